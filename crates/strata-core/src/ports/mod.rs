//! Ports - seams to the outside world.
//!
//! Each trait hides something the engine should not depend on directly:
//! wall-clock time, id randomness, and the external store violations are
//! published to.

pub mod clock;
pub mod id_generator;
pub mod violation_sink;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::violation_sink::ViolationSink;
