//! Tasks - declaring and registering task bodies.
//!
//! - **body**: [`TaskBody`] trait, implemented for plain functions too
//! - **definition**: [`TaskDefinition`] = descriptor + body
//! - **registry**: [`TaskRegistry`], one per integration

pub mod body;
pub mod definition;
pub mod registry;

pub use self::body::TaskBody;
pub use self::definition::TaskDefinition;
pub use self::registry::TaskRegistry;
