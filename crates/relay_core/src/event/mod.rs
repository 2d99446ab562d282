//! Synchronous broadcast primitives.
//!
//! [`Event`] fans a notification out to every connected handler in
//! connection order. Handlers receive the arguments by mutable reference and
//! later handlers observe earlier handlers' edits. [`Pipeline`] makes that
//! explicit: named stages that transform a shared buffer in sequence.

mod handler_list;
mod multicast;
mod pipeline;
mod subscription;

pub use multicast::{Event, Subscriber};
pub use pipeline::Pipeline;
pub use subscription::Subscription;
