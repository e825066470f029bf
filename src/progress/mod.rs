pub mod channel;
pub mod registry;

pub use channel::{ProgressChannel, ProgressReporter};
pub use registry::SessionRegistry;
