mod metadata;
mod mode;
mod timestamp;

pub use metadata::Metadata;
pub use mode::OutputMode;
pub use timestamp::{format_duration, Timestamp};
