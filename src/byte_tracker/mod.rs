mod byte_tracker;
pub mod kalman_filter;
mod matching;

pub mod detection;
pub mod rect;
pub mod strack;

pub use crate::error::TrackError;
pub use byte_tracker::ByteTracker;
pub use detection::DetectionFormat;
pub use rect::Rect;
