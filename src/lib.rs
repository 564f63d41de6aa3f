pub mod byte_tracker;
pub mod error;
pub mod lapjv;

pub use byte_tracker::detection;
pub use byte_tracker::rect;
pub use byte_tracker::strack;

use crate::error::TrackError;
use crate::strack::STrack;
use nalgebra::DMatrix;

/// One tracker instance per video stream. `output_results` is the raw
/// detector matrix (one row per detection, at least five columns),
/// `img_info` the original `(height, width)` of the frame and `img_size`
/// the `(height, width)` the detector was run at.
pub trait Tracker {
    fn update(
        &mut self,
        output_results: &DMatrix<f32>,
        img_info: (u32, u32),
        img_size: (u32, u32),
    ) -> Result<Vec<STrack>, TrackError>;
}

#[cfg(test)]
mod test_byte_tracker;
#[cfg(test)]
mod test_lapjv;
