use crate::byte_tracker::rect::Rect;
use crate::error::TrackError;
use nalgebra::DMatrix;

/*------------------------------------------------------------------------------
Detector output layout
------------------------------------------------------------------------------*/

/// Column layout of the raw detector matrix, keyed on its width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionFormat {
    /// Five columns `[x1, y1, x2, y2, score]`.
    Scored,
    /// Six or more columns `[x1, y1, x2, y2, objectness, class_conf, ..]`;
    /// the score is the product of objectness and class confidence.
    ClassConditional,
}

impl DetectionFormat {
    pub fn from_columns(ncols: usize) -> Result<Self, TrackError> {
        match ncols {
            0..=4 => Err(TrackError::InvalidInput(format!(
                "detection matrix needs at least 5 columns, got {}",
                ncols
            ))),
            5 => Ok(Self::Scored),
            _ => Ok(Self::ClassConditional),
        }
    }

    fn score(&self, row: usize, output_results: &DMatrix<f32>) -> f32 {
        match self {
            Self::Scored => output_results[(row, 4)],
            Self::ClassConditional => {
                output_results[(row, 4)] * output_results[(row, 5)]
            }
        }
    }
}

/*------------------------------------------------------------------------------
Detection struct
------------------------------------------------------------------------------*/

/// A single decoded detection, alive for one tracker update.
#[derive(Debug, Clone)]
pub struct Detection {
    rect: Rect<f32>,
    score: f32,
}

impl Detection {
    pub fn new(rect: Rect<f32>, score: f32) -> Self {
        Self { rect, score }
    }

    pub fn rect(&self) -> &Rect<f32> {
        &self.rect
    }

    pub fn score(&self) -> f32 {
        self.score
    }
}

/*------------------------------------------------------------------------------
Decode boundary
------------------------------------------------------------------------------*/

/// Decode the raw detector matrix into scored boxes in original-image
/// pixels, undoing the detector's letterbox scale. `img_info` is the
/// original `(height, width)`, `img_size` the size the detector ran at.
pub(crate) fn decode_detections(
    output_results: &DMatrix<f32>,
    img_info: (u32, u32),
    img_size: (u32, u32),
) -> Result<Vec<Detection>, TrackError> {
    if img_info.0 == 0 || img_info.1 == 0 {
        return Err(TrackError::InvalidInput(format!(
            "image size must be positive, got {}x{}",
            img_info.0, img_info.1
        )));
    }
    if img_size.0 == 0 || img_size.1 == 0 {
        return Err(TrackError::InvalidInput(format!(
            "detector input size must be positive, got {}x{}",
            img_size.0, img_size.1
        )));
    }
    if output_results.nrows() == 0 {
        return Ok(Vec::new());
    }

    let format = DetectionFormat::from_columns(output_results.ncols())?;

    let (img_h, img_w) = img_info;
    let scale = (img_size.0 as f32 / img_h as f32)
        .min(img_size.1 as f32 / img_w as f32);

    let mut detections = Vec::with_capacity(output_results.nrows());
    for row in 0..output_results.nrows() {
        let x1 = output_results[(row, 0)];
        let y1 = output_results[(row, 1)];
        let x2 = output_results[(row, 2)];
        let y2 = output_results[(row, 3)];
        let score = format.score(row, output_results);

        if [x1, y1, x2, y2, score]
            .iter()
            .any(|value| !value.is_finite())
        {
            return Err(TrackError::NonFiniteMeasurement(format!(
                "detection row {}",
                row
            )));
        }

        let rect =
            Rect::from_xyxy(x1 / scale, y1 / scale, x2 / scale, y2 / scale);
        detections.push(Detection::new(rect, score));
    }
    Ok(detections)
}
