use crate::byte_tracker::rect::Rect;
use crate::byte_tracker::strack::STrack;
use crate::error::TrackError;
use crate::lapjv::lapjv;
use nalgebra::DMatrix;

/*-----------------------------------------------------------------------------
IoU kernel
-----------------------------------------------------------------------------*/

/// Pairwise IoU between two batches of boxes. Either side may be empty,
/// yielding an empty matrix of the right shape.
pub(crate) fn ious(
    a_rects: &[Rect<f32>],
    b_rects: &[Rect<f32>],
) -> DMatrix<f32> {
    let mut ious = DMatrix::zeros(a_rects.len(), b_rects.len());
    if a_rects.is_empty() || b_rects.is_empty() {
        return ious;
    }

    for (ai, a_rect) in a_rects.iter().enumerate() {
        for (bi, b_rect) in b_rects.iter().enumerate() {
            ious[(ai, bi)] = a_rect.calc_iou(b_rect);
        }
    }
    ious
}

/// `1 - IoU` cost matrix over two sets of boxes.
pub(crate) fn iou_distance_boxes(
    a_rects: &[Rect<f32>],
    b_rects: &[Rect<f32>],
) -> DMatrix<f32> {
    let mut cost_matrix = ious(a_rects, b_rects);
    for value in cost_matrix.iter_mut() {
        *value = 1.0 - *value;
    }
    cost_matrix
}

/// `1 - IoU` cost matrix over two sets of tracks; boxes are extracted
/// once at this boundary.
pub(crate) fn iou_distance(
    a_tracks: &[STrack],
    b_tracks: &[STrack],
) -> DMatrix<f32> {
    let a_rects: Vec<Rect<f32>> =
        a_tracks.iter().map(|track| track.get_rect()).collect();
    let b_rects: Vec<Rect<f32>> =
        b_tracks.iter().map(|track| track.get_rect()).collect();
    iou_distance_boxes(&a_rects, &b_rects)
}

/*-----------------------------------------------------------------------------
Linear assignment
-----------------------------------------------------------------------------*/

/// Optimal partial assignment under a cost gate. Pairs costing more than
/// `thresh` are infeasible; every returned match costs at most `thresh`.
/// Returns `(matches, unmatched_rows, unmatched_cols)`.
pub(crate) fn linear_assignment(
    cost_matrix: &DMatrix<f32>,
    thresh: f32,
) -> Result<(Vec<(usize, usize)>, Vec<usize>, Vec<usize>), TrackError> {
    let n_rows = cost_matrix.nrows();
    let n_cols = cost_matrix.ncols();
    if n_rows == 0 || n_cols == 0 {
        return Ok((
            Vec::new(),
            (0..n_rows).collect(),
            (0..n_cols).collect(),
        ));
    }

    // Square extension: row i can fall back to dummy column n_cols + i
    // and column j to dummy row n_rows + j, both at cost_limit / 2, so a
    // real pair is taken exactly when it beats the gate. Costs above the
    // gate are clamped to the limit, keeping the solver finite.
    let cost_limit = (thresh as f64) + 1e-4;
    let n = n_rows + n_cols;
    let mut cost = vec![vec![cost_limit / 2.0; n]; n];
    for row in cost.iter_mut().skip(n_rows) {
        for value in row.iter_mut().skip(n_cols) {
            *value = 0.0;
        }
    }
    for row in 0..n_rows {
        for col in 0..n_cols {
            let c = cost_matrix[(row, col)] as f64;
            cost[row][col] = if c > thresh as f64 { cost_limit } else { c };
        }
    }

    let mut x = vec![-1isize; n];
    let mut y = vec![-1isize; n];
    let n_free = lapjv(n, &cost, &mut x, &mut y);
    if n_free != 0 {
        return Err(TrackError::Assignment(format!(
            "{} rows left unassigned",
            n_free
        )));
    }

    let mut matches = Vec::new();
    let mut unmatched_rows = Vec::new();
    let mut matched_cols = vec![false; n_cols];
    for (row, &col) in x.iter().take(n_rows).enumerate() {
        let col = col as usize;
        if col < n_cols && cost_matrix[(row, col)] <= thresh {
            matches.push((row, col));
            matched_cols[col] = true;
        } else {
            unmatched_rows.push(row);
        }
    }
    let unmatched_cols =
        (0..n_cols).filter(|&col| !matched_cols[col]).collect();

    Ok((matches, unmatched_rows, unmatched_cols))
}
