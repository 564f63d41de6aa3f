use crate::byte_tracker::detection::decode_detections;
use crate::byte_tracker::kalman_filter::KalmanFilter;
use crate::byte_tracker::matching;
use crate::byte_tracker::rect::Rect;
use crate::byte_tracker::strack::{STrack, TrackLifecycle, TrackState};
use crate::error::TrackError;
use crate::Tracker;
use log::{debug, warn};
use nalgebra::DMatrix;
use std::collections::HashSet;

/*-----------------------------------------------------------------------------
ByteTracker
-----------------------------------------------------------------------------*/

// Fixed thresholds of the association cascade.
const LOW_SCORE_FLOOR: f32 = 0.1;
const SECOND_MATCH_THRESH: f32 = 0.5;
const UNCONFIRMED_MATCH_THRESH: f32 = 0.7;
const DUPLICATE_IOU_DISTANCE: f32 = 0.15;

/// Two-stage association tracker. High-confidence detections drive the
/// first pass; low-confidence ones only rescue tracks the first pass
/// missed. Identities are instance-local and monotonic.
#[derive(Debug)]
pub struct ByteTracker {
    track_thresh: f32,
    det_thresh: f32,
    match_thresh: f32,
    max_time_lost: usize,

    frame_id: usize,
    track_id_count: usize,

    kalman_filter: KalmanFilter,

    tracked_stracks: Vec<STrack>,
    lost_stracks: Vec<STrack>,
    removed_stracks: Vec<STrack>,
}

impl ByteTracker {
    /// Create a tracker. The defaults of the reference configuration are
    /// `(30, 30, 0.25, 0.8)`; new tracks additionally need a score of at
    /// least `track_thresh + 0.1`, and a lost track is retained for
    /// `frame_rate / 30 * track_buffer` frames.
    pub fn new(
        frame_rate: usize,
        track_buffer: usize,
        track_thresh: f32,
        match_thresh: f32,
    ) -> Result<Self, TrackError> {
        if frame_rate == 0 {
            return Err(TrackError::InvalidConfig(
                "frame_rate must be positive".into(),
            ));
        }
        if track_buffer == 0 {
            return Err(TrackError::InvalidConfig(
                "track_buffer must be positive".into(),
            ));
        }
        if !track_thresh.is_finite() || !(0.0..1.0).contains(&track_thresh) {
            return Err(TrackError::InvalidConfig(format!(
                "track_thresh must be in [0, 1), got {}",
                track_thresh
            )));
        }
        if !match_thresh.is_finite() || !(0.0..=1.0).contains(&match_thresh) {
            return Err(TrackError::InvalidConfig(format!(
                "match_thresh must be in [0, 1], got {}",
                match_thresh
            )));
        }

        let max_time_lost =
            (frame_rate as f32 / 30.0 * track_buffer as f32) as usize;

        Ok(Self {
            track_thresh,
            det_thresh: track_thresh + 0.1,
            match_thresh,
            max_time_lost,

            frame_id: 0,
            track_id_count: 0,

            kalman_filter: KalmanFilter::new(1.0 / 20., 1.0 / 160.),

            tracked_stracks: Vec::new(),
            lost_stracks: Vec::new(),
            removed_stracks: Vec::new(),
        })
    }

    pub fn frame_id(&self) -> usize {
        self.frame_id
    }

    pub fn max_time_lost(&self) -> usize {
        self.max_time_lost
    }

    pub fn tracked_stracks(&self) -> &[STrack] {
        &self.tracked_stracks
    }

    pub fn lost_stracks(&self) -> &[STrack] {
        &self.lost_stracks
    }

    pub fn removed_stracks(&self) -> &[STrack] {
        &self.removed_stracks
    }

    /// Run one frame through the cascade and return the activated tracks.
    /// Shape and configuration errors surface before any tracker state
    /// changes; a per-track numerical failure drops that track to lost
    /// on its predicted state.
    pub fn update(
        &mut self,
        output_results: &DMatrix<f32>,
        img_info: (u32, u32),
        img_size: (u32, u32),
    ) -> Result<Vec<STrack>, TrackError> {
        let decoded = decode_detections(output_results, img_info, img_size)?;

        self.frame_id += 1;
        let frame_id = self.frame_id;

        let mut activated_stracks: Vec<STrack> = Vec::new();
        let mut refind_stracks: Vec<STrack> = Vec::new();
        let mut lost_stracks: Vec<STrack> = Vec::new();
        let mut removed_stracks: Vec<STrack> = Vec::new();

        // Partition detections at the tracking threshold; scores in
        // (0.1, track_thresh] are kept for the rescue pass only.
        let mut detections: Vec<STrack> = Vec::new();
        let mut detections_second: Vec<STrack> = Vec::new();
        for det in &decoded {
            if det.score() > self.track_thresh {
                detections.push(STrack::new(det.rect().clone(), det.score()));
            } else if det.score() > LOW_SCORE_FLOOR {
                detections_second
                    .push(STrack::new(det.rect().clone(), det.score()));
            }
        }

        // Split the active set into confirmed tracks and fresh births
        // still waiting for their second hit.
        let mut unconfirmed: Vec<STrack> = Vec::new();
        let mut tracked_stracks: Vec<STrack> = Vec::new();
        for track in self.tracked_stracks.drain(..) {
            if track.is_activated() {
                tracked_stracks.push(track);
            } else {
                unconfirmed.push(track);
            }
        }

        // Predict over confirmed and lost tracks.
        let confirmed_len = tracked_stracks.len();
        let mut strack_pool =
            Self::joint_stracks(&tracked_stracks, &self.lost_stracks);
        STrack::multi_predict(&mut strack_pool, &self.kalman_filter);

        // First association: high-confidence detections.
        let dists = matching::iou_distance(&strack_pool, &detections);
        let (matches, u_track, u_detection) =
            matching::linear_assignment(&dists, self.match_thresh)?;
        Self::apply_matches(
            frame_id,
            &mut strack_pool,
            &detections,
            &matches,
            &mut activated_stracks,
            &mut refind_stracks,
            &mut lost_stracks,
        );

        // Second association: rescue still-tracked leftovers with the
        // low-confidence pool.
        let r_tracked_indices: Vec<usize> = u_track
            .iter()
            .copied()
            .filter(|&index| {
                strack_pool[index].get_state() == TrackState::Tracked
            })
            .collect();
        let r_rects: Vec<Rect<f32>> = r_tracked_indices
            .iter()
            .map(|&index| strack_pool[index].get_rect())
            .collect();
        let second_rects: Vec<Rect<f32>> = detections_second
            .iter()
            .map(|track| track.get_rect())
            .collect();
        let dists = matching::iou_distance_boxes(&r_rects, &second_rects);
        let (matches, u_track_second, _) =
            matching::linear_assignment(&dists, SECOND_MATCH_THRESH)?;
        let matches: Vec<(usize, usize)> = matches
            .iter()
            .map(|&(row, col)| (r_tracked_indices[row], col))
            .collect();
        Self::apply_matches(
            frame_id,
            &mut strack_pool,
            &detections_second,
            &matches,
            &mut activated_stracks,
            &mut refind_stracks,
            &mut lost_stracks,
        );
        for row in u_track_second {
            let track = &mut strack_pool[r_tracked_indices[row]];
            track.mark_as_lost();
            lost_stracks.push(track.clone());
        }

        // Unconfirmed tracks get one shot at the detections the first
        // pass left over; a miss removes them.
        let remaining_detections = u_detection;
        let remaining_rects: Vec<Rect<f32>> = remaining_detections
            .iter()
            .map(|&index| detections[index].get_rect())
            .collect();
        let unconfirmed_rects: Vec<Rect<f32>> = unconfirmed
            .iter()
            .map(|track| track.get_rect())
            .collect();
        let dists =
            matching::iou_distance_boxes(&unconfirmed_rects, &remaining_rects);
        let (matches, u_unconfirmed, u_detection) =
            matching::linear_assignment(&dists, UNCONFIRMED_MATCH_THRESH)?;
        for (row, col) in matches {
            let det = &detections[remaining_detections[col]];
            let track = &mut unconfirmed[row];
            match track.update(det, frame_id) {
                Ok(()) => activated_stracks.push(track.clone()),
                Err(err) => warn!(
                    "track {} kept its predicted state: {}",
                    track.get_track_id(),
                    err
                ),
            }
        }
        for row in u_unconfirmed {
            let track = &mut unconfirmed[row];
            track.mark_as_removed();
            removed_stracks.push(track.clone());
        }

        // Births: leftovers of the unconfirmed pass above the admission
        // threshold. Low-confidence detections never spawn tracks.
        for col in u_detection {
            let track = &mut detections[remaining_detections[col]];
            if track.get_score() < self.det_thresh {
                continue;
            }
            self.track_id_count += 1;
            track.activate(&self.kalman_filter, frame_id, self.track_id_count);
            activated_stracks.push(track.clone());
        }

        // Retire lost tracks that outlived the buffer.
        for track in strack_pool.iter_mut().skip(confirmed_len) {
            if frame_id - track.get_frame_id() > self.max_time_lost {
                track.mark_as_removed();
                removed_stracks.push(track.clone());
            }
        }

        // Merge. Survivors of the previous active set keep their relative
        // order, then fresh activations, then recovered tracks.
        let mut next_tracked: Vec<STrack> = strack_pool[..confirmed_len]
            .iter()
            .filter(|track| track.get_state() == TrackState::Tracked)
            .cloned()
            .collect();
        next_tracked.extend(
            unconfirmed
                .iter()
                .filter(|track| track.get_state() == TrackState::Tracked)
                .cloned(),
        );
        let next_tracked =
            Self::joint_stracks(&next_tracked, &activated_stracks);
        let next_tracked = Self::joint_stracks(&next_tracked, &refind_stracks);

        let prev_lost = strack_pool.split_off(confirmed_len);
        let mut next_lost = Self::sub_stracks(&prev_lost, &next_tracked);
        next_lost.extend(lost_stracks);
        // Expired tracks join the removed history exactly once and leave
        // the lost list in the same frame.
        self.removed_stracks.extend(removed_stracks);
        let next_lost = Self::sub_stracks(&next_lost, &self.removed_stracks);

        let (next_tracked, next_lost) =
            Self::remove_duplicate_stracks(&next_tracked, &next_lost);

        self.tracked_stracks = next_tracked;
        self.lost_stracks = next_lost;

        debug!(
            "frame {}: {} tracked, {} lost, {} removed",
            frame_id,
            self.tracked_stracks.len(),
            self.lost_stracks.len(),
            self.removed_stracks.len()
        );

        Ok(self
            .tracked_stracks
            .iter()
            .filter(|track| track.is_activated())
            .cloned()
            .collect())
    }

    // Fold matched detections into their tracks. Tracks in `Tracked`
    // continue, anything else is recovered from Lost. A numerical failure
    // drops the track to Lost on its predicted state so it can still age
    // out; a failed recovery simply stays lost.
    fn apply_matches(
        frame_id: usize,
        pool: &mut [STrack],
        detections: &[STrack],
        matches: &[(usize, usize)],
        activated_stracks: &mut Vec<STrack>,
        refind_stracks: &mut Vec<STrack>,
        lost_stracks: &mut Vec<STrack>,
    ) {
        for &(itracked, idet) in matches {
            let det = &detections[idet];
            let track = &mut pool[itracked];
            if track.get_state() == TrackState::Tracked {
                match track.update(det, frame_id) {
                    Ok(()) => activated_stracks.push(track.clone()),
                    Err(err) => {
                        warn!(
                            "track {} lost after failed update: {}",
                            track.get_track_id(),
                            err
                        );
                        track.mark_as_lost();
                        lost_stracks.push(track.clone());
                    }
                }
            } else {
                match track.re_activate(det, frame_id, None) {
                    Ok(()) => refind_stracks.push(track.clone()),
                    Err(err) => warn!(
                        "track {} stays lost: {}",
                        track.get_track_id(),
                        err
                    ),
                }
            }
        }
    }

    /// Order-preserving union of two track lists; the first occurrence of
    /// an id wins.
    pub fn joint_stracks(
        a_tracks: &[STrack],
        b_tracks: &[STrack],
    ) -> Vec<STrack> {
        let mut exists = HashSet::new();
        let mut res = Vec::new();

        for track in a_tracks {
            exists.insert(track.get_track_id());
            res.push(track.clone());
        }
        for track in b_tracks {
            if exists.insert(track.get_track_id()) {
                res.push(track.clone());
            }
        }
        res
    }

    /// Tracks of `a_tracks` whose id does not appear in `b_tracks`.
    pub fn sub_stracks(
        a_tracks: &[STrack],
        b_tracks: &[STrack],
    ) -> Vec<STrack> {
        let b_ids: HashSet<usize> =
            b_tracks.iter().map(|track| track.get_track_id()).collect();
        a_tracks
            .iter()
            .filter(|track| !b_ids.contains(&track.get_track_id()))
            .cloned()
            .collect()
    }

    /// Drop near-identical tracks across the two lists. The younger of an
    /// overlapping pair yields; on equal age the second list yields.
    pub fn remove_duplicate_stracks(
        a_tracks: &[STrack],
        b_tracks: &[STrack],
    ) -> (Vec<STrack>, Vec<STrack>) {
        let pairwise_distance = matching::iou_distance(a_tracks, b_tracks);

        let mut duplicates_a = HashSet::new();
        let mut duplicates_b = HashSet::new();
        for ai in 0..a_tracks.len() {
            for bi in 0..b_tracks.len() {
                if pairwise_distance[(ai, bi)] >= DUPLICATE_IOU_DISTANCE {
                    continue;
                }
                if a_tracks[ai].age() >= b_tracks[bi].age() {
                    duplicates_b.insert(bi);
                } else {
                    duplicates_a.insert(ai);
                }
            }
        }

        let result_a = a_tracks
            .iter()
            .enumerate()
            .filter(|(index, _)| !duplicates_a.contains(index))
            .map(|(_, track)| track.clone())
            .collect();
        let result_b = b_tracks
            .iter()
            .enumerate()
            .filter(|(index, _)| !duplicates_b.contains(index))
            .map(|(_, track)| track.clone())
            .collect();
        (result_a, result_b)
    }
}

impl Tracker for ByteTracker {
    fn update(
        &mut self,
        output_results: &DMatrix<f32>,
        img_info: (u32, u32),
        img_size: (u32, u32),
    ) -> Result<Vec<STrack>, TrackError> {
        ByteTracker::update(self, output_results, img_info, img_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_update_drops_matched_track_to_lost() {
        let kalman_filter = KalmanFilter::new(1.0 / 20., 1.0 / 160.);
        let rect = Rect::new(100.0, 100.0, 100.0, 200.0);
        let mut track = STrack::new(rect.clone(), 0.9);
        track.activate(&kalman_filter, 1, 1);
        // wreck the covariance so the correction step cannot factor it
        track.covariance[(0, 0)] = -1e12;

        let mut pool = vec![track];
        let detections = vec![STrack::new(rect, 0.85)];
        let mut activated = Vec::new();
        let mut refind = Vec::new();
        let mut lost = Vec::new();

        ByteTracker::apply_matches(
            2,
            &mut pool,
            &detections,
            &[(0, 0)],
            &mut activated,
            &mut refind,
            &mut lost,
        );

        // the track enters the lost lifecycle instead of lingering in the
        // active set with a frozen state
        assert!(activated.is_empty());
        assert!(refind.is_empty());
        assert_eq!(lost.len(), 1);
        assert_eq!(lost[0].get_track_id(), 1);
        assert_eq!(pool[0].get_state(), TrackState::Lost);
        // the failed correction did not advance the track's clock, so the
        // retention bound is measured from its last good frame
        assert_eq!(pool[0].get_frame_id(), 1);
    }

    #[test]
    fn test_failed_recovery_keeps_track_lost() {
        let kalman_filter = KalmanFilter::new(1.0 / 20., 1.0 / 160.);
        let rect = Rect::new(100.0, 100.0, 100.0, 200.0);
        let mut track = STrack::new(rect.clone(), 0.9);
        track.activate(&kalman_filter, 1, 1);
        track.mark_as_lost();
        track.covariance[(0, 0)] = -1e12;

        let mut pool = vec![track];
        let detections = vec![STrack::new(rect, 0.85)];
        let mut activated = Vec::new();
        let mut refind = Vec::new();
        let mut lost = Vec::new();

        ByteTracker::apply_matches(
            3,
            &mut pool,
            &detections,
            &[(0, 0)],
            &mut activated,
            &mut refind,
            &mut lost,
        );

        assert!(refind.is_empty());
        assert!(lost.is_empty());
        assert_eq!(pool[0].get_state(), TrackState::Lost);
        assert_eq!(pool[0].get_frame_id(), 1);
    }
}
