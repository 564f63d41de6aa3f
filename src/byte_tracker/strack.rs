use crate::byte_tracker::kalman_filter::{KalmanFilter, StateCov, StateMean};
use crate::byte_tracker::rect::Rect;
use crate::error::TrackError;
use std::fmt::Debug;

/*----------------------------------------------------------------------------
STrack State enums
----------------------------------------------------------------------------*/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    New,
    Tracked,
    Lost,
    Removed,
}

/*----------------------------------------------------------------------------
Track lifecycle
----------------------------------------------------------------------------*/

/// Lifecycle surface shared by trackable objects. Additional track kinds
/// extend `TrackState` and implement this trait; there is no base class.
pub(crate) trait TrackLifecycle {
    /// Bind a fresh id, initiate the motion state and enter `Tracked`.
    fn activate(
        &mut self,
        kalman_filter: &KalmanFilter,
        frame_id: usize,
        track_id: usize,
    );

    /// Advance the motion state by one frame.
    fn predict(&mut self);

    /// Fold a matched detection into the motion state.
    fn update(
        &mut self,
        new_track: &Self,
        frame_id: usize,
    ) -> Result<(), TrackError>;
}

/*----------------------------------------------------------------------------
STrack struct
----------------------------------------------------------------------------*/

impl Debug for STrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "STrack {{ track_id: {}, frame_id: {}, start_frame_id: {}, tracklet_len: {}, state: {:?}, is_activated: {}, score: {}, rect: {:?} }}",
            self.track_id, self.frame_id, self.start_frame_id, self.tracklet_len, self.state, self.is_activated, self.score, self.rect
        )
    }
}

#[derive(Clone)]
pub struct STrack {
    kalman_filter: KalmanFilter,
    pub(crate) mean: StateMean,
    pub(crate) covariance: StateCov,
    rect: Rect<f32>,
    state: TrackState,
    is_activated: bool,
    score: f32,
    track_id: usize,
    frame_id: usize,
    start_frame_id: usize,
    tracklet_len: usize,
    // reserved for multi-camera association
    location: (f32, f32),
}

impl STrack {
    pub fn new(rect: Rect<f32>, score: f32) -> Self {
        let kalman_filter = KalmanFilter::new(1.0 / 20., 1.0 / 160.);
        Self {
            kalman_filter,
            mean: StateMean::zeros(),
            covariance: StateCov::zeros(),
            rect,
            state: TrackState::New,
            is_activated: false,
            score,
            track_id: 0,
            frame_id: 0,
            start_frame_id: 0,
            tracklet_len: 0,
            location: (f32::INFINITY, f32::INFINITY),
        }
    }

    // This constructor is used by the list-helper tests in
    // src/test_byte_tracker.rs
    #[cfg(test)]
    pub(crate) fn dummy_strack(track_id: usize) -> Self {
        let mut track = Self::new(Rect::new(0.0, 0.0, 0.0, 0.0), 0.0);
        track.track_id = track_id;
        track
    }

    pub fn get_rect(&self) -> Rect<f32> {
        self.rect.clone()
    }

    pub fn get_state(&self) -> TrackState {
        self.state
    }

    pub fn is_activated(&self) -> bool {
        self.is_activated
    }

    pub fn get_score(&self) -> f32 {
        self.score
    }

    pub fn get_track_id(&self) -> usize {
        self.track_id
    }

    pub fn get_frame_id(&self) -> usize {
        self.frame_id
    }

    pub fn get_start_frame_id(&self) -> usize {
        self.start_frame_id
    }

    pub fn get_tracklet_length(&self) -> usize {
        self.tracklet_len
    }

    pub fn get_location(&self) -> (f32, f32) {
        self.location
    }

    /// Frames this track has been alive since activation.
    pub(crate) fn age(&self) -> usize {
        self.frame_id - self.start_frame_id
    }

    /// Kalman update from a matched detection, re-entering `Tracked` from
    /// `Lost`. `new_track_id` rebinds the identity when given. The run
    /// length restarts.
    pub(crate) fn re_activate(
        &mut self,
        new_track: &STrack,
        frame_id: usize,
        new_track_id: Option<usize>,
    ) -> Result<(), TrackError> {
        let (mean, covariance) = self.kalman_filter.update(
            &self.mean,
            &self.covariance,
            &new_track.get_rect().get_xyah(),
        )?;
        self.mean = mean;
        self.covariance = covariance;
        self.update_rect();

        self.state = TrackState::Tracked;
        self.is_activated = true;
        self.score = new_track.get_score();
        self.tracklet_len = 0;

        if let Some(track_id) = new_track_id {
            self.track_id = track_id;
        }
        self.frame_id = frame_id;
        Ok(())
    }

    /// Batched predict over a pool of tracks through the tracker's shared
    /// filter. Matches calling `predict` on each track in turn.
    pub(crate) fn multi_predict(
        tracks: &mut [STrack],
        kalman_filter: &KalmanFilter,
    ) {
        if tracks.is_empty() {
            return;
        }

        let mut means = Vec::with_capacity(tracks.len());
        let mut covariances = Vec::with_capacity(tracks.len());
        for track in tracks.iter_mut() {
            if track.state != TrackState::Tracked {
                track.mean[(0, 7)] = 0.;
            }
            means.push(track.mean);
            covariances.push(track.covariance);
        }

        kalman_filter.multi_predict(&mut means, &mut covariances);

        for (track, (mean, covariance)) in tracks
            .iter_mut()
            .zip(means.into_iter().zip(covariances.into_iter()))
        {
            track.mean = mean;
            track.covariance = covariance;
            track.update_rect();
        }
    }

    pub(crate) fn mark_as_lost(&mut self) {
        self.state = TrackState::Lost;
    }

    pub(crate) fn mark_as_removed(&mut self) {
        self.state = TrackState::Removed;
    }

    // Derive the tlwh view from the motion state.
    pub(crate) fn update_rect(&mut self) {
        self.rect.set_width(self.mean[(0, 2)] * self.mean[(0, 3)]);
        self.rect.set_height(self.mean[(0, 3)]);
        self.rect
            .set_x(self.mean[(0, 0)] - self.rect.width() / 2.);
        self.rect
            .set_y(self.mean[(0, 1)] - self.rect.height() / 2.);
    }
}

impl TrackLifecycle for STrack {
    fn activate(
        &mut self,
        kalman_filter: &KalmanFilter,
        frame_id: usize,
        track_id: usize,
    ) {
        self.kalman_filter = kalman_filter.clone();
        let (mean, covariance) =
            self.kalman_filter.initiate(&self.rect.get_xyah());
        self.mean = mean;
        self.covariance = covariance;
        self.update_rect();

        self.state = TrackState::Tracked;
        // Only a track born in the very first frame is emitted before its
        // second hit.
        if frame_id == 1 {
            self.is_activated = true;
        }
        self.track_id = track_id;
        self.frame_id = frame_id;
        self.start_frame_id = frame_id;
        self.tracklet_len = 0;
    }

    fn predict(&mut self) {
        if self.state != TrackState::Tracked {
            self.mean[(0, 7)] = 0.;
        }
        let (mean, covariance) =
            self.kalman_filter.predict(&self.mean, &self.covariance);
        self.mean = mean;
        self.covariance = covariance;
        self.update_rect();
    }

    fn update(
        &mut self,
        new_track: &STrack,
        frame_id: usize,
    ) -> Result<(), TrackError> {
        let (mean, covariance) = self.kalman_filter.update(
            &self.mean,
            &self.covariance,
            &new_track.get_rect().get_xyah(),
        )?;
        self.mean = mean;
        self.covariance = covariance;
        self.update_rect();

        self.state = TrackState::Tracked;
        self.is_activated = true;
        self.score = new_track.get_score();
        self.frame_id = frame_id;
        self.tracklet_len += 1;
        Ok(())
    }
}

impl PartialEq for STrack {
    fn eq(&self, other: &Self) -> bool {
        self.track_id == other.track_id
    }
}
