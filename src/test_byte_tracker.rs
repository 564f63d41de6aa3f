use crate::byte_tracker::kalman_filter::KalmanFilter;
use crate::byte_tracker::ByteTracker;
use crate::rect::Rect;
use crate::strack::{STrack, TrackLifecycle};

// Track with a real lifecycle behind it: activated at `start_frame`,
// last matched at `last_frame`, sitting on `rect`.
fn aged_strack(
    track_id: usize,
    start_frame: usize,
    last_frame: usize,
    rect: Rect<f32>,
) -> STrack {
    let kalman_filter = KalmanFilter::new(1.0 / 20., 1.0 / 160.);
    let mut track = STrack::new(rect.clone(), 0.9);
    track.activate(&kalman_filter, start_frame, track_id);
    if last_frame > start_frame {
        let hit = STrack::new(rect, 0.9);
        track.update(&hit, last_frame).unwrap();
    }
    track
}

#[test]
fn test_joint_stracks() {
    let a_tlist: Vec<STrack> = vec![
        STrack::dummy_strack(1),
        STrack::dummy_strack(2),
        STrack::dummy_strack(3),
        STrack::dummy_strack(4),
        STrack::dummy_strack(5),
    ];
    let b_tlist: Vec<STrack> = vec![
        STrack::dummy_strack(2),
        STrack::dummy_strack(3),
        STrack::dummy_strack(4),
        STrack::dummy_strack(5),
        STrack::dummy_strack(6),
    ];

    let result = ByteTracker::joint_stracks(&a_tlist, &b_tlist);

    let expected_result: Vec<STrack> = vec![
        STrack::dummy_strack(1),
        STrack::dummy_strack(2),
        STrack::dummy_strack(3),
        STrack::dummy_strack(4),
        STrack::dummy_strack(5),
        STrack::dummy_strack(6),
    ];

    assert_eq!(result, expected_result);
}

#[test]
fn test_sub_stracks() {
    let a_tlist: Vec<STrack> = vec![
        STrack::dummy_strack(1),
        STrack::dummy_strack(2),
        STrack::dummy_strack(3),
        STrack::dummy_strack(4),
        STrack::dummy_strack(5),
    ];
    let b_tlist: Vec<STrack> =
        vec![STrack::dummy_strack(2), STrack::dummy_strack(4)];

    let result = ByteTracker::sub_stracks(&a_tlist, &b_tlist);

    let expected_result: Vec<STrack> = vec![
        STrack::dummy_strack(1),
        STrack::dummy_strack(3),
        STrack::dummy_strack(5),
    ];
    assert_eq!(result, expected_result);
}

#[test]
fn test_remove_duplicate_stracks_keeps_older() {
    let rect = Rect::new(100.0, 100.0, 100.0, 200.0);
    // tracked since frame 1, lost twin born later
    let tracked = vec![aged_strack(1, 1, 10, rect.clone())];
    let lost = vec![aged_strack(2, 6, 10, rect.clone())];

    let (result_tracked, result_lost) =
        ByteTracker::remove_duplicate_stracks(&tracked, &lost);

    assert_eq!(result_tracked.len(), 1);
    assert_eq!(result_tracked[0].get_track_id(), 1);
    assert!(result_lost.is_empty());

    // mirrored ages drop from the tracked side instead
    let tracked = vec![aged_strack(3, 6, 10, rect.clone())];
    let lost = vec![aged_strack(4, 1, 10, rect)];
    let (result_tracked, result_lost) =
        ByteTracker::remove_duplicate_stracks(&tracked, &lost);
    assert!(result_tracked.is_empty());
    assert_eq!(result_lost[0].get_track_id(), 4);
}

#[test]
fn test_remove_duplicate_stracks_tie_drops_lost() {
    let rect = Rect::new(100.0, 100.0, 100.0, 200.0);
    let tracked = vec![aged_strack(1, 2, 10, rect.clone())];
    let lost = vec![aged_strack(2, 2, 10, rect)];

    let (result_tracked, result_lost) =
        ByteTracker::remove_duplicate_stracks(&tracked, &lost);

    assert_eq!(result_tracked.len(), 1);
    assert!(result_lost.is_empty());
}

#[test]
fn test_remove_duplicate_stracks_ignores_disjoint() {
    let tracked =
        vec![aged_strack(1, 1, 10, Rect::new(0.0, 0.0, 50.0, 50.0))];
    let lost =
        vec![aged_strack(2, 1, 10, Rect::new(500.0, 0.0, 50.0, 50.0))];

    let (result_tracked, result_lost) =
        ByteTracker::remove_duplicate_stracks(&tracked, &lost);

    assert_eq!(result_tracked.len(), 1);
    assert_eq!(result_lost.len(), 1);
}
