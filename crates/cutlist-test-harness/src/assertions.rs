use cutlist_core::history::History;
use cutlist_core::timeline::{Timeline, TimelinePosition};

/// Assert that a track holds a specific number of clips.
pub fn assert_track_clip_count(timeline: &Timeline, track_index: usize, expected: usize) {
    let actual = timeline.clips_on_track(track_index).count();
    assert_eq!(
        actual, expected,
        "track {track_index} has {actual} clips, expected {expected}"
    );
}

/// Assert that no two clips overlap on a given track.
pub fn assert_no_overlaps(timeline: &Timeline, track_index: usize) {
    let clips: Vec<_> = timeline.clips_on_track(track_index).collect();
    for (i, a) in clips.iter().enumerate() {
        for b in clips.iter().skip(i + 1) {
            assert!(
                !a.timeline_range().overlaps(&b.timeline_range()),
                "clips {:?} and {:?} overlap on track {}",
                a.id,
                b.id,
                track_index
            );
        }
    }
}

/// Assert that a clip covers the given time on a track.
pub fn assert_clip_at(timeline: &Timeline, track_index: usize, position_secs: f64) {
    let pos = TimelinePosition::from_secs_f64(position_secs);
    assert!(
        timeline
            .clips_on_track(track_index)
            .any(|c| c.timeline_range().contains(pos)),
        "expected clip at {position_secs}s on track {track_index}, but none found"
    );
}

/// Assert the history holds exactly `expected` snapshots (the initial load
/// plus one per committed edit).
pub fn assert_history_len(history: &History, expected: usize) {
    assert_eq!(
        history.len(),
        expected,
        "history has {} entries, expected {}",
        history.len(),
        expected
    );
}

/// Assert the timeline total duration is approximately the expected value.
pub fn assert_timeline_duration_approx(
    timeline: &Timeline,
    expected_secs: f64,
    tolerance_secs: f64,
) {
    let actual = timeline.duration().as_secs_f64();
    assert!(
        (actual - expected_secs).abs() < tolerance_secs,
        "timeline duration {actual:.3}s != expected {expected_secs:.3}s (tolerance {tolerance_secs:.3}s)"
    );
}
