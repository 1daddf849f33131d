use uuid::Uuid;

use cutlist_core::error::EngineError;
use cutlist_core::interaction::{
    Interaction, PointerPosition, TrimHandle, Viewport,
};
use cutlist_core::session::EditorSession;
use cutlist_core::timeline::TimelinePosition;
use cutlist_test_harness::assertions::{assert_history_len, assert_no_overlaps};
use cutlist_test_harness::builders::{ClipBuilder, TimelineBuilder};

/// 100 px per second, no scroll, 20 px ruler, 50 px tracks.
fn viewport() -> Viewport {
    Viewport::new(100.0)
}

/// Pointer y in the middle of a track lane.
fn track_y(track_index: usize) -> f64 {
    20.0 + track_index as f64 * 50.0 + 25.0
}

/// One five-second clip at 2.0s on track 0.
fn session_with_one_clip() -> EditorSession {
    TimelineBuilder::new()
        .with_clip(ClipBuilder::new().at(2.0).source_window(0.0, 5.0).build())
        .build_session()
}

// ----- viewport mapping ---------------------------------------------------

#[test]
fn test_px_to_secs() {
    let vp = viewport();
    assert!((vp.px_to_secs(200.0) - 2.0).abs() < 1e-9);
    assert!((vp.secs_to_px(2.0) - 200.0).abs() < 1e-9);
}

#[test]
fn test_px_to_secs_with_scroll() {
    let mut vp = viewport();
    vp.scroll_offset = 50.0;
    assert!((vp.secs_to_px(2.0) - 150.0).abs() < 1e-9);
    assert!((vp.px_to_secs(150.0) - 2.0).abs() < 1e-9);
}

#[test]
fn test_track_at_y_clamps() {
    let vp = viewport();
    assert_eq!(vp.track_at_y(45.0, 3), 0);
    assert_eq!(vp.track_at_y(95.0, 3), 1);
    // Above the ruler and far below the last lane both clamp.
    assert_eq!(vp.track_at_y(0.0, 3), 0);
    assert_eq!(vp.track_at_y(5000.0, 3), 2);
}

// ----- clip drag ----------------------------------------------------------

#[test]
fn test_drag_commit_repositions_clip() {
    let mut session = session_with_one_clip();
    let clip_id = session.timeline().clips[0].id;
    let vp = viewport();

    // Grab 50 px into the clip (clip left edge is at 200 px).
    session.begin_clip_drag(clip_id, PointerPosition::new(250.0, track_y(0)), &vp);
    assert!(!session.interaction().is_idle());

    let candidate = session
        .update_clip_drag(PointerPosition::new(450.0, track_y(0)), &vp)
        .unwrap();
    assert_eq!(
        candidate.timeline_position,
        TimelinePosition::from_secs_f64(4.0)
    );
    assert_eq!(candidate.track_index, 0);
    // Preview only: the live clip has not moved.
    assert_eq!(
        session.timeline().clips[0].timeline_position,
        TimelinePosition::from_secs_f64(2.0)
    );

    session
        .commit_clip_drag(PointerPosition::new(450.0, track_y(0)), &vp)
        .unwrap();
    assert!(session.interaction().is_idle());
    assert_eq!(
        session.timeline().clips[0].timeline_position,
        TimelinePosition::from_secs_f64(4.0)
    );
    assert_history_len(session.history(), 2);
}

#[test]
fn test_drag_position_clamps_to_zero() {
    let mut session = session_with_one_clip();
    let clip_id = session.timeline().clips[0].id;
    let vp = viewport();

    session.begin_clip_drag(clip_id, PointerPosition::new(250.0, track_y(0)), &vp);
    let candidate = session
        .update_clip_drag(PointerPosition::new(10.0, track_y(0)), &vp)
        .unwrap();
    assert_eq!(candidate.timeline_position, TimelinePosition::zero());
}

#[test]
fn test_drag_across_tracks() {
    let mut session = TimelineBuilder::new()
        .with_clip(ClipBuilder::new().at(2.0).source_window(0.0, 5.0).build())
        .with_clip(
            ClipBuilder::new()
                .at(20.0)
                .source_window(0.0, 2.0)
                .on_track(1)
                .build(),
        )
        .build_session();
    let clip_id = session.timeline().clips[0].id;
    let vp = viewport();

    session.begin_clip_drag(clip_id, PointerPosition::new(250.0, track_y(0)), &vp);
    session
        .commit_clip_drag(PointerPosition::new(450.0, track_y(1)), &vp)
        .unwrap();

    let clip = session.timeline().get_clip(clip_id).unwrap();
    assert_eq!(clip.track_index, 1);
    assert_eq!(clip.timeline_position, TimelinePosition::from_secs_f64(4.0));
}

#[test]
fn test_drag_track_index_clamps_to_last_track() {
    let mut session = TimelineBuilder::new()
        .with_clip(ClipBuilder::new().at(2.0).source_window(0.0, 5.0).build())
        .with_clip(
            ClipBuilder::new()
                .at(20.0)
                .source_window(0.0, 2.0)
                .on_track(1)
                .build(),
        )
        .build_session();
    let clip_id = session.timeline().clips[0].id;
    let vp = viewport();

    session.begin_clip_drag(clip_id, PointerPosition::new(250.0, track_y(0)), &vp);
    let candidate = session
        .update_clip_drag(PointerPosition::new(450.0, 5000.0), &vp)
        .unwrap();
    assert_eq!(candidate.track_index, 1);
}

#[test]
fn test_drag_snaps_to_visible_guide() {
    let mut session = session_with_one_clip();
    let clip_id = session.timeline().clips[0].id;
    session.add_guide(TimelinePosition::from_secs_f64(4.13), "#ff0000");
    let vp = viewport();

    session.begin_clip_drag(clip_id, PointerPosition::new(250.0, track_y(0)), &vp);
    let candidate = session
        .update_clip_drag(PointerPosition::new(450.0, track_y(0)), &vp)
        .unwrap();
    assert_eq!(
        candidate.timeline_position,
        TimelinePosition::from_secs_f64(4.13)
    );
}

#[test]
fn test_drag_ignores_hidden_guides() {
    let mut session = session_with_one_clip();
    let clip_id = session.timeline().clips[0].id;
    let guide_id = session.add_guide(TimelinePosition::from_secs_f64(4.13), "#ff0000");
    session.toggle_guide_visibility(guide_id);
    let vp = viewport();

    session.begin_clip_drag(clip_id, PointerPosition::new(250.0, track_y(0)), &vp);
    let candidate = session
        .update_clip_drag(PointerPosition::new(450.0, track_y(0)), &vp)
        .unwrap();
    assert_eq!(
        candidate.timeline_position,
        TimelinePosition::from_secs_f64(4.0)
    );
}

#[test]
fn test_drag_snaps_to_playhead() {
    let mut session = session_with_one_clip();
    let clip_id = session.timeline().clips[0].id;
    session.set_current_time(TimelinePosition::from_secs_f64(3.0));
    let vp = viewport();

    session.begin_clip_drag(clip_id, PointerPosition::new(250.0, track_y(0)), &vp);
    // Raw candidate is 3.2s; the playhead at 3.0s is within tolerance.
    let candidate = session
        .update_clip_drag(PointerPosition::new(370.0, track_y(0)), &vp)
        .unwrap();
    assert_eq!(
        candidate.timeline_position,
        TimelinePosition::from_secs_f64(3.0)
    );
}

#[test]
fn test_drag_snaps_trailing_edge_to_neighbor_start() {
    let mut session = TimelineBuilder::new()
        .with_clip(ClipBuilder::new().at(2.0).source_window(0.0, 5.0).build())
        .with_clip(ClipBuilder::new().at(10.0).source_window(0.0, 5.0).build())
        .build_session();
    let clip_id = session.timeline().clips[0].id;
    let vp = viewport();

    session.begin_clip_drag(clip_id, PointerPosition::new(250.0, track_y(0)), &vp);
    // Raw candidate start 5.3s puts the clip end at 10.3s, 0.3s from the
    // neighbor's start; the end edge snaps so start becomes 5.0s.
    let candidate = session
        .update_clip_drag(PointerPosition::new(580.0, track_y(0)), &vp)
        .unwrap();
    assert_eq!(
        candidate.timeline_position,
        TimelinePosition::from_secs_f64(5.0)
    );

    session
        .commit_clip_drag(PointerPosition::new(580.0, track_y(0)), &vp)
        .unwrap();
    assert_no_overlaps(session.timeline(), 0);
}

#[test]
fn test_drag_snap_disabled_uses_raw_candidate() {
    let mut session = session_with_one_clip();
    let clip_id = session.timeline().clips[0].id;
    session.add_guide(TimelinePosition::from_secs_f64(4.13), "#ff0000");
    session.set_snap_enabled(false);
    let vp = viewport();

    session.begin_clip_drag(clip_id, PointerPosition::new(250.0, track_y(0)), &vp);
    let candidate = session
        .update_clip_drag(PointerPosition::new(450.0, track_y(0)), &vp)
        .unwrap();
    assert_eq!(
        candidate.timeline_position,
        TimelinePosition::from_secs_f64(4.0)
    );
}

#[test]
fn test_drag_commit_rejects_overlap() {
    let mut session = TimelineBuilder::new()
        .with_clip(ClipBuilder::new().at(0.0).source_window(0.0, 5.0).build())
        .with_clip(ClipBuilder::new().at(6.0).source_window(0.0, 5.0).build())
        .build_session();
    let clip_id = session.timeline().clips[0].id;
    let vp = viewport();

    // Grab the first clip at its left edge and drop it at 4.0s, which would
    // overlap [6, 11).
    session.begin_clip_drag(clip_id, PointerPosition::new(0.0, track_y(0)), &vp);
    let result = session.commit_clip_drag(PointerPosition::new(400.0, track_y(0)), &vp);

    assert!(matches!(result, Err(EngineError::ClipOverlap { .. })));
    assert!(session.interaction().is_idle());
    assert_eq!(
        session.timeline().get_clip(clip_id).unwrap().timeline_position,
        TimelinePosition::zero()
    );
    assert_history_len(session.history(), 1);
}

#[test]
fn test_drag_cancel_discards_gesture() {
    let mut session = session_with_one_clip();
    let clip_id = session.timeline().clips[0].id;
    let before = session.timeline().clone();
    let vp = viewport();

    session.begin_clip_drag(clip_id, PointerPosition::new(250.0, track_y(0)), &vp);
    session.update_clip_drag(PointerPosition::new(700.0, track_y(0)), &vp);
    session.cancel_interaction();

    assert!(session.interaction().is_idle());
    assert_eq!(*session.timeline(), before);
    assert_history_len(session.history(), 1);
}

#[test]
fn test_drag_release_without_movement_records_nothing() {
    let mut session = session_with_one_clip();
    let clip_id = session.timeline().clips[0].id;
    let vp = viewport();

    let grab = PointerPosition::new(250.0, track_y(0));
    session.begin_clip_drag(clip_id, grab, &vp);
    session.commit_clip_drag(grab, &vp).unwrap();

    assert_history_len(session.history(), 1);
}

#[test]
fn test_drag_with_unknown_clip_is_noop() {
    let mut session = session_with_one_clip();
    let vp = viewport();

    session.begin_clip_drag(Uuid::new_v4(), PointerPosition::new(250.0, track_y(0)), &vp);
    assert!(session.interaction().is_idle());
}

#[test]
fn test_drag_update_without_gesture_is_noop() {
    let mut session = session_with_one_clip();
    let vp = viewport();

    assert!(session
        .update_clip_drag(PointerPosition::new(450.0, track_y(0)), &vp)
        .is_none());
    session
        .commit_clip_drag(PointerPosition::new(450.0, track_y(0)), &vp)
        .unwrap();
    assert_history_len(session.history(), 1);
}

// ----- trim ---------------------------------------------------------------

/// A clip with the full ten-second source window, placed at 5.0s.
fn session_with_trimmable_clip() -> EditorSession {
    TimelineBuilder::new()
        .with_clip(ClipBuilder::new().at(5.0).build())
        .build_session()
}

#[test]
fn test_trim_left_handle_shifts_start_and_position() {
    let mut session = session_with_trimmable_clip();
    let clip_id = session.timeline().clips[0].id;
    let vp = viewport();

    session.begin_clip_trim(clip_id, TrimHandle::Left);
    // Moving the visible left edge from 5.0s to 8.0s trims 3s off the start.
    let preview = session
        .update_clip_trim(PointerPosition::new(800.0, track_y(0)), &vp)
        .unwrap();
    assert_eq!(preview.start, TimelinePosition::from_secs_f64(3.0));
    assert_eq!(preview.end, TimelinePosition::from_secs_f64(10.0));
    assert_eq!(
        preview.timeline_position,
        TimelinePosition::from_secs_f64(8.0)
    );

    session.commit_clip_trim().unwrap();
    let clip = session.timeline().get_clip(clip_id).unwrap();
    assert_eq!(clip.start, TimelinePosition::from_secs_f64(3.0));
    assert_eq!(clip.end, TimelinePosition::from_secs_f64(10.0));
    assert_eq!(clip.timeline_position, TimelinePosition::from_secs_f64(8.0));
    // The clip's visible end time is unchanged: 5 + 10 == 8 + 7.
    assert_eq!(clip.timeline_end(), TimelinePosition::from_secs_f64(15.0));
    assert_history_len(session.history(), 2);
}

#[test]
fn test_trim_right_handle_moves_only_end() {
    let mut session = session_with_trimmable_clip();
    let clip_id = session.timeline().clips[0].id;
    let vp = viewport();

    session.begin_clip_trim(clip_id, TrimHandle::Right);
    // Moving the visible right edge from 15.0s to 12.0s trims the end to 7s.
    let preview = session
        .update_clip_trim(PointerPosition::new(1200.0, track_y(0)), &vp)
        .unwrap();
    assert_eq!(preview.start, TimelinePosition::zero());
    assert_eq!(preview.end, TimelinePosition::from_secs_f64(7.0));
    assert_eq!(
        preview.timeline_position,
        TimelinePosition::from_secs_f64(5.0)
    );

    session.commit_clip_trim().unwrap();
    let clip = session.timeline().get_clip(clip_id).unwrap();
    assert_eq!(clip.start, TimelinePosition::zero());
    assert_eq!(clip.end, TimelinePosition::from_secs_f64(7.0));
    assert_eq!(clip.timeline_position, TimelinePosition::from_secs_f64(5.0));
}

#[test]
fn test_trim_preview_does_not_mutate_clip() {
    let mut session = session_with_trimmable_clip();
    let clip_id = session.timeline().clips[0].id;
    let before = session.timeline().clone();
    let vp = viewport();

    session.begin_clip_trim(clip_id, TrimHandle::Right);
    session.update_clip_trim(PointerPosition::new(1200.0, track_y(0)), &vp);
    assert_eq!(*session.timeline(), before);

    session.cancel_interaction();
    assert_eq!(*session.timeline(), before);
    assert_history_len(session.history(), 1);
}

#[test]
fn test_trim_left_clamps_to_minimum_duration() {
    let mut session = session_with_trimmable_clip();
    let clip_id = session.timeline().clips[0].id;
    let vp = viewport();

    session.begin_clip_trim(clip_id, TrimHandle::Left);
    let preview = session
        .update_clip_trim(PointerPosition::new(5000.0, track_y(0)), &vp)
        .unwrap();
    // At most end - minimum duration.
    assert!((preview.start.as_secs_f64() - 9.9).abs() < 1e-9);
    assert!((preview.timeline_position.as_secs_f64() - 14.9).abs() < 1e-9);
}

#[test]
fn test_trim_right_clamps_to_source_duration() {
    let mut session = TimelineBuilder::new()
        .with_clip(ClipBuilder::new().at(5.0).source_window(2.0, 8.0).build())
        .build_session();
    let clip_id = session.timeline().clips[0].id;
    let vp = viewport();

    session.begin_clip_trim(clip_id, TrimHandle::Right);
    let preview = session
        .update_clip_trim(PointerPosition::new(5000.0, track_y(0)), &vp)
        .unwrap();
    // The source is ten seconds long; the out point cannot pass it.
    assert_eq!(preview.end, TimelinePosition::from_secs_f64(10.0));
    assert_eq!(preview.start, TimelinePosition::from_secs_f64(2.0));
}

#[test]
fn test_trim_left_keeps_timeline_position_nonnegative() {
    let mut session = TimelineBuilder::new()
        .with_clip(ClipBuilder::new().at(1.0).source_window(3.0, 10.0).build())
        .build_session();
    let clip_id = session.timeline().clips[0].id;
    let vp = viewport();

    session.begin_clip_trim(clip_id, TrimHandle::Left);
    let preview = session
        .update_clip_trim(PointerPosition::new(-1000.0, track_y(0)), &vp)
        .unwrap();
    // Revealing more than 1s of source would push the clip before time 0.
    assert_eq!(preview.start, TimelinePosition::from_secs_f64(2.0));
    assert_eq!(preview.timeline_position, TimelinePosition::zero());
}

#[test]
fn test_trim_release_without_change_records_nothing() {
    let mut session = session_with_trimmable_clip();
    let clip_id = session.timeline().clips[0].id;

    session.begin_clip_trim(clip_id, TrimHandle::Left);
    session.commit_clip_trim().unwrap();

    assert!(session.interaction().is_idle());
    assert_history_len(session.history(), 1);
}

#[test]
fn test_trim_commit_rejects_overlap() {
    let mut session = TimelineBuilder::new()
        .with_clip(ClipBuilder::new().at(0.0).source_window(0.0, 5.0).build())
        .with_clip(ClipBuilder::new().at(5.0).source_window(0.0, 5.0).build())
        .build_session();
    let clip_id = session.timeline().clips[0].id;
    let before = session.timeline().clone();
    let vp = viewport();

    session.begin_clip_trim(clip_id, TrimHandle::Right);
    // Extending the first clip's right edge to 7.0s runs into [5, 10).
    session.update_clip_trim(PointerPosition::new(700.0, track_y(0)), &vp);
    let result = session.commit_clip_trim();

    assert!(matches!(result, Err(EngineError::ClipOverlap { .. })));
    assert_eq!(*session.timeline(), before);
    assert_history_len(session.history(), 1);
}

#[test]
fn test_trim_with_unknown_clip_is_noop() {
    let mut session = session_with_trimmable_clip();

    session.begin_clip_trim(Uuid::new_v4(), TrimHandle::Left);
    assert!(session.interaction().is_idle());
    session.commit_clip_trim().unwrap();
    assert_history_len(session.history(), 1);
}

// ----- playhead -----------------------------------------------------------

#[test]
fn test_playhead_drag_scrubs_and_clamps() {
    let mut session = session_with_one_clip();
    let vp = viewport();

    session.begin_playhead_drag();
    assert!(matches!(
        session.interaction(),
        Interaction::DraggingPlayhead
    ));

    session.update_playhead_drag(PointerPosition::new(350.0, 10.0), &vp);
    assert_eq!(
        session.current_time(),
        TimelinePosition::from_secs_f64(3.5)
    );

    session.update_playhead_drag(PointerPosition::new(-50.0, 10.0), &vp);
    assert_eq!(session.current_time(), TimelinePosition::zero());

    session.end_playhead_drag();
    assert!(session.interaction().is_idle());
    assert_history_len(session.history(), 1);
}

#[test]
fn test_playhead_update_without_gesture_is_noop() {
    let mut session = session_with_one_clip();
    let vp = viewport();

    session.update_playhead_drag(PointerPosition::new(350.0, 10.0), &vp);
    assert_eq!(session.current_time(), TimelinePosition::zero());
}

// ----- gestures vs undo ---------------------------------------------------

#[test]
fn test_undo_clears_in_flight_gesture() {
    let mut session = session_with_one_clip();
    let clip_id = session.timeline().clips[0].id;
    let vp = viewport();

    session.begin_clip_drag(clip_id, PointerPosition::new(250.0, track_y(0)), &vp);
    session
        .commit_clip_drag(PointerPosition::new(450.0, track_y(0)), &vp)
        .unwrap();

    session.begin_clip_trim(clip_id, TrimHandle::Right);
    session.undo().unwrap();

    assert!(session.interaction().is_idle());
    assert_eq!(
        session.timeline().clips[0].timeline_position,
        TimelinePosition::from_secs_f64(2.0)
    );
}
