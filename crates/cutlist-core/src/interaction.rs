use uuid::Uuid;

use crate::timeline::{Timeline, TimelinePosition};

/// Minimum clip duration left by a trim, in seconds. Prevents zero-length clips.
pub const MIN_CLIP_DURATION_SECS: f64 = 0.1;

/// Bounds for the snap grid interval, in seconds.
pub const SNAP_GRID_MIN_SECS: f64 = 0.01;
pub const SNAP_GRID_MAX_SECS: f64 = 10.0;
pub const DEFAULT_SNAP_GRID_INTERVAL_SECS: f64 = 1.0;

/// Maps between pointer pixels and timeline seconds for one gesture.
///
/// `pixels_per_second` is the session zoom at gesture time; `scroll_offset`
/// the horizontal scroll of the timeline view in pixels.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub pixels_per_second: f64,
    pub scroll_offset: f64,
    pub ruler_height: f64,
    pub track_height: f64,
}

impl Viewport {
    pub fn new(pixels_per_second: f64) -> Self {
        Self {
            pixels_per_second,
            scroll_offset: 0.0,
            ruler_height: 20.0,
            track_height: 50.0,
        }
    }

    pub fn px_to_secs(&self, px: f64) -> f64 {
        (px + self.scroll_offset) / self.pixels_per_second
    }

    pub fn secs_to_px(&self, secs: f64) -> f64 {
        secs * self.pixels_per_second - self.scroll_offset
    }

    /// Track index under a pointer y coordinate, clamped to `[0, track_count - 1]`.
    pub fn track_at_y(&self, y: f64, track_count: usize) -> usize {
        let track_y = (y - self.ruler_height).max(0.0);
        let idx = (track_y / self.track_height) as usize;
        idx.min(track_count.saturating_sub(1))
    }
}

/// A pointer location in timeline-view pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
}

impl PointerPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Which boundary of a clip a trim gesture grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimHandle {
    Left,
    Right,
}

/// Ephemeral state for a clip reposition gesture.
#[derive(Debug, Clone, Copy)]
pub struct DraggingClip {
    pub clip_id: Uuid,
    /// Pointer offset inside the clip's visual bounds at grab time, pixels.
    pub grab_offset_x: f64,
    pub grab_offset_y: f64,
    /// Copied at grab time so move math never re-reads the live clip.
    pub duration_secs: f64,
    pub current_x: f64,
    pub current_y: f64,
}

/// Ephemeral state for a trim gesture: everything captured at handle grab.
#[derive(Debug, Clone, Copy)]
pub struct TrimmingClip {
    pub clip_id: Uuid,
    pub handle: TrimHandle,
    pub original_start: TimelinePosition,
    pub original_end: TimelinePosition,
    pub original_position: TimelinePosition,
    pub source_duration: TimelinePosition,
}

/// Live trim preview, updated on every pointer move so the view can render
/// the candidate boundary without mutating the clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimPreview {
    pub clip_id: Uuid,
    pub start: TimelinePosition,
    pub end: TimelinePosition,
    pub timeline_position: TimelinePosition,
}

/// Candidate placement produced by a drag move, after clamping and snapping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragCandidate {
    pub timeline_position: TimelinePosition,
    pub track_index: usize,
}

/// The session's in-flight gesture, if any. Never serialized, never
/// snapshotted into history; a cancelled gesture simply resets to `Idle`.
#[derive(Debug, Clone, Copy, Default)]
pub enum Interaction {
    #[default]
    Idle,
    DraggingClip(DraggingClip),
    DraggingPlayhead,
    Trimming {
        state: TrimmingClip,
        preview: TrimPreview,
    },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }
}

/// Collect the times a dragged clip may snap to: visible guides, the
/// playhead, and every other clip's start and end.
pub(crate) fn snap_targets(
    timeline: &Timeline,
    playhead: TimelinePosition,
    exclude: Uuid,
) -> Vec<f64> {
    let mut targets = Vec::new();
    for guide in timeline.guides.iter().filter(|g| g.visible) {
        targets.push(guide.time.as_secs_f64());
    }
    targets.push(playhead.as_secs_f64());
    for clip in timeline.clips.iter().filter(|c| c.id != exclude) {
        targets.push(clip.timeline_position.as_secs_f64());
        targets.push(clip.timeline_end().as_secs_f64());
    }
    targets
}

/// Pull a candidate start position to the nearest snap target within
/// `tolerance_secs`, trying both the clip's start and end edges. Returns the
/// original start when nothing is close enough.
pub(crate) fn apply_snap(
    start_secs: f64,
    duration_secs: f64,
    targets: &[f64],
    tolerance_secs: f64,
) -> f64 {
    let end_secs = start_secs + duration_secs;
    let mut best_gap = f64::MAX;
    let mut best_start = start_secs;

    for &target in targets {
        let gap = (start_secs - target).abs();
        if gap <= tolerance_secs && gap < best_gap {
            best_gap = gap;
            best_start = target;
        }

        let gap = (end_secs - target).abs();
        if gap <= tolerance_secs && gap < best_gap {
            best_gap = gap;
            best_start = target - duration_secs;
        }
    }

    best_start.max(0.0)
}
