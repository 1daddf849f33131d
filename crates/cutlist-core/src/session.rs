use std::collections::HashSet;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use crate::error::{EngineError, Result};
use crate::history::History;
use crate::interaction::{
    apply_snap, snap_targets, DragCandidate, DraggingClip, Interaction, PointerPosition,
    TrimHandle, TrimPreview, TrimmingClip, Viewport, DEFAULT_SNAP_GRID_INTERVAL_SECS,
    MIN_CLIP_DURATION_SECS, SNAP_GRID_MAX_SECS, SNAP_GRID_MIN_SECS,
};
use crate::timeline::{Clip, Timeline, TimelinePosition, Transition, TransitionKind};
use crate::zoom::{clamp_zoom, fit_zoom, preset_zoom, DEFAULT_ZOOM};

/// A validated mutation of the timeline. Every variant carries its own
/// invariant checks; applying one through the session is the only commit
/// path and records at most one history entry.
#[derive(Debug, Clone)]
pub enum EditCommand {
    Reposition {
        clip_id: Uuid,
        timeline_position: TimelinePosition,
        track_index: usize,
    },
    Trim {
        clip_id: Uuid,
        start: TimelinePosition,
        end: TimelinePosition,
        timeline_position: TimelinePosition,
    },
    SetTransition {
        clip_ids: Vec<Uuid>,
        transition: Option<Transition>,
    },
    AddClip(Clip),
    RemoveClip {
        clip_id: Uuid,
    },
}

impl EditCommand {
    fn label(&self) -> &'static str {
        match self {
            EditCommand::Reposition { .. } => "Move clip",
            EditCommand::Trim { .. } => "Trim clip",
            EditCommand::SetTransition { .. } => "Set transition",
            EditCommand::AddClip(_) => "Add clip",
            EditCommand::RemoveClip { .. } => "Remove clip",
        }
    }
}

/// The editing session: sole owner of the authoritative timeline plus the
/// editor-only state around it (selection, zoom, playhead, snap settings,
/// history, and the in-flight gesture).
///
/// All mutation is synchronous through `&mut self`; readers borrow the
/// timeline between commits. Drop the session (or take the timeline back
/// with [`EditorSession::into_timeline`]) to dispose it.
#[derive(Debug, Clone)]
pub struct EditorSession {
    timeline: Timeline,
    history: History,
    selection: HashSet<Uuid>,
    zoom: f64,
    current_time: TimelinePosition,
    snap_enabled: bool,
    snap_grid_interval: f64,
    interaction: Interaction,
}

impl EditorSession {
    /// Create a session around a loaded timeline. The load is the first
    /// history entry.
    pub fn new(timeline: Timeline) -> Self {
        let history = History::new(&timeline);
        Self {
            timeline,
            history,
            selection: HashSet::new(),
            zoom: DEFAULT_ZOOM,
            current_time: TimelinePosition::zero(),
            snap_enabled: true,
            snap_grid_interval: DEFAULT_SNAP_GRID_INTERVAL_SECS,
            interaction: Interaction::Idle,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// Consume the session, keeping the timeline for the caller to persist.
    pub fn into_timeline(self) -> Timeline {
        self.timeline
    }

    // ----- selection ------------------------------------------------------

    pub fn selection(&self) -> &HashSet<Uuid> {
        &self.selection
    }

    pub fn select_clip(&mut self, clip_id: Uuid) {
        if self.timeline.get_clip(clip_id).is_some() {
            self.selection.insert(clip_id);
        }
    }

    pub fn deselect_clip(&mut self, clip_id: Uuid) {
        self.selection.remove(&clip_id);
    }

    pub fn set_selection(&mut self, clip_ids: impl IntoIterator<Item = Uuid>) {
        self.selection = clip_ids
            .into_iter()
            .filter(|id| self.timeline.get_clip(*id).is_some())
            .collect();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ----- playhead -------------------------------------------------------

    pub fn current_time(&self) -> TimelinePosition {
        self.current_time
    }

    /// Seek the playhead. The external player follows this value; the
    /// engine does not drive playback timing.
    pub fn set_current_time(&mut self, time: TimelinePosition) {
        self.current_time = time;
    }

    // ----- snapping -------------------------------------------------------

    pub fn snap_enabled(&self) -> bool {
        self.snap_enabled
    }

    pub fn set_snap_enabled(&mut self, enabled: bool) {
        self.snap_enabled = enabled;
    }

    pub fn snap_grid_interval(&self) -> f64 {
        self.snap_grid_interval
    }

    pub fn set_snap_grid_interval(&mut self, interval_secs: f64) {
        self.snap_grid_interval = if interval_secs.is_finite() {
            interval_secs.clamp(SNAP_GRID_MIN_SECS, SNAP_GRID_MAX_SECS)
        } else {
            DEFAULT_SNAP_GRID_INTERVAL_SECS
        };
    }

    fn snap_tolerance_secs(&self) -> f64 {
        self.snap_grid_interval / 2.0
    }

    // ----- zoom -----------------------------------------------------------

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = clamp_zoom(zoom);
    }

    pub fn set_zoom_preset(&mut self, pct: f64) {
        self.zoom = preset_zoom(pct);
    }

    /// Zoom at which the whole timeline (time 0 through the latest clip end)
    /// exactly fills `viewport_width` pixels. Falls back to the default zoom
    /// for an empty timeline or degenerate viewport.
    pub fn calculate_fit_to_timeline_zoom(&self, viewport_width: f64) -> f64 {
        let span = self.timeline.content_end().as_secs_f64();
        fit_zoom(viewport_width, span).unwrap_or(DEFAULT_ZOOM)
    }

    /// Same fit restricted to the selected clips' span. Falls back to the
    /// current zoom, unchanged, when nothing is selected or the viewport is
    /// degenerate.
    pub fn calculate_fit_to_selection_zoom(&self, viewport_width: f64) -> f64 {
        match self.selection_span() {
            Some((start, end)) => {
                let span = end.as_secs_f64() - start.as_secs_f64();
                fit_zoom(viewport_width, span).unwrap_or(self.zoom)
            }
            None => self.zoom,
        }
    }

    pub fn fit_to_timeline(&mut self, viewport_width: f64) {
        let zoom = self.calculate_fit_to_timeline_zoom(viewport_width);
        self.set_zoom(zoom);
    }

    pub fn fit_to_selection(&mut self, viewport_width: f64) {
        let zoom = self.calculate_fit_to_selection_zoom(viewport_width);
        self.set_zoom(zoom);
    }

    fn selection_span(&self) -> Option<(TimelinePosition, TimelinePosition)> {
        let mut span: Option<(TimelinePosition, TimelinePosition)> = None;
        for clip in self
            .timeline
            .clips
            .iter()
            .filter(|c| self.selection.contains(&c.id))
        {
            let (start, end) = (clip.timeline_position, clip.timeline_end());
            span = Some(match span {
                Some((s, e)) => (s.min(start), e.max(end)),
                None => (start, end),
            });
        }
        span
    }

    // ----- guides ---------------------------------------------------------
    //
    // Guides mutate the timeline directly; they are not part of the
    // committing operations and push no history entries.

    pub fn add_guide(&mut self, time: TimelinePosition, color: impl Into<String>) -> Uuid {
        let guide = crate::timeline::Guide::new(time, color);
        let id = guide.id;
        self.timeline.guides.push(guide);
        id
    }

    /// Remove by id; unknown ids are a no-op.
    pub fn remove_guide(&mut self, guide_id: Uuid) {
        self.timeline.guides.retain(|g| g.id != guide_id);
    }

    /// Move and recolor a guide; unknown ids are a no-op.
    pub fn update_guide(&mut self, guide_id: Uuid, time: TimelinePosition, color: impl Into<String>) {
        if let Some(guide) = self.timeline.guides.iter_mut().find(|g| g.id == guide_id) {
            guide.time = time;
            guide.color = color.into();
        }
    }

    pub fn toggle_guide_visibility(&mut self, guide_id: Uuid) {
        if let Some(guide) = self.timeline.guides.iter_mut().find(|g| g.id == guide_id) {
            guide.visible = !guide.visible;
        }
    }

    /// Hide every guide if any is visible; otherwise show them all.
    /// Mixed visibility therefore resolves to hidden.
    pub fn toggle_all_guides_visibility(&mut self) {
        let any_visible = self.timeline.guides.iter().any(|g| g.visible);
        for guide in &mut self.timeline.guides {
            guide.visible = !any_visible;
        }
    }

    pub fn clear_all_guides(&mut self) {
        self.timeline.guides.clear();
    }

    // ----- transitions ----------------------------------------------------

    /// Set `transition_to_next` on every selected clip, overwriting any
    /// existing transition. One history entry covers all affected clips;
    /// an empty selection commits nothing.
    pub fn add_transition_to_selected_clips(
        &mut self,
        kind: TransitionKind,
        duration: Duration,
    ) -> Result<()> {
        if self.selection.is_empty() {
            return Ok(());
        }
        let mut clip_ids: Vec<Uuid> = self.selection.iter().copied().collect();
        clip_ids.sort();
        self.apply(EditCommand::SetTransition {
            clip_ids,
            transition: Some(Transition::new(kind, duration)),
        })
    }

    // ----- commit path ----------------------------------------------------

    /// Apply a command to the timeline. On success, exactly one history
    /// entry is recorded unless the command left the timeline unchanged
    /// (a no-op release commits nothing).
    pub fn apply(&mut self, command: EditCommand) -> Result<()> {
        let label = command.label();
        let before = self.timeline.clone();
        self.apply_command(command)?;
        if self.timeline != before {
            self.history.record(label, &self.timeline);
            debug!(label, history_len = self.history.len(), "edit committed");
        }
        Ok(())
    }

    fn apply_command(&mut self, command: EditCommand) -> Result<()> {
        match command {
            EditCommand::Reposition {
                clip_id,
                timeline_position,
                track_index,
            } => {
                let track_index = track_index.min(self.timeline.track_count() - 1);
                let clip = self
                    .timeline
                    .get_clip(clip_id)
                    .ok_or(EngineError::ClipNotFound(clip_id))?;
                let duration = TimelinePosition::from(clip.duration());
                let range = crate::timeline::TimeRange {
                    start: timeline_position,
                    end: timeline_position + duration,
                };
                if self
                    .timeline
                    .overlaps_on_track(track_index, &range, Some(clip_id))
                {
                    return Err(EngineError::ClipOverlap {
                        position: timeline_position,
                    });
                }
                let clip = self
                    .timeline
                    .get_clip_mut(clip_id)
                    .ok_or(EngineError::ClipNotFound(clip_id))?;
                clip.timeline_position = timeline_position;
                clip.track_index = track_index;
                self.timeline.sort_clips();
                Ok(())
            }
            EditCommand::Trim {
                clip_id,
                start,
                end,
                timeline_position,
            } => {
                let clip = self
                    .timeline
                    .get_clip(clip_id)
                    .ok_or(EngineError::ClipNotFound(clip_id))?;
                if start >= end {
                    return Err(EngineError::InvalidTimeRange { start, end });
                }
                if end > clip.source_duration {
                    return Err(EngineError::SourceWindowOutOfBounds {
                        end,
                        source_duration: clip.source_duration,
                    });
                }
                let duration = end - start;
                let range = crate::timeline::TimeRange {
                    start: timeline_position,
                    end: timeline_position + duration,
                };
                if self
                    .timeline
                    .overlaps_on_track(clip.track_index, &range, Some(clip_id))
                {
                    return Err(EngineError::ClipOverlap {
                        position: timeline_position,
                    });
                }
                let clip = self
                    .timeline
                    .get_clip_mut(clip_id)
                    .ok_or(EngineError::ClipNotFound(clip_id))?;
                clip.start = start;
                clip.end = end;
                clip.timeline_position = timeline_position;
                self.timeline.sort_clips();
                Ok(())
            }
            EditCommand::SetTransition {
                clip_ids,
                transition,
            } => {
                // Unknown ids are skipped rather than rejected: the command
                // commits atomically over whatever part of the selection
                // still exists.
                for clip_id in clip_ids {
                    if let Some(clip) = self.timeline.get_clip_mut(clip_id) {
                        clip.transition_to_next = transition;
                    }
                }
                Ok(())
            }
            EditCommand::AddClip(clip) => self.timeline.add_clip(clip),
            EditCommand::RemoveClip { clip_id } => {
                self.timeline.remove_clip(clip_id)?;
                self.selection.remove(&clip_id);
                Ok(())
            }
        }
    }

    // ----- undo / redo ----------------------------------------------------

    pub fn undo(&mut self) -> Result<()> {
        let state = self.history.undo()?.clone();
        self.timeline = state;
        self.interaction = Interaction::Idle;
        self.prune_selection();
        debug!(history_len = self.history.len(), "undo");
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        let state = self.history.redo()?.clone();
        self.timeline = state;
        self.interaction = Interaction::Idle;
        self.prune_selection();
        debug!(history_len = self.history.len(), "redo");
        Ok(())
    }

    fn prune_selection(&mut self) {
        let timeline = &self.timeline;
        self.selection.retain(|id| timeline.get_clip(*id).is_some());
    }

    // ----- gestures: clip drag --------------------------------------------

    /// Start repositioning a clip. Captures the pointer offset inside the
    /// clip's visual bounds; the timeline stays untouched until commit.
    /// An unknown clip id is a no-op.
    pub fn begin_clip_drag(&mut self, clip_id: Uuid, pointer: PointerPosition, viewport: &Viewport) {
        let Some(clip) = self.timeline.get_clip(clip_id) else {
            return;
        };
        let clip_start_px = viewport.secs_to_px(clip.timeline_position.as_secs_f64());
        let track_top = viewport.ruler_height + clip.track_index as f64 * viewport.track_height;
        self.interaction = Interaction::DraggingClip(DraggingClip {
            clip_id,
            grab_offset_x: pointer.x - clip_start_px,
            grab_offset_y: pointer.y - track_top,
            duration_secs: clip.duration().as_secs_f64(),
            current_x: pointer.x,
            current_y: pointer.y,
        });
    }

    /// Advance the drag and return the candidate placement for preview.
    /// No-op (returns `None`) when no clip drag is in flight.
    pub fn update_clip_drag(
        &mut self,
        pointer: PointerPosition,
        viewport: &Viewport,
    ) -> Option<DragCandidate> {
        let Interaction::DraggingClip(mut drag) = self.interaction else {
            return None;
        };
        drag.current_x = pointer.x;
        drag.current_y = pointer.y;
        let candidate = self.drag_candidate(&drag, pointer, viewport);
        self.interaction = Interaction::DraggingClip(drag);
        Some(candidate)
    }

    /// Commit the drag at the release pointer. The final candidate goes
    /// through [`EditCommand::Reposition`]; a commit that would overlap
    /// another clip on the destination track is rejected and the timeline
    /// stays unchanged. Ephemeral state clears either way.
    pub fn commit_clip_drag(
        &mut self,
        pointer: PointerPosition,
        viewport: &Viewport,
    ) -> Result<()> {
        let Interaction::DraggingClip(drag) = self.interaction else {
            return Ok(());
        };
        self.interaction = Interaction::Idle;
        let candidate = self.drag_candidate(&drag, pointer, viewport);
        self.apply(EditCommand::Reposition {
            clip_id: drag.clip_id,
            timeline_position: candidate.timeline_position,
            track_index: candidate.track_index,
        })
    }

    /// Discard any in-flight gesture without committing.
    pub fn cancel_interaction(&mut self) {
        self.interaction = Interaction::Idle;
    }

    fn drag_candidate(
        &self,
        drag: &DraggingClip,
        pointer: PointerPosition,
        viewport: &Viewport,
    ) -> DragCandidate {
        let raw_start = viewport.px_to_secs(pointer.x - drag.grab_offset_x).max(0.0);
        let track_index = viewport.track_at_y(pointer.y, self.timeline.track_count());
        let start_secs = if self.snap_enabled {
            let targets = snap_targets(&self.timeline, self.current_time, drag.clip_id);
            apply_snap(
                raw_start,
                drag.duration_secs,
                &targets,
                self.snap_tolerance_secs(),
            )
        } else {
            raw_start
        };
        DragCandidate {
            timeline_position: TimelinePosition::from_secs_f64(start_secs),
            track_index,
        }
    }

    // ----- gestures: trim -------------------------------------------------

    /// Grab a trim handle. Captures the clip's original boundaries so every
    /// move recomputes from the same baseline. Unknown ids are a no-op.
    pub fn begin_clip_trim(&mut self, clip_id: Uuid, handle: TrimHandle) {
        let Some(clip) = self.timeline.get_clip(clip_id) else {
            return;
        };
        let state = TrimmingClip {
            clip_id,
            handle,
            original_start: clip.start,
            original_end: clip.end,
            original_position: clip.timeline_position,
            source_duration: clip.source_duration,
        };
        let preview = TrimPreview {
            clip_id,
            start: clip.start,
            end: clip.end,
            timeline_position: clip.timeline_position,
        };
        self.interaction = Interaction::Trimming { state, preview };
    }

    /// Advance the trim and return the live preview. The clip itself is not
    /// mutated; the view renders from the preview. No-op when no trim is in
    /// flight.
    pub fn update_clip_trim(
        &mut self,
        pointer: PointerPosition,
        viewport: &Viewport,
    ) -> Option<TrimPreview> {
        let Interaction::Trimming { state, .. } = self.interaction else {
            return None;
        };
        let preview = trim_candidate(&state, pointer, viewport);
        self.interaction = Interaction::Trimming { state, preview };
        Some(preview)
    }

    /// Commit the trim from the current preview. Releasing without a change
    /// is idempotent: the timeline is untouched and no history entry is
    /// recorded.
    pub fn commit_clip_trim(&mut self) -> Result<()> {
        let Interaction::Trimming { preview, .. } = self.interaction else {
            return Ok(());
        };
        self.interaction = Interaction::Idle;
        self.apply(EditCommand::Trim {
            clip_id: preview.clip_id,
            start: preview.start,
            end: preview.end,
            timeline_position: preview.timeline_position,
        })
    }

    // ----- gestures: playhead ---------------------------------------------

    pub fn begin_playhead_drag(&mut self) {
        self.interaction = Interaction::DraggingPlayhead;
    }

    /// Scrub the playhead while dragging; clamped to time zero. Playhead
    /// moves never enter history.
    pub fn update_playhead_drag(&mut self, pointer: PointerPosition, viewport: &Viewport) {
        if matches!(self.interaction, Interaction::DraggingPlayhead) {
            let secs = viewport.px_to_secs(pointer.x).max(0.0);
            self.current_time = TimelinePosition::from_secs_f64(secs);
        }
    }

    pub fn end_playhead_drag(&mut self) {
        if matches!(self.interaction, Interaction::DraggingPlayhead) {
            self.interaction = Interaction::Idle;
        }
    }
}

/// Compute the trim preview for the current pointer, clamped so the clip
/// keeps at least the minimum duration and stays inside its source media.
fn trim_candidate(
    state: &TrimmingClip,
    pointer: PointerPosition,
    viewport: &Viewport,
) -> TrimPreview {
    let orig_start = state.original_start.as_secs_f64();
    let orig_end = state.original_end.as_secs_f64();
    let orig_pos = state.original_position.as_secs_f64();

    match state.handle {
        TrimHandle::Left => {
            // The pointer tracks the clip's visible left edge; the same
            // delta moves the source in-point and the timeline position so
            // the visible end time never changes.
            let edge_secs = viewport.px_to_secs(pointer.x);
            let candidate = orig_start + (edge_secs - orig_pos);
            // Lower bound keeps both start >= 0 and timeline_position >= 0.
            let lower = (orig_start - orig_pos).max(0.0);
            let upper = orig_end - MIN_CLIP_DURATION_SECS;
            let start = candidate.min(upper).max(lower);
            TrimPreview {
                clip_id: state.clip_id,
                start: TimelinePosition::from_secs_f64(start),
                end: state.original_end,
                timeline_position: TimelinePosition::from_secs_f64(orig_pos + (start - orig_start)),
            }
        }
        TrimHandle::Right => {
            let edge_secs = viewport.px_to_secs(pointer.x);
            let candidate = orig_start + (edge_secs - orig_pos);
            let lower = orig_start + MIN_CLIP_DURATION_SECS;
            let upper = state.source_duration.as_secs_f64();
            let end = candidate.min(upper).max(lower);
            TrimPreview {
                clip_id: state.clip_id,
                start: state.original_start,
                end: TimelinePosition::from_secs_f64(end),
                timeline_position: state.original_position,
            }
        }
    }
}
