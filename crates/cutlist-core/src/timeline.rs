use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{EngineError, Result};

/// A position on the timeline, represented as a duration from the start.
///
/// Serializes as fractional seconds so the persisted JSON stays numeric
/// (the timeline is stored in a JSONB column by the surrounding service).
/// Negative or non-finite input clamps to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimelinePosition(Duration);

impl TimelinePosition {
    pub fn zero() -> Self {
        Self(Duration::ZERO)
    }

    pub fn from_secs_f64(secs: f64) -> Self {
        Self(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO))
    }

    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.0.as_secs_f64()
    }
}

impl From<Duration> for TimelinePosition {
    fn from(d: Duration) -> Self {
        Self(d)
    }
}

impl std::ops::Add for TimelinePosition {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl std::ops::Sub for TimelinePosition {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }
}

impl Serialize for TimelinePosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0.as_secs_f64())
    }
}

impl<'de> Deserialize<'de> for TimelinePosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(Self::from_secs_f64(secs))
    }
}

/// A time range with start (inclusive) and end (exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: TimelinePosition,
    pub end: TimelinePosition,
}

impl TimeRange {
    pub fn new(start: TimelinePosition, end: TimelinePosition) -> Result<Self> {
        if start >= end {
            return Err(EngineError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn duration(&self) -> Duration {
        self.end.as_duration() - self.start.as_duration()
    }

    pub fn contains(&self, pos: TimelinePosition) -> bool {
        pos >= self.start && pos < self.end
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// The visual effect applied between a clip and its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Fade,
    Dissolve,
    Wipe,
    None,
}

impl TransitionKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Fade => "Fade",
            Self::Dissolve => "Dissolve",
            Self::Wipe => "Wipe",
            Self::None => "None",
        }
    }
}

/// A timed transition on a clip's trailing edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    #[serde(rename = "type")]
    pub kind: TransitionKind,
    pub duration: TimelinePosition,
}

impl Transition {
    pub fn new(kind: TransitionKind, duration: Duration) -> Self {
        Self {
            kind,
            duration: TimelinePosition::from(duration),
        }
    }
}

/// Normalized crop rectangle applied to a clip's frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Crop {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Crop {
    fn default() -> Self {
        // Full frame.
        Self {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        }
    }
}

/// A clip placed on a track, referencing a trimmed window of source media.
///
/// `start`/`end` are offsets into the source media (the trim window);
/// `timeline_position` is where the clip sits on the timeline and
/// `track_index` which lane it occupies. Tracks are implicit: there is no
/// Track entity, only the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: Uuid,
    /// The asset this clip references, resolvable by the external catalog.
    pub asset_id: Uuid,
    pub file_path: String,
    pub mime: String,
    /// In point into the source media.
    pub start: TimelinePosition,
    /// Out point into the source media (exclusive).
    pub end: TimelinePosition,
    /// Total duration of the source media; `end` may not exceed it.
    pub source_duration: TimelinePosition,
    pub timeline_position: TimelinePosition,
    pub track_index: usize,
    #[serde(default)]
    pub crop: Crop,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_to_next: Option<Transition>,
}

impl Clip {
    /// Create a clip using the full source window, placed at `timeline_position`.
    pub fn new(
        asset_id: Uuid,
        file_path: impl Into<String>,
        mime: impl Into<String>,
        source_duration: TimelinePosition,
        timeline_position: TimelinePosition,
        track_index: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            asset_id,
            file_path: file_path.into(),
            mime: mime.into(),
            start: TimelinePosition::zero(),
            end: source_duration,
            source_duration,
            timeline_position,
            track_index,
            crop: Crop::default(),
            transition_to_next: None,
        }
    }

    /// Clip duration on the timeline.
    pub fn duration(&self) -> Duration {
        self.end.as_duration() - self.start.as_duration()
    }

    /// Where the clip ends on the timeline.
    pub fn timeline_end(&self) -> TimelinePosition {
        self.timeline_position + TimelinePosition::from(self.duration())
    }

    /// The clip's occupied range on the timeline.
    pub fn timeline_range(&self) -> TimeRange {
        TimeRange {
            start: self.timeline_position,
            end: self.timeline_end(),
        }
    }

    /// Check the trim-window invariant: `0 <= start < end <= source_duration`.
    pub fn validate(&self) -> Result<()> {
        if self.start >= self.end {
            return Err(EngineError::InvalidTimeRange {
                start: self.start,
                end: self.end,
            });
        }
        if self.end > self.source_duration {
            return Err(EngineError::SourceWindowOutOfBounds {
                end: self.end,
                source_duration: self.source_duration,
            });
        }
        Ok(())
    }
}

/// A vertical marker at a fixed time, used for snapping and visual reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guide {
    pub id: Uuid,
    pub time: TimelinePosition,
    pub color: String,
    pub visible: bool,
}

impl Guide {
    pub fn new(time: TimelinePosition, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            time,
            color: color.into(),
            visible: true,
        }
    }
}

/// Render output settings carried with the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputSettings {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub v_bitrate_k: u32,
    pub a_bitrate_k: u32,
    pub format: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 30.0,
            v_bitrate_k: 8000,
            a_bitrate_k: 192,
            format: "mp4".into(),
        }
    }
}

/// The authoritative timeline: every clip, every guide, output settings.
///
/// Owned exclusively by the editing session; external collaborators persist
/// it (JSON) and render from it but never mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub project_id: Uuid,
    pub clips: Vec<Clip>,
    #[serde(default)]
    pub guides: Vec<Guide>,
    pub output: OutputSettings,
}

impl Timeline {
    pub fn new(project_id: Uuid) -> Self {
        Self {
            project_id,
            clips: Vec::new(),
            guides: Vec::new(),
            output: OutputSettings::default(),
        }
    }

    pub fn get_clip(&self, clip_id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == clip_id)
    }

    pub fn get_clip_mut(&mut self, clip_id: Uuid) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == clip_id)
    }

    pub fn clips_on_track(&self, track_index: usize) -> impl Iterator<Item = &Clip> {
        self.clips.iter().filter(move |c| c.track_index == track_index)
    }

    /// Number of implicit tracks: highest occupied index plus one, never zero.
    pub fn track_count(&self) -> usize {
        self.clips
            .iter()
            .map(|c| c.track_index + 1)
            .max()
            .unwrap_or(1)
    }

    /// End of the latest clip across all tracks.
    pub fn content_end(&self) -> TimelinePosition {
        self.clips
            .iter()
            .map(|c| c.timeline_end())
            .max()
            .unwrap_or(TimelinePosition::zero())
    }

    /// Total duration of the timeline.
    pub fn duration(&self) -> Duration {
        self.content_end().as_duration()
    }

    /// Whether `range` would collide with another clip on `track_index`.
    /// `exclude` skips the clip being moved or resized.
    pub fn overlaps_on_track(
        &self,
        track_index: usize,
        range: &TimeRange,
        exclude: Option<Uuid>,
    ) -> bool {
        self.clips_on_track(track_index)
            .filter(|c| Some(c.id) != exclude)
            .any(|c| c.timeline_range().overlaps(range))
    }

    /// Add a clip, checking its trim window and rejecting track collisions.
    pub fn add_clip(&mut self, clip: Clip) -> Result<()> {
        clip.validate()?;
        let range = clip.timeline_range();
        if self.overlaps_on_track(clip.track_index, &range, None) {
            return Err(EngineError::ClipOverlap {
                position: range.start,
            });
        }
        self.clips.push(clip);
        self.sort_clips();
        Ok(())
    }

    /// Remove a clip by id, returning it.
    pub fn remove_clip(&mut self, clip_id: Uuid) -> Result<Clip> {
        let idx = self
            .clips
            .iter()
            .position(|c| c.id == clip_id)
            .ok_or(EngineError::ClipNotFound(clip_id))?;
        Ok(self.clips.remove(idx))
    }

    /// Keep clips ordered by track, then by position along the track.
    pub(crate) fn sort_clips(&mut self) {
        self.clips
            .sort_by_key(|c| (c.track_index, c.timeline_position.as_duration()));
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}
