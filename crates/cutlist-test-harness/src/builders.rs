use uuid::Uuid;

use cutlist_core::session::EditorSession;
use cutlist_core::timeline::{Clip, Guide, OutputSettings, Timeline, TimelinePosition};

/// Builder for creating test Clips with sensible defaults: a ten-second
/// mp4 source used in full, placed at time zero on track zero.
pub struct ClipBuilder {
    asset_id: Uuid,
    file_path: String,
    mime: String,
    source_duration_secs: f64,
    start_secs: f64,
    end_secs: Option<f64>,
    position_secs: f64,
    track_index: usize,
}

impl ClipBuilder {
    pub fn new() -> Self {
        Self {
            asset_id: Uuid::new_v4(),
            file_path: "/assets/test.mp4".into(),
            mime: "video/mp4".into(),
            source_duration_secs: 10.0,
            start_secs: 0.0,
            end_secs: None,
            position_secs: 0.0,
            track_index: 0,
        }
    }

    pub fn asset_id(mut self, asset_id: Uuid) -> Self {
        self.asset_id = asset_id;
        self
    }

    pub fn file_path(mut self, path: &str) -> Self {
        self.file_path = path.into();
        self
    }

    pub fn source_duration_secs(mut self, secs: f64) -> Self {
        self.source_duration_secs = secs;
        self
    }

    /// Trim window into the source media.
    pub fn source_window(mut self, start_secs: f64, end_secs: f64) -> Self {
        self.start_secs = start_secs;
        self.end_secs = Some(end_secs);
        self
    }

    /// Where the clip sits on the timeline.
    pub fn at(mut self, position_secs: f64) -> Self {
        self.position_secs = position_secs;
        self
    }

    pub fn on_track(mut self, track_index: usize) -> Self {
        self.track_index = track_index;
        self
    }

    pub fn build(self) -> Clip {
        let mut clip = Clip::new(
            self.asset_id,
            self.file_path,
            self.mime,
            TimelinePosition::from_secs_f64(self.source_duration_secs),
            TimelinePosition::from_secs_f64(self.position_secs),
            self.track_index,
        );
        clip.start = TimelinePosition::from_secs_f64(self.start_secs);
        clip.end = TimelinePosition::from_secs_f64(
            self.end_secs.unwrap_or(self.source_duration_secs),
        );
        clip
    }
}

impl Default for ClipBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a timeline pre-populated with clips and guides.
pub struct TimelineBuilder {
    project_id: Uuid,
    clips: Vec<Clip>,
    guides: Vec<Guide>,
    output: OutputSettings,
}

impl TimelineBuilder {
    pub fn new() -> Self {
        Self {
            project_id: Uuid::new_v4(),
            clips: Vec::new(),
            guides: Vec::new(),
            output: OutputSettings::default(),
        }
    }

    pub fn with_clip(mut self, clip: Clip) -> Self {
        self.clips.push(clip);
        self
    }

    pub fn with_guide(mut self, guide: Guide) -> Self {
        self.guides.push(guide);
        self
    }

    pub fn with_output(mut self, output: OutputSettings) -> Self {
        self.output = output;
        self
    }

    pub fn build(self) -> Timeline {
        let mut timeline = Timeline::new(self.project_id);
        timeline.guides = self.guides;
        timeline.output = self.output;
        for clip in self.clips {
            timeline
                .add_clip(clip)
                .expect("overlapping clips in test builder");
        }
        timeline
    }

    /// Build the timeline and wrap it in an editing session.
    pub fn build_session(self) -> EditorSession {
        EditorSession::new(self.build())
    }
}

impl Default for TimelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
