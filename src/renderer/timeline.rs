use crate::script::{Directive, Scene};
use serde::Serialize;

/// Timeline for mapping frames onto scene directives
#[derive(Debug, Clone)]
pub struct Timeline {
    fps: u32,
    total_frames: u32,
    segments: Vec<DirectiveSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectiveSegment {
    pub index: usize,
    pub label: String,
    pub start_frame: u32,
    pub end_frame: u32,
    pub duration: f32,
}

impl DirectiveSegment {
    pub fn frames(&self) -> u32 {
        self.end_frame - self.start_frame
    }
}

fn label(directive: &Directive) -> String {
    match directive {
        Directive::Wait { duration } => format!("wait({duration})"),
        Directive::Play { .. } => {
            let names: Vec<String> = directive
                .animations()
                .iter()
                .map(|a| format!("{}({})", a.name(), a.target()))
                .collect();
            format!("play[{}]", names.join(", "))
        }
    }
}

/// Serializable view of a timeline, for printing the schedule
#[derive(Debug, Clone, Serialize)]
pub struct TimelineSummary {
    pub scene: String,
    pub fps: u32,
    pub total_frames: u32,
    pub duration: f32,
    pub segments: Vec<DirectiveSegment>,
}

impl Timeline {
    /// Create timeline from a built scene
    pub fn from_scene(scene: &Scene, fps: u32) -> Self {
        let mut segments = Vec::with_capacity(scene.directives().len());
        let mut current_frame = 0;

        for (index, directive) in scene.directives().iter().enumerate() {
            let frames = ((directive.duration() * fps as f32).round() as u32).max(1);
            segments.push(DirectiveSegment {
                index,
                label: label(directive),
                start_frame: current_frame,
                end_frame: current_frame + frames,
                duration: directive.duration(),
            });
            current_frame += frames;
        }

        Self {
            fps,
            total_frames: current_frame,
            segments,
        }
    }

    /// Directive index and seconds elapsed within it at `frame`.
    /// Frames past the end report one past the last directive.
    pub fn position_at_frame(&self, frame: u32) -> (usize, f32) {
        match self.segment_at_frame(frame) {
            Some(segment) => {
                let alpha = (frame - segment.start_frame) as f32 / segment.frames() as f32;
                (segment.index, alpha * segment.duration)
            }
            None => (self.segments.len(), 0.0),
        }
    }

    /// Get segment playing at given frame number
    pub fn segment_at_frame(&self, frame: u32) -> Option<&DirectiveSegment> {
        self.segments
            .iter()
            .find(|s| frame >= s.start_frame && frame < s.end_frame)
    }

    pub fn segments(&self) -> &[DirectiveSegment] {
        &self.segments
    }

    pub fn summary(&self, scene: &str) -> TimelineSummary {
        TimelineSummary {
            scene: scene.to_string(),
            fps: self.fps,
            total_frames: self.total_frames,
            duration: self.frame_to_time(self.total_frames),
            segments: self.segments.clone(),
        }
    }

    /// Get total frame count
    pub fn total_frames(&self) -> u32 {
        self.total_frames
    }

    /// Get FPS
    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Convert frame number to time in seconds
    pub fn frame_to_time(&self, frame: u32) -> f32 {
        frame as f32 / self.fps as f32
    }
}
