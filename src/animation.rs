//! Animation kinds, rate functions, and per-frame sampling.

use crate::layout::{Direction, Point};
use crate::script::MobjectId;
use serde::Serialize;

/// Maps linear progress in `0..=1` to eased progress
pub type RateFn = fn(f32) -> f32;

const SMOOTH_INFLECTION: f32 = 10.0;
pub const DEFAULT_RUN_TIME: f32 = 1.0;

pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Normalized sigmoid easing
pub fn smooth(t: f32) -> f32 {
    let error = sigmoid(-SMOOTH_INFLECTION / 2.0);
    let value = (sigmoid(SMOOTH_INFLECTION * (t - 0.5)) - error) / (1.0 - 2.0 * error);
    value.clamp(0.0, 1.0)
}

/// Progress of the `index`-th of `count` staggered parts.
/// Every part is complete once `alpha` reaches 1.
pub fn lagged_alpha(alpha: f32, index: usize, count: usize, lag_ratio: f32) -> f32 {
    if alpha >= 1.0 {
        return 1.0;
    }
    let full_length = (count.saturating_sub(1)) as f32 * lag_ratio + 1.0;
    (alpha * full_length - index as f32 * lag_ratio).clamp(0.0, 1.0)
}

/// A single animation requested in a `play` directive
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Animation {
    Write {
        target: MobjectId,
    },
    GrowFromBottom {
        target: MobjectId,
    },
    FadeIn {
        target: MobjectId,
        shift: Option<Direction>,
    },
    FadeOut {
        target: MobjectId,
        shift: Option<Direction>,
    },
}

impl Animation {
    pub fn target(&self) -> MobjectId {
        match self {
            Animation::Write { target }
            | Animation::GrowFromBottom { target }
            | Animation::FadeIn { target, .. }
            | Animation::FadeOut { target, .. } => *target,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Animation::Write { .. } => "write",
            Animation::GrowFromBottom { .. } => "grow_from_bottom",
            Animation::FadeIn { .. } => "fade_in",
            Animation::FadeOut { .. } => "fade_out",
        }
    }

    pub fn rate_fn(&self) -> RateFn {
        match self {
            Animation::Write { .. } => linear,
            _ => smooth,
        }
    }
}

/// Run time and stagger used by `Write` for a text of `glyphs` graphemes
pub fn write_timing(glyphs: usize) -> (f32, f32) {
    let run_time = if glyphs < 15 { 1.0 } else { 2.0 };
    let lag_ratio = (4.0 / glyphs.max(1) as f32).min(0.2);
    (run_time, lag_ratio)
}

/// Per-glyph reveal of a text being written
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WriteProgress {
    pub alpha: f32,
    pub lag_ratio: f32,
}

/// Visual state of one drawable mobject at one instant
#[derive(Debug, Clone, PartialEq)]
pub struct LeafState {
    pub visible: bool,
    pub opacity: f32,
    pub offset: Point,
    pub scale: f32,
    pub anchor: Point,
    pub write: Option<WriteProgress>,
}

impl Default for LeafState {
    fn default() -> Self {
        Self {
            visible: false,
            opacity: 1.0,
            offset: Point::ORIGIN,
            scale: 1.0,
            anchor: Point::ORIGIN,
            write: None,
        }
    }
}

impl LeafState {
    fn settled() -> Self {
        Self {
            visible: true,
            ..Self::default()
        }
    }

    /// Reveal factor for glyph `index` of `count`
    pub fn glyph_reveal(&self, index: usize, count: usize) -> f32 {
        match self.write {
            Some(progress) => lagged_alpha(progress.alpha, index, count, progress.lag_ratio),
            None => 1.0,
        }
    }
}

/// An animation resolved against the scene: which leaves it drives and for how long
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnimationTrack {
    pub animation: Animation,
    pub run_time: f32,
    pub leaves: Vec<MobjectId>,
    #[serde(skip)]
    pub anchor: Point,
    #[serde(skip)]
    pub lag_ratio: f32,
}

impl AnimationTrack {
    /// Apply this track's state at `elapsed` seconds into its play directive
    pub fn apply(&self, elapsed: f32, states: &mut [LeafState]) {
        let linear_alpha = if self.run_time > 0.0 {
            (elapsed / self.run_time).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let alpha = (self.animation.rate_fn())(linear_alpha);

        for leaf in &self.leaves {
            let Some(state) = states.get_mut(leaf.index()) else {
                continue;
            };
            *state = self.sample(alpha);
        }
    }

    /// Apply this track's final state
    pub fn complete(&self, states: &mut [LeafState]) {
        for leaf in &self.leaves {
            if let Some(state) = states.get_mut(leaf.index()) {
                *state = self.sample(1.0);
            }
        }
    }

    fn sample(&self, alpha: f32) -> LeafState {
        match self.animation {
            Animation::Write { .. } => {
                if alpha >= 1.0 {
                    LeafState::settled()
                } else {
                    LeafState {
                        write: Some(WriteProgress {
                            alpha,
                            lag_ratio: self.lag_ratio,
                        }),
                        ..LeafState::settled()
                    }
                }
            }
            Animation::GrowFromBottom { .. } => LeafState {
                scale: alpha,
                anchor: self.anchor,
                ..LeafState::settled()
            },
            Animation::FadeIn { shift, .. } => LeafState {
                opacity: alpha,
                offset: shift_vector(shift) * (alpha - 1.0),
                ..LeafState::settled()
            },
            Animation::FadeOut { shift, .. } => LeafState {
                visible: alpha < 1.0,
                opacity: 1.0 - alpha,
                offset: shift_vector(shift) * alpha,
                ..LeafState::default()
            },
        }
    }
}

fn shift_vector(shift: Option<Direction>) -> Point {
    shift.map(Direction::vector).unwrap_or(Point::ORIGIN)
}
