use crate::animation::{write_timing, Animation, AnimationTrack, LeafState, DEFAULT_RUN_TIME};
use crate::error::{SceneError, SceneResult};
use crate::layout::{arrange_offsets, next_to_offset, BoundingBox, Direction, Point};
use crate::palette::Color;
use crate::text::{GlyphLayout, GlyphRasterizer, BASE_FONT_SIZE, LINE_HEIGHT_UNITS};
use serde::Serialize;
use tracing::debug;

/// Scene units per stroke width unit
const STROKE_UNIT: f32 = 0.01;
const DEFAULT_STROKE_WIDTH: f32 = 4.0;

/// Handle to an object owned by a `Scene`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MobjectId(pub usize);

impl MobjectId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for MobjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Styled text, before layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextSpec {
    pub content: String,
    pub font: String,
    pub font_size: f32,
    pub color: Color,
    pub scale: f32,
}

impl TextSpec {
    pub fn new(content: impl Into<String>, color: Color) -> Self {
        Self {
            content: content.into(),
            font: String::new(),
            font_size: BASE_FONT_SIZE,
            color,
            scale: 1.0,
        }
    }

    pub fn font(mut self, font: impl Into<String>) -> Self {
        self.font = font.into();
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }
}

/// Filled, stroked rectangle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RectangleSpec {
    pub width: f32,
    pub height: f32,
    pub fill_color: Color,
    pub fill_opacity: f32,
    pub stroke_color: Color,
    pub stroke_width: f32,
}

impl RectangleSpec {
    /// Unfilled rectangle with the default white stroke
    pub fn new(height: f32, width: f32) -> Self {
        Self {
            width,
            height,
            fill_color: Color::WHITE,
            fill_opacity: 0.0,
            stroke_color: Color::WHITE,
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }

    pub fn fill(mut self, color: Color, opacity: f32) -> Self {
        self.fill_color = color;
        self.fill_opacity = opacity;
        self
    }

    /// Stroke thickness in scene units
    pub fn stroke_units(&self) -> f32 {
        self.stroke_width * STROKE_UNIT
    }
}

/// Text with its glyph layout resolved
#[derive(Debug, Clone, PartialEq)]
pub struct TextMobject {
    pub spec: TextSpec,
    pub layout: GlyphLayout,
    /// Line height in scene units
    pub line_height: f32,
}

impl TextMobject {
    pub fn width(&self) -> f32 {
        self.layout.width_em * self.line_height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MobjectKind {
    Text(TextMobject),
    Rectangle(RectangleSpec),
    Group(Vec<MobjectId>),
}

/// An object placed in the scene
#[derive(Debug, Clone, PartialEq)]
pub struct Mobject {
    pub kind: MobjectKind,
    /// Center in scene units; unused for groups
    pub center: Point,
}

impl Mobject {
    pub fn is_leaf(&self) -> bool {
        !matches!(self.kind, MobjectKind::Group(_))
    }
}

/// One declarative step of the scene timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Directive {
    Play {
        tracks: Vec<AnimationTrack>,
        run_time: f32,
    },
    Wait {
        duration: f32,
    },
}

impl Directive {
    pub fn duration(&self) -> f32 {
        match self {
            Directive::Play { run_time, .. } => *run_time,
            Directive::Wait { duration } => *duration,
        }
    }

    pub fn animations(&self) -> Vec<Animation> {
        match self {
            Directive::Play { tracks, .. } => tracks.iter().map(|t| t.animation).collect(),
            Directive::Wait { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    NotPlayed,
    Played,
}

/// A scene script builds a timeline against a `Scene`
pub trait SceneScript {
    fn name(&self) -> &str;

    fn construct(&self, scene: &mut Scene) -> SceneResult<()>;
}

/// Owns every mobject and the directive log of one animation
#[derive(Debug, Clone)]
pub struct Scene {
    background: Color,
    mobjects: Vec<Mobject>,
    directives: Vec<Directive>,
    rasterizer: GlyphRasterizer,
    state: PlaybackState,
}

impl Scene {
    pub fn new(rasterizer: GlyphRasterizer) -> Self {
        Self {
            background: Color::rgb(0, 0, 0),
            mobjects: Vec::new(),
            directives: Vec::new(),
            rasterizer,
            state: PlaybackState::NotPlayed,
        }
    }

    /// Run `script` once. A scene can only be built a single time.
    pub fn build(&mut self, script: &dyn SceneScript) -> SceneResult<()> {
        self.ensure_not_played()?;
        debug!(scene = script.name(), "constructing scene");
        script.construct(self)?;
        self.state = PlaybackState::Played;
        debug!(
            scene = script.name(),
            directives = self.directives.len(),
            duration = self.duration(),
            "scene constructed"
        );
        Ok(())
    }

    fn ensure_not_played(&self) -> SceneResult<()> {
        match self.state {
            PlaybackState::NotPlayed => Ok(()),
            PlaybackState::Played => Err(SceneError::AlreadyPlayed),
        }
    }

    fn get(&self, id: MobjectId) -> SceneResult<&Mobject> {
        self.mobjects
            .get(id.index())
            .ok_or(SceneError::UnknownMobject { id: id.index() })
    }

    fn push(&mut self, mobject: Mobject) -> MobjectId {
        let id = MobjectId(self.mobjects.len());
        self.mobjects.push(mobject);
        id
    }

    pub fn set_background(&mut self, color: Color) -> SceneResult<()> {
        self.ensure_not_played()?;
        self.background = color;
        Ok(())
    }

    /// Add a text line centered at the origin
    pub fn add_text(&mut self, spec: TextSpec) -> SceneResult<MobjectId> {
        self.ensure_not_played()?;
        let layout = self.rasterizer.layout(&spec.content);
        let line_height = LINE_HEIGHT_UNITS * spec.font_size / BASE_FONT_SIZE * spec.scale;
        Ok(self.push(Mobject {
            kind: MobjectKind::Text(TextMobject {
                spec,
                layout,
                line_height,
            }),
            center: Point::ORIGIN,
        }))
    }

    /// Add a rectangle centered at the origin
    pub fn add_rectangle(&mut self, spec: RectangleSpec) -> SceneResult<MobjectId> {
        self.ensure_not_played()?;
        Ok(self.push(Mobject {
            kind: MobjectKind::Rectangle(spec),
            center: Point::ORIGIN,
        }))
    }

    pub fn group(&mut self, children: Vec<MobjectId>) -> SceneResult<MobjectId> {
        self.ensure_not_played()?;
        for child in &children {
            self.get(*child)?;
        }
        Ok(self.push(Mobject {
            kind: MobjectKind::Group(children),
            center: Point::ORIGIN,
        }))
    }

    /// Drawable mobjects under `id`, in group order
    pub fn leaves(&self, id: MobjectId) -> SceneResult<Vec<MobjectId>> {
        let mut out = Vec::new();
        self.collect_leaves(id, &mut out)?;
        Ok(out)
    }

    fn collect_leaves(&self, id: MobjectId, out: &mut Vec<MobjectId>) -> SceneResult<()> {
        match &self.get(id)?.kind {
            MobjectKind::Group(children) => {
                for child in children {
                    self.collect_leaves(*child, out)?;
                }
            }
            _ => out.push(id),
        }
        Ok(())
    }

    pub fn bounding_box(&self, id: MobjectId) -> SceneResult<BoundingBox> {
        let mobject = self.get(id)?;
        match &mobject.kind {
            MobjectKind::Text(text) => Ok(BoundingBox::from_center(
                mobject.center,
                text.width(),
                text.line_height,
            )),
            MobjectKind::Rectangle(rect) => Ok(BoundingBox::from_center(
                mobject.center,
                rect.width,
                rect.height,
            )),
            MobjectKind::Group(children) => {
                let mut bounds: Option<BoundingBox> = None;
                for child in children {
                    let child_box = self.bounding_box(*child)?;
                    bounds = Some(match bounds {
                        Some(b) => b.union(&child_box),
                        None => child_box,
                    });
                }
                Ok(bounds.unwrap_or_else(|| BoundingBox::from_center(Point::ORIGIN, 0.0, 0.0)))
            }
        }
    }

    pub fn shift(&mut self, id: MobjectId, offset: Point) -> SceneResult<()> {
        self.ensure_not_played()?;
        for leaf in self.leaves(id)? {
            self.mobjects[leaf.index()].center = self.mobjects[leaf.index()].center + offset;
        }
        Ok(())
    }

    pub fn move_to(&mut self, id: MobjectId, point: Point) -> SceneResult<()> {
        let center = self.bounding_box(id)?.center();
        self.shift(id, point - center)
    }

    /// Line up a group's children along `direction`, recentered on the origin
    pub fn arrange(&mut self, id: MobjectId, direction: Direction, buff: f32) -> SceneResult<()> {
        self.ensure_not_played()?;
        let children = match &self.get(id)?.kind {
            MobjectKind::Group(children) => children.clone(),
            _ => return Ok(()),
        };
        let boxes = children
            .iter()
            .map(|c| self.bounding_box(*c))
            .collect::<SceneResult<Vec<_>>>()?;
        let offsets = arrange_offsets(&boxes, direction, buff);
        for (child, offset) in children.into_iter().zip(offsets) {
            self.shift(child, offset)?;
        }
        Ok(())
    }

    /// Place `id` on the `direction` side of `target` with a `buff` gap
    pub fn next_to(
        &mut self,
        id: MobjectId,
        target: MobjectId,
        direction: Direction,
        buff: f32,
    ) -> SceneResult<()> {
        let mobject_box = self.bounding_box(id)?;
        let target_box = self.bounding_box(target)?;
        self.shift(id, next_to_offset(&mobject_box, &target_box, direction, buff))
    }

    fn resolve(&self, animation: Animation) -> SceneResult<AnimationTrack> {
        let target = animation.target();
        let leaves = self.leaves(target)?;
        let mut track = AnimationTrack {
            animation,
            run_time: DEFAULT_RUN_TIME,
            leaves,
            anchor: Point::ORIGIN,
            lag_ratio: 0.0,
        };

        match animation {
            Animation::Write { .. } => {
                let MobjectKind::Text(text) = &self.get(target)?.kind else {
                    return Err(SceneError::NotText { id: target.index() });
                };
                let (run_time, lag_ratio) = write_timing(text.layout.len());
                track.run_time = run_time;
                track.lag_ratio = lag_ratio;
            }
            Animation::GrowFromBottom { .. } => {
                track.anchor = self.bounding_box(target)?.edge(Direction::Down);
            }
            Animation::FadeIn { .. } | Animation::FadeOut { .. } => {}
        }

        Ok(track)
    }

    /// Play animations together; the directive lasts as long as the longest one
    pub fn play(&mut self, animations: Vec<Animation>) -> SceneResult<()> {
        self.ensure_not_played()?;
        if animations.is_empty() {
            return Err(SceneError::EmptyPlay);
        }
        let tracks = animations
            .into_iter()
            .map(|a| self.resolve(a))
            .collect::<SceneResult<Vec<_>>>()?;
        let run_time = tracks.iter().map(|t| t.run_time).fold(0.0, f32::max);
        debug!(
            animations = tracks.len(),
            run_time, "play directive recorded"
        );
        self.directives.push(Directive::Play { tracks, run_time });
        Ok(())
    }

    pub fn wait(&mut self, seconds: f32) -> SceneResult<()> {
        self.ensure_not_played()?;
        if seconds.is_nan() || seconds <= 0.0 {
            return Err(SceneError::InvalidDuration { seconds });
        }
        self.directives.push(Directive::Wait { duration: seconds });
        Ok(())
    }

    /// Leaf states after completing `directives[..segment]` and running
    /// `elapsed` seconds into `directives[segment]`
    pub fn states_at(&self, segment: usize, elapsed: f32) -> Vec<LeafState> {
        let mut states = vec![LeafState::default(); self.mobjects.len()];

        for (idx, directive) in self.directives.iter().enumerate().take(segment + 1) {
            let Directive::Play { tracks, .. } = directive else {
                continue;
            };
            for track in tracks {
                if idx < segment {
                    track.complete(&mut states);
                } else {
                    track.apply(elapsed, &mut states);
                }
            }
        }

        states
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn mobjects(&self) -> &[Mobject] {
        &self.mobjects
    }

    pub fn mobject(&self, id: MobjectId) -> SceneResult<&Mobject> {
        self.get(id)
    }

    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn rasterizer(&self) -> &GlyphRasterizer {
        &self.rasterizer
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Total timeline length in seconds
    pub fn duration(&self) -> f32 {
        self.directives.iter().map(Directive::duration).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene() -> Scene {
        Scene::new(GlyphRasterizer::Blocks)
    }

    #[test]
    fn test_text_measurement() {
        let mut scene = scene();
        let id = scene
            .add_text(TextSpec::new("ABCD", Color::rgb(1, 2, 3)).scale(0.5))
            .unwrap();
        let bbox = scene.bounding_box(id).unwrap();
        assert!((bbox.height() - 0.25).abs() < 1e-5);
        assert!((bbox.width() - 4.0 * 0.6 * 0.25).abs() < 1e-5);
        assert_eq!(bbox.center(), Point::ORIGIN);
    }

    #[test]
    fn test_group_bounds_and_shift() {
        let mut scene = scene();
        let a = scene.add_rectangle(RectangleSpec::new(1.0, 1.0)).unwrap();
        let b = scene.add_rectangle(RectangleSpec::new(1.0, 1.0)).unwrap();
        scene.shift(b, Point::new(2.0, 0.0)).unwrap();
        let group = scene.group(vec![a, b]).unwrap();

        let bbox = scene.bounding_box(group).unwrap();
        assert!((bbox.width() - 3.0).abs() < 1e-5);

        scene.move_to(group, Point::ORIGIN).unwrap();
        let bbox = scene.bounding_box(group).unwrap();
        assert!(bbox.center().x.abs() < 1e-5);
        assert_eq!(scene.leaves(group).unwrap(), vec![a, b]);
    }

    #[test]
    fn test_unknown_mobject() {
        let mut scene = scene();
        let err = scene.group(vec![MobjectId(7)]).unwrap_err();
        assert!(matches!(err, SceneError::UnknownMobject { id: 7 }));
    }

    #[test]
    fn test_write_requires_text() {
        let mut scene = scene();
        let rect = scene.add_rectangle(RectangleSpec::new(1.0, 1.0)).unwrap();
        let err = scene.play(vec![Animation::Write { target: rect }]).unwrap_err();
        assert!(matches!(err, SceneError::NotText { .. }));
    }

    #[test]
    fn test_play_run_time_is_longest() {
        let mut scene = scene();
        let text = scene
            .add_text(TextSpec::new("a fairly long line of text", Color::rgb(0, 0, 0)))
            .unwrap();
        let rect = scene.add_rectangle(RectangleSpec::new(1.0, 1.0)).unwrap();
        scene
            .play(vec![
                Animation::Write { target: text },
                Animation::FadeIn {
                    target: rect,
                    shift: None,
                },
            ])
            .unwrap();
        assert_eq!(scene.directives()[0].duration(), 2.0);
    }

    #[test]
    fn test_empty_play_and_bad_wait() {
        let mut scene = scene();
        assert!(matches!(scene.play(vec![]), Err(SceneError::EmptyPlay)));
        assert!(matches!(
            scene.wait(0.0),
            Err(SceneError::InvalidDuration { .. })
        ));
        assert!(scene.wait(f32::NAN).is_err());
    }

    struct OneRect;

    impl SceneScript for OneRect {
        fn name(&self) -> &str {
            "OneRect"
        }

        fn construct(&self, scene: &mut Scene) -> SceneResult<()> {
            let rect = scene.add_rectangle(RectangleSpec::new(1.0, 1.0))?;
            scene.play(vec![Animation::FadeIn {
                target: rect,
                shift: None,
            }])?;
            scene.wait(1.0)
        }
    }

    #[test]
    fn test_build_only_once() {
        let mut scene = scene();
        scene.build(&OneRect).unwrap();
        assert_eq!(scene.state(), PlaybackState::Played);
        assert!(matches!(scene.build(&OneRect), Err(SceneError::AlreadyPlayed)));
        assert!(matches!(scene.wait(1.0), Err(SceneError::AlreadyPlayed)));
    }

    #[test]
    fn test_states_at() {
        let mut scene = scene();
        scene.build(&OneRect).unwrap();

        let before = scene.states_at(0, 0.0);
        assert!(before[0].opacity < 0.01);

        let after = scene.states_at(1, 0.0);
        assert!(after[0].visible);
        assert_eq!(after[0].opacity, 1.0);
    }
}
