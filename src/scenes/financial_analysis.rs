use crate::animation::Animation;
use crate::error::SceneResult;
use crate::layout::Direction;
use crate::palette::Palette;
use crate::script::{RectangleSpec, Scene, SceneScript, TextSpec};

pub const TITLE: &str = "AI-Powered Financial Data Analysis";
pub const SUBTITLE: &str = "Smarter Insights. Faster Decisions.";
pub const OUTRO: &str = "AI Financial Intelligence";
const FONT: &str = "Inter";

/// (height, width) of each bar, left to right
pub const BAR_SIZES: [(f32, f32); 3] = [(1.0, 0.3), (2.0, 0.3), (1.5, 0.3)];
pub const BAR_SPACING: f32 = 0.5;
const BAR_FILL_OPACITY: f32 = 0.9;

/// Title card, three growing bars, a subtitle, and an outro
pub struct FinancialAnalysis;

impl SceneScript for FinancialAnalysis {
    fn name(&self) -> &str {
        "FinancialAnalysis"
    }

    fn construct(&self, scene: &mut Scene) -> SceneResult<()> {
        let palette = Palette::load()?;

        scene.set_background(palette.charcoal)?;

        let title = scene.add_text(TextSpec::new(TITLE, palette.teal).font(FONT).scale(0.9))?;
        scene.play(vec![Animation::Write { target: title }])?;
        scene.wait(1.0)?;

        let fills = [palette.teal, palette.cream, palette.orange];
        let mut bars = Vec::with_capacity(BAR_SIZES.len());
        for ((height, width), fill) in BAR_SIZES.into_iter().zip(fills) {
            bars.push(
                scene.add_rectangle(
                    RectangleSpec::new(height, width).fill(fill, BAR_FILL_OPACITY),
                )?,
            );
        }
        let chart = scene.group(bars.clone())?;
        scene.arrange(chart, Direction::Right, BAR_SPACING)?;
        scene.next_to(chart, title, Direction::Down, 1.0)?;

        scene.play(
            bars.iter()
                .map(|&bar| Animation::GrowFromBottom { target: bar })
                .collect(),
        )?;
        scene.wait(1.0)?;

        let subtitle =
            scene.add_text(TextSpec::new(SUBTITLE, palette.cream).font(FONT).scale(0.6))?;
        scene.next_to(subtitle, chart, Direction::Down, 0.8)?;

        scene.play(vec![Animation::FadeIn {
            target: subtitle,
            shift: Some(Direction::Up),
        }])?;
        scene.wait(2.0)?;

        let outro = scene.add_text(TextSpec::new(OUTRO, palette.teal).font(FONT).scale(0.8))?;
        scene.play(
            [title, chart, subtitle]
                .into_iter()
                .map(|target| Animation::FadeOut {
                    target,
                    shift: None,
                })
                .collect(),
        )?;
        scene.play(vec![Animation::FadeIn {
            target: outro,
            shift: Some(Direction::Down),
        }])?;
        scene.wait(2.0)?;

        Ok(())
    }
}
