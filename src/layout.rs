//! Scene-space geometry and relative placement.
//!
//! Scene space is measured in units with the origin at the frame center and
//! `+y` pointing up. Placement follows the usual motion-graphics conventions:
//! `next_to` puts an object against a target edge with a gap, and `arrange`
//! lines objects up with a gap and recenters the row on the origin.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Position in scene units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Unit direction used by placement and shifted fades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn vector(self) -> Point {
        match self {
            Direction::Up => Point::new(0.0, 1.0),
            Direction::Down => Point::new(0.0, -1.0),
            Direction::Left => Point::new(-1.0, 0.0),
            Direction::Right => Point::new(1.0, 0.0),
        }
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Axis-aligned bounds in scene units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn from_center(center: Point, width: f32, height: f32) -> Self {
        let half = Point::new(width / 2.0, height / 2.0);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Point {
        (self.min + self.max) * 0.5
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn translate(&self, offset: Point) -> BoundingBox {
        BoundingBox {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Midpoint of the edge facing `direction`
    pub fn edge(&self, direction: Direction) -> Point {
        let c = self.center();
        match direction {
            Direction::Up => Point::new(c.x, self.max.y),
            Direction::Down => Point::new(c.x, self.min.y),
            Direction::Left => Point::new(self.min.x, c.y),
            Direction::Right => Point::new(self.max.x, c.y),
        }
    }
}

/// Offset that places `mobject` against `target` on the `direction` side,
/// `buff` units away, centered on the target along the other axis.
pub fn next_to_offset(
    mobject: &BoundingBox,
    target: &BoundingBox,
    direction: Direction,
    buff: f32,
) -> Point {
    let target_point = target.edge(direction);
    let anchor = mobject.edge(direction.opposite());
    target_point - anchor + direction.vector() * buff
}

/// Offsets that line `boxes` up along `direction` with `buff` gaps and then
/// center the whole row on the origin.
pub fn arrange_offsets(boxes: &[BoundingBox], direction: Direction, buff: f32) -> Vec<Point> {
    let mut offsets = Vec::with_capacity(boxes.len());
    let mut placed: Vec<BoundingBox> = Vec::with_capacity(boxes.len());

    for (idx, bbox) in boxes.iter().enumerate() {
        let offset = if idx == 0 {
            Point::ORIGIN
        } else {
            next_to_offset(bbox, &placed[idx - 1], direction, buff)
        };
        offsets.push(offset);
        placed.push(bbox.translate(offset));
    }

    if let Some(first) = placed.first() {
        let bounds = placed.iter().skip(1).fold(*first, |acc, b| acc.union(b));
        let recenter = -bounds.center();
        for offset in &mut offsets {
            *offset = *offset + recenter;
        }
    }

    offsets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_next_to_below() {
        let target = BoundingBox::from_center(Point::ORIGIN, 4.0, 1.0);
        let mobject = BoundingBox::from_center(Point::new(3.0, 3.0), 2.0, 2.0);

        let placed = mobject.translate(next_to_offset(&mobject, &target, Direction::Down, 1.0));
        assert!(approx(placed.max.y, -1.5));
        assert!(approx(placed.center().x, 0.0));
    }

    #[test]
    fn test_arrange_right_centers_row() {
        let boxes = [
            BoundingBox::from_center(Point::ORIGIN, 0.3, 1.0),
            BoundingBox::from_center(Point::ORIGIN, 0.3, 2.0),
            BoundingBox::from_center(Point::ORIGIN, 0.3, 1.5),
        ];
        let offsets = arrange_offsets(&boxes, Direction::Right, 0.5);
        let placed: Vec<_> = boxes
            .iter()
            .zip(&offsets)
            .map(|(b, o)| b.translate(*o))
            .collect();

        assert!(approx(placed[1].min.x - placed[0].max.x, 0.5));
        assert!(approx(placed[2].min.x - placed[1].max.x, 0.5));
        assert!(approx(placed[0].min.x, -(placed[2].max.x)));
        // vertically centered on one another
        for b in &placed {
            assert!(approx(b.center().y, 0.0));
        }
    }

    #[test]
    fn test_arrange_empty() {
        assert!(arrange_offsets(&[], Direction::Right, 0.5).is_empty());
    }
}
