//! Core value types: points, colours, polylines, scenes and planner tuning.
//!
//! Coordinates are normalized:
//! - x: -1.0 (left) to 1.0 (right)
//! - y: -1.0 (bottom) to 1.0 (top)
//! - Colours: 0.0 to 1.0 per channel
//!
//! These ranges are the contract for everything downstream: the planner emits
//! samples inside them, the physics models clamp to them, and
//! [`BeamState::validate`](crate::BeamState::validate) treats an excursion as
//! a bug.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single demand sample: beam position plus colour.
///
/// Immutable by convention; the planner and pathers copy points around
/// freely.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// X coordinate, -1.0 to 1.0
    pub x: f32,
    /// Y coordinate, -1.0 to 1.0
    pub y: f32,
    /// Red channel (0.0 to 1.0)
    pub r: f32,
    /// Green channel (0.0 to 1.0)
    pub g: f32,
    /// Blue channel (0.0 to 1.0)
    pub b: f32,
}

impl Point {
    /// Creates a new point.
    pub fn new(x: f32, y: f32, r: f32, g: f32, b: f32) -> Self {
        Self { x, y, r, g, b }
    }

    /// Creates a blanked point (laser off) at the given position.
    pub fn blanked(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    /// Returns the colour channels of this point.
    pub fn rgb(&self) -> Rgb {
        Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }

    /// Squared distance between the positions of two points.
    ///
    /// Used by the planner for nearest-neighbor scans; comparing squared
    /// distances avoids the sqrt in the inner loop.
    pub fn squared_distance(&self, other: &Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance between the positions of two points.
    pub fn distance(&self, other: &Point) -> f32 {
        self.squared_distance(other).sqrt()
    }
}

/// An RGB colour triple, 0.0 to 1.0 per channel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    pub const WHITE: Rgb = Rgb {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Largest per-channel difference to another colour.
    pub fn max_channel_delta(&self, other: &Rgb) -> f32 {
        let dr = (other.r - self.r).abs();
        let dg = (other.g - self.g).abs();
        let db = (other.b - self.b).abs();
        dr.max(dg).max(db)
    }
}

/// An ordered run of connected points, open or closed.
///
/// The planner treats a polyline as a unit: it enters at one endpoint,
/// traces every interior segment, and leaves at the other endpoint. A
/// polyline entered at its far end is reversed first.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polyline {
    points: Vec<Point>,
}

impl Polyline {
    /// Creates a polyline from its vertices.
    ///
    /// # Errors
    ///
    /// Fails with a config error when fewer than two points are given.
    pub fn new(points: Vec<Point>) -> Result<Self> {
        if points.len() < 2 {
            return Err(Error::invalid_config(format!(
                "polyline needs at least 2 points, got {}",
                points.len()
            )));
        }
        Ok(Self { points })
    }

    /// Convenience constructor for a single line segment.
    pub fn segment(a: Point, b: Point) -> Self {
        Self { points: vec![a, b] }
    }

    /// The vertices in order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// First vertex.
    pub fn start(&self) -> Point {
        self.points[0]
    }

    /// Last vertex.
    pub fn end(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Reverses the traversal direction in place.
    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// True when the first and last vertex share a position.
    pub fn is_closed(&self) -> bool {
        let a = self.start();
        let b = self.end();
        a.x == b.x && a.y == b.y
    }
}

/// Axis-aligned bounds of a scene's geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    fn include(&mut self, p: &Point) {
        self.min_x = self.min_x.min(p.x);
        self.min_y = self.min_y.min(p.y);
        self.max_x = self.max_x.max(p.x);
        self.max_y = self.max_y.max(p.y);
    }

    fn from_point(p: &Point) -> Self {
        Self {
            min_x: p.x,
            min_y: p.y,
            max_x: p.x,
            max_y: p.y,
        }
    }
}

/// A 2D vector scene: polylines plus isolated points.
///
/// Scenes are produced per animation tick by an external animator and
/// consumed here only through the `lines()` / `isolated_points()` views and
/// the `bounds()` query.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scene {
    lines: Vec<Polyline>,
    points: Vec<Point>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a polyline to the scene.
    pub fn add_line(&mut self, line: Polyline) -> &mut Self {
        self.lines.push(line);
        self
    }

    /// Adds an isolated point to the scene.
    pub fn add_point(&mut self, point: Point) -> &mut Self {
        self.points.push(point);
        self
    }

    /// All polylines, in insertion order.
    pub fn lines(&self) -> &[Polyline] {
        &self.lines
    }

    /// All isolated points, in insertion order.
    pub fn isolated_points(&self) -> &[Point] {
        &self.points
    }

    /// True when the scene has no geometry at all.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.points.is_empty()
    }

    /// Axis-aligned bounds over all geometry, `None` for an empty scene.
    pub fn bounds(&self) -> Option<Bounds> {
        let mut bounds: Option<Bounds> = None;
        for line in &self.lines {
            for p in line.points() {
                match bounds.as_mut() {
                    Some(b) => b.include(p),
                    None => bounds = Some(Bounds::from_point(p)),
                }
            }
        }
        for p in &self.points {
            match bounds.as_mut() {
                Some(b) => b.include(p),
                None => bounds = Some(Bounds::from_point(p)),
            }
        }
        bounds
    }
}

/// Position interpolation mode for the sub-segment interpolator.
///
/// Applied to position only, never to colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Interpolation {
    /// Constant-velocity interpolation, `t = i/n`.
    #[default]
    Linear,
    /// Quintic ease-in/ease-out with zero first and second derivative at
    /// the endpoints. Gives the galvos a gentler start and stop on long
    /// jumps.
    Quintic,
}

/// Tuning for the path planner and interpolator.
///
/// Validated at construction of [`PathPlanner`](crate::PathPlanner); invalid
/// values fail fast instead of being clamped.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlannerConfig {
    /// Interpolated samples inserted per unit of travelled distance.
    pub points_per_unit: f32,
    /// Extra samples inserted per segment regardless of its length.
    pub points_per_unit_offset: usize,
    /// Dwell samples at each polyline vertex, giving a slow beam time to
    /// settle before the direction change.
    pub vertex_points: usize,
    /// Dwell samples at each isolated point.
    pub points_per_point: usize,
    /// Blanked dwell samples inserted before travelling to an isolated
    /// point (pen up).
    pub black_points: usize,
    /// Position interpolation mode.
    pub interpolation: Interpolation,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            points_per_unit: 100.0,
            points_per_unit_offset: 0,
            vertex_points: 3,
            points_per_point: 5,
            black_points: 5,
            interpolation: Interpolation::Linear,
        }
    }
}

impl PlannerConfig {
    /// Checks the tuning values.
    ///
    /// `points_per_unit` must be finite and non-negative; the count fields
    /// are unsigned and need no check.
    pub fn validate(&self) -> Result<()> {
        if !self.points_per_unit.is_finite() || self.points_per_unit < 0.0 {
            return Err(Error::invalid_config(format!(
                "points_per_unit must be finite and >= 0, got {}",
                self.points_per_unit
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_blanked_sets_all_colours_to_zero() {
        let p = Point::blanked(0.25, -0.75);
        assert_eq!(p.x, 0.25);
        assert_eq!(p.y, -0.75);
        assert_eq!(p.r, 0.0);
        assert_eq!(p.g, 0.0);
        assert_eq!(p.b, 0.0);
    }

    #[test]
    fn test_point_distance() {
        let a = Point::blanked(0.0, 0.0);
        let b = Point::blanked(0.3, 0.4);
        assert!((a.squared_distance(&b) - 0.25).abs() < 1e-6);
        assert!((a.distance(&b) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rgb_max_channel_delta() {
        let from = Rgb::new(0.2, 0.9, 0.5);
        assert!((from.max_channel_delta(&Rgb::BLACK) - 0.9).abs() < 1e-6);
        assert!((from.max_channel_delta(&Rgb::WHITE) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_polyline_requires_two_points() {
        assert!(Polyline::new(vec![]).is_err());
        assert!(Polyline::new(vec![Point::blanked(0.0, 0.0)]).is_err());
        assert!(Polyline::new(vec![Point::blanked(0.0, 0.0); 2]).is_ok());
    }

    #[test]
    fn test_polyline_reverse_swaps_endpoints() {
        let mut line = Polyline::segment(
            Point::new(-0.5, 0.0, 1.0, 0.0, 0.0),
            Point::new(0.5, 0.0, 0.0, 1.0, 0.0),
        );
        line.reverse();
        assert_eq!(line.start().x, 0.5);
        assert_eq!(line.end().x, -0.5);
    }

    #[test]
    fn test_polyline_is_closed() {
        let open = Polyline::segment(Point::blanked(0.0, 0.0), Point::blanked(1.0, 0.0));
        assert!(!open.is_closed());

        let closed = Polyline::new(vec![
            Point::blanked(0.0, 0.0),
            Point::blanked(1.0, 0.0),
            Point::blanked(0.0, 0.0),
        ])
        .unwrap();
        assert!(closed.is_closed());
    }

    #[test]
    fn test_scene_bounds() {
        let mut scene = Scene::new();
        assert!(scene.bounds().is_none());

        scene.add_point(Point::blanked(0.5, -0.5));
        scene.add_line(Polyline::segment(
            Point::blanked(-0.9, 0.1),
            Point::blanked(0.2, 0.8),
        ));

        let b = scene.bounds().unwrap();
        assert_eq!(b.min_x, -0.9);
        assert_eq!(b.min_y, -0.5);
        assert_eq!(b.max_x, 0.5);
        assert_eq!(b.max_y, 0.8);
    }

    #[test]
    fn test_planner_config_rejects_bad_density() {
        let cfg = PlannerConfig {
            points_per_unit: -1.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = PlannerConfig {
            points_per_unit: f32::NAN,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        assert!(PlannerConfig::default().validate().is_ok());
    }
}
