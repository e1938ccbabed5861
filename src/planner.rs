//! Greedy scene sequencer and sub-segment interpolator.
//!
//! The planner turns a [`Scene`] of disjoint polylines and isolated points
//! into one continuous, closed sample loop a galvo pair can physically
//! follow. Sequencing is a greedy nearest-neighbor walk (good enough at
//! tens-to-hundreds of elements; this is deliberately not a TSP solver),
//! interpolation densifies each hop to the configured point density with
//! optional quintic easing, and disjoint geometry is bridged pen-up.

use crate::error::Result;
use crate::pather::{PathSamples, Pather};
use crate::types::{Interpolation, Point, PlannerConfig, Polyline, Scene};

/// One stop in the planned traversal order.
#[derive(Debug, Clone, PartialEq)]
pub enum Visit {
    /// Trace a polyline, already oriented so entry is at `start()`.
    Line(Polyline),
    /// Dwell on an isolated point, reached pen-up.
    Point(Point),
}

/// A planned, closed sample loop. Output of [`PathPlanner::plan`].
#[derive(Debug, Clone)]
pub struct PlannedPath {
    samples: PathSamples,
}

impl PlannedPath {
    /// Number of samples in the loop.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the path holds no samples. Does not happen for paths
    /// produced by the planner, which emits at least one blanked sample.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl Pather for PlannedPath {
    fn samples(&self) -> &PathSamples {
        &self.samples
    }
}

/// Quintic ease-in/ease-out.
///
/// `f(t) = 16t^5` for `t < 0.5`, else `1 - ((-2t + 2)^5) / 2`. Zero first
/// and second derivative at both endpoints, so the beam starts and stops a
/// jump without a velocity step.
pub fn quintic_ease(t: f32) -> f32 {
    if t < 0.5 {
        16.0 * t * t * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
    }
}

/// Sequences scenes into closed, interpolated sample loops.
pub struct PathPlanner {
    config: PlannerConfig,
}

impl PathPlanner {
    /// Creates a planner with the given tuning.
    ///
    /// # Errors
    ///
    /// Fails fast with a config error on invalid tuning values.
    pub fn new(config: PlannerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The planner's tuning.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Computes the greedy traversal order without interpolating.
    ///
    /// Every polyline and isolated point of the scene appears exactly once.
    /// Polylines entered at their far endpoint come back reversed.
    pub fn sequence(&self, scene: &Scene) -> Vec<Visit> {
        sequence_scene(scene)
    }

    /// Plans a scene into one closed sample loop.
    ///
    /// Every line and isolated point is visited exactly once; transitions
    /// to isolated points are blanked; after all geometry is consumed the
    /// path closes by interpolating back to its first sample. An empty
    /// scene yields a single blanked sample at the origin.
    ///
    /// # Errors
    ///
    /// Fails with a fatal internal error if the output arrays diverge in
    /// length (a bug, not a user-facing condition).
    pub fn plan(&self, scene: &Scene) -> Result<PlannedPath> {
        let cfg = &self.config;
        let visits = sequence_scene(scene);
        let mut samples = PathSamples::new();

        if visits.is_empty() {
            samples.push(Point::blanked(0.0, 0.0));
            samples.validate()?;
            return Ok(PlannedPath { samples });
        }

        let mut cursor = initial_cursor(scene);

        for visit in &visits {
            match visit {
                Visit::Line(line) => {
                    self.interpolate(&mut samples, cursor, line.start(), cfg.vertex_points);
                    for pair in line.points().windows(2) {
                        self.interpolate(&mut samples, pair[0], pair[1], cfg.vertex_points);
                    }
                    cursor = line.end();
                }
                Visit::Point(point) => {
                    // Pen up: park blanked at the current position so the
                    // transit to the point stays invisible.
                    let park = Point::blanked(cursor.x, cursor.y);
                    for _ in 0..cfg.black_points {
                        samples.push(park);
                    }
                    cursor = park;
                    self.interpolate(&mut samples, cursor, *point, cfg.points_per_point);
                    cursor = *point;
                }
            }
        }

        // Close the loop back to the first emitted sample.
        if samples.is_empty() {
            // All counts tuned to zero; still emit something drivable.
            samples.push(Point::blanked(cursor.x, cursor.y));
        } else {
            let first = samples.point(0);
            self.interpolate(&mut samples, cursor, first, cfg.vertex_points);
        }

        samples.validate()?;
        log::debug!(
            "planned {} samples from {} lines + {} points",
            samples.len(),
            scene.lines().len(),
            scene.isolated_points().len()
        );
        Ok(PlannedPath { samples })
    }

    /// Appends interpolated samples from `from` to `to`, then `dwell`
    /// settle samples at `to`.
    ///
    /// Inserts `distance * points_per_unit + points_per_unit_offset`
    /// samples at `t = i/n`, eased in position only; colour stays at the
    /// departure point's colour for the whole transit.
    fn interpolate(&self, out: &mut PathSamples, from: Point, to: Point, dwell: usize) {
        let cfg = &self.config;
        let n = (from.distance(&to) * cfg.points_per_unit) as usize + cfg.points_per_unit_offset;

        for i in 0..n {
            let t = i as f32 / n as f32;
            let t = match cfg.interpolation {
                Interpolation::Linear => t,
                Interpolation::Quintic => quintic_ease(t),
            };
            out.push(Point {
                x: from.x + (to.x - from.x) * t,
                y: from.y + (to.y - from.y) * t,
                r: from.r,
                g: from.g,
                b: from.b,
            });
        }

        for _ in 0..dwell {
            out.push(to);
        }
    }
}

/// Starting cursor: a line's start, else a point, else the origin.
fn initial_cursor(scene: &Scene) -> Point {
    if let Some(line) = scene.lines().first() {
        line.start()
    } else if let Some(point) = scene.isolated_points().first() {
        *point
    } else {
        Point::blanked(0.0, 0.0)
    }
}

/// Greedy nearest-neighbor traversal over removable working sets.
///
/// Lines are scanned before points and only a strictly smaller distance
/// replaces the current best, so on a tie the first-found candidate wins.
/// That ordering is load-bearing: downstream tests pin the deterministic
/// traversal it produces.
fn sequence_scene(scene: &Scene) -> Vec<Visit> {
    enum Winner {
        Line { index: usize, reversed: bool },
        Point { index: usize },
    }

    let mut lines: Vec<Polyline> = scene.lines().to_vec();
    let mut points: Vec<Point> = scene.isolated_points().to_vec();
    let mut visits = Vec::with_capacity(lines.len() + points.len());

    if lines.is_empty() && points.is_empty() {
        return visits;
    }

    let mut cursor = initial_cursor(scene);

    while !lines.is_empty() || !points.is_empty() {
        let mut best = f32::INFINITY;
        let mut winner: Option<Winner> = None;

        for (index, line) in lines.iter().enumerate() {
            let d = cursor.squared_distance(&line.start());
            if d < best {
                best = d;
                winner = Some(Winner::Line {
                    index,
                    reversed: false,
                });
            }
            let d = cursor.squared_distance(&line.end());
            if d < best {
                best = d;
                winner = Some(Winner::Line {
                    index,
                    reversed: true,
                });
            }
        }

        for (index, point) in points.iter().enumerate() {
            let d = cursor.squared_distance(point);
            if d < best {
                best = d;
                winner = Some(Winner::Point { index });
            }
        }

        match winner.expect("working sets are non-empty") {
            Winner::Line { index, reversed } => {
                let mut line = lines.remove(index);
                if reversed {
                    line.reverse();
                }
                cursor = line.end();
                visits.push(Visit::Line(line));
            }
            Winner::Point { index } => {
                let point = points.remove(index);
                cursor = point;
                visits.push(Visit::Point(point));
            }
        }
    }

    visits
}
