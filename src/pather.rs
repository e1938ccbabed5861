//! The [`Pather`] contract and its sample container.
//!
//! A pather is anything that can hand the output stage five equal-length
//! sample sequences: x, y, red, green, blue. The planner produces one by
//! sequencing a scene; [`SimplePather`] wraps pre-built point lists
//! (calibration frames, ILDA content) that must reach the output device
//! unmodified.

use crate::error::{Error, Result};
use crate::types::Point;

/// Five parallel sample sequences.
///
/// Invariant: the five arrays always have the same length. A divergence is
/// a planner bug and surfaces as a fatal internal error from
/// [`validate`](Self::validate), never as silent truncation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PathSamples {
    xs: Vec<f32>,
    ys: Vec<f32>,
    rs: Vec<f32>,
    gs: Vec<f32>,
    bs: Vec<f32>,
}

impl PathSamples {
    /// Creates an empty sample set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty sample set with reserved capacity.
    pub fn with_capacity(n: usize) -> Self {
        Self {
            xs: Vec::with_capacity(n),
            ys: Vec::with_capacity(n),
            rs: Vec::with_capacity(n),
            gs: Vec::with_capacity(n),
            bs: Vec::with_capacity(n),
        }
    }

    /// Appends one sample.
    pub fn push(&mut self, point: Point) {
        self.xs.push(point.x);
        self.ys.push(point.y);
        self.rs.push(point.r);
        self.gs.push(point.g);
        self.bs.push(point.b);
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// True when no samples are present.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Reassembles the sample at `index` as a [`Point`].
    ///
    /// # Panics
    ///
    /// Panics when `index >= len()`.
    pub fn point(&self, index: usize) -> Point {
        Point {
            x: self.xs[index],
            y: self.ys[index],
            r: self.rs[index],
            g: self.gs[index],
            b: self.bs[index],
        }
    }

    /// X samples.
    pub fn xs(&self) -> &[f32] {
        &self.xs
    }

    /// Y samples.
    pub fn ys(&self) -> &[f32] {
        &self.ys
    }

    /// Red samples.
    pub fn rs(&self) -> &[f32] {
        &self.rs
    }

    /// Green samples.
    pub fn gs(&self) -> &[f32] {
        &self.gs
    }

    /// Blue samples.
    pub fn bs(&self) -> &[f32] {
        &self.bs
    }

    /// Checks the equal-length invariant.
    pub fn validate(&self) -> Result<()> {
        let n = self.xs.len();
        if self.ys.len() != n || self.rs.len() != n || self.gs.len() != n || self.bs.len() != n {
            return Err(Error::internal(format!(
                "sample arrays diverged: xs={} ys={} rs={} gs={} bs={}",
                self.xs.len(),
                self.ys.len(),
                self.rs.len(),
                self.gs.len(),
                self.bs.len()
            )));
        }
        Ok(())
    }
}

/// Produces five equal-length sample sequences for the output stage.
pub trait Pather: Send {
    /// Borrows the planned samples.
    fn samples(&self) -> &PathSamples;
}

/// Identity pather: N points in, exactly N samples out, in input order.
///
/// Calibration and ILDA content is already normalized and interpolated by
/// its producer; reinterpreting it would distort the calibration, so this
/// pather passes every point through untouched.
#[derive(Debug, Clone, Default)]
pub struct SimplePather {
    samples: PathSamples,
}

impl SimplePather {
    /// Wraps a pre-built point list.
    pub fn new(points: &[Point]) -> Self {
        let mut samples = PathSamples::with_capacity(points.len());
        for p in points {
            samples.push(*p);
        }
        Self { samples }
    }
}

impl Pather for SimplePather {
    fn samples(&self) -> &PathSamples {
        &self.samples
    }
}
