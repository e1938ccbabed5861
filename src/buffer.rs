//! Fixed-capacity signal storage for the real-time stepper.

use crate::error::{Error, Result};
use crate::pather::PathSamples;
use crate::types::Point;

/// Fixed-capacity parallel arrays of x, y, r, g, b samples.
///
/// Backing storage is allocated once at construction and never grows;
/// entries beyond the filled count are stale and undefined. The simulator
/// owns a front/back pair of these and swaps them when a new path is
/// submitted, so refills must not allocate.
#[derive(Debug)]
pub struct SignalBuffer {
    xs: Vec<f32>,
    ys: Vec<f32>,
    rs: Vec<f32>,
    gs: Vec<f32>,
    bs: Vec<f32>,
    len: usize,
}

impl SignalBuffer {
    /// Creates a buffer holding up to `capacity` samples.
    ///
    /// # Errors
    ///
    /// Fails with a config error when `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::invalid_config("buffer capacity must be > 0"));
        }
        Ok(Self {
            xs: vec![0.0; capacity],
            ys: vec![0.0; capacity],
            rs: vec![0.0; capacity],
            gs: vec![0.0; capacity],
            bs: vec![0.0; capacity],
            len: 0,
        })
    }

    /// Maximum number of samples this buffer can hold.
    pub fn capacity(&self) -> usize {
        self.xs.len()
    }

    /// Number of valid samples currently in the buffer.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True when no valid samples are present.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops the valid samples without touching the backing storage.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Copies a pather's samples into this buffer, replacing its contents.
    ///
    /// # Errors
    ///
    /// Fails with an internal error when the source arrays have unequal
    /// lengths, and with a config error when the path does not fit the
    /// fixed capacity. A failed copy leaves the previous contents intact.
    pub fn copy_from(&mut self, samples: &PathSamples) -> Result<()> {
        samples.validate()?;

        let n = samples.len();
        if n > self.capacity() {
            return Err(Error::invalid_config(format!(
                "path of {} samples exceeds buffer capacity {}",
                n,
                self.capacity()
            )));
        }

        self.len = 0;
        self.xs[..n].copy_from_slice(samples.xs());
        self.ys[..n].copy_from_slice(samples.ys());
        self.rs[..n].copy_from_slice(samples.rs());
        self.gs[..n].copy_from_slice(samples.gs());
        self.bs[..n].copy_from_slice(samples.bs());
        self.len = n;
        Ok(())
    }

    /// Reassembles the sample at `index` as a [`Point`].
    ///
    /// # Panics
    ///
    /// Panics when `index >= len()`.
    pub fn sample(&self, index: usize) -> Point {
        assert!(index < self.len, "sample index {} out of range", index);
        Point {
            x: self.xs[index],
            y: self.ys[index],
            r: self.rs[index],
            g: self.gs[index],
            b: self.bs[index],
        }
    }
}
