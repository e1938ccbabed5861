//! Real-time beam simulator.
//!
//! The simulator owns a front [`SignalBuffer`] it reads demand samples from
//! and a beam state it advances through a [`BeamPhysics`] model, one fixed
//! tick at a time. A producer thread submits freshly planned paths through a
//! [`PathSubmitter`]; submissions land in a back buffer and are swapped in
//! at the top of the next `update()`, so neither side ever observes the
//! other's half-written samples.
//!
//! Every tick deposits a copy of the beam state into a bounded trail ring
//! sized to one persistence-of-vision interval, which is what a renderer
//! reads to draw the glowing path a viewer would perceive.

use std::mem;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::buffer::SignalBuffer;
use crate::error::{Error, Result};
use crate::pather::Pather;
use crate::physics::{BeamPhysics, BeamState, POSITION_MAX, POSITION_MIN};
use crate::types::Point;

/// Frame rate below which the eye stops fusing the trail into a single
/// image. The trail ring holds one interval's worth of ticks.
pub const FPS_POV: u32 = 25;

/// Lifecycle of a simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorState {
    /// No path has been submitted yet.
    Idle,
    /// A path has been submitted but no tick has run.
    Armed,
    /// Ticks are flowing.
    Running,
}

/// Simulator tuning, validated at construction.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulatorConfig {
    /// Ticks per second.
    pub sample_rate: u32,
    /// Demand samples consumed per second, reported to planners.
    pub points_per_second: u32,
    /// Capacity of the front and back signal buffers, in samples.
    pub buffer_size: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            sample_rate: 30_000,
            points_per_second: 30_000,
            buffer_size: 4096,
        }
    }
}

impl SimulatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::invalid_config("sample_rate must be > 0"));
        }
        if self.points_per_second == 0 {
            return Err(Error::invalid_config("points_per_second must be > 0"));
        }
        if self.buffer_size == 0 {
            return Err(Error::invalid_config("buffer_size must be > 0"));
        }
        Ok(())
    }
}

/// State shared with producer-side handles.
struct Shared {
    back: SignalBuffer,
    pending: bool,
    armed: bool,
}

fn submit_samples(shared: &Mutex<Shared>, pather: &dyn Pather) -> Result<()> {
    let samples = pather.samples();
    samples.validate()?;
    let mut guard = shared.lock().unwrap();
    if guard.pending {
        log::debug!("superseding a pending path of {} samples", guard.back.len());
    }
    // A failed copy must leave an already-accepted pending path intact.
    guard.back.copy_from(samples)?;
    guard.pending = true;
    guard.armed = true;
    Ok(())
}

/// Clonable producer-side handle for submitting planned paths.
///
/// Obtained from [`Simulator::submitter`] and safe to move to another
/// thread; each submission supersedes any not-yet-displayed predecessor.
#[derive(Clone)]
pub struct PathSubmitter {
    shared: Arc<Mutex<Shared>>,
}

impl PathSubmitter {
    /// Copies the pather's samples into the back buffer and marks them
    /// ready to be swapped in.
    pub fn submit(&self, pather: &dyn Pather) -> Result<()> {
        submit_samples(&self.shared, pather)
    }
}

/// Bounded ring of beam states covering one POV interval.
struct Trail {
    ring: Vec<BeamState>,
    head: usize,
    len: usize,
}

impl Trail {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            ring: vec![BeamState::default(); capacity],
            head: 0,
            len: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.ring.len()
    }

    fn push(&mut self, state: BeamState) {
        self.ring[self.head] = state;
        self.head = (self.head + 1) % self.ring.len();
        self.len = (self.len + 1).min(self.ring.len());
    }

    fn extend(&mut self, batch: &[BeamState]) {
        for state in batch {
            self.push(*state);
        }
    }

    /// Discards all entries and reallocates to the new capacity.
    fn reset(&mut self, capacity: usize) {
        self.ring = vec![BeamState::default(); capacity];
        self.head = 0;
        self.len = 0;
    }

    /// Copied snapshot, oldest to newest.
    fn snapshot(&self) -> Vec<BeamState> {
        if self.len < self.ring.len() {
            self.ring[..self.len].to_vec()
        } else {
            let mut out = Vec::with_capacity(self.len);
            out.extend_from_slice(&self.ring[self.head..]);
            out.extend_from_slice(&self.ring[..self.head]);
            out
        }
    }
}

/// Clonable reader handle for the trail ring.
#[derive(Clone)]
pub struct TrailReader {
    trail: Arc<Mutex<Trail>>,
}

impl TrailReader {
    /// Copied snapshot of the trail, oldest to newest.
    pub fn read(&self) -> Vec<BeamState> {
        self.trail.lock().unwrap().snapshot()
    }
}

fn trail_capacity(sample_rate: u32) -> usize {
    (sample_rate / FPS_POV).max(1) as usize
}

/// Double-buffered beam stepper.
///
/// Owned by the simulation thread; only [`PathSubmitter`] and
/// [`TrailReader`] handles cross thread boundaries.
pub struct Simulator {
    physics: Box<dyn BeamPhysics>,
    sample_rate: u32,
    points_per_second: u32,
    front: SignalBuffer,
    cursor: usize,
    beam: BeamState,
    running: bool,
    shared: Arc<Mutex<Shared>>,
    trail: Arc<Mutex<Trail>>,
    last_update: Option<Instant>,
    carry_ns: u64,
}

impl Simulator {
    pub fn new(physics: Box<dyn BeamPhysics>, config: SimulatorConfig) -> Result<Self> {
        config.validate()?;
        let front = SignalBuffer::with_capacity(config.buffer_size)?;
        let back = SignalBuffer::with_capacity(config.buffer_size)?;
        Ok(Self {
            physics,
            sample_rate: config.sample_rate,
            points_per_second: config.points_per_second,
            front,
            cursor: 0,
            beam: BeamState::default(),
            running: false,
            shared: Arc::new(Mutex::new(Shared {
                back,
                pending: false,
                armed: false,
            })),
            trail: Arc::new(Mutex::new(Trail::with_capacity(trail_capacity(
                config.sample_rate,
            )))),
            last_update: None,
            carry_ns: 0,
        })
    }

    /// Submits a planned path for display at the next `update()`.
    pub fn make_path(&self, pather: &dyn Pather) -> Result<()> {
        submit_samples(&self.shared, pather)
    }

    /// Handle for submitting paths from another thread.
    pub fn submitter(&self) -> PathSubmitter {
        PathSubmitter {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Handle for reading the trail from another thread.
    pub fn trail_reader(&self) -> TrailReader {
        TrailReader {
            trail: Arc::clone(&self.trail),
        }
    }

    pub fn state(&self) -> SimulatorState {
        if self.running {
            SimulatorState::Running
        } else if self.shared.lock().unwrap().armed {
            SimulatorState::Armed
        } else {
            SimulatorState::Idle
        }
    }

    pub fn is_armed(&self) -> bool {
        self.state() != SimulatorState::Idle
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Changes the tick rate and resizes the trail ring to one POV
    /// interval at the new rate. The trail contents are discarded.
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<()> {
        if sample_rate == 0 {
            return Err(Error::invalid_config("sample_rate must be > 0"));
        }
        self.sample_rate = sample_rate;
        self.carry_ns = 0;
        self.trail
            .lock()
            .unwrap()
            .reset(trail_capacity(sample_rate));
        Ok(())
    }

    pub fn points_per_second(&self) -> u32 {
        self.points_per_second
    }

    pub fn set_points_per_second(&mut self, points_per_second: u32) -> Result<()> {
        if points_per_second == 0 {
            return Err(Error::invalid_config("points_per_second must be > 0"));
        }
        self.points_per_second = points_per_second;
        Ok(())
    }

    pub fn buffer_size(&self) -> usize {
        self.front.capacity()
    }

    /// Duration of one tick in nanoseconds.
    fn tick_ns(&self) -> u64 {
        1_000_000_000 / u64::from(self.sample_rate)
    }

    /// Swaps in a pending path, if any, and resets the read cursor.
    fn apply_pending_swap(&mut self) {
        let mut guard = self.shared.lock().unwrap();
        if guard.pending {
            mem::swap(&mut self.front, &mut guard.back);
            guard.pending = false;
            self.cursor = 0;
            log::debug!("displaying new path of {} samples", self.front.len());
        }
    }

    /// Advances by however much wall-clock time has passed since the last
    /// call, in whole ticks, carrying the sub-tick remainder forward.
    /// Returns the number of ticks stepped; the first call establishes the
    /// reference instant and steps zero ticks.
    pub fn update(&mut self) -> Result<u64> {
        self.apply_pending_swap();
        let now = Instant::now();
        let elapsed = match self.last_update.replace(now) {
            Some(prev) => now.duration_since(prev).as_nanos() as u64,
            None => 0,
        };
        let tick_ns = self.tick_ns();
        let total = elapsed + self.carry_ns;
        let ticks = total / tick_ns;
        self.carry_ns = total % tick_ns;
        self.advance(ticks)?;
        Ok(ticks)
    }

    /// Steps exactly `ticks` ticks of fixed duration, picking up any
    /// pending path submission first.
    ///
    /// The cursor wraps around the front buffer, so a path repeats until
    /// superseded. With no path loaded the beam is driven toward a blanked
    /// demand at its own position. A beam state that leaves the legal
    /// range is blanked and reported as an internal error.
    pub fn advance(&mut self, ticks: u64) -> Result<()> {
        self.apply_pending_swap();
        if ticks == 0 {
            return Ok(());
        }
        let tick_ns = self.tick_ns();
        let mut batch = Vec::with_capacity(ticks as usize);
        for _ in 0..ticks {
            let demand = if self.front.is_empty() {
                Point::blanked(self.beam.x, self.beam.y)
            } else {
                let p = self.front.sample(self.cursor);
                self.cursor = (self.cursor + 1) % self.front.len();
                p
            };
            self.physics.time_step(demand, &mut self.beam, tick_ns);
            if let Err(err) = self.beam.validate() {
                // Fall back to a dark, parked beam instead of rendering the
                // corrupt sample; the next tick starts from a legal state.
                self.beam.blank();
                self.beam.x = self.beam.x.clamp(POSITION_MIN, POSITION_MAX);
                self.beam.y = self.beam.y.clamp(POSITION_MIN, POSITION_MAX);
                self.beam.vx = 0.0;
                self.beam.vy = 0.0;
                self.trail.lock().unwrap().extend(&batch);
                return Err(err);
            }
            batch.push(self.beam);
        }
        self.running = true;
        self.trail.lock().unwrap().extend(&batch);
        Ok(())
    }

    /// Copied snapshot of the trail, oldest to newest.
    pub fn trail(&self) -> Vec<BeamState> {
        self.trail.lock().unwrap().snapshot()
    }
}
