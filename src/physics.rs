//! Beam physics models.
//!
//! A physics model advances a mutable [`BeamState`] toward a demand sample
//! over an elapsed time slice. The models differ in how much galvo and
//! colour-channel latency they assume: [`LinearBeamPhysics`] is rate-limited
//! with no inertia, [`ConstAccelBeamPhysics`] and [`PropAccelBeamPhysics`]
//! integrate velocity, and [`TeleportBeamPhysics`] is the zero-latency model
//! used for deterministic tests.
//!
//! All models keep position within [-1, 1] and colour within [0, 1]; the
//! simulator treats an excursion as an internal error and blanks the beam.

use crate::error::{Error, Result};
use crate::types::{Point, Rgb};

/// Legal position range, both axes.
pub const POSITION_MIN: f32 = -1.0;
/// Legal position range, both axes.
pub const POSITION_MAX: f32 = 1.0;

/// Mutable beam state: position, velocity and colour.
///
/// Exclusively owned by the simulator between ticks; each physics call gets
/// it by exclusive reference and mutates it in place.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BeamState {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl BeamState {
    /// A dark beam at rest at the given position.
    pub fn at_rest(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Default::default()
        }
    }

    /// The beam's current colour.
    pub fn rgb(&self) -> Rgb {
        Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }

    /// Forces the colour channels to black (used as the failure fallback).
    pub fn blank(&mut self) {
        self.r = 0.0;
        self.g = 0.0;
        self.b = 0.0;
    }

    /// Checks the range invariants.
    ///
    /// A violation means a physics model is buggy; it is an internal error,
    /// never a user-facing condition.
    pub fn validate(&self) -> Result<()> {
        let pos_ok = (POSITION_MIN..=POSITION_MAX).contains(&self.x)
            && (POSITION_MIN..=POSITION_MAX).contains(&self.y);
        let colour_ok = (0.0..=1.0).contains(&self.r)
            && (0.0..=1.0).contains(&self.g)
            && (0.0..=1.0).contains(&self.b);
        if !pos_ok || !colour_ok {
            return Err(Error::internal(format!(
                "beam state out of range: pos=({}, {}) rgb=({}, {}, {})",
                self.x, self.y, self.r, self.g, self.b
            )));
        }
        Ok(())
    }
}

/// Strategy contract for advancing a beam toward a demand sample.
///
/// Selected at simulator construction and injected as a trait object; there
/// is no global physics state.
pub trait BeamPhysics: Send {
    /// Advances `state` toward `demand` over `elapsed_ns` nanoseconds.
    fn time_step(&self, demand: Point, state: &mut BeamState, elapsed_ns: u64);

    /// Estimated nanoseconds for the colour channels to move from `from`
    /// to `to`. Used for scheduling estimates only.
    fn nanos_to(&self, from: Rgb, to: Rgb) -> u64;

    /// Estimated nanoseconds to fade `from` to black.
    fn nanos_to_black(&self, from: Rgb) -> u64 {
        self.nanos_to(from, Rgb::BLACK)
    }

    /// Estimated nanoseconds to drive `from` to full white.
    fn nanos_to_white(&self, from: Rgb) -> u64 {
        self.nanos_to(from, Rgb::WHITE)
    }
}

/// Moves `current` toward `target` by at most `max_delta`, never past it.
fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        target
    } else if delta > 0.0 {
        current + max_delta
    } else {
        current - max_delta
    }
}

/// Sign with a true zero case (`f32::signum(0.0)` is 1.0, which would
/// accelerate a settled beam).
fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

fn colour_step(state: &mut BeamState, demand: &Point, max_delta: f32) {
    state.r = approach(state.r, demand.r, max_delta);
    state.g = approach(state.g, demand.g, max_delta);
    state.b = approach(state.b, demand.b, max_delta);
}

fn colour_nanos(from: Rgb, to: Rgb, rate: f32) -> u64 {
    (from.max_channel_delta(&to) / rate * 1e9) as u64
}

fn require_positive(value: f32, name: &str) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::invalid_config(format!(
            "{} must be finite and > 0, got {}",
            name, value
        )));
    }
    Ok(())
}

// =============================================================================
// Linear
// =============================================================================

/// Rate-limited beam with no inertia.
///
/// Position and each colour channel move directly toward the demand at
/// independent fixed rates, clamped so they never overshoot within a
/// timestep. Each position axis gets the full rate; diagonal moves are not
/// normalized.
#[derive(Debug, Clone)]
pub struct LinearBeamPhysics {
    xy_rate: f32,
    colour_rate: f32,
}

impl LinearBeamPhysics {
    /// Creates the model; `xy_rate` and `colour_rate` in units per second.
    pub fn new(xy_rate: f32, colour_rate: f32) -> Result<Self> {
        require_positive(xy_rate, "xy_rate")?;
        require_positive(colour_rate, "colour_rate")?;
        Ok(Self {
            xy_rate,
            colour_rate,
        })
    }
}

impl BeamPhysics for LinearBeamPhysics {
    fn time_step(&self, demand: Point, state: &mut BeamState, elapsed_ns: u64) {
        let dt = elapsed_ns as f32 / 1e9;
        let max_move = self.xy_rate * dt;
        state.x = approach(state.x, demand.x, max_move);
        state.y = approach(state.y, demand.y, max_move);
        colour_step(state, &demand, self.colour_rate * dt);
    }

    fn nanos_to(&self, from: Rgb, to: Rgb) -> u64 {
        colour_nanos(from, to, self.colour_rate)
    }
}

// =============================================================================
// ConstAccel
// =============================================================================

/// Constant-magnitude acceleration toward the demand.
///
/// Velocity integrates over seconds and is clamped to `max_speed`; position
/// advances by velocity per millisecond, and is slam-clamped to the legal
/// range with velocity zeroed on impact. The acceleration magnitude ignores
/// the remaining distance, so the beam overshoots and rings around the
/// target; downstream tuning and the compatibility tests depend on these
/// exact numerics, so neither the scaling nor the ringing may be corrected
/// here.
#[derive(Debug, Clone)]
pub struct ConstAccelBeamPhysics {
    accel: f32,
    max_speed: f32,
    colour_rate: f32,
}

impl ConstAccelBeamPhysics {
    /// Creates the model; `accel` in units/s^2, `max_speed` and
    /// `colour_rate` in units/s.
    pub fn new(accel: f32, max_speed: f32, colour_rate: f32) -> Result<Self> {
        require_positive(accel, "accel")?;
        require_positive(max_speed, "max_speed")?;
        require_positive(colour_rate, "colour_rate")?;
        Ok(Self {
            accel,
            max_speed,
            colour_rate,
        })
    }
}

/// Shared velocity/position integration for the accelerating models.
fn integrate(state: &mut BeamState, ax: f32, ay: f32, max_speed: f32, elapsed_ns: u64) {
    let dt_s = elapsed_ns as f32 / 1e9;
    let dt_ms = elapsed_ns as f32 / 1e6;

    state.vx = (state.vx + ax * dt_s).clamp(-max_speed, max_speed);
    state.vy = (state.vy + ay * dt_s).clamp(-max_speed, max_speed);

    state.x += state.vx * dt_ms;
    state.y += state.vy * dt_ms;

    // Slam clamp: hitting the edge of the range kills the velocity.
    if state.x > POSITION_MAX {
        state.x = POSITION_MAX;
        state.vx = 0.0;
    } else if state.x < POSITION_MIN {
        state.x = POSITION_MIN;
        state.vx = 0.0;
    }
    if state.y > POSITION_MAX {
        state.y = POSITION_MAX;
        state.vy = 0.0;
    } else if state.y < POSITION_MIN {
        state.y = POSITION_MIN;
        state.vy = 0.0;
    }
}

impl BeamPhysics for ConstAccelBeamPhysics {
    fn time_step(&self, demand: Point, state: &mut BeamState, elapsed_ns: u64) {
        let ax = self.accel * sign(demand.x - state.x);
        let ay = self.accel * sign(demand.y - state.y);
        integrate(state, ax, ay, self.max_speed, elapsed_ns);

        let dt_s = elapsed_ns as f32 / 1e9;
        colour_step(state, &demand, self.colour_rate * dt_s);
    }

    fn nanos_to(&self, from: Rgb, to: Rgb) -> u64 {
        colour_nanos(from, to, self.colour_rate)
    }
}

// =============================================================================
// PropAccel
// =============================================================================

/// Acceleration proportional to the cube of the normalized positional
/// error.
///
/// The cubic response keeps the sign of the error while scaling the
/// acceleration down sharply as the beam closes in, giving a softer,
/// distance-aware approach than [`ConstAccelBeamPhysics`]. Integration and
/// clamping are otherwise identical.
#[derive(Debug, Clone)]
pub struct PropAccelBeamPhysics {
    accel: f32,
    max_speed: f32,
    colour_rate: f32,
}

impl PropAccelBeamPhysics {
    /// Creates the model; `accel` in units/s^2, `max_speed` and
    /// `colour_rate` in units/s.
    pub fn new(accel: f32, max_speed: f32, colour_rate: f32) -> Result<Self> {
        require_positive(accel, "accel")?;
        require_positive(max_speed, "max_speed")?;
        require_positive(colour_rate, "colour_rate")?;
        Ok(Self {
            accel,
            max_speed,
            colour_rate,
        })
    }

    /// Error normalized by the full 2-unit range, cubed.
    fn response(&self, error: f32) -> f32 {
        let norm = error / (POSITION_MAX - POSITION_MIN);
        self.accel * norm * norm * norm
    }
}

impl BeamPhysics for PropAccelBeamPhysics {
    fn time_step(&self, demand: Point, state: &mut BeamState, elapsed_ns: u64) {
        let ax = self.response(demand.x - state.x);
        let ay = self.response(demand.y - state.y);
        integrate(state, ax, ay, self.max_speed, elapsed_ns);

        let dt_s = elapsed_ns as f32 / 1e9;
        colour_step(state, &demand, self.colour_rate * dt_s);
    }

    fn nanos_to(&self, from: Rgb, to: Rgb) -> u64 {
        colour_nanos(from, to, self.colour_rate)
    }
}

// =============================================================================
// Teleport
// =============================================================================

/// Zero-latency beam: position and colour land exactly on the demand every
/// call. Deterministic reference model for tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeleportBeamPhysics;

impl TeleportBeamPhysics {
    pub fn new() -> Self {
        Self
    }
}

impl BeamPhysics for TeleportBeamPhysics {
    fn time_step(&self, demand: Point, state: &mut BeamState, _elapsed_ns: u64) {
        state.x = demand.x;
        state.y = demand.y;
        state.vx = 0.0;
        state.vy = 0.0;
        state.r = demand.r;
        state.g = demand.g;
        state.b = demand.b;
    }

    fn nanos_to(&self, _from: Rgb, _to: Rgb) -> u64 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: u64 = 1_000_000;
    const SECOND: u64 = 1_000_000_000;

    #[test]
    fn test_constructors_reject_non_positive_rates() {
        assert!(LinearBeamPhysics::new(0.0, 1.0).is_err());
        assert!(LinearBeamPhysics::new(1.0, -1.0).is_err());
        assert!(LinearBeamPhysics::new(f32::NAN, 1.0).is_err());
        assert!(ConstAccelBeamPhysics::new(1.0, 0.0, 0.5).is_err());
        assert!(PropAccelBeamPhysics::new(-1.0, 2.0, 0.5).is_err());
        assert!(LinearBeamPhysics::new(2.0, 0.5).is_ok());
    }

    #[test]
    fn test_linear_reaches_demand_exactly_and_colour_is_rate_limited() {
        // xy_rate permits the full move in one second; colour_rate only
        // permits half of the needed range change, so colour lands at 0.5.
        let physics = LinearBeamPhysics::new(2.0, 0.5).unwrap();
        let mut state = BeamState::at_rest(0.0, 1.0);
        let demand = Point::new(-1.0, -1.0, 1.0, 1.0, 1.0);

        physics.time_step(demand, &mut state, SECOND);

        assert_eq!(state.x, -1.0);
        assert_eq!(state.y, -1.0);
        assert_eq!(state.r, 0.5);
        assert_eq!(state.g, 0.5);
        assert_eq!(state.b, 0.5);
    }

    #[test]
    fn test_linear_never_overshoots_on_long_step() {
        let physics = LinearBeamPhysics::new(10.0, 10.0).unwrap();
        let mut state = BeamState::at_rest(0.0, 0.0);
        let demand = Point::new(0.25, -0.25, 0.5, 0.5, 0.5);

        physics.time_step(demand, &mut state, SECOND);

        assert_eq!(state.x, 0.25);
        assert_eq!(state.y, -0.25);
        assert_eq!(state.r, 0.5);
        state.validate().unwrap();
    }

    #[test]
    fn test_const_accel_pinned_numerics() {
        let physics = ConstAccelBeamPhysics::new(1.0, 2.0, 0.5).unwrap();
        let mut state = BeamState::at_rest(0.0, 1.0);
        let demand = Point::new(1.0, 0.0, 1.0, 1.0, 1.0);

        physics.time_step(demand, &mut state, MS);
        assert!((state.vx - 0.001).abs() < 1e-4, "vx={}", state.vx);
        assert!((state.vy + 0.001).abs() < 1e-4, "vy={}", state.vy);
        assert!((state.x - 0.001).abs() < 1e-4, "x={}", state.x);
        assert!((state.y - 0.999).abs() < 1e-4, "y={}", state.y);

        physics.time_step(demand, &mut state, MS);
        assert!((state.vx - 0.002).abs() < 1e-4, "vx={}", state.vx);
        assert!((state.vy + 0.002).abs() < 1e-4, "vy={}", state.vy);
        assert!((state.x - 0.003).abs() < 1e-4, "x={}", state.x);
        assert!((state.y - 0.997).abs() < 1e-4, "y={}", state.y);
    }

    #[test]
    fn test_const_accel_rings_around_a_nearby_target() {
        // The acceleration ignores distance-to-target, so a settled
        // approach is impossible: the beam must cross the target and come
        // back at least once. This pins the documented behavior.
        let physics = ConstAccelBeamPhysics::new(1.0, 2.0, 0.5).unwrap();
        let mut state = BeamState::at_rest(0.0, 0.0);
        let demand = Point::new(0.1, 0.0, 0.0, 0.0, 0.0);

        let mut crossings = 0;
        let mut prev_side = sign(demand.x - state.x);
        for _ in 0..200 {
            physics.time_step(demand, &mut state, MS);
            let side = sign(demand.x - state.x);
            if side != 0.0 && prev_side != 0.0 && side != prev_side {
                crossings += 1;
            }
            if side != 0.0 {
                prev_side = side;
            }
        }
        assert!(crossings >= 2, "expected ringing, got {} crossings", crossings);
    }

    #[test]
    fn test_const_accel_slam_clamp_zeroes_velocity() {
        let physics = ConstAccelBeamPhysics::new(1.0, 2.0, 0.5).unwrap();
        let mut state = BeamState::at_rest(0.9, 0.0);
        state.vx = 2.0;
        let demand = Point::new(1.0, 0.0, 0.0, 0.0, 0.0);

        physics.time_step(demand, &mut state, MS);

        assert_eq!(state.x, POSITION_MAX);
        assert_eq!(state.vx, 0.0);
        state.validate().unwrap();
    }

    #[test]
    fn test_const_accel_velocity_clamped_to_max_speed() {
        let physics = ConstAccelBeamPhysics::new(1000.0, 0.5, 0.5).unwrap();
        let mut state = BeamState::at_rest(-1.0, 0.0);
        let demand = Point::new(1.0, 0.0, 0.0, 0.0, 0.0);

        physics.time_step(demand, &mut state, 10 * MS);
        assert!(state.vx <= 0.5, "vx={} exceeds max speed", state.vx);
    }

    #[test]
    fn test_prop_accel_is_softer_than_const_accel_near_target() {
        let const_accel = ConstAccelBeamPhysics::new(1.0, 2.0, 0.5).unwrap();
        let prop_accel = PropAccelBeamPhysics::new(1.0, 2.0, 0.5).unwrap();
        let demand = Point::new(0.5, 0.0, 0.0, 0.0, 0.0);

        let mut hard = BeamState::at_rest(0.0, 0.0);
        let mut soft = BeamState::at_rest(0.0, 0.0);
        const_accel.time_step(demand, &mut hard, MS);
        prop_accel.time_step(demand, &mut soft, MS);

        assert!(soft.vx > 0.0);
        assert!(soft.vx < hard.vx, "soft={} hard={}", soft.vx, hard.vx);
    }

    #[test]
    fn test_prop_accel_response_keeps_error_sign() {
        let physics = PropAccelBeamPhysics::new(1.0, 2.0, 0.5).unwrap();
        let demand = Point::new(-0.5, 0.0, 0.0, 0.0, 0.0);
        let mut state = BeamState::at_rest(0.0, 0.0);

        physics.time_step(demand, &mut state, MS);
        assert!(state.vx < 0.0);
    }

    #[test]
    fn test_teleport_lands_exactly_on_demand() {
        let physics = TeleportBeamPhysics::new();
        let mut state = BeamState::at_rest(-0.3, 0.7);
        state.vx = 1.5;
        let demand = Point::new(0.25, -0.5, 0.1, 0.2, 0.3);

        physics.time_step(demand, &mut state, 1);

        assert_eq!(state.x, 0.25);
        assert_eq!(state.y, -0.5);
        assert_eq!(state.vx, 0.0);
        assert_eq!(state.vy, 0.0);
        assert_eq!((state.r, state.g, state.b), (0.1, 0.2, 0.3));
        assert_eq!(physics.nanos_to_black(state.rgb()), 0);
    }

    #[test]
    fn test_colour_latency_estimators() {
        let physics = LinearBeamPhysics::new(2.0, 0.5).unwrap();
        // Full black-to-white swing at 0.5/s takes two seconds.
        assert_eq!(physics.nanos_to_white(Rgb::BLACK), 2 * SECOND);
        assert_eq!(physics.nanos_to_black(Rgb::WHITE), 2 * SECOND);
        assert_eq!(physics.nanos_to(Rgb::WHITE, Rgb::WHITE), 0);

        let halfway = Rgb::new(0.5, 0.0, 0.0);
        assert_eq!(physics.nanos_to_black(halfway), SECOND);
    }

    #[test]
    fn test_beam_state_validate_flags_excursions() {
        let mut state = BeamState::at_rest(0.0, 0.0);
        state.validate().unwrap();

        state.x = 1.5;
        assert!(state.validate().unwrap_err().is_internal());

        state.x = 0.0;
        state.g = -0.1;
        assert!(state.validate().unwrap_err().is_internal());
    }
}
