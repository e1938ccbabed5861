//! Path planning and beam simulation for galvanometer laser displays.
//!
//! This crate turns a scene of disjoint lines and isolated points into one
//! continuous closed beam path, interpolates it into per-sample demand
//! signals, and simulates how a physical beam with latency would trace it,
//! accumulating the persistence-of-vision trail a viewer would perceive.
//!
//! # Pipeline
//!
//! - **Planning** - [`PathPlanner`] greedily sequences a [`Scene`] into a
//!   single visiting order and interpolates it into a [`PlannedPath`]
//! - **Physics** - a [`BeamPhysics`] model ([`LinearBeamPhysics`],
//!   [`ConstAccelBeamPhysics`], [`PropAccelBeamPhysics`], or the test-only
//!   [`TeleportBeamPhysics`]) advances a [`BeamState`] toward each demand
//! - **Simulation** - [`Simulator`] double-buffers submitted paths, steps
//!   the beam at a fixed sample rate, and keeps the trail ring
//!
//! # Coordinate System
//!
//! All positions use normalized coordinates:
//! - X: -1.0 (left) to 1.0 (right)
//! - Y: -1.0 (bottom) to 1.0 (top)
//! - Colors: 0.0 to 1.0 for R, G, B; all channels zero means blanked
//!
//! # Features
//!
//! - `serde`: serialization derives on scene, point and config types

pub mod buffer;
mod error;
pub mod pather;
pub mod physics;
pub mod planner;
pub mod simulator;
pub mod types;

// Error types
pub use error::{Error, Result};

// Scene and planner types
pub use planner::{quintic_ease, PathPlanner, PlannedPath, Visit};
pub use types::{Bounds, Interpolation, PlannerConfig, Point, Polyline, Rgb, Scene};

// Sample sequences
pub use buffer::SignalBuffer;
pub use pather::{PathSamples, Pather, SimplePather};

// Physics models
pub use physics::{
    BeamPhysics, BeamState, ConstAccelBeamPhysics, LinearBeamPhysics, PropAccelBeamPhysics,
    TeleportBeamPhysics,
};

// Simulation
pub use simulator::{
    PathSubmitter, Simulator, SimulatorConfig, SimulatorState, TrailReader, FPS_POV,
};
