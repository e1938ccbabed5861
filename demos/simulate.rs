//! Offline simulation demo: plan a scene, stream it through the simulator,
//! print trail statistics.
//!
//! Run with: `cargo run --example simulate -- --physics linear --millis 200`

use clap::{Parser, ValueEnum};
use laser_path::{
    ConstAccelBeamPhysics, LinearBeamPhysics, PathPlanner, PlannerConfig, Point, Polyline,
    PropAccelBeamPhysics, Result, Scene, Simulator, SimulatorConfig, TeleportBeamPhysics,
};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Physics {
    Linear,
    ConstAccel,
    PropAccel,
    Teleport,
}

#[derive(Parser, Debug)]
#[command(about = "Simulate a planned laser path and report the POV trail")]
struct Args {
    /// Beam physics model
    #[arg(long, value_enum, default_value_t = Physics::Linear)]
    physics: Physics,

    /// Simulator ticks per second
    #[arg(long, default_value_t = 30_000)]
    sample_rate: u32,

    /// Wall-clock simulation time in milliseconds
    #[arg(long, default_value_t = 200)]
    millis: u64,
}

/// Triangle with per-edge colours plus two isolated points, the same scene
/// shape the integration tests use.
fn demo_scene() -> Scene {
    let mut scene = Scene::new();
    scene
        .add_line(Polyline::segment(
            Point::new(-0.5, -0.5, 1.0, 0.0, 0.0),
            Point::new(0.5, -0.5, 1.0, 0.0, 0.0),
        ))
        .add_line(Polyline::segment(
            Point::new(0.5, -0.5, 0.0, 1.0, 0.0),
            Point::new(0.0, 0.5, 0.0, 1.0, 0.0),
        ))
        .add_line(Polyline::segment(
            Point::new(0.0, 0.5, 0.0, 0.0, 1.0),
            Point::new(-0.5, -0.5, 0.0, 0.0, 1.0),
        ))
        .add_point(Point::new(0.8, 0.8, 1.0, 1.0, 1.0))
        .add_point(Point::new(-0.8, 0.8, 1.0, 1.0, 1.0));
    scene
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let scene = demo_scene();
    let planner = PathPlanner::new(PlannerConfig::default())?;
    let path = planner.plan(&scene)?;
    println!(
        "Planned {} lines + {} points into {} samples",
        scene.lines().len(),
        scene.isolated_points().len(),
        path.len()
    );

    let physics: Box<dyn laser_path::BeamPhysics> = match args.physics {
        Physics::Linear => Box::new(LinearBeamPhysics::new(4.0, 20.0)?),
        Physics::ConstAccel => Box::new(ConstAccelBeamPhysics::new(2.0, 0.01, 20.0)?),
        Physics::PropAccel => Box::new(PropAccelBeamPhysics::new(16.0, 0.01, 20.0)?),
        Physics::Teleport => Box::new(TeleportBeamPhysics::new()),
    };

    let mut sim = Simulator::new(
        physics,
        SimulatorConfig {
            sample_rate: args.sample_rate,
            points_per_second: args.sample_rate,
            buffer_size: path.len().max(4096),
        },
    )?;

    sim.make_path(&path)?;
    println!(
        "Simulating {:?} at {} Hz for {} ms...",
        args.physics, args.sample_rate, args.millis
    );

    let mut total_ticks = 0u64;
    let frames = args.millis / 10;
    for _ in 0..frames.max(1) {
        total_ticks += sim.update()?;
        thread::sleep(Duration::from_millis(10));
    }
    total_ticks += sim.update()?;

    let trail = sim.trail();
    let lit = trail
        .iter()
        .filter(|s| s.r > 0.0 || s.g > 0.0 || s.b > 0.0)
        .count();
    let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
    for state in &trail {
        min_x = min_x.min(state.x);
        max_x = max_x.max(state.x);
        min_y = min_y.min(state.y);
        max_y = max_y.max(state.y);
    }

    println!("Ticks stepped:  {}", total_ticks);
    println!("Trail entries:  {} ({} lit)", trail.len(), lit);
    if !trail.is_empty() {
        println!("Trail bounds:   x [{:.3}, {:.3}]  y [{:.3}, {:.3}]", min_x, max_x, min_y, max_y);
    }

    Ok(())
}
