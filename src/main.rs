use anyhow::{Context, Result};
use clap::Parser;

use rs_pkm_motion::demo::DemoRegistry;
use rs_pkm_motion::hardware::SimulatedDriver;
use rs_pkm_motion::kinematic_traits::MoveKind;
use rs_pkm_motion::motion_error::MotionError;
use rs_pkm_motion::robot::{Robot, RobotVariant};
use rs_pkm_motion::utils::dump_pose;

/// Drives one demonstration trajectory on a simulated robot and prints the
/// poses it passes through. Useful for eyeballing the kinematics without
/// hardware attached.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Robot geometry: delta, quattro or 6rus
    #[arg(default_value = "quattro")]
    robot: String,

    /// Demo program to run (default: random pick)
    #[arg(short, long)]
    program: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::DEBUG).init();

    let args = Args::parse();
    let variant: RobotVariant = args.robot.parse()?;

    let driver = SimulatedDriver::new(match variant {
        RobotVariant::Delta => 3,
        RobotVariant::Quattro => 4,
        RobotVariant::SixRus => 6,
    });
    let mut robot = Robot::build(variant, Box::new(driver));

    robot.home("90").context("homing the reference pose")?;
    println!("Homed at:");
    dump_pose(robot.home_pose());

    let registry = DemoRegistry::standard();
    let (name, waypoints) = match &args.program {
        Some(name) => (
            name.as_str(),
            registry
                .generate(robot.dof(), name)
                .with_context(|| format!("no demo program named '{}'", name))?,
        ),
        None => registry
            .choose(robot.dof())
            .context("no demo programs for this geometry")?,
    };

    println!("Running '{}' ({} waypoints):", name, waypoints.len());
    for (pose, kind) in &waypoints {
        let result = match kind {
            MoveKind::Ptp => robot.mov(pose),
            MoveKind::Linear => robot.mov_lin(pose, 10.0, 3.0, None),
        };
        match result {
            Ok(()) => dump_pose(robot.current_pose()),
            Err(MotionError::WorkspaceViolation) => {
                println!("  (waypoint outside the workspace, skipped)")
            }
            Err(other) => return Err(other.into()),
        }
    }

    println!("Final step counts: {:?}", robot.current_steps());
    Ok(())
}
