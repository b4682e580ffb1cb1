use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::error;
use tracing_subscriber::EnvFilter;

use tvc_attitude::sim::{ControlLoop, TimeClock, TimeSource};
use tvc_attitude::vehicle::{presets, Scenario};
use tvc_attitude::TvcResult;

/// Run the TVC attitude loop in real time and print its state.
#[derive(Parser, Debug)]
#[command(name = "tvc-attitude", version, about)]
struct Args {
    /// Scenario preset.
    #[arg(long, value_enum, default_value_t = Preset::Console)]
    preset: Preset,

    /// Run duration in seconds.
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// Display refresh period in milliseconds.
    #[arg(long, default_value_t = 500)]
    display_ms: u64,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Preset {
    Console,
    Visualization,
}

impl Preset {
    fn scenario(self) -> Scenario {
        match self {
            Preset::Console => presets::console(),
            Preset::Visualization => presets::visualization(),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> TvcResult<()> {
    let scenario = args.preset.scenario();
    let duration = Duration::try_from_secs_f64(args.duration).unwrap_or(Duration::ZERO);

    let clock = Arc::new(TimeClock::new());
    let control = ControlLoop::from_scenario(&scenario, clock.clone())?;
    let mount = control.mount();
    let body = control.body();

    println!();
    println!("====================================================================");
    println!("  TVC ATTITUDE LOOP — {}", scenario.name);
    println!("====================================================================");
    println!(
        "  kp={:+.3}  ki={:+.3}  kd={:+.3}   setpoint={:+.1} deg   period={} ms",
        scenario.pid.kp,
        scenario.pid.ki,
        scenario.pid.kd,
        scenario.control.setpoint,
        scenario.control.period.as_millis(),
    );
    println!(
        "  mass={:.2} kg  height={:.2} m  thrust={:.1} N   start={:+.1} deg @ {:+.1} deg/s",
        scenario.vehicle.mass,
        scenario.vehicle.height,
        scenario.vehicle.thrust,
        scenario.vehicle.initial_angle,
        scenario.vehicle.initial_rate,
    );
    println!("  ──────────────────────────────────────────────────────────────────");
    println!("  {:>8}  {:>14}  {:>14}", "t (s)", "rocket (deg)", "mount (deg)");

    clock.start()?;
    let handle = control.spawn();

    let display = Duration::from_millis(args.display_ms.max(1));
    while clock.time() < duration && !handle.is_finished() {
        println!(
            "  {:>8.2}  {:>14.3}  {:>14.1}",
            clock.time().as_secs_f64(),
            body.angle(),
            mount.angle(),
        );
        thread::sleep(display);
    }

    let iterations = handle.stop()?;
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Loop iterations: {}   Mount entries: {}   Final angle: {:+.3} deg",
        iterations,
        mount.len(),
        body.angle(),
    );
    println!("====================================================================");
    println!();
    Ok(())
}
