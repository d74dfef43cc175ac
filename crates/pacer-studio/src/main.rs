use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use pacer_engine::host::HostLoop;
use pacer_engine::logging::{LoggingConfig, init_logging};
use pacer_engine::schedule::{ComponentStack, FrameScheduler, SchedulerConfig};
use pacer_engine::window::{WindowConfig, WindowHost};

mod bouncer;
mod watch;

use bouncer::Bouncer;
use watch::SlowWatch;

/// Drives a bouncing particle through the frame scheduler.
#[derive(Debug, Parser)]
#[command(name = "pacer-studio", version)]
struct Args {
    /// Run without a window until `--seconds` of simulation time have passed.
    #[arg(long)]
    headless: bool,

    #[arg(long, default_value_t = 5.0)]
    seconds: f64,

    /// Fixed update rate.
    #[arg(long, default_value_t = 60)]
    hz: u32,

    /// Step once per pass with the measured elapsed time.
    #[arg(long)]
    variable: bool,

    /// Stall every N updates to provoke catch-up bursts. 0 disables.
    #[arg(long, default_value_t = 0)]
    stall_every: u64,

    #[arg(long, default_value_t = 40)]
    stall_ms: u64,

    /// Log filter, e.g. "debug" or "pacer_engine=trace".
    #[arg(long)]
    log: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut logging = LoggingConfig::default();
    if let Some(filter) = &args.log {
        logging = logging.with_filter(filter.clone());
    }
    init_logging(logging);

    let config = SchedulerConfig::from_hz(args.hz)
        .context("invalid --hz")?
        .with_fixed_time_step(!args.variable);
    let scheduler = FrameScheduler::system(config).context("failed to build frame scheduler")?;
    let app = ComponentStack::new(Bouncer::new(
        args.stall_every,
        Duration::from_millis(args.stall_ms),
    ))
    .with(SlowWatch::default());

    if args.headless {
        return run_headless(scheduler, app, args.seconds);
    }

    let window = WindowConfig::default()
        .with_title("pacer studio")
        .with_size(640.0, 360.0);
    WindowHost::run(window, scheduler, app)
}

fn run_headless(
    scheduler: FrameScheduler,
    mut app: ComponentStack<Bouncer>,
    seconds: f64,
) -> Result<()> {
    let limit = Duration::try_from_secs_f64(seconds).context("invalid --seconds")?;
    let mut host = HostLoop::new(scheduler)
        .with_simulation_limit(limit)
        .with_stats_interval(100_000);

    let summary = host.run(&mut app)?;

    println!();
    println!("  passes     {}", summary.passes);
    println!("  steps      {}", summary.steps);
    println!("  frames     {}", summary.frames);
    println!("  simulated  {:.3}s", summary.simulation_time.as_secs_f64());
    println!("  {}", host.scheduler().stats());
    println!();
    Ok(())
}
