use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use std::{thread, time::Duration};

use crate::{
    cli::{args::ConfigArgs, handlers::commons},
    core::profiler::{Profiler, ProfilerError},
    models::{DebugMode, Stage},
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Walks one simulated request through every lifecycle stage."
)]
struct SimulateArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Treat the request as coming from an administrator.
    #[arg(long)]
    admin: bool,

    /// Milliseconds of simulated work between stages.
    #[arg(long, default_value_t = 5)]
    delay_ms: u64,

    /// Kilobytes allocated per stage, to make memory readings move.
    #[arg(long, default_value_t = 256)]
    alloc_kb: usize,
}

pub fn handle(args: Vec<String>) -> Result<()> {
    let simulate_args = SimulateArgs::try_parse_from(&args)?;
    let mut profiler = commons::build_profiler(&simulate_args.config)?;

    if !profiler.tracks_lifecycle() {
        println!(
            "{}",
            "Log mode is 'none': lifecycle stages are not tracked for this request.".yellow()
        );
    }

    // Held until the end of the request so the memory readings keep growing.
    let mut ballast: Vec<Vec<u8>> = Vec::new();

    for stage in Stage::ALL {
        if stage.is_admin() && !simulate_args.admin {
            continue;
        }

        thread::sleep(Duration::from_millis(simulate_args.delay_ms));
        ballast.push(vec![1u8; simulate_args.alloc_kb * 1024]);

        if stage == Stage::Init {
            render_system_report_if_requested(&mut profiler, simulate_args.admin)?;
        }

        if profiler.tracks_lifecycle() {
            // A failed flush must not abort the request being instrumented.
            if let Err(e) = profiler.record_lifecycle_event(stage) {
                eprintln!("{}: {}", "Warning".yellow().bold(), e);
            }
        }
    }

    log::debug!("Simulated request held {} allocations.", ballast.len());
    commons::print_event_table(profiler.events());
    println!("{}", commons::summary_line(&profiler).dimmed());
    if profiler.config().log_mode == crate::models::LogMode::File {
        println!(
            "Event log appended to '{}'.",
            profiler.config().log_path.display().to_string().green()
        );
    }
    Ok(())
}

/// The system report runs at `init`, and only for administrators. A
/// non-administrator asking for it terminates the request.
fn render_system_report_if_requested(profiler: &mut Profiler, admin: bool) -> Result<()> {
    let debug = profiler.debug_request();
    if !debug.active || debug.mode != DebugMode::SystemInfo {
        return Ok(());
    }
    let is_admin = move || admin;
    match profiler.system_report(&is_admin) {
        Ok(_) => Ok(()),
        Err(ProfilerError::Forbidden) => Err(anyhow::anyhow!("forbidden")),
        Err(e) => Err(e.into()),
    }
}
