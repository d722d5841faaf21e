use anyhow::{Result, anyhow};
use clap::Parser;
use colored::Colorize;

use crate::{
    cli::{args::ConfigArgs, handlers::commons},
    core::profiler::{DumpOutcome, ProfilerError},
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Renders the full system report. Requires --admin and --debug."
)]
struct ReportArgs {
    /// Treat the caller as an administrator.
    #[arg(long)]
    admin: bool,

    #[command(flatten)]
    config: ConfigArgs,
}

pub fn handle(args: Vec<String>) -> Result<()> {
    let report_args = ReportArgs::try_parse_from(&args)?;
    let mut profiler = commons::build_profiler(&report_args.config)?;

    let admin = report_args.admin;
    let is_admin = move || admin;
    match profiler.system_report(&is_admin) {
        Ok(DumpOutcome::Rendered) => Ok(()),
        Ok(DumpOutcome::Suppressed) => {
            eprintln!(
                "{}",
                "Not a debug request: nothing rendered. Pass --debug phpinfo.".dimmed()
            );
            Ok(())
        }
        Err(ProfilerError::Forbidden) => Err(anyhow!("forbidden")),
        Err(e) => Err(e.into()),
    }
}
