use anyhow::Result;
use clap::Parser;

use crate::cli::{args::ConfigArgs, handlers::commons};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Appends a value to the log file as one timestamped entry."
)]
struct LogArgs {
    /// The value to log. Valid JSON is logged structured, anything else as text.
    value: Option<String>,

    #[command(flatten)]
    config: ConfigArgs,
}

pub fn handle(args: Vec<String>) -> Result<()> {
    let log_args = LogArgs::try_parse_from(&args)?;
    let profiler = commons::build_profiler(&log_args.config)?;

    // A missing value is logged as `null`, like any other absent value.
    let value = log_args
        .value
        .as_deref()
        .map(commons::parse_value)
        .unwrap_or(serde_json::Value::Null);

    profiler.log(&value)?;
    log::debug!("Logged to '{}'", profiler.config().log_path.display());
    Ok(())
}
