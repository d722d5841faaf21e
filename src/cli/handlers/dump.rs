use anyhow::Result;
use clap::Parser;
use colored::Colorize;

use crate::{
    cli::{args::ConfigArgs, handlers::commons},
    core::profiler::DumpOutcome,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Renders a value to stdout, but only for debug requests (--debug)."
)]
struct DumpArgs {
    /// The value to dump. Valid JSON is dumped structured, anything else as text.
    value: String,

    #[command(flatten)]
    config: ConfigArgs,
}

pub fn handle(args: Vec<String>) -> Result<()> {
    let dump_args = DumpArgs::try_parse_from(&args)?;
    let mut profiler = commons::build_profiler(&dump_args.config)?;

    let value = commons::parse_value(&dump_args.value);
    if profiler.dump(&value)? == DumpOutcome::Suppressed {
        eprintln!(
            "{}",
            "Not a debug request: nothing rendered. Pass --debug <value> to enable dumps.".dimmed()
        );
    }
    Ok(())
}
