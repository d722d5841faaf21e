use clap::Parser;

pub mod args;
pub mod handlers;

/// reqprobe: drives a request-lifecycle profiler the way a host would.
///
/// Usage:
///   reqprobe <command> [args...]
///
/// Commands:
///   simulate   Walk one request through every lifecycle stage.
///   log        Append a value to the log file.
///   dump       Render a value, if the request is a debug request.
///   report     Render the full system report (requires --admin).
///   humanize   Print byte counts in human-readable units.
///   stages     List the lifecycle stages in call order.
///
/// Run `reqprobe <command> --help` for the options of each command.
#[derive(Parser, Debug)]
#[command(author, version, about, verbatim_doc_comment)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// The command to run.
    pub command: Option<String>,

    /// All remaining arguments, passed to the command as-is.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
