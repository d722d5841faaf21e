// src/bin/reqprobe.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use reqprobe::cli::{Cli, handlers};

// --- Command Definition and Registry ---

/// Defines a command, its aliases, and its handler function.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>) -> Result<()>,
}

/// The single source of truth for all commands.
static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "dump",
        aliases: &[],
        handler: handlers::dump::handle,
    },
    CommandDefinition {
        name: "humanize",
        aliases: &["bytes"],
        handler: handlers::humanize::handle,
    },
    CommandDefinition {
        name: "log",
        aliases: &[],
        handler: handlers::log::handle,
    },
    CommandDefinition {
        name: "report",
        aliases: &["phpinfo", "sysinfo"],
        handler: handlers::report::handle,
    },
    CommandDefinition {
        name: "simulate",
        aliases: &["sim"],
        handler: handlers::simulate::handle,
    },
    CommandDefinition {
        name: "stages",
        aliases: &[],
        handler: handlers::stages::handle,
    },
];

/// Finds a command definition in the registry by its name or alias.
fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

/// The main entry point of the `reqprobe` application.
/// It sets up logging, parses arguments, dispatches to the correct handler,
/// and performs centralized error handling.
fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        // clap errors (including --help) know how to print and exit themselves.
        if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
            clap_err.exit();
        }
        eprintln!("\n{}: {:#}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let Some(command_name) = cli.command else {
        println!("Welcome to reqprobe! Try `reqprobe simulate --log-mode page --debug 1`.");
        return Ok(());
    };

    match find_command(&command_name) {
        Some(command) => (command.handler)(cli.args),
        None => {
            let known: Vec<&str> = COMMAND_REGISTRY.iter().map(|cmd| cmd.name).collect();
            Err(anyhow::anyhow!(
                "Unknown command '{}'. Available commands: {}",
                command_name,
                known.join(", ")
            ))
        }
    }
}
