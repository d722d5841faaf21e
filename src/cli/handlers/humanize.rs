use anyhow::Result;
use clap::Parser;

use crate::core::format;

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Prints byte counts in human-readable units (B, KB, MB, ...)."
)]
struct HumanizeArgs {
    /// Byte counts. Negative values are treated as deltas.
    #[arg(required = true, allow_negative_numbers = true)]
    bytes: Vec<i64>,
}

pub fn handle(args: Vec<String>) -> Result<()> {
    let humanize_args = HumanizeArgs::try_parse_from(&args)?;
    for bytes in humanize_args.bytes {
        println!("{:>20} => {}", bytes, format::humanize_signed(bytes));
    }
    Ok(())
}
