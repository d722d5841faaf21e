use anyhow::Result;
use colored::Colorize;

use crate::models::Stage;

pub fn handle(_args: Vec<String>) -> Result<()> {
    for (position, stage) in Stage::ALL.iter().enumerate() {
        let marker = if stage.is_admin() {
            " (admin pages only)".dimmed().to_string()
        } else {
            String::new()
        };
        println!("{:>2}. {}{}", position + 1, stage.as_str().cyan(), marker);
    }
    Ok(())
}
