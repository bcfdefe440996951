use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};

/// the rendered table followed by the time it was rolled
pub fn clipboard_text(table: &str, rolled_at: &DateTime<Local>) -> String {
    format!(
        "{table}\nRolled at {}",
        rolled_at.format("%Y-%m-%dT%H:%M:%S%.6f")
    )
}

/// Puts the table on the clipboard, prints it and waits for Enter before clearing the clipboard again.
///
/// The clipboard owner has to stay alive until the text was pasted on some platforms, hence the wait.
pub fn copy_and_wait(table: &str) -> Result<()> {
    let text = clipboard_text(table, &Local::now());
    let mut clipboard = arboard::Clipboard::new().context("could not open the system clipboard")?;
    clipboard
        .set_text(text)
        .context("could not copy the table to the clipboard")?;
    log::debug!("table copied to clipboard");

    println!("{table}");
    print!("Result copied to clipboard! Press enter when you have pasted it to continue (clipboard will be cleared).");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    clipboard.clear().context("could not clear the clipboard")?;
    Ok(())
}
