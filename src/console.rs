use std::io::{self, BufRead, IsTerminal, Write};

use dialoguer::Input;
use media_bucket_core::contract::Console;
use media_bucket_core::error::MigrateError;
use media_bucket_core::migrate::BatchReport;

/// Operator console on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn show_mappings(&self, title: &str, rows: &[(String, String)]) {
        println!("\n#{title}");
        println!("------------------------------------------------------");
        for (source, target) in rows {
            println!("{source} ==> {target}");
        }
        println!();
    }

    fn prompt(&self, message: &str) -> Result<String, MigrateError> {
        if !io::stdin().is_terminal() {
            return read_piped_answer(message);
        }
        Input::<String>::new()
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| MigrateError::Prompt(e.to_string()))
    }

    fn batch_finished(&self, report: &BatchReport) {
        println!(
            "Batch {} ({}): {} attempted, {} uploaded, {} skipped, {} failed",
            report.index,
            report.resource_type,
            report.attempted,
            report.uploaded,
            report.skipped,
            report.failed()
        );
        if !report.failures.is_empty() {
            println!("Following resources failed:");
            for failure in &report.failures {
                println!(
                    "source URL: {} ({})",
                    failure.mapping.source_url, failure.error
                );
            }
        }
    }
}

/// Answer from a non-interactive stdin (`echo yes | media-bucket migrate`). End of input
/// reads as an empty answer.
fn read_piped_answer(message: &str) -> Result<String, MigrateError> {
    print!("{message}: ");
    io::stdout()
        .flush()
        .map_err(|e| MigrateError::Prompt(e.to_string()))?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| MigrateError::Prompt(e.to_string()))?;
    println!();
    Ok(answer)
}
