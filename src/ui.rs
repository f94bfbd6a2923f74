// UI layer: colored status lines and the interactive prompts, using
// `crossterm` for color and `dialoguer` for input. The pipeline only sees
// the `Operator` trait so it can run without a terminal.

use crossterm::style::Stylize;
use dialoguer::{Confirm, MultiSelect};
use std::io;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

/// The person driving the run: picks folders and decides when to stop.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait Operator {
    /// Pick the photo-set folders to process from `available`. An empty
    /// answer means nothing should be processed this round.
    fn choose_folders(&mut self, available: &[String]) -> io::Result<Vec<String>>;

    /// Whether to process another set after this one.
    fn confirm_another(&mut self) -> io::Result<bool>;
}

/// Operator backed by terminal prompts.
#[derive(Default)]
pub struct ConsoleOperator;

impl Operator for ConsoleOperator {
    fn choose_folders(&mut self, available: &[String]) -> io::Result<Vec<String>> {
        // `MultiSelect` toggles entries with space and confirms with Enter.
        let picked = MultiSelect::new()
            .with_prompt("Select the folders to process (space to toggle, enter to confirm)")
            .items(available)
            .interact()?;
        if picked.is_empty() {
            error("No valid folders selected.");
            return Ok(Vec::new());
        }

        let chosen: Vec<String> = picked.into_iter().map(|i| available[i].clone()).collect();
        info("Selected folders:");
        for folder in &chosen {
            println!("- {}", folder);
        }

        let go = Confirm::new()
            .with_prompt("Process the selected folders?")
            .default(true)
            .interact()?;
        if !go {
            info("Processing cancelled.");
            return Ok(Vec::new());
        }
        Ok(chosen)
    }

    fn confirm_another(&mut self) -> io::Result<bool> {
        Confirm::new()
            .with_prompt("Process another folder?")
            .default(true)
            .interact()
    }
}

pub fn step(msg: &str) {
    println!("{}", format!("[STEP] {}", msg).green());
}

pub fn info(msg: &str) {
    println!("{}", format!("[INFO] {}", msg).blue());
}

pub fn warn(msg: &str) {
    println!("{}", format!("[WARN] {}", msg).dark_yellow());
}

pub fn error(msg: &str) {
    eprintln!("{}", format!("[ERROR] {}", msg).red());
}

/// Bytes as decimal megabytes, the unit the service quotes its limits in.
pub fn megabytes(bytes: u64) -> String {
    format!("{} MB", bytes as f64 / 1e6)
}
