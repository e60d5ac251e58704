//! Interactive shell
//!
//! Keeps one unlocked session open across commands. Each line is parsed with
//! the same clap definitions as the command line. An idle session locks again
//! and must be unlocked before the next command runs.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use finos_core::FinosConfig;

use super::{run_command, second_ticker, stdin_lines, unlock, Gate, GateEvent};
use crate::cli::{Commands, ShellLine};

/// A parsed shell line
pub enum ShellInput {
    Empty,
    Exit,
    Run(Commands),
}

/// Parse one shell line. Arguments are split on whitespace.
pub fn parse_shell_line(line: &str) -> std::result::Result<ShellInput, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        [] => Ok(ShellInput::Empty),
        ["exit"] | ["quit"] => Ok(ShellInput::Exit),
        _ => ShellLine::try_parse_from(words).map(|parsed| ShellInput::Run(parsed.command)),
    }
}

fn print_prompt() {
    print!("finos> ");
    let _ = std::io::stdout().flush();
}

enum Wake {
    Line(Option<String>),
    Tick,
}

/// Run commands until `exit` or end of input.
///
/// Without a gate (`--no-lock`) the shell never locks.
pub async fn run_shell(
    mut gate: Option<Gate>,
    data: &Path,
    config_path: Option<&Path>,
    config: &FinosConfig,
) -> Result<()> {
    let mut lines = stdin_lines();
    if let Some(gate) = gate.as_mut() {
        unlock(gate, &mut lines).await?;
    }

    let mut ticker = second_ticker();
    println!();
    println!("   Type a command (dashboard, categories, trend, outliers, loans, config), `help`, or `exit`");
    print_prompt();

    loop {
        let wake = tokio::select! {
            line = lines.next_line() => Wake::Line(line.context("Failed to read command")?),
            _ = ticker.tick() => Wake::Tick,
        };

        let line = match wake {
            Wake::Line(None) => {
                println!();
                return Ok(());
            }
            Wake::Line(Some(line)) => line,
            Wake::Tick => {
                if let Some(gate) = gate.as_mut() {
                    if gate.tick(Utc::now()) == GateEvent::Relocked {
                        println!();
                        println!("   🔒 Locked after inactivity");
                        unlock(gate, &mut lines).await?;
                        print_prompt();
                    }
                }
                continue;
            }
        };

        if let Some(gate) = gate.as_mut() {
            let now = Utc::now();
            // The ticker may not have fired yet for an idle session
            if gate.expire_if_idle(now) {
                println!("   🔒 Locked after inactivity, command discarded");
                unlock(gate, &mut lines).await?;
                print_prompt();
                continue;
            }
            gate.record_activity(now);
        }

        match parse_shell_line(&line) {
            Ok(ShellInput::Empty) => {}
            Ok(ShellInput::Exit) => return Ok(()),
            Ok(ShellInput::Run(command)) => {
                if let Err(e) = run_command(command, data, config_path, config) {
                    println!("   ❌ {:#}", e);
                }
            }
            Err(e) => println!("{}", e),
        }
        print_prompt();
    }
}
