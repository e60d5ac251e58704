//! Interactive PIN gate
//!
//! Reads keypad input from stdin one line at a time. Each digit on a line is
//! one key press; `b` or `<` is backspace. A once-per-second ticker drives the
//! lockout countdown, clears an abandoned half-typed PIN, and relocks an
//! unlocked session that has gone idle.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use finos_core::lock::{format_countdown, InactivityTimer, LockSession, PressOutcome, PIN_LENGTH};
use finos_core::LockConfig;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::time::{interval, Duration, Interval, MissedTickBehavior};

/// Line reader over stdin, shared by the gate and the shell
pub type InputLines = Lines<BufReader<Stdin>>;

pub fn stdin_lines() -> InputLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Once-per-second ticker for the countdown and idle checks
pub fn second_ticker() -> Interval {
    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Feed one line of keypad input into the session.
///
/// Returns the outcome of every key that was acted on. Whitespace and unknown
/// characters are skipped.
pub fn feed_line(session: &mut LockSession, line: &str, now: DateTime<Utc>) -> Vec<PressOutcome> {
    let mut outcomes = Vec::new();
    for c in line.chars() {
        let outcome = match c {
            '0'..='9' => session.press_digit(c as u8 - b'0', now),
            'b' | 'B' | '<' => {
                if !session.backspace() {
                    continue;
                }
                PressOutcome::Buffered {
                    entered: session.entered_len(),
                }
            }
            _ => continue,
        };
        outcomes.push(outcome);
        if session.is_unlocked() {
            break;
        }
    }
    outcomes
}

/// Message to show for a press outcome, if any
pub fn describe_outcome(outcome: &PressOutcome, now: DateTime<Utc>) -> Option<String> {
    match outcome {
        PressOutcome::Ignored | PressOutcome::Buffered { .. } => None,
        PressOutcome::Unlocked => Some("🔓 Unlocked".to_string()),
        PressOutcome::Rejected {
            failed_attempts,
            max_attempts,
        } => Some(format!(
            "❌ Wrong PIN ({} of {} attempts)",
            failed_attempts, max_attempts
        )),
        PressOutcome::LockedOut { until } => Some(format!(
            "🔒 Too many attempts. Keypad locked for {}",
            format_countdown(*until - now)
        )),
    }
}

/// PIN dots for the current buffer, e.g. "●●○○"
pub fn pin_dots(entered: usize) -> String {
    let entered = entered.min(PIN_LENGTH);
    let mut dots = "●".repeat(entered);
    dots.push_str(&"○".repeat(PIN_LENGTH - entered));
    dots
}

/// What a once-per-second check changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateEvent {
    Quiet,
    /// Still locked out for this long
    Countdown(chrono::Duration),
    LockoutEnded,
    /// An abandoned half-typed PIN was discarded
    EntryCleared,
    /// An idle unlocked session was locked again
    Relocked,
}

/// A lock session paired with its inactivity timer
#[derive(Debug, Clone)]
pub struct Gate {
    session: LockSession,
    idle: InactivityTimer,
}

impl Gate {
    pub fn new(config: &LockConfig, now: DateTime<Utc>) -> Self {
        Self {
            session: LockSession::new(config),
            idle: InactivityTimer::new(config.inactivity_limit, now),
        }
    }

    pub fn session(&self) -> &LockSession {
        &self.session
    }

    pub fn is_open(&self) -> bool {
        self.session.is_unlocked()
    }

    /// Note user input without pressing any keys
    pub fn record_activity(&mut self, now: DateTime<Utc>) {
        self.idle.record_activity(now);
    }

    /// Feed a line of keypad input
    pub fn input(&mut self, line: &str, now: DateTime<Utc>) -> Vec<PressOutcome> {
        self.idle.record_activity(now);
        feed_line(&mut self.session, line, now)
    }

    /// Relock an unlocked session that has been idle past the limit
    pub fn expire_if_idle(&mut self, now: DateTime<Utc>) -> bool {
        if self.session.enforce_inactivity(&self.idle, now) {
            self.idle.record_activity(now);
            return true;
        }
        false
    }

    /// Periodic housekeeping
    pub fn tick(&mut self, now: DateTime<Utc>) -> GateEvent {
        if self.session.tick(now) {
            self.idle.record_activity(now);
            return GateEvent::LockoutEnded;
        }
        if let Some(left) = self.session.remaining_lockout(now) {
            return GateEvent::Countdown(left);
        }
        if self.expire_if_idle(now) {
            return GateEvent::Relocked;
        }
        if self.session.entered_len() > 0 && self.idle.is_idle(now) && self.session.clear_entry() {
            self.idle.record_activity(now);
            return GateEvent::EntryCleared;
        }
        GateEvent::Quiet
    }
}

fn print_prompt(session: &LockSession) {
    print!("   Enter PIN {} ", pin_dots(session.entered_len()));
    let _ = std::io::stdout().flush();
}

enum Wake {
    Line(Option<String>),
    Tick,
}

/// Block until the gate opens.
///
/// Returns immediately when it is already open. Fails if stdin closes first.
pub async fn unlock(gate: &mut Gate, lines: &mut InputLines) -> Result<()> {
    if gate.is_open() {
        return Ok(());
    }

    let mut ticker = second_ticker();

    println!();
    println!("🔐 FinOS is locked");
    println!("   Type digits and press Enter (b = backspace)");
    print_prompt(gate.session());

    loop {
        let wake = tokio::select! {
            line = lines.next_line() => Wake::Line(line.context("Failed to read PIN input")?),
            _ = ticker.tick() => Wake::Tick,
        };

        match wake {
            Wake::Line(None) => {
                println!();
                anyhow::bail!("Input closed before the PIN was accepted");
            }
            Wake::Line(Some(line)) => {
                let now = Utc::now();
                for outcome in gate.input(&line, now) {
                    if let Some(message) = describe_outcome(&outcome, now) {
                        println!("   {}", message);
                    }
                }

                if gate.is_open() {
                    return Ok(());
                }
                if gate.session().is_locked_out() {
                    println!("   Keypad locked, input ignored");
                } else {
                    print_prompt(gate.session());
                }
            }
            Wake::Tick => match gate.tick(Utc::now()) {
                GateEvent::LockoutEnded => {
                    println!();
                    println!("   Keypad available again");
                    print_prompt(gate.session());
                }
                GateEvent::Countdown(left) => {
                    print!("\r   ⏳ Try again in {} ", format_countdown(left));
                    let _ = std::io::stdout().flush();
                }
                GateEvent::EntryCleared => {
                    println!();
                    println!("   PIN entry cleared after inactivity");
                    print_prompt(gate.session());
                }
                GateEvent::Quiet | GateEvent::Relocked => {}
            },
        }
    }
}

/// Gate a one-shot command: block until the PIN is accepted
pub async fn run_lock_screen(config: &LockConfig) -> Result<()> {
    let mut gate = Gate::new(config, Utc::now());
    unlock(&mut gate, &mut stdin_lines()).await
}
