//! Session lock state machine
//!
//! A PIN keypad gate with attempt counting and timed lockout. The machine is
//! driven entirely by discrete events (`press_digit`, `backspace`, `tick`,
//! `relock`) and never reads a clock itself: every time-dependent call takes
//! the current instant from the host.
//!
//! ```text
//!            correct PIN                  relock / idle
//!   Locked ───────────────▶ Unlocked ─────────────────▶ Locked("", 0)
//!     │  wrong PIN (n < max)  ▲
//!     ├──────────────┐        │
//!     │ ◀────────────┘        │
//!     │ wrong PIN (n == max)
//!     ▼
//!   LockedOut(until) ── tick(now >= until) ──▶ Locked("", 0)
//! ```

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::config::LockConfig;
use crate::error::{Error, Result};

/// Digits in a PIN
pub const PIN_LENGTH: usize = 4;

/// Factory PIN, meant to be replaced through config or `FINOS_PIN`
pub const DEFAULT_PIN: &str = "1022";

/// A validated four-digit PIN. Debug output is masked.
#[derive(Clone, PartialEq, Eq)]
pub struct Pin(String);

impl Pin {
    pub fn new(code: &str) -> Result<Self> {
        let code = code.trim();
        if code.len() != PIN_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::Config(format!(
                "PIN must be exactly {} digits",
                PIN_LENGTH
            )));
        }
        Ok(Self(code.to_string()))
    }

    fn matches(&self, entered: &str) -> bool {
        self.0 == entered
    }
}

impl Default for Pin {
    fn default() -> Self {
        Self(DEFAULT_PIN.to_string())
    }
}

impl std::str::FromStr for Pin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl std::fmt::Debug for Pin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Pin(****)")
    }
}

/// Where the session currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockState {
    /// Keypad active
    Locked {
        entered: String,
        failed_attempts: u32,
    },
    /// Keypad disabled until the deadline passes
    LockedOut { until: DateTime<Utc> },
    /// Protected view revealed
    Unlocked,
}

impl LockState {
    fn fresh() -> Self {
        Self::Locked {
            entered: String::new(),
            failed_attempts: 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Locked { .. } => "locked",
            Self::LockedOut { .. } => "locked_out",
            Self::Unlocked => "unlocked",
        }
    }
}

/// Result of a keypad press, for the host to render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// Press had no effect (locked out, already unlocked, or not a digit)
    Ignored,
    /// Digit stored; `entered` digits are now buffered
    Buffered { entered: usize },
    /// Correct PIN
    Unlocked,
    /// Wrong PIN, keypad still active
    Rejected { failed_attempts: u32, max_attempts: u32 },
    /// Wrong PIN exhausted the attempts
    LockedOut { until: DateTime<Utc> },
}

/// One PIN-gated session. Starts locked with no failed attempts.
#[derive(Debug, Clone)]
pub struct LockSession {
    pin: Pin,
    max_attempts: u32,
    lockout_duration: Duration,
    state: LockState,
}

impl LockSession {
    pub fn new(config: &LockConfig) -> Self {
        Self {
            pin: config.pin.clone(),
            max_attempts: config.max_attempts.max(1),
            lockout_duration: config.lockout_duration,
            state: LockState::fresh(),
        }
    }

    pub fn state(&self) -> &LockState {
        &self.state
    }

    /// Unlock signal consumed by the host
    pub fn is_unlocked(&self) -> bool {
        matches!(self.state, LockState::Unlocked)
    }

    pub fn is_locked_out(&self) -> bool {
        matches!(self.state, LockState::LockedOut { .. })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Failed attempts counted toward the next lockout
    pub fn failed_attempts(&self) -> u32 {
        match &self.state {
            LockState::Locked {
                failed_attempts, ..
            } => *failed_attempts,
            LockState::LockedOut { .. } => self.max_attempts,
            LockState::Unlocked => 0,
        }
    }

    /// Number of buffered digits (for rendering the PIN dots)
    pub fn entered_len(&self) -> usize {
        match &self.state {
            LockState::Locked { entered, .. } => entered.len(),
            _ => 0,
        }
    }

    /// Feed one keypad digit (0-9).
    ///
    /// The fourth digit triggers validation and always clears the buffer.
    pub fn press_digit(&mut self, digit: u8, now: DateTime<Utc>) -> PressOutcome {
        if digit > 9 {
            return PressOutcome::Ignored;
        }

        let (entered, failed_attempts) = match &mut self.state {
            LockState::Locked {
                entered,
                failed_attempts,
            } => (entered, failed_attempts),
            LockState::LockedOut { .. } | LockState::Unlocked => return PressOutcome::Ignored,
        };

        if entered.len() < PIN_LENGTH {
            entered.push(char::from(b'0' + digit));
        }
        if entered.len() < PIN_LENGTH {
            return PressOutcome::Buffered {
                entered: entered.len(),
            };
        }

        let accepted = self.pin.matches(entered);
        entered.clear();

        if accepted {
            info!("PIN accepted, session unlocked");
            self.state = LockState::Unlocked;
            return PressOutcome::Unlocked;
        }

        *failed_attempts += 1;
        let attempts = *failed_attempts;

        if attempts >= self.max_attempts {
            let until = now
                .checked_add_signed(self.lockout_duration)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            warn!(
                attempts,
                until = %until.to_rfc3339(),
                "Too many failed PIN attempts, keypad locked out"
            );
            self.state = LockState::LockedOut { until };
            return PressOutcome::LockedOut { until };
        }

        debug!(attempts, max = self.max_attempts, "PIN rejected");
        PressOutcome::Rejected {
            failed_attempts: attempts,
            max_attempts: self.max_attempts,
        }
    }

    /// Drop the last buffered digit. Returns whether anything was removed.
    pub fn backspace(&mut self) -> bool {
        match &mut self.state {
            LockState::Locked { entered, .. } => entered.pop().is_some(),
            _ => false,
        }
    }

    /// Advance time. Ends an expired lockout with a fresh attempt count.
    ///
    /// Returns true when the state changed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        match self.state {
            LockState::LockedOut { until } if now >= until => {
                info!("Lockout expired");
                self.state = LockState::fresh();
                true
            }
            _ => false,
        }
    }

    /// Discard a half-typed PIN. Failed attempts are kept.
    ///
    /// Returns whether any digits were dropped.
    pub fn clear_entry(&mut self) -> bool {
        match &mut self.state {
            LockState::Locked { entered, .. } if !entered.is_empty() => {
                entered.clear();
                true
            }
            _ => false,
        }
    }

    /// Force the session back to the keypad (e.g. after inactivity).
    ///
    /// From `Unlocked` this starts a fresh keypad. While `Locked` only the
    /// buffer is cleared, and an active lockout is left running.
    pub fn relock(&mut self) {
        match self.state {
            LockState::Unlocked => {
                info!("Session relocked");
                self.state = LockState::fresh();
            }
            LockState::Locked { .. } => {
                self.clear_entry();
            }
            LockState::LockedOut { .. } => {}
        }
    }

    /// Time left on the lockout, rounded up to whole seconds
    pub fn remaining_lockout(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self.state {
            LockState::LockedOut { until } => {
                let millis = (until - now).num_milliseconds();
                let secs = (millis + 999).div_euclid(1000).max(0);
                Some(Duration::seconds(secs))
            }
            _ => None,
        }
    }

    /// Relock when the timer reports the user idle. Returns true on relock.
    pub fn enforce_inactivity(&mut self, timer: &InactivityTimer, now: DateTime<Utc>) -> bool {
        if self.is_unlocked() && timer.is_idle(now) {
            self.relock();
            return true;
        }
        false
    }
}

/// Tracks the last user input to decide when to relock
#[derive(Debug, Clone)]
pub struct InactivityTimer {
    limit: Duration,
    last_activity: DateTime<Utc>,
}

impl InactivityTimer {
    pub fn new(limit: Duration, now: DateTime<Utc>) -> Self {
        Self {
            limit,
            last_activity: now,
        }
    }

    /// Call on every user input event
    pub fn record_activity(&mut self, now: DateTime<Utc>) {
        if now > self.last_activity {
            self.last_activity = now;
        }
    }

    pub fn is_idle(&self, now: DateTime<Utc>) -> bool {
        now - self.last_activity >= self.limit
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }
}

/// Format a remaining duration as "m:ss"
pub fn format_countdown(remaining: Duration) -> String {
    let secs = remaining.num_seconds().max(0);
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> LockConfig {
        LockConfig {
            pin: Pin::new("1022").unwrap(),
            ..LockConfig::default()
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap()
    }

    fn enter(session: &mut LockSession, code: &str, now: DateTime<Utc>) -> PressOutcome {
        let mut last = PressOutcome::Ignored;
        for c in code.chars() {
            last = session.press_digit(c.to_digit(10).unwrap() as u8, now);
        }
        last
    }

    #[test]
    fn test_pin_validation() {
        assert!(Pin::new("1234").is_ok());
        assert!(Pin::new(" 0000 ").is_ok());
        assert!(Pin::new("123").is_err());
        assert!(Pin::new("12345").is_err());
        assert!(Pin::new("12a4").is_err());
        assert_eq!(format!("{:?}", Pin::new("1234").unwrap()), "Pin(****)");
    }

    #[test]
    fn test_initial_state() {
        let session = LockSession::new(&config());
        assert_eq!(
            session.state(),
            &LockState::Locked {
                entered: String::new(),
                failed_attempts: 0
            }
        );
        assert!(!session.is_unlocked());
    }

    #[test]
    fn test_correct_pin_unlocks() {
        let mut session = LockSession::new(&config());
        assert_eq!(
            session.press_digit(1, t0()),
            PressOutcome::Buffered { entered: 1 }
        );
        assert_eq!(enter(&mut session, "022", t0()), PressOutcome::Unlocked);
        assert!(session.is_unlocked());
        assert_eq!(session.failed_attempts(), 0);
    }

    #[test]
    fn test_wrong_pin_counts_and_clears_buffer() {
        let mut session = LockSession::new(&config());
        let outcome = enter(&mut session, "9999", t0());
        assert_eq!(
            outcome,
            PressOutcome::Rejected {
                failed_attempts: 1,
                max_attempts: 3
            }
        );
        assert_eq!(session.entered_len(), 0);
        assert_eq!(session.failed_attempts(), 1);
    }

    #[test]
    fn test_correct_pin_resets_attempts() {
        let mut session = LockSession::new(&config());
        enter(&mut session, "0000", t0());
        enter(&mut session, "1111", t0());
        assert_eq!(session.failed_attempts(), 2);
        assert_eq!(enter(&mut session, "1022", t0()), PressOutcome::Unlocked);
        session.relock();
        assert_eq!(session.failed_attempts(), 0);
    }

    #[test]
    fn test_three_failures_lock_out() {
        let mut session = LockSession::new(&config());
        enter(&mut session, "0000", t0());
        enter(&mut session, "0001", t0());
        let outcome = enter(&mut session, "0002", t0());

        let until = t0() + Duration::minutes(5);
        assert_eq!(outcome, PressOutcome::LockedOut { until });
        assert_eq!(session.state(), &LockState::LockedOut { until });

        // A fourth attempt, even the right one, does nothing
        assert_eq!(enter(&mut session, "1022", t0()), PressOutcome::Ignored);
        assert!(session.is_locked_out());
        assert!(!session.backspace());
    }

    #[test]
    fn test_tick_expires_lockout() {
        let mut session = LockSession::new(&config());
        for code in ["0000", "0001", "0002"] {
            enter(&mut session, code, t0());
        }
        let until = t0() + Duration::minutes(5);

        assert!(!session.tick(until - Duration::seconds(1)));
        assert_eq!(session.state(), &LockState::LockedOut { until });

        assert!(session.tick(until));
        assert_eq!(
            session.state(),
            &LockState::Locked {
                entered: String::new(),
                failed_attempts: 0
            }
        );
        assert_eq!(enter(&mut session, "1022", until), PressOutcome::Unlocked);
    }

    #[test]
    fn test_tick_outside_lockout_is_noop() {
        let mut session = LockSession::new(&config());
        session.press_digit(4, t0());
        assert!(!session.tick(t0() + Duration::hours(1)));
        assert_eq!(session.entered_len(), 1);
    }

    #[test]
    fn test_backspace() {
        let mut session = LockSession::new(&config());
        assert!(!session.backspace());
        session.press_digit(1, t0());
        session.press_digit(0, t0());
        assert!(session.backspace());
        assert_eq!(session.entered_len(), 1);
        // "1" + "022" still unlocks after the correction
        assert_eq!(enter(&mut session, "022", t0()), PressOutcome::Unlocked);
    }

    #[test]
    fn test_non_digit_ignored() {
        let mut session = LockSession::new(&config());
        assert_eq!(session.press_digit(10, t0()), PressOutcome::Ignored);
        assert_eq!(session.entered_len(), 0);
    }

    #[test]
    fn test_presses_while_unlocked_ignored() {
        let mut session = LockSession::new(&config());
        enter(&mut session, "1022", t0());
        assert_eq!(session.press_digit(5, t0()), PressOutcome::Ignored);
        assert!(session.is_unlocked());
    }

    #[test]
    fn test_relock_is_idempotent() {
        let mut session = LockSession::new(&config());
        enter(&mut session, "1022", t0());

        session.relock();
        let once = session.state().clone();
        session.relock();
        assert_eq!(session.state(), &once);
        assert_eq!(
            once,
            LockState::Locked {
                entered: String::new(),
                failed_attempts: 0
            }
        );
    }

    #[test]
    fn test_relock_keeps_failed_attempts() {
        let mut session = LockSession::new(&config());
        enter(&mut session, "0000", t0());
        enter(&mut session, "1111", t0());
        session.press_digit(1, t0());

        session.relock();
        assert_eq!(session.failed_attempts(), 2);
        assert_eq!(session.entered_len(), 0);

        session.relock();
        assert_eq!(
            session.state(),
            &LockState::Locked {
                entered: String::new(),
                failed_attempts: 2
            }
        );

        // The third wrong PIN still triggers the lockout
        assert!(matches!(
            enter(&mut session, "2222", t0()),
            PressOutcome::LockedOut { .. }
        ));
    }

    #[test]
    fn test_clear_entry() {
        let mut session = LockSession::new(&config());
        enter(&mut session, "0000", t0());
        assert!(!session.clear_entry());

        enter(&mut session, "10", t0());
        assert!(session.clear_entry());
        assert_eq!(session.entered_len(), 0);
        assert_eq!(session.failed_attempts(), 1);

        enter(&mut session, "1022", t0());
        assert!(!session.clear_entry());
        assert!(session.is_unlocked());
    }

    #[test]
    fn test_huge_lockout_saturates() {
        let mut session = LockSession::new(&LockConfig {
            max_attempts: 1,
            lockout_duration: Duration::seconds(9_000_000_000_000),
            ..config()
        });
        let outcome = enter(&mut session, "5555", t0());
        assert_eq!(
            outcome,
            PressOutcome::LockedOut {
                until: DateTime::<Utc>::MAX_UTC
            }
        );
        assert!(!session.tick(t0() + Duration::days(365)));
        assert!(session.is_locked_out());
    }

    #[test]
    fn test_relock_does_not_cancel_lockout() {
        let mut session = LockSession::new(&config());
        for code in ["0000", "0001", "0002"] {
            enter(&mut session, code, t0());
        }
        session.relock();
        assert!(session.is_locked_out());
    }

    #[test]
    fn test_remaining_lockout_rounds_up() {
        let mut session = LockSession::new(&config());
        assert!(session.remaining_lockout(t0()).is_none());
        for code in ["0000", "0001", "0002"] {
            enter(&mut session, code, t0());
        }

        let later = t0() + Duration::milliseconds(1500);
        assert_eq!(
            session.remaining_lockout(later),
            Some(Duration::seconds(299))
        );
        assert_eq!(
            session.remaining_lockout(t0() + Duration::minutes(10)),
            Some(Duration::zero())
        );
    }

    #[test]
    fn test_custom_attempt_limit() {
        let mut session = LockSession::new(&LockConfig {
            max_attempts: 1,
            lockout_duration: Duration::seconds(30),
            ..config()
        });
        let outcome = enter(&mut session, "5555", t0());
        assert_eq!(
            outcome,
            PressOutcome::LockedOut {
                until: t0() + Duration::seconds(30)
            }
        );
    }

    #[test]
    fn test_inactivity_relocks() {
        let mut session = LockSession::new(&config());
        enter(&mut session, "1022", t0());

        let mut timer = InactivityTimer::new(Duration::minutes(5), t0());
        timer.record_activity(t0() + Duration::minutes(3));

        assert!(!session.enforce_inactivity(&timer, t0() + Duration::minutes(7)));
        assert!(session.is_unlocked());

        assert!(session.enforce_inactivity(&timer, t0() + Duration::minutes(8)));
        assert!(!session.is_unlocked());
    }

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(Duration::seconds(299)), "4:59");
        assert_eq!(format_countdown(Duration::seconds(5)), "0:05");
        assert_eq!(format_countdown(Duration::seconds(-3)), "0:00");
    }
}
