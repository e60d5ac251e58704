//! Config command implementation

use std::path::Path;

use anyhow::Result;
use finos_core::config::{resolved_config_path, PIN_ENV_VAR};
use finos_core::lock::format_countdown;
use finos_core::FinosConfig;

pub fn cmd_config(explicit: Option<&Path>, config: &FinosConfig) -> Result<()> {
    println!();
    println!("⚙️  FinOS Configuration");
    println!("   ─────────────────────────────────────────────────────────────");

    match resolved_config_path(explicit) {
        Some(path) => println!("   Source: {}", path.display()),
        None => println!("   Source: built-in defaults"),
    }

    let lock = &config.lock;
    if std::env::var(PIN_ENV_VAR).is_ok() {
        println!("   PIN: **** (from {})", PIN_ENV_VAR);
    } else {
        println!("   PIN: ****");
    }
    println!("   Max attempts: {}", lock.max_attempts);
    println!("   Lockout: {}", format_countdown(lock.lockout_duration));
    println!("   Idle relock: {}", format_countdown(lock.inactivity_limit));

    println!();
    if config.analytics.needs.is_empty() {
        println!("   Needs: (none, every expense counts as a want)");
    } else {
        println!("   Needs: {}", config.analytics.needs.join(", "));
    }
    println!("   Currency: {}", config.display.currency);

    Ok(())
}
