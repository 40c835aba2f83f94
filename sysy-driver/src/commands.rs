//! Subcommand implementations
//!
//! Each command takes an already loaded `Description` and returns the text
//! to print, so the commands are testable without touching the file system.

use log::{debug, info};
use std::fmt::Write;
use sysy_types::{Description, TypeError};

/// `name: declarator (size N)` for every declared type
pub fn print_types(desc: &Description) -> Result<String, TypeError> {
    let env = desc.build_env()?;
    info!("Built {} types", env.len());

    let mut out = String::new();
    for (name, ty) in env.iter() {
        let size = desc.layout.size_of(ty);
        // Writing to a String cannot fail.
        let _ = writeln!(out, "{name}: {ty} (size {size})");
    }
    Ok(out)
}

/// Evaluate every check; the flag reports whether any of them failed
pub fn check_types(desc: &Description) -> Result<(String, bool), TypeError> {
    let env = desc.build_env()?;
    let mut out = String::new();
    let mut failed = false;

    for check in &desc.checks {
        let (left, right, outcome) = check.evaluate(&env)?;
        debug!("{}({left}, {right}) evaluated to {outcome:?}", check.relation);
        failed |= outcome.is_failure();
        let _ = writeln!(out, "{}({left}, {right}) = {outcome}", check.relation);
    }
    Ok((out, failed))
}

/// Re-describe the built types as pretty JSON
pub fn dump_types(desc: &Description) -> Result<String, TypeError> {
    let env = desc.build_env()?;
    let dumped = Description::from_env(&env, desc.layout);
    Ok(serde_json::to_string_pretty(&dumped)?)
}
