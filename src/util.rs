// === Module Header (agents-tooling) START ===
// header: Parsed by scripts/check_module_headers.sh for purpose/role presence; keep keys on single-line entries.
// purpose: Small helpers for git subprocesses, instant parsing, and time deltas
// role: utilities/helpers
// inputs: Repo paths, CLI date strings, chrono instants
// outputs: Command stdout, UTC instants, second deltas
// side_effects: run_git invokes a git subprocess
// invariants:
// - parse_instant accepts RFC 3339 or YYYY-MM-DD (midnight UTC) and nothing else
// - parse_window_end reads a bare date as the last second of that day
// - effective_now centralizes clock access so tests can pin "now"
// errors: run_git surfaces command + stderr; parse errors name the offending input
// tie_breakers: contracts > orchestration > correctness > performance > minimal_diffs
// === Module Header END ===

use std::process::Command;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

pub fn run_git(repo: &str, args: &[&str]) -> Result<String> {
  let out = Command::new("git")
    .args(args)
    .current_dir(repo)
    .output()
    .with_context(|| format!("spawning git {:?}", args))?;

  if out.status.success() {
    Ok(String::from_utf8_lossy(&out.stdout).to_string())
  } else {
    let stderr = String::from_utf8_lossy(&out.stderr);
    anyhow::bail!("git {:?} failed: {}", args, stderr)
  }
}

/// Parse an RFC 3339 instant or a bare `YYYY-MM-DD` date (taken as 00:00:00 UTC).
pub fn parse_instant(s: &str) -> Result<DateTime<Utc>> {
  parse_with_day_time(s, 0, 0, 0)
}

/// Like [`parse_instant`], but a bare date covers the whole day (23:59:59 UTC).
pub fn parse_window_end(s: &str) -> Result<DateTime<Utc>> {
  parse_with_day_time(s, 23, 59, 59)
}

fn parse_with_day_time(s: &str, hour: u32, min: u32, sec: u32) -> Result<DateTime<Utc>> {
  let s = s.trim();

  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Ok(dt.with_timezone(&Utc));
  }

  let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .with_context(|| format!("invalid date {:?}: expected RFC 3339 or YYYY-MM-DD", s))?;

  date
    .and_hms_opt(hour, min, sec)
    .map(|naive| naive.and_utc())
    .with_context(|| format!("invalid date {:?}", s))
}

/// Returns the pinned "now" when given, otherwise the wall clock.
pub fn effective_now(override_now: Option<DateTime<Utc>>) -> DateTime<Utc> {
  override_now.unwrap_or_else(Utc::now)
}

/// Seconds from `start` to `end` (negative when `end` precedes `start`).
pub fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
  (end - start).num_seconds()
}
