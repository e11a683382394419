//! DORA delivery metrics: deploy frequency, change-failure rate, mean time to recovery.
//!
//! Releases stand in for deploys. Every computation returns `(value, rating)` and
//! resolves empty denominators to `(0.0, NotAvailable)` rather than a poor rating.

use crate::primitives;
use crate::types::{Commit, DateRange, DoraRating, Issue, Release};

pub const DAYS_PER_MONTH: f64 = 30.0;

fn deploys_in(releases: &[Release], period: &DateRange) -> u64 {
  releases
    .iter()
    .filter(|r| period.contains(&r.published_at))
    .count() as u64
}

// ---------------------------------------------------------------------------
// Deploy frequency
// ---------------------------------------------------------------------------

/// In-period releases per 30-day month.
pub fn deploy_frequency(releases: &[Release], period: &DateRange) -> (f64, DoraRating) {
  let count = deploys_in(releases, period);
  if count == 0 {
    return (0.0, DoraRating::NotAvailable);
  }
  let freq = count as f64 / (period.rate_days() / DAYS_PER_MONTH);
  (freq, deploy_frequency_rating(freq))
}

pub fn deploy_frequency_rating(per_month: f64) -> DoraRating {
  if per_month >= 30.0 {
    DoraRating::Elite
  } else if per_month >= 4.0 {
    DoraRating::High
  } else if per_month >= 1.0 {
    DoraRating::Medium
  } else {
    DoraRating::Low
  }
}

// ---------------------------------------------------------------------------
// Change failure rate
// ---------------------------------------------------------------------------

/// (failure-labelled issues created in period + revert commits) / in-period deploys, percent.
pub fn change_failure_rate(
  issues: &[Issue],
  releases: &[Release],
  commits: &[Commit],
  period: &DateRange,
) -> (f64, DoraRating) {
  let deploys = deploys_in(releases, period);
  if deploys == 0 {
    return (0.0, DoraRating::NotAvailable);
  }

  let failed_issues = issues
    .iter()
    .filter(|i| period.contains(&i.created_at) && primitives::is_failure_issue(i))
    .count();
  let failures = failed_issues + primitives::count_reverts(commits);

  let rate = failures as f64 / deploys as f64 * 100.0;
  (rate, change_failure_rating(rate))
}

pub fn change_failure_rating(pct: f64) -> DoraRating {
  if pct <= 15.0 {
    DoraRating::Elite
  } else if pct <= 30.0 {
    DoraRating::High
  } else if pct <= 45.0 {
    DoraRating::Medium
  } else {
    DoraRating::Low
  }
}

// ---------------------------------------------------------------------------
// MTTR
// ---------------------------------------------------------------------------

/// Mean open-to-close hours over closed failure issues created in period.
/// Issues closed before they were created are skipped.
pub fn mttr(issues: &[Issue], period: &DateRange) -> (f64, DoraRating) {
  let hours: Vec<f64> = issues
    .iter()
    .filter(|i| period.contains(&i.created_at) && primitives::is_failure_issue(i))
    .filter_map(|i| {
      let closed = i.closed_at?;
      let h = (closed - i.created_at).num_seconds() as f64 / 3600.0;
      (h >= 0.0).then_some(h)
    })
    .collect();

  if hours.is_empty() {
    return (0.0, DoraRating::NotAvailable);
  }
  let mean = hours.iter().sum::<f64>() / hours.len() as f64;
  (mean, mttr_rating(mean))
}

pub fn mttr_rating(hours: f64) -> DoraRating {
  if hours < 1.0 {
    DoraRating::Elite
  } else if hours < 24.0 {
    DoraRating::High
  } else if hours < 168.0 {
    DoraRating::Medium
  } else {
    DoraRating::Low
  }
}
