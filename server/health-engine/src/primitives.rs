//! Pure helpers over raw entities: late-night and revert detection, PR lead time,
//! PR type from branch name, dependency age, failure-issue labels.

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Commit, Issue, PullRequest};

/// Late night is [22:00, 05:00) in the commit's own offset.
pub const LATE_NIGHT_START_HOUR: u32 = 22;
pub const LATE_NIGHT_END_HOUR: u32 = 5;

const REVERT_PREFIX: &str = "Revert ";

const BUGFIX_PREFIXES: [&str; 3] = ["fix/", "bugfix/", "hotfix/"];
const FEATURE_PREFIXES: [&str; 2] = ["feature/", "feat/"];
const REFACTOR_PREFIXES: [&str; 5] = ["refactor/", "chore/", "debt/", "ci/", "docs/"];

const FAILURE_LABELS: [&str; 3] = ["bug", "incident", "hotfix"];

/// Uses the hour as the timestamp arrived; the author's real timezone is unknown.
pub fn is_late_night(ts: &DateTime<FixedOffset>) -> bool {
  let hour = ts.hour();
  hour >= LATE_NIGHT_START_HOUR || hour < LATE_NIGHT_END_HOUR
}

pub fn count_late_night(commits: &[Commit]) -> usize {
  commits.iter().filter(|c| is_late_night(&c.timestamp)).count()
}

/// Case-sensitive prefix, as written by `git revert`.
pub fn is_revert(message: &str) -> bool {
  message.starts_with(REVERT_PREFIX)
}

pub fn count_reverts(commits: &[Commit]) -> usize {
  commits.iter().filter(|c| is_revert(&c.message)).count()
}

/// Days from creation to merge; -1.0 for unmerged PRs.
pub fn lead_time_days(pr: &PullRequest) -> f64 {
  match pr.merged_at {
    Some(merged) => (merged - pr.created_at).num_seconds() as f64 / 3600.0 / 24.0,
    None => -1.0,
  }
}

// ---------------------------------------------------------------------------
// PR type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrType {
  Feature,
  BugFix,
  Refactor,
  Other,
}

/// PR type from the source branch name (case-insensitive prefix match).
/// Bug fix is checked before feature, feature before refactor.
pub fn classify_branch(branch: &str) -> PrType {
  let b = branch.to_lowercase();
  if starts_with_any(&b, &BUGFIX_PREFIXES) {
    PrType::BugFix
  } else if starts_with_any(&b, &FEATURE_PREFIXES) {
    PrType::Feature
  } else if starts_with_any(&b, &REFACTOR_PREFIXES) {
    PrType::Refactor
  } else {
    PrType::Other
  }
}

fn starts_with_any(s: &str, prefixes: &[&str]) -> bool {
  prefixes.iter().any(|p| s.starts_with(p))
}

// ---------------------------------------------------------------------------
// Dependency age
// ---------------------------------------------------------------------------

/// Whole 30-day months between `released_at` and `now` (truncated).
pub fn age_in_months(released_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
  let hours = (now - released_at).num_seconds() as f64 / 3600.0;
  (hours / 24.0 / 30.0) as i64
}

/// "5m", "2y", "2y 3m".
pub fn format_age(months: i64) -> String {
  let years = months / 12;
  let rest = months % 12;
  match (years, rest) {
    (0, m) => format!("{}m", m),
    (y, 0) => format!("{}y", y),
    (y, m) => format!("{}y {}m", y, m),
  }
}

/// Issue labelled bug / incident / hotfix (case-insensitive).
pub fn is_failure_issue(issue: &Issue) -> bool {
  issue
    .labels
    .iter()
    .any(|l| FAILURE_LABELS.contains(&l.to_lowercase().as_str()))
}

/// part / whole * 100, or 0 when whole is 0.
pub fn percent(part: u64, whole: u64) -> f64 {
  if whole == 0 {
    0.0
  } else {
    part as f64 / whole as f64 * 100.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::ItemState;
  use chrono::TimeZone;

  fn at_hour(hour: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
      .unwrap()
      .with_ymd_and_hms(2025, 1, 15, hour, 30, 0)
      .unwrap()
  }

  fn pr(created: DateTime<Utc>, merged: Option<DateTime<Utc>>) -> PullRequest {
    PullRequest {
      number: 1,
      title: "t".into(),
      author: "a".into(),
      head_branch: "feature/x".into(),
      state: ItemState::Closed,
      created_at: created,
      merged_at: merged,
      additions: 0,
      deletions: 0,
    }
  }

  #[test]
  fn late_night_boundaries() {
    assert!(is_late_night(&at_hour(22)));
    assert!(is_late_night(&at_hour(23)));
    assert!(is_late_night(&at_hour(0)));
    assert!(is_late_night(&at_hour(4)));
    assert!(!is_late_night(&at_hour(5)));
    assert!(!is_late_night(&at_hour(21)));
    assert!(!is_late_night(&at_hour(12)));
  }

  #[test]
  fn late_night_uses_offset_as_delivered() {
    // 23:30 at +09:00 is 14:30 UTC; the local hour is what counts.
    let tokyo = FixedOffset::east_opt(9 * 3600)
      .unwrap()
      .with_ymd_and_hms(2025, 1, 15, 23, 30, 0)
      .unwrap();
    assert!(is_late_night(&tokyo));
    assert!(!is_late_night(&tokyo.with_timezone(&FixedOffset::east_opt(0).unwrap())));
  }

  #[test]
  fn revert_prefix_is_literal() {
    assert!(is_revert("Revert \"add feature\""));
    assert!(!is_revert("revert: lowercase"));
    assert!(!is_revert("Reverted something"));
    assert!(!is_revert("fix: Revert handling"));
  }

  #[test]
  fn lead_time_negative_iff_unmerged() {
    let created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(lead_time_days(&pr(created, None)), -1.0);

    let merged = Utc.with_ymd_and_hms(2025, 1, 4, 12, 0, 0).unwrap();
    assert!((lead_time_days(&pr(created, Some(merged))) - 3.5).abs() < 1e-9);
    assert_eq!(lead_time_days(&pr(created, Some(created))), 0.0);
  }

  #[test]
  fn classify_branch_prefixes() {
    assert_eq!(classify_branch("fix/login"), PrType::BugFix);
    assert_eq!(classify_branch("BugFix/crash"), PrType::BugFix);
    assert_eq!(classify_branch("hotfix/prod"), PrType::BugFix);
    assert_eq!(classify_branch("feature/auth"), PrType::Feature);
    assert_eq!(classify_branch("FEAT/x"), PrType::Feature);
    assert_eq!(classify_branch("refactor/db"), PrType::Refactor);
    assert_eq!(classify_branch("chore/deps"), PrType::Refactor);
    assert_eq!(classify_branch("debt/cleanup"), PrType::Refactor);
    assert_eq!(classify_branch("ci/cache"), PrType::Refactor);
    assert_eq!(classify_branch("docs/readme"), PrType::Refactor);
    assert_eq!(classify_branch("main"), PrType::Other);
    assert_eq!(classify_branch("fixes-typo"), PrType::Other);
    assert_eq!(classify_branch(""), PrType::Other);
  }

  #[test]
  fn classification_is_exclusive_for_nested_prefixes() {
    // Only the leading segment matters.
    assert_eq!(classify_branch("fix/feature/x"), PrType::BugFix);
    assert_eq!(classify_branch("feat/fix/x"), PrType::Feature);
  }

  #[test]
  fn age_in_months_truncates() {
    let released = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
    // 89 days -> 2 months, 90 days -> 3 months.
    assert_eq!(age_in_months(released, released + chrono::Duration::days(89)), 2);
    assert_eq!(age_in_months(released, released + chrono::Duration::days(90)), 3);
    assert_eq!(age_in_months(released, released), 0);
  }

  #[test]
  fn format_age_forms() {
    assert_eq!(format_age(5), "5m");
    assert_eq!(format_age(24), "2y");
    assert_eq!(format_age(27), "2y 3m");
    assert_eq!(format_age(0), "0m");
  }

  #[test]
  fn failure_labels_case_insensitive() {
    let mut issue = Issue {
      number: 1,
      title: "t".into(),
      state: ItemState::Open,
      labels: vec!["Incident".into()],
      created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
      closed_at: None,
    };
    assert!(is_failure_issue(&issue));
    issue.labels = vec!["enhancement".into(), "bugs".into()];
    assert!(!is_failure_issue(&issue));
  }

  #[test]
  fn percent_guards_zero() {
    assert_eq!(percent(3, 0), 0.0);
    assert_eq!(percent(1, 4), 25.0);
  }
}
