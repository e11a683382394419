//! Metrics calculator: turns the raw entity lists of one period into the flat
//! `Metrics` record.
//!
//! Sub-computations are independent. Averages over review wait and PR size come
//! in pre-aggregated, since they need per-PR detail fetches the engine bounds.

use crate::dora;
use crate::primitives::{self, PrType};
use crate::types::{
  Commit, Contributor, DateRange, File, Issue, Metrics, PullRequest, Release,
};

/// Everything one metrics pass reads.
#[derive(Debug, Clone, Copy)]
pub struct MetricsInput<'a> {
  pub commits: &'a [Commit],
  pub contributors: &'a [Contributor],
  pub closed_prs: &'a [PullRequest],
  pub open_prs: &'a [PullRequest],
  /// Issues of every state, fetched since period start.
  pub issues: &'a [Issue],
  pub open_issues: &'a [Issue],
  pub files: &'a [File],
  pub releases: &'a [Release],
  pub period: DateRange,
  pub avg_review_wait_hours: f64,
  pub avg_pr_size: u64,
}

pub fn calculate(input: &MetricsInput<'_>) -> Metrics {
  let commit_count = input.commits.len() as u64;
  let prs = pr_breakdown(input.closed_prs);
  let issues = issue_stats(input.issues, &input.period);

  let (deploy_frequency, deploy_frequency_rating) =
    dora::deploy_frequency(input.releases, &input.period);
  let (change_failure_rate, change_failure_rating) =
    dora::change_failure_rate(input.issues, input.releases, input.commits, &input.period);
  let (mttr_hours, mttr_rating) = dora::mttr(input.issues, &input.period);

  let revert_commit_count = primitives::count_reverts(input.commits) as u64;
  let late_night = primitives::count_late_night(input.commits) as u64;

  Metrics {
    total_commits: commit_count,
    commit_frequency: commit_count as f64 / input.period.rate_days(),
    avg_lead_time_days: avg_lead_time(input.closed_prs),
    avg_review_wait_hours: input.avg_review_wait_hours,
    open_pr_count: input.open_prs.len() as u64,
    open_issue_count: input.open_issues.len() as u64,

    bug_fix_ratio: prs.bug_fix_ratio,
    rework_rate: primitives::percent(revert_commit_count, commit_count),
    avg_pr_size: input.avg_pr_size,
    issue_close_rate: issues.close_rate,
    issues_created: issues.created,
    issues_closed: issues.closed,

    feature_pr_count: prs.feature,
    bug_fix_pr_count: prs.bug_fix,
    refactor_pr_count: prs.refactor,
    other_pr_count: prs.other,
    feature_ratio: prs.feature_ratio,
    refactor_ratio: prs.refactor_ratio,

    deploy_frequency,
    deploy_frequency_rating,
    change_failure_rate,
    change_failure_rating,
    mttr_hours,
    mttr_rating,

    revert_commit_count,
    revert_rate: primitives::percent(revert_commit_count, commit_count),

    total_files: input.files.len() as u64,
    total_contributors: input.contributors.len() as u64,
    late_night_commit_rate: primitives::percent(late_night, commit_count),
  }
}

// ---------------------------------------------------------------------------
// PR breakdown
// ---------------------------------------------------------------------------

/// Merged PRs by type; ratios are percentages of merged PRs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrBreakdown {
  pub feature: u64,
  pub bug_fix: u64,
  pub refactor: u64,
  pub other: u64,
  pub bug_fix_ratio: f64,
  pub feature_ratio: f64,
  pub refactor_ratio: f64,
}

impl PrBreakdown {
  pub fn total(&self) -> u64 {
    self.feature + self.bug_fix + self.refactor + self.other
  }
}

pub fn pr_breakdown(prs: &[PullRequest]) -> PrBreakdown {
  let mut b = PrBreakdown::default();
  for pr in prs.iter().filter(|pr| pr.merged_at.is_some()) {
    match primitives::classify_branch(&pr.head_branch) {
      PrType::BugFix => b.bug_fix += 1,
      PrType::Feature => b.feature += 1,
      PrType::Refactor => b.refactor += 1,
      PrType::Other => b.other += 1,
    }
  }

  let total = b.total();
  b.bug_fix_ratio = primitives::percent(b.bug_fix, total);
  b.feature_ratio = primitives::percent(b.feature, total);
  b.refactor_ratio = primitives::percent(b.refactor, total);
  b
}

/// Mean lead time in days over merged PRs; 0 when none merged.
pub fn avg_lead_time(prs: &[PullRequest]) -> f64 {
  let merged: Vec<f64> = prs
    .iter()
    .map(primitives::lead_time_days)
    .filter(|d| *d >= 0.0)
    .collect();
  if merged.is_empty() {
    return 0.0;
  }
  merged.iter().sum::<f64>() / merged.len() as f64
}

// ---------------------------------------------------------------------------
// Issue stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IssueStats {
  pub created: u64,
  pub closed: u64,
  /// closed / created * 100; 0 when nothing was created.
  pub close_rate: f64,
}

/// Counts issues created and closed inside the period (bounds inclusive).
pub fn issue_stats(issues: &[Issue], period: &DateRange) -> IssueStats {
  let created = issues.iter().filter(|i| period.contains(&i.created_at)).count() as u64;
  let closed = issues
    .iter()
    .filter(|i| i.closed_at.map_or(false, |c| period.contains(&c)))
    .count() as u64;
  IssueStats {
    created,
    closed,
    close_rate: primitives::percent(closed, created),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::{DoraRating, ItemState};
  use chrono::{DateTime, Duration, FixedOffset, TimeZone, Utc};

  fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).unwrap()
  }

  fn period() -> DateRange {
    DateRange::new(day(1), day(31))
  }

  fn pr(number: u64, branch: &str, merged: bool) -> PullRequest {
    PullRequest {
      number,
      title: format!("PR {}", number),
      author: "dev".into(),
      head_branch: branch.into(),
      state: ItemState::Closed,
      created_at: day(2),
      merged_at: merged.then(|| day(4)),
      additions: 0,
      deletions: 0,
    }
  }

  fn issue(created: DateTime<Utc>, closed: Option<DateTime<Utc>>) -> Issue {
    Issue {
      number: 1,
      title: "t".into(),
      state: ItemState::Closed,
      labels: vec![],
      created_at: created,
      closed_at: closed,
    }
  }

  fn commit(message: &str, hour: u32) -> Commit {
    Commit {
      sha: "s".into(),
      author: "a".into(),
      email: "a@example.com".into(),
      timestamp: FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2025, 1, 10, hour, 0, 0)
        .unwrap(),
      message: message.into(),
      files: vec![],
    }
  }

  fn empty_input(period: DateRange) -> MetricsInput<'static> {
    MetricsInput {
      commits: &[],
      contributors: &[],
      closed_prs: &[],
      open_prs: &[],
      issues: &[],
      open_issues: &[],
      files: &[],
      releases: &[],
      period,
      avg_review_wait_hours: 0.0,
      avg_pr_size: 0,
    }
  }

  #[test]
  fn pr_breakdown_counts_merged_only() {
    let prs = vec![
      pr(1, "feature/a", true),
      pr(2, "feat/b", true),
      pr(3, "fix/c", true),
      pr(4, "chore/d", true),
      pr(5, "feature/unmerged", false),
    ];
    let b = pr_breakdown(&prs);
    assert_eq!((b.feature, b.bug_fix, b.refactor, b.other), (2, 1, 1, 0));
    assert_eq!(b.total(), 4);
    assert!((b.feature_ratio - 50.0).abs() < 1e-9);
    assert!((b.bug_fix_ratio - 25.0).abs() < 1e-9);
    assert!((b.refactor_ratio - 25.0).abs() < 1e-9);
  }

  #[test]
  fn pr_breakdown_of_nothing_is_zero() {
    let b = pr_breakdown(&[pr(1, "feature/x", false)]);
    assert_eq!(b, PrBreakdown::default());
  }

  #[test]
  fn avg_lead_time_skips_unmerged() {
    let prs = vec![pr(1, "a", true), pr(2, "b", false)];
    assert!((avg_lead_time(&prs) - 2.0).abs() < 1e-9);
    assert_eq!(avg_lead_time(&[pr(3, "c", false)]), 0.0);
  }

  #[test]
  fn issue_stats_window_is_inclusive() {
    let issues = vec![
      issue(day(1), Some(day(31))),
      issue(day(10), None),
      issue(day(1) - Duration::days(5), Some(day(3))),
      issue(day(31) + Duration::seconds(1), None),
    ];
    let st = issue_stats(&issues, &period());
    assert_eq!(st.created, 2);
    assert_eq!(st.closed, 2);
    assert!((st.close_rate - 100.0).abs() < 1e-9);
  }

  #[test]
  fn issue_close_rate_zero_without_created() {
    let st = issue_stats(&[], &period());
    assert_eq!(st, IssueStats::default());
  }

  #[test]
  fn empty_period_is_all_zero_and_not_available() {
    let m = calculate(&empty_input(period()));
    assert_eq!(m.total_commits, 0);
    assert_eq!(m.commit_frequency, 0.0);
    assert_eq!(m.rework_rate, 0.0);
    assert_eq!(m.late_night_commit_rate, 0.0);
    assert_eq!(m.deploy_frequency, 0.0);
    assert_eq!(m.deploy_frequency_rating, DoraRating::NotAvailable);
    assert_eq!(m.change_failure_rating, DoraRating::NotAvailable);
    assert_eq!(m.mttr_rating, DoraRating::NotAvailable);
  }

  #[test]
  fn calculate_fills_commit_driven_fields() {
    let commits = vec![
      commit("Revert \"a\"", 23),
      commit("feat: b", 10),
      commit("fix: c", 11),
      commit("chore: d", 2),
    ];
    let prs = vec![pr(1, "fix/a", true), pr(2, "main", true)];
    let open = vec![pr(3, "feature/x", false)];
    let input = MetricsInput {
      commits: &commits,
      closed_prs: &prs,
      open_prs: &open,
      avg_review_wait_hours: 3.5,
      avg_pr_size: 120,
      ..empty_input(DateRange::new(day(1), day(5)))
    };
    let m = calculate(&input);
    assert_eq!(m.total_commits, 4);
    assert!((m.commit_frequency - 1.0).abs() < 1e-9);
    assert_eq!(m.revert_commit_count, 1);
    assert!((m.revert_rate - 25.0).abs() < 1e-9);
    assert!((m.rework_rate - 25.0).abs() < 1e-9);
    assert!((m.late_night_commit_rate - 50.0).abs() < 1e-9);
    assert!((m.bug_fix_ratio - 50.0).abs() < 1e-9);
    assert_eq!(m.other_pr_count, 1);
    assert_eq!(m.open_pr_count, 1);
    assert_eq!(m.avg_pr_size, 120);
    assert_eq!(m.avg_review_wait_hours, 3.5);
  }
}
