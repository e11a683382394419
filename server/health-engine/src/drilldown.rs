//! Per-entity detail lists kept in the result next to the aggregate scores.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, Timelike};

use crate::primitives;
use crate::types::{
  Commit, Contributor, ContributorDetail, DailyCommit, DateRange, PrDetail, PullRequest, Review,
};

// ---------------------------------------------------------------------------
// PR details
// ---------------------------------------------------------------------------

/// Up to `cap` merged PRs, most recently merged first (ties: higher number first).
pub fn recent_merged(prs: &[PullRequest], cap: usize) -> Vec<&PullRequest> {
  let mut merged: Vec<&PullRequest> = prs.iter().filter(|pr| pr.merged_at.is_some()).collect();
  merged.sort_by(|a, b| b.merged_at.cmp(&a.merged_at).then(b.number.cmp(&a.number)));
  merged.truncate(cap);
  merged
}

/// Hours from PR creation to the earliest review; 0 without reviews or when the
/// earliest review predates the PR.
pub fn review_wait_hours(pr: &PullRequest, reviews: &[Review]) -> f64 {
  let first = match reviews.iter().map(|r| r.submitted_at).min() {
    Some(t) => t,
    None => return 0.0,
  };
  let hours = (first - pr.created_at).num_seconds() as f64 / 3600.0;
  if hours >= 0.0 {
    hours
  } else {
    0.0
  }
}

/// Detail row for one merged PR. `detail` carries additions/deletions when its
/// fetch succeeded; `reviews` is empty when that fetch failed.
pub fn pr_detail(pr: &PullRequest, detail: Option<&PullRequest>, reviews: &[Review]) -> PrDetail {
  let (additions, deletions) = detail.map_or((0, 0), |d| (d.additions, d.deletions));
  PrDetail {
    number: pr.number,
    title: pr.title.clone(),
    author: pr.author.clone(),
    lead_time_days: primitives::lead_time_days(pr),
    size: additions + deletions,
    additions,
    deletions,
    review_wait_hours: review_wait_hours(pr, reviews),
  }
}

/// Integer mean size over PRs with a non-zero size.
pub fn avg_pr_size(details: &[PrDetail]) -> u64 {
  let sized: Vec<u64> = details.iter().map(|d| d.size).filter(|s| *s > 0).collect();
  if sized.is_empty() {
    return 0;
  }
  sized.iter().sum::<u64>() / sized.len() as u64
}

/// Mean review wait over PRs that were reviewed.
pub fn avg_review_wait(details: &[PrDetail]) -> f64 {
  let waits: Vec<f64> = details
    .iter()
    .map(|d| d.review_wait_hours)
    .filter(|w| *w > 0.0)
    .collect();
  if waits.is_empty() {
    return 0.0;
  }
  waits.iter().sum::<f64>() / waits.len() as f64
}

// ---------------------------------------------------------------------------
// Contributors + commit histograms
// ---------------------------------------------------------------------------

pub fn contributor_details(contributors: &[Contributor]) -> Vec<ContributorDetail> {
  let total = contributors
    .iter()
    .fold(0u64, |acc, c| acc.saturating_add(c.contributions));
  contributors
    .iter()
    .map(|c| ContributorDetail {
      name: c.login.clone(),
      commits: c.contributions,
      ratio: primitives::percent(c.contributions, total),
    })
    .collect()
}

/// Commits per hour of day, in each commit's own offset.
pub fn hourly_commits(commits: &[Commit]) -> [u64; 24] {
  let mut hourly = [0u64; 24];
  for c in commits {
    hourly[c.timestamp.hour() as usize] += 1;
  }
  hourly
}

/// One entry per calendar day from period start to period end, zero-filled.
pub fn daily_commits(commits: &[Commit], period: &DateRange) -> Vec<DailyCommit> {
  let mut by_date: BTreeMap<NaiveDate, u64> = BTreeMap::new();
  for c in commits {
    *by_date.entry(c.timestamp.date_naive()).or_insert(0) += 1;
  }

  let mut out = Vec::new();
  let mut current = period.from;
  while current <= period.to {
    let date = current.date_naive();
    out.push(DailyCommit {
      date,
      count: by_date.get(&date).copied().unwrap_or(0),
    });
    current += Duration::days(1);
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::ItemState;
  use chrono::{DateTime, FixedOffset, TimeZone, Utc};

  fn at(d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, d, h, 0, 0).unwrap()
  }

  fn pr(number: u64, merged: Option<DateTime<Utc>>) -> PullRequest {
    PullRequest {
      number,
      title: format!("PR {}", number),
      author: "dev".into(),
      head_branch: "feature/x".into(),
      state: ItemState::Closed,
      created_at: at(1, 0),
      merged_at: merged,
      additions: 0,
      deletions: 0,
    }
  }

  fn review(at: DateTime<Utc>) -> Review {
    Review {
      id: 1,
      author: "rev".into(),
      state: "APPROVED".into(),
      submitted_at: at,
    }
  }

  fn commit(d: u32, h: u32) -> Commit {
    Commit {
      sha: "s".into(),
      author: "a".into(),
      email: "a@example.com".into(),
      timestamp: FixedOffset::east_opt(9 * 3600)
        .unwrap()
        .with_ymd_and_hms(2025, 1, d, h, 0, 0)
        .unwrap(),
      message: "m".into(),
      files: vec![],
    }
  }

  #[test]
  fn recent_merged_orders_and_caps() {
    let prs = vec![
      pr(1, Some(at(3, 0))),
      pr(2, None),
      pr(3, Some(at(5, 0))),
      pr(4, Some(at(3, 0))),
      pr(5, Some(at(2, 0))),
    ];
    let numbers: Vec<u64> = recent_merged(&prs, 3).iter().map(|p| p.number).collect();
    assert_eq!(numbers, vec![3, 4, 1]);
    assert!(recent_merged(&prs, 0).is_empty());
  }

  #[test]
  fn review_wait_uses_earliest_review() {
    let p = pr(1, Some(at(5, 0)));
    let reviews = vec![review(at(2, 0)), review(at(1, 6))];
    assert!((review_wait_hours(&p, &reviews) - 6.0).abs() < 1e-9);
    assert_eq!(review_wait_hours(&p, &[]), 0.0);
  }

  #[test]
  fn review_before_creation_is_ignored() {
    let mut p = pr(1, Some(at(5, 0)));
    p.created_at = at(3, 0);
    assert_eq!(review_wait_hours(&p, &[review(at(2, 0))]), 0.0);
  }

  #[test]
  fn pr_detail_without_detail_fetch_has_zero_size() {
    let p = pr(7, Some(at(3, 0)));
    let row = pr_detail(&p, None, &[]);
    assert_eq!(row.size, 0);
    assert!((row.lead_time_days - 2.0).abs() < 1e-9);

    let mut d = p.clone();
    d.additions = 30;
    d.deletions = 12;
    let row = pr_detail(&p, Some(&d), &[]);
    assert_eq!((row.size, row.additions, row.deletions), (42, 30, 12));
  }

  #[test]
  fn averages_skip_zero_entries() {
    let p = pr(1, Some(at(3, 0)));
    let mut rows = vec![pr_detail(&p, None, &[]); 3];
    rows[0].size = 100;
    rows[1].size = 201;
    rows[0].review_wait_hours = 4.0;
    assert_eq!(avg_pr_size(&rows), 150);
    assert_eq!(avg_review_wait(&rows), 4.0);
    assert_eq!(avg_pr_size(&[]), 0);
    assert_eq!(avg_review_wait(&[]), 0.0);
  }

  #[test]
  fn contributor_ratio_is_percent() {
    let contributors = vec![
      Contributor { login: "a".into(), contributions: 75 },
      Contributor { login: "b".into(), contributions: 25 },
    ];
    let details = contributor_details(&contributors);
    assert_eq!(details[0].ratio, 75.0);
    assert_eq!(details[1].commits, 25);
  }

  #[test]
  fn contributor_ratio_survives_huge_counts() {
    let contributors = vec![
      Contributor { login: "a".into(), contributions: u64::MAX },
      Contributor { login: "b".into(), contributions: 1 },
    ];
    let details = contributor_details(&contributors);
    assert!((details[0].ratio - 100.0).abs() < 1e-9);
    assert!(details[1].ratio < 1e-9);
    assert_eq!(details[0].commits, u64::MAX);
  }

  #[test]
  fn hourly_uses_local_hour() {
    let commits = vec![commit(2, 23), commit(2, 23), commit(3, 1)];
    let hourly = hourly_commits(&commits);
    assert_eq!(hourly[23], 2);
    assert_eq!(hourly[1], 1);
    assert_eq!(hourly.iter().sum::<u64>(), 3);
  }

  #[test]
  fn daily_is_zero_filled_and_inclusive() {
    let period = DateRange::new(at(1, 0), at(4, 0));
    let commits = vec![commit(2, 10), commit(2, 11), commit(4, 9)];
    let daily = daily_commits(&commits, &period);
    let counts: Vec<u64> = daily.iter().map(|d| d.count).collect();
    assert_eq!(daily.len(), 4);
    assert_eq!(counts, vec![0, 2, 0, 1]);
    assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
  }
}
