//! Period-over-period comparison of a few headline metrics.

use crate::metrics;
use crate::types::{Commit, DateRange, Direction, Issue, Metrics, TrendDelta};

pub const COMMIT_COUNT: &str = "commit_count";
pub const COMMIT_FREQUENCY: &str = "commit_frequency";
pub const ISSUE_CLOSE_RATE: &str = "issue_close_rate";

/// Deltas for commit count, commit frequency and issue close rate against the
/// raw data of the preceding period.
pub fn compare(
  current: &Metrics,
  prev_commits: &[Commit],
  prev_issues: &[Issue],
  prev_period: &DateRange,
  same_band_pct: f64,
) -> Vec<TrendDelta> {
  let prev_count = prev_commits.len() as f64;
  let prev_frequency = prev_count / prev_period.rate_days();
  let prev_close_rate = metrics::issue_stats(prev_issues, prev_period).close_rate;

  vec![
    delta(COMMIT_COUNT, current.total_commits as f64, prev_count, same_band_pct),
    delta(COMMIT_FREQUENCY, current.commit_frequency, prev_frequency, same_band_pct),
    delta(ISSUE_CLOSE_RATE, current.issue_close_rate, prev_close_rate, same_band_pct),
  ]
}

/// Percent change from `previous`; 0 (and "same") when there is no previous value.
pub fn delta(metric: &str, current: f64, previous: f64, same_band_pct: f64) -> TrendDelta {
  let delta_pct = if previous > 0.0 {
    (current - previous) / previous * 100.0
  } else {
    0.0
  };

  let direction = if delta_pct.abs() <= same_band_pct {
    Direction::Same
  } else if delta_pct > 0.0 {
    Direction::Up
  } else {
    Direction::Down
  };

  TrendDelta {
    metric: metric.to_string(),
    current,
    previous,
    delta_pct,
    direction,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::types::ItemState;
  use chrono::{DateTime, FixedOffset, TimeZone, Utc};

  const BAND: f64 = 5.0;

  #[test]
  fn direction_bands() {
    let up = delta(COMMIT_COUNT, 120.0, 100.0, BAND);
    assert!((up.delta_pct - 20.0).abs() < 1e-9);
    assert_eq!(up.direction, Direction::Up);

    assert_eq!(delta(COMMIT_COUNT, 80.0, 100.0, BAND).direction, Direction::Down);
    assert_eq!(delta(COMMIT_COUNT, 102.0, 100.0, BAND).direction, Direction::Same);
    assert_eq!(delta(COMMIT_COUNT, 104.0, 100.0, BAND).direction, Direction::Same);
    assert_eq!(delta(COMMIT_COUNT, 96.0, 100.0, BAND).direction, Direction::Same);
    assert_eq!(delta(COMMIT_COUNT, 94.0, 100.0, BAND).direction, Direction::Down);
  }

  #[test]
  fn zero_previous_is_same_with_zero_delta() {
    let d = delta(COMMIT_COUNT, 50.0, 0.0, BAND);
    assert_eq!(d.delta_pct, 0.0);
    assert_eq!(d.direction, Direction::Same);
  }

  fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, d, 0, 0, 0).unwrap()
  }

  fn commit() -> Commit {
    Commit {
      sha: "s".into(),
      author: "a".into(),
      email: "a@example.com".into(),
      timestamp: FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2025, 1, 3, 12, 0, 0)
        .unwrap(),
      message: "m".into(),
      files: vec![],
    }
  }

  #[test]
  fn compare_emits_three_metrics_in_order() {
    let prev_period = DateRange::new(day(1), day(11));
    let prev_commits: Vec<Commit> = (0..10).map(|_| commit()).collect();
    let prev_issues = vec![
      Issue {
        number: 1,
        title: "a".into(),
        state: ItemState::Closed,
        labels: vec![],
        created_at: day(2),
        closed_at: Some(day(3)),
      },
      Issue {
        number: 2,
        title: "b".into(),
        state: ItemState::Open,
        labels: vec![],
        created_at: day(2),
        closed_at: None,
      },
    ];
    let current = Metrics {
      total_commits: 20,
      commit_frequency: 2.0,
      issue_close_rate: 50.0,
      ..Metrics::default()
    };

    let trends = compare(&current, &prev_commits, &prev_issues, &prev_period, BAND);
    let names: Vec<&str> = trends.iter().map(|t| t.metric.as_str()).collect();
    assert_eq!(names, vec![COMMIT_COUNT, COMMIT_FREQUENCY, ISSUE_CLOSE_RATE]);

    assert_eq!(trends[0].previous, 10.0);
    assert_eq!(trends[0].direction, Direction::Up);
    assert!((trends[1].previous - 1.0).abs() < 1e-9);
    assert!((trends[1].delta_pct - 100.0).abs() < 1e-9);
    assert_eq!(trends[2].previous, 50.0);
    assert_eq!(trends[2].direction, Direction::Same);
  }
}
