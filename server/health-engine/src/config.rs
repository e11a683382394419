//! Engine configuration with sane defaults.

use serde::Deserialize;

use crate::score::PenaltyTable;

/// Fixed thresholds for risk detection, scoring and trend comparison.
/// Deserializes from a partial object; missing keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Changes to one file that raise a Medium change-concentration risk.
  pub change_concentration_warning: u64,
  /// Changes to one file that raise a High change-concentration risk.
  pub change_concentration_critical: u64,
  /// Top contributor share (0..1) that counts as a knowledge silo.
  pub ownership_ratio: f64,
  /// Late-night commit share (0..1) that counts as unsustainable.
  pub late_night_ratio: f64,
  pub large_file_warning_bytes: u64,
  pub large_file_critical_bytes: u64,
  pub outdated_dep_warning_months: i64,
  pub outdated_dep_critical_months: i64,
  /// Average PR lead time (days) above which delivery counts as slow.
  pub lead_time_days: f64,
  pub review_wait_hours: f64,
  /// Average PR size (added + deleted lines).
  pub pr_size_lines: u64,
  /// Issue close rate (%) below which issues pile up.
  pub issue_close_rate_pct: f64,
  pub bug_fix_ratio_pct: f64,
  pub deploy_frequency_per_month: f64,
  pub change_failure_pct: f64,
  pub mttr_hours: f64,
  /// Feature PR share (%) below which investment counts as low.
  pub feature_investment_pct: f64,
  /// Max merged PRs whose detail and reviews are fetched.
  pub max_pr_details: usize,
  /// Trend deltas within +/- this percentage are reported as "same".
  pub trend_same_band_pct: f64,
  pub penalties: PenaltyTable,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      change_concentration_warning: 10,
      change_concentration_critical: 20,
      ownership_ratio: 0.8,
      late_night_ratio: 0.3,
      large_file_warning_bytes: 50 * 1024,
      large_file_critical_bytes: 100 * 1024,
      outdated_dep_warning_months: 24,
      outdated_dep_critical_months: 36,
      lead_time_days: 7.0,
      review_wait_hours: 48.0,
      pr_size_lines: 500,
      issue_close_rate_pct: 50.0,
      bug_fix_ratio_pct: 50.0,
      deploy_frequency_per_month: 1.0,
      change_failure_pct: 30.0,
      mttr_hours: 24.0,
      feature_investment_pct: 30.0,
      max_pr_details: 20,
      trend_same_band_pct: 5.0,
      penalties: PenaltyTable::default(),
    }
  }
}
