//! Risk vocabulary: categories, risk types, severities and the fixed lookup tables
//! (category mapping, display names, diagnosis text, detail formatting).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// One of the four fixed groupings used to partition risks and compute sub-scores.
/// Declaration order is the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
  Velocity,
  Quality,
  TechDebt,
  Health,
}

impl Category {
  pub const ALL: [Category; 4] = [
    Category::Velocity,
    Category::Quality,
    Category::TechDebt,
    Category::Health,
  ];
}

// ---------------------------------------------------------------------------
// Risk type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskType {
  ChangeConcentration,
  LargeFile,
  Ownership,
  OutdatedDeps,
  LateNight,
  SlowLeadTime,
  SlowReview,
  LargePr,
  LowIssueClose,
  BugFixHigh,
  LowDeployFreq,
  HighChangeFailure,
  SlowRecovery,
  LowFeatureInvestment,
}

impl RiskType {
  /// Parse the wire name (`change_concentration`, `large_pr`, ...).
  pub fn from_str_loose(s: &str) -> Option<Self> {
    let t = match s.trim().to_ascii_lowercase().as_str() {
      "change_concentration" => Self::ChangeConcentration,
      "large_file" => Self::LargeFile,
      "ownership" => Self::Ownership,
      "outdated_deps" => Self::OutdatedDeps,
      "late_night" => Self::LateNight,
      "slow_lead_time" => Self::SlowLeadTime,
      "slow_review" => Self::SlowReview,
      "large_pr" => Self::LargePr,
      "low_issue_close" => Self::LowIssueClose,
      "bug_fix_high" => Self::BugFixHigh,
      "low_deploy_freq" => Self::LowDeployFreq,
      "high_change_failure" => Self::HighChangeFailure,
      "slow_recovery" => Self::SlowRecovery,
      "low_feature_investment" => Self::LowFeatureInvestment,
      _ => return None,
    };
    Some(t)
  }

  pub fn category(self) -> Category {
    match self {
      Self::SlowLeadTime | Self::SlowReview | Self::LowDeployFreq | Self::SlowRecovery => {
        Category::Velocity
      }
      Self::ChangeConcentration
      | Self::LargePr
      | Self::LowIssueClose
      | Self::BugFixHigh
      | Self::HighChangeFailure => Category::Quality,
      Self::LargeFile | Self::OutdatedDeps | Self::LowFeatureInvestment => Category::TechDebt,
      Self::LateNight | Self::Ownership => Category::Health,
    }
  }

  /// Category for a risk type given by wire name. Unknown names land in Quality.
  pub fn category_of(name: &str) -> Category {
    Self::from_str_loose(name)
      .map(Self::category)
      .unwrap_or(Category::Quality)
  }

  pub fn display_name(self) -> &'static str {
    match self {
      Self::ChangeConcentration => "Change concentration",
      Self::LargeFile => "Large files",
      Self::Ownership => "Knowledge silo",
      Self::OutdatedDeps => "Outdated dependencies",
      Self::LateNight => "Late-night work",
      Self::SlowLeadTime => "Slow PR lead time",
      Self::SlowReview => "Slow review",
      Self::LargePr => "Large PRs",
      Self::LowIssueClose => "Low issue close rate",
      Self::BugFixHigh => "High bug-fix ratio",
      Self::LowDeployFreq => "Low deploy frequency",
      Self::HighChangeFailure => "High change failure rate",
      Self::SlowRecovery => "Slow recovery",
      Self::LowFeatureInvestment => "Low feature investment",
    }
  }

  /// One-line diagnosis used when this type is the worst risk of a category.
  pub fn diagnosis(self) -> &'static str {
    match self {
      Self::SlowLeadTime => "PR lead time is long and delivery speed is dropping",
      Self::SlowReview => "Reviews wait too long and feedback is delayed",
      Self::ChangeConcentration => "Changes concentrate on a few files, raising quality risk",
      Self::LargePr => "PRs are large, which can lower review quality",
      Self::LowIssueClose => "Issues are not being closed fast enough and debt is piling up",
      Self::BugFixHigh => "A high share of work is bug fixing, pointing at quality problems",
      Self::LargeFile => "Many oversized files hurt maintainability",
      Self::OutdatedDeps => "Old dependency versions carry security risk",
      Self::LateNight => "Frequent late-night work threatens team sustainability",
      Self::Ownership => "Knowledge is concentrated in one person",
      Self::LowDeployFreq => "Deploys are infrequent and value reaches users slowly",
      Self::HighChangeFailure => "Many changes fail in production, release quality needs work",
      Self::SlowRecovery => "Recovery from incidents takes too long",
      Self::LowFeatureInvestment => "Little investment goes into features; the team is busy with upkeep",
    }
  }
}

// ---------------------------------------------------------------------------
// Severity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Low,
  Medium,
  High,
}

// ---------------------------------------------------------------------------
// Risk
// ---------------------------------------------------------------------------

/// Target used by detectors that judge the repository as a whole.
pub const REPOSITORY_TARGET: &str = "repository";

/// One detected risk. `value` and `threshold` are per-type; fractional metrics
/// (lead time, review wait, deploy frequency, MTTR) are stored scaled by 10.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Risk {
  #[serde(rename = "type")]
  pub risk_type: RiskType,
  pub severity: Severity,
  pub target: String,
  pub description: String,
  pub value: i64,
  pub threshold: i64,
}

impl Risk {
  pub fn new(
    risk_type: RiskType,
    severity: Severity,
    target: impl Into<String>,
    value: i64,
    threshold: i64,
  ) -> Self {
    Self {
      risk_type,
      severity,
      target: target.into(),
      description: String::new(),
      value,
      threshold,
    }
  }

  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = description.into();
    self
  }

  pub fn category(&self) -> Category {
    self.risk_type.category()
  }

  /// "value vs threshold" sentence for score breakdown lines. Empty when both are zero.
  pub fn detail(&self) -> String {
    if self.value == 0 && self.threshold == 0 {
      return String::new();
    }
    let (v, t) = (self.value, self.threshold);
    let tenths = |n: i64| n as f64 / 10.0;
    match self.risk_type {
      RiskType::LateNight => format!("{}% of commits between 22:00 and 05:00, limit {}%", v, t),
      RiskType::Ownership => format!("one person made {}% of commits, limit {}%", v, t),
      RiskType::ChangeConcentration => format!("changed {} times, limit {}", v, t),
      RiskType::LargeFile => format!("{} files of {}KB or more", v, t),
      RiskType::OutdatedDeps => format!("{} dependencies {} years old or more", v, t / 12),
      RiskType::SlowLeadTime => format!("average {:.1} days, limit {} days", tenths(v), t),
      RiskType::SlowReview => format!("average {:.1} hours, limit {} hours", tenths(v), t),
      RiskType::LargePr => format!("average {} lines, limit {} lines", v, t),
      RiskType::LowIssueClose => format!("close rate {}%, target {}% or more", v, t),
      RiskType::BugFixHigh => format!("bug fixes {}%, limit {}%", v, t),
      RiskType::LowDeployFreq => format!(
        "{:.1} per month, target {:.1} per month or more",
        tenths(v),
        tenths(t)
      ),
      RiskType::HighChangeFailure => format!("failure rate {}%, limit {}%", v, t),
      RiskType::SlowRecovery => format!(
        "average {:.1} hours, limit {:.1} hours",
        tenths(v),
        tenths(t)
      ),
      RiskType::LowFeatureInvestment => format!("features {}%, target {}% or more", v, t),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const ALL_TYPES: [RiskType; 14] = [
    RiskType::ChangeConcentration,
    RiskType::LargeFile,
    RiskType::Ownership,
    RiskType::OutdatedDeps,
    RiskType::LateNight,
    RiskType::SlowLeadTime,
    RiskType::SlowReview,
    RiskType::LargePr,
    RiskType::LowIssueClose,
    RiskType::BugFixHigh,
    RiskType::LowDeployFreq,
    RiskType::HighChangeFailure,
    RiskType::SlowRecovery,
    RiskType::LowFeatureInvestment,
  ];

  #[test]
  fn category_mapping_matches_table() {
    assert_eq!(RiskType::SlowLeadTime.category(), Category::Velocity);
    assert_eq!(RiskType::SlowRecovery.category(), Category::Velocity);
    assert_eq!(RiskType::ChangeConcentration.category(), Category::Quality);
    assert_eq!(RiskType::HighChangeFailure.category(), Category::Quality);
    assert_eq!(RiskType::LargeFile.category(), Category::TechDebt);
    assert_eq!(RiskType::LowFeatureInvestment.category(), Category::TechDebt);
    assert_eq!(RiskType::LateNight.category(), Category::Health);
    assert_eq!(RiskType::Ownership.category(), Category::Health);
  }

  #[test]
  fn wire_names_round_trip_through_parser() {
    for t in ALL_TYPES {
      let wire = serde_json::to_value(t).unwrap();
      let name = wire.as_str().unwrap();
      assert_eq!(RiskType::from_str_loose(name), Some(t));
      assert_eq!(RiskType::category_of(name), t.category());
    }
  }

  #[test]
  fn unknown_type_name_falls_back_to_quality() {
    assert_eq!(RiskType::category_of("mystery_risk"), Category::Quality);
    assert_eq!(RiskType::category_of(""), Category::Quality);
  }

  #[test]
  fn every_type_has_display_and_diagnosis() {
    for t in ALL_TYPES {
      assert!(!t.display_name().is_empty());
      assert!(!t.diagnosis().is_empty());
    }
  }

  #[test]
  fn detail_formats_scaled_values() {
    let r = Risk::new(RiskType::SlowLeadTime, Severity::Medium, REPOSITORY_TARGET, 105, 7);
    assert_eq!(r.detail(), "average 10.5 days, limit 7 days");

    let r = Risk::new(RiskType::OutdatedDeps, Severity::High, "3 dependencies", 3, 36);
    assert_eq!(r.detail(), "3 dependencies 3 years old or more");
  }

  #[test]
  fn detail_is_empty_without_numbers() {
    let r = Risk::new(RiskType::LateNight, Severity::Medium, REPOSITORY_TARGET, 0, 0);
    assert!(r.detail().is_empty());
  }

  #[test]
  fn risk_serializes_type_field() {
    let r = Risk::new(RiskType::LargePr, Severity::Medium, REPOSITORY_TARGET, 800, 500);
    let json = serde_json::to_value(&r).unwrap();
    assert_eq!(json["type"], "large_pr");
    assert_eq!(json["severity"], "medium");
  }
}
