//! Risk detectors. Each inspects one slice of raw data or one computed metric
//! against a fixed threshold and returns zero or more risks.
//!
//! Detectors are independent: none reads another's output and none mutates input.
//! Aggregating detectors (large files, outdated dependencies) emit at most one risk
//! per severity bucket and return the offending items separately for drill-down.

use std::collections::BTreeMap;

use crate::config::Config;
use crate::primitives;
use crate::risk::{Risk, RiskType, Severity, REPOSITORY_TARGET};
use crate::types::{
  Commit, Contributor, Dependency, File, LargeFile, Metrics, OutdatedDependency,
};

// ---------------------------------------------------------------------------
// Data-based detectors
// ---------------------------------------------------------------------------

/// One risk per file path touched by at least `change_concentration_warning` commits.
/// Paths are reported in lexical order.
pub fn change_concentration(commits: &[Commit], config: &Config) -> Vec<Risk> {
  let mut changes: BTreeMap<&str, u64> = BTreeMap::new();
  for c in commits {
    for f in &c.files {
      *changes.entry(f.as_str()).or_insert(0) += 1;
    }
  }

  changes
    .into_iter()
    .filter_map(|(path, count)| {
      let (severity, threshold) = if count >= config.change_concentration_critical {
        (Severity::High, config.change_concentration_critical)
      } else if count >= config.change_concentration_warning {
        (Severity::Medium, config.change_concentration_warning)
      } else {
        return None;
      };
      Some(
        Risk::new(
          RiskType::ChangeConcentration,
          severity,
          path,
          count as i64,
          threshold as i64,
        )
        .with_description(format!("{} was changed in {} commits", path, count)),
      )
    })
    .collect()
}

/// Top contributor (index 0) holding `ownership_ratio` or more of all contributions.
pub fn ownership(contributors: &[Contributor], config: &Config) -> Vec<Risk> {
  let top = match contributors.first() {
    Some(c) => c,
    None => return Vec::new(),
  };
  let total = contributors
    .iter()
    .fold(0u64, |acc, c| acc.saturating_add(c.contributions));
  if total == 0 {
    return Vec::new();
  }

  let ratio = top.contributions as f64 / total as f64;
  if ratio < config.ownership_ratio {
    return Vec::new();
  }
  vec![Risk::new(
    RiskType::Ownership,
    Severity::Medium,
    top.login.as_str(),
    (ratio * 100.0) as i64,
    pct_threshold(config.ownership_ratio),
  )
  .with_description("One contributor accounts for most of the commits")]
}

pub fn late_night(commits: &[Commit], config: &Config) -> Vec<Risk> {
  if commits.is_empty() {
    return Vec::new();
  }
  let ratio = primitives::count_late_night(commits) as f64 / commits.len() as f64;
  if ratio < config.late_night_ratio {
    return Vec::new();
  }
  vec![Risk::new(
    RiskType::LateNight,
    Severity::Medium,
    REPOSITORY_TARGET,
    (ratio * 100.0) as i64,
    pct_threshold(config.late_night_ratio),
  )
  .with_description("Many commits happen late at night")]
}

/// Files of at least `large_file_critical_bytes` (High) or `large_file_warning_bytes`
/// (Medium), aggregated into one risk per bucket.
pub fn large_files(files: &[File], config: &Config) -> (Vec<Risk>, Vec<LargeFile>) {
  let mut listed = Vec::new();
  let (mut high, mut medium) = (0u64, 0u64);

  for f in files {
    let severity = if f.size >= config.large_file_critical_bytes {
      high += 1;
      Severity::High
    } else if f.size >= config.large_file_warning_bytes {
      medium += 1;
      Severity::Medium
    } else {
      continue;
    };
    listed.push(LargeFile {
      path: f.path.clone(),
      size_kb: f.size / 1024,
      severity,
    });
  }

  let mut risks = Vec::new();
  for (severity, count, bytes, noun) in [
    (Severity::High, high, config.large_file_critical_bytes, "huge"),
    (Severity::Medium, medium, config.large_file_warning_bytes, "large"),
  ] {
    if count == 0 {
      continue;
    }
    let kb = bytes / 1024;
    risks.push(
      Risk::new(
        RiskType::LargeFile,
        severity,
        format!("{} files", count),
        count as i64,
        kb as i64,
      )
      .with_description(format!("There are {} files of {}KB or more", noun, kb)),
    );
  }
  (risks, listed)
}

/// Dependencies at least `outdated_dep_critical_months` (High) or
/// `outdated_dep_warning_months` (Medium) old, aggregated like large files.
pub fn outdated_dependencies(
  dependencies: &[Dependency],
  config: &Config,
) -> (Vec<Risk>, Vec<OutdatedDependency>) {
  let mut listed = Vec::new();
  let (mut high, mut medium) = (0u64, 0u64);

  for dep in dependencies {
    let severity = if dep.age_months >= config.outdated_dep_critical_months {
      high += 1;
      Severity::High
    } else if dep.age_months >= config.outdated_dep_warning_months {
      medium += 1;
      Severity::Medium
    } else {
      continue;
    };
    listed.push(OutdatedDependency {
      name: dep.name.clone(),
      version: dep.version.clone(),
      ecosystem: dep.ecosystem.clone(),
      age_months: dep.age_months,
      age: primitives::format_age(dep.age_months),
      severity,
    });
  }

  let mut risks = Vec::new();
  for (severity, count, months) in [
    (Severity::High, high, config.outdated_dep_critical_months),
    (Severity::Medium, medium, config.outdated_dep_warning_months),
  ] {
    if count == 0 {
      continue;
    }
    risks.push(
      Risk::new(
        RiskType::OutdatedDeps,
        severity,
        format!("{} dependencies", count),
        count as i64,
        months,
      )
      .with_description(format!(
        "There are dependencies released {} or more years ago",
        months / 12
      )),
    );
  }
  (risks, listed)
}

// ---------------------------------------------------------------------------
// Metric-based detectors
// ---------------------------------------------------------------------------

/// All metric-based detectors, in a fixed order.
pub fn metric_risks(metrics: &Metrics, config: &Config) -> Vec<Risk> {
  [
    slow_lead_time(metrics, config),
    slow_review(metrics, config),
    large_pr(metrics, config),
    low_issue_close(metrics, config),
    high_bug_fix_ratio(metrics, config),
    low_deploy_frequency(metrics, config),
    high_change_failure(metrics, config),
    slow_recovery(metrics, config),
    low_feature_investment(metrics, config),
  ]
  .into_iter()
  .flatten()
  .collect()
}

pub fn slow_lead_time(m: &Metrics, config: &Config) -> Option<Risk> {
  (m.avg_lead_time_days > config.lead_time_days).then(|| {
    repository_risk(
      RiskType::SlowLeadTime,
      Severity::Medium,
      tenths(m.avg_lead_time_days),
      config.lead_time_days as i64,
      format!("PR lead time averages {:.1} days", m.avg_lead_time_days),
    )
  })
}

pub fn slow_review(m: &Metrics, config: &Config) -> Option<Risk> {
  (m.avg_review_wait_hours > config.review_wait_hours).then(|| {
    repository_risk(
      RiskType::SlowReview,
      Severity::Medium,
      tenths(m.avg_review_wait_hours),
      config.review_wait_hours as i64,
      format!("Reviews wait {:.1} hours on average", m.avg_review_wait_hours),
    )
  })
}

pub fn large_pr(m: &Metrics, config: &Config) -> Option<Risk> {
  (m.avg_pr_size > config.pr_size_lines).then(|| {
    repository_risk(
      RiskType::LargePr,
      Severity::Medium,
      m.avg_pr_size as i64,
      config.pr_size_lines as i64,
      format!("PRs average {} changed lines", m.avg_pr_size),
    )
  })
}

/// Only judged when issues were created in the period.
pub fn low_issue_close(m: &Metrics, config: &Config) -> Option<Risk> {
  (m.issues_created > 0 && m.issue_close_rate < config.issue_close_rate_pct).then(|| {
    repository_risk(
      RiskType::LowIssueClose,
      Severity::Medium,
      m.issue_close_rate as i64,
      config.issue_close_rate_pct as i64,
      format!("Issue close rate is {:.1}%", m.issue_close_rate),
    )
  })
}

pub fn high_bug_fix_ratio(m: &Metrics, config: &Config) -> Option<Risk> {
  (m.bug_fix_ratio > config.bug_fix_ratio_pct).then(|| {
    repository_risk(
      RiskType::BugFixHigh,
      Severity::Medium,
      m.bug_fix_ratio as i64,
      config.bug_fix_ratio_pct as i64,
      format!("Bug-fix PRs make up {:.1}%", m.bug_fix_ratio),
    )
  })
}

/// Zero frequency means no deploy data, not a slow team.
pub fn low_deploy_frequency(m: &Metrics, config: &Config) -> Option<Risk> {
  (m.deploy_frequency > 0.0 && m.deploy_frequency < config.deploy_frequency_per_month).then(|| {
    repository_risk(
      RiskType::LowDeployFreq,
      Severity::Medium,
      tenths(m.deploy_frequency),
      tenths(config.deploy_frequency_per_month),
      format!("Deploys happen {:.1} times per month", m.deploy_frequency),
    )
  })
}

pub fn high_change_failure(m: &Metrics, config: &Config) -> Option<Risk> {
  (m.change_failure_rate > config.change_failure_pct).then(|| {
    repository_risk(
      RiskType::HighChangeFailure,
      Severity::High,
      m.change_failure_rate as i64,
      config.change_failure_pct as i64,
      format!("Change failure rate is {:.1}%", m.change_failure_rate),
    )
  })
}

pub fn slow_recovery(m: &Metrics, config: &Config) -> Option<Risk> {
  (m.mttr_hours > config.mttr_hours).then(|| {
    repository_risk(
      RiskType::SlowRecovery,
      Severity::Medium,
      tenths(m.mttr_hours),
      tenths(config.mttr_hours),
      format!("Mean time to recovery is {:.1} hours", m.mttr_hours),
    )
  })
}

/// Only judged when merged PRs were classified.
pub fn low_feature_investment(m: &Metrics, config: &Config) -> Option<Risk> {
  (m.classified_pr_count() > 0 && m.feature_ratio < config.feature_investment_pct).then(|| {
    repository_risk(
      RiskType::LowFeatureInvestment,
      Severity::Medium,
      m.feature_ratio as i64,
      config.feature_investment_pct as i64,
      format!("Feature PRs make up {:.1}%", m.feature_ratio),
    )
  })
}

fn repository_risk(
  risk_type: RiskType,
  severity: Severity,
  value: i64,
  threshold: i64,
  description: String,
) -> Risk {
  Risk::new(risk_type, severity, REPOSITORY_TARGET, value, threshold).with_description(description)
}

/// Fractional metric stored as an integer number of tenths (truncated).
fn tenths(v: f64) -> i64 {
  (v * 10.0) as i64
}

/// Ratio threshold (0..1) as a whole percentage.
fn pct_threshold(ratio: f64) -> i64 {
  (ratio * 100.0).round() as i64
}
