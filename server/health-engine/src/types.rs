//! Core types for the health engine (JSON contracts + internal models).

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::risk::{Category, Risk, Severity};
use crate::score::{CategoryScore, Score};

// ---------------------------------------------------------------------------
// Repository identity + analysis period
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
  pub owner: String,
  pub name: String,
}

impl Repository {
  pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
    Self {
      owner: owner.into(),
      name: name.into(),
    }
  }

  /// "owner/name".
  pub fn full_name(&self) -> String {
    format!("{}/{}", self.owner, self.name)
  }
}

/// Analysis window; both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub from: DateTime<Utc>,
  pub to: DateTime<Utc>,
}

impl DateRange {
  pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
    Self { from, to }
  }

  /// Whole days between the bounds (truncated).
  pub fn days(&self) -> i64 {
    (self.to - self.from).num_days()
  }

  /// Day count used as a rate denominator; never below 1.
  pub fn rate_days(&self) -> f64 {
    self.days().max(1) as f64
  }

  pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
    *ts >= self.from && *ts <= self.to
  }

  /// The preceding window of the same length, ending the day before this one starts.
  pub fn previous(&self) -> DateRange {
    let to = self.from - Duration::days(1);
    let from = to - Duration::days(self.days());
    DateRange { from, to }
  }
}

// ---------------------------------------------------------------------------
// Raw entities (owned by the data source, read-only here)
// ---------------------------------------------------------------------------

/// Commit timestamps keep the offset they were recorded with; no normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Commit {
  pub sha: String,
  pub author: String,
  pub email: String,
  pub timestamp: DateTime<FixedOffset>,
  pub message: String,
  pub files: Vec<String>,
}

/// Contributors arrive ranked; index 0 is the top contributor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contributor {
  pub login: String,
  pub contributions: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
  Open,
  Closed,
}

impl ItemState {
  pub fn from_str_loose(s: &str) -> Option<Self> {
    match s.to_ascii_lowercase().as_str() {
      "open" => Some(Self::Open),
      "closed" | "merged" => Some(Self::Closed),
      _ => None,
    }
  }
}

/// State filter for PR and issue fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFilter {
  Open,
  Closed,
  All,
}

impl StateFilter {
  pub fn matches(self, state: ItemState) -> bool {
    match self {
      Self::Open => state == ItemState::Open,
      Self::Closed => state == ItemState::Closed,
      Self::All => true,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullRequest {
  pub number: u64,
  pub title: String,
  pub author: String,
  pub head_branch: String,
  pub state: ItemState,
  pub created_at: DateTime<Utc>,
  /// None for unmerged PRs.
  pub merged_at: Option<DateTime<Utc>>,
  pub additions: u64,
  pub deletions: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Review {
  pub id: u64,
  pub author: String,
  pub state: String,
  pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
  pub number: u64,
  pub title: String,
  pub state: ItemState,
  pub labels: Vec<String>,
  pub created_at: DateTime<Utc>,
  pub closed_at: Option<DateTime<Utc>>,
}

/// Releases stand in for deploy events.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
  pub id: u64,
  pub tag_name: String,
  pub name: String,
  pub published_at: DateTime<Utc>,
}

/// Snapshot of the current tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
  pub path: String,
  pub size: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
  pub name: String,
  pub version: String,
  pub released_at: DateTime<Utc>,
  pub age_months: i64,
  /// "npm", "go", "pypi", ...
  pub ecosystem: String,
}

// ---------------------------------------------------------------------------
// Inbound snapshot (JSON contract: what the caller sends the binary)
// ---------------------------------------------------------------------------

/// One snapshot of everything the data source would return. Unknown fields are
/// ignored. Absent optional sections behave like failed fetches.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundSnapshot {
  pub repository: Repository,
  pub period: InboundPeriod,
  /// Reference time for dependency ages; defaults to the current time.
  #[serde(default)]
  pub as_of: Option<String>,
  #[serde(default)]
  pub config: Option<Config>,
  #[serde(default)]
  pub commits: Vec<InboundCommit>,
  #[serde(default)]
  pub contributors: Vec<InboundContributor>,
  #[serde(default)]
  pub pull_requests: Vec<InboundPullRequest>,
  #[serde(default)]
  pub issues: Option<Vec<InboundIssue>>,
  #[serde(default)]
  pub files: Option<Vec<InboundFile>>,
  #[serde(default)]
  pub dependencies: Option<Vec<InboundDependency>>,
  #[serde(default)]
  pub releases: Option<Vec<InboundRelease>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundPeriod {
  pub from: String,
  pub to: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundCommit {
  pub sha: String,
  #[serde(default)]
  pub author: String,
  #[serde(default)]
  pub email: String,
  pub timestamp: String,
  #[serde(default)]
  pub message: String,
  #[serde(default)]
  pub files: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundContributor {
  pub login: String,
  pub contributions: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundPullRequest {
  pub number: u64,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub author: String,
  #[serde(default)]
  pub head_branch: String,
  pub state: String,
  pub created_at: String,
  #[serde(default)]
  pub merged_at: Option<String>,
  #[serde(default)]
  pub additions: Option<u64>,
  #[serde(default)]
  pub deletions: Option<u64>,
  #[serde(default)]
  pub reviews: Vec<InboundReview>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundReview {
  #[serde(default)]
  pub id: u64,
  #[serde(default)]
  pub author: String,
  #[serde(default)]
  pub state: String,
  pub submitted_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundIssue {
  pub number: u64,
  #[serde(default)]
  pub title: String,
  pub state: String,
  #[serde(default)]
  pub labels: Vec<String>,
  pub created_at: String,
  #[serde(default)]
  pub closed_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundRelease {
  #[serde(default)]
  pub id: u64,
  #[serde(default)]
  pub tag_name: String,
  #[serde(default)]
  pub name: String,
  pub published_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundFile {
  pub path: String,
  pub size: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundDependency {
  pub name: String,
  pub version: String,
  pub released_at: String,
  #[serde(default)]
  pub age_months: Option<i64>,
  #[serde(default)]
  pub ecosystem: String,
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// DORA performance band. `NotAvailable` means there was no data, which is
/// distinct from poor performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoraRating {
  Elite,
  High,
  Medium,
  Low,
  #[default]
  #[serde(rename = "N/A")]
  NotAvailable,
}

impl DoraRating {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Elite => "Elite",
      Self::High => "High",
      Self::Medium => "Medium",
      Self::Low => "Low",
      Self::NotAvailable => "N/A",
    }
  }
}

impl std::fmt::Display for DoraRating {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Flat derived metrics for one period. Percentages are 0..=100.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Metrics {
  // Velocity
  pub total_commits: u64,
  /// Commits per day.
  pub commit_frequency: f64,
  pub avg_lead_time_days: f64,
  pub avg_review_wait_hours: f64,
  pub open_pr_count: u64,
  pub open_issue_count: u64,

  // Quality
  pub bug_fix_ratio: f64,
  pub rework_rate: f64,
  pub avg_pr_size: u64,
  pub issue_close_rate: f64,
  pub issues_created: u64,
  pub issues_closed: u64,

  // PR breakdown (merged PRs only)
  pub feature_pr_count: u64,
  pub bug_fix_pr_count: u64,
  pub refactor_pr_count: u64,
  pub other_pr_count: u64,
  pub feature_ratio: f64,
  pub refactor_ratio: f64,

  // DORA
  /// Deploys per 30-day month.
  pub deploy_frequency: f64,
  pub deploy_frequency_rating: DoraRating,
  pub change_failure_rate: f64,
  pub change_failure_rating: DoraRating,
  pub mttr_hours: f64,
  pub mttr_rating: DoraRating,

  // Churn
  pub revert_commit_count: u64,
  pub revert_rate: f64,

  // Team health
  pub total_files: u64,
  pub total_contributors: u64,
  pub late_night_commit_rate: f64,
}

impl Metrics {
  /// Merged PRs that received a type classification.
  pub fn classified_pr_count(&self) -> u64 {
    self.feature_pr_count + self.bug_fix_pr_count + self.refactor_pr_count + self.other_pr_count
  }
}

// ---------------------------------------------------------------------------
// Trends
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
  Up,
  Down,
  Same,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendDelta {
  pub metric: String,
  pub current: f64,
  pub previous: f64,
  pub delta_pct: f64,
  pub direction: Direction,
}

// ---------------------------------------------------------------------------
// Drill-down records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LargeFile {
  pub path: String,
  pub size_kb: u64,
  pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutdatedDependency {
  pub name: String,
  pub version: String,
  pub ecosystem: String,
  pub age_months: i64,
  /// "2y 3m".
  pub age: String,
  pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrDetail {
  pub number: u64,
  pub title: String,
  pub author: String,
  pub lead_time_days: f64,
  /// additions + deletions; 0 when the detail fetch failed.
  pub size: u64,
  pub additions: u64,
  pub deletions: u64,
  /// Hours until the first review; 0 without reviews.
  pub review_wait_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContributorDetail {
  pub name: String,
  pub commits: u64,
  /// Share of all contributions, percent.
  pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCommit {
  pub date: NaiveDate,
  pub count: u64,
}

// ---------------------------------------------------------------------------
// Analysis result (JSON contract: what we emit)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
  pub analysis_id: String,
  pub repository: Repository,
  pub period: DateRange,
  /// Always the four categories, in `Category::ALL` order.
  pub category_scores: Vec<CategoryScore>,
  pub overall_score: Score,
  pub risks: Vec<Risk>,
  pub metrics: Metrics,
  pub daily_commits: Vec<DailyCommit>,
  pub hourly_commits: [u64; 24],
  pub large_files: Vec<LargeFile>,
  pub outdated_deps: Vec<OutdatedDependency>,
  pub pr_details: Vec<PrDetail>,
  pub contributor_details: Vec<ContributorDetail>,
  pub trends: Vec<TrendDelta>,
  pub generated_at: DateTime<Utc>,
}

impl AnalysisResult {
  pub fn risk_count(&self, severity: Severity) -> usize {
    self.risks.iter().filter(|r| r.severity == severity).count()
  }

  pub fn high_risks(&self) -> Vec<&Risk> {
    self
      .risks
      .iter()
      .filter(|r| r.severity == Severity::High)
      .collect()
  }

  pub fn category_score(&self, category: Category) -> Option<&CategoryScore> {
    self.category_scores.iter().find(|cs| cs.category == category)
  }
}
