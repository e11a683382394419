//! Core engine: fetches one period of repository data, detects risks, computes
//! metrics and scores, and assembles the `AnalysisResult`.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::detect;
use crate::drilldown;
use crate::error::{EngineError, SourceError};
use crate::metrics::{self, MetricsInput};
use crate::normalize;
use crate::score;
use crate::source::DataSource;
use crate::trend;
use crate::types::*;

/// What to analyze.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
  pub repository: Repository,
  pub period: DateRange,
}

/// The repository health engine. Stateless between runs.
#[derive(Debug, Clone, Default)]
pub struct Engine {
  config: Config,
}

impl Engine {
  pub fn new(config: Config) -> Self {
    Self { config }
  }

  pub fn with_defaults() -> Self {
    Self::new(Config::default())
  }

  pub fn analyze(
    &self,
    source: &dyn DataSource,
    request: &AnalysisRequest,
  ) -> Result<AnalysisResult, EngineError> {
    self.analyze_at(source, request, Utc::now())
  }

  /// Full run with an explicit clock; `now` only lands in `generated_at`.
  ///
  /// Commits, contributors and closed PRs are required. Every other fetch degrades
  /// to an empty value with a warning.
  pub fn analyze_at(
    &self,
    source: &dyn DataSource,
    request: &AnalysisRequest,
    now: DateTime<Utc>,
  ) -> Result<AnalysisResult, EngineError> {
    let repo = &request.repository;
    let period = request.period;
    let cfg = &self.config;

    // Required fetches.
    debug!(repo = %repo.full_name(), "fetching required data");
    let commits = source
      .commits(repo, &period)
      .map_err(|e| EngineError::fetch("commits", e))?;
    let contributors = source
      .contributors(repo)
      .map_err(|e| EngineError::fetch("contributors", e))?;
    let closed_prs = source
      .pull_requests(repo, StateFilter::Closed)
      .map_err(|e| EngineError::fetch("pull_requests", e))?;

    // Optional fetches.
    let open_prs = degraded("open_pull_requests", source.pull_requests(repo, StateFilter::Open));
    let issues = degraded(
      "issues",
      source.issues(repo, StateFilter::All, Some(period.from)),
    );
    let open_issues = degraded("open_issues", source.issues(repo, StateFilter::Open, None));
    let files = degraded("files", source.files(repo));
    let dependencies = degraded("dependencies", source.dependencies(repo));
    let releases = degraded("releases", source.releases(repo));
    debug!(
      commits = commits.len(),
      contributors = contributors.len(),
      closed_prs = closed_prs.len(),
      issues = issues.len(),
      releases = releases.len(),
      "data fetched"
    );

    // Data-based risks.
    let mut risks = Vec::new();
    risks.extend(detect::change_concentration(&commits, cfg));
    risks.extend(detect::ownership(&contributors, cfg));
    risks.extend(detect::late_night(&commits, cfg));
    let (file_risks, large_files) = detect::large_files(&files, cfg);
    risks.extend(file_risks);
    let (dep_risks, outdated_deps) = detect::outdated_dependencies(&dependencies, cfg);
    risks.extend(dep_risks);

    // Bounded PR sample for size and review wait.
    let pr_details = self.pr_details(source, repo, &closed_prs);
    debug!(sampled = pr_details.len(), "pr details built");

    let metrics = metrics::calculate(&MetricsInput {
      commits: &commits,
      contributors: &contributors,
      closed_prs: &closed_prs,
      open_prs: &open_prs,
      issues: &issues,
      open_issues: &open_issues,
      files: &files,
      releases: &releases,
      period,
      avg_review_wait_hours: drilldown::avg_review_wait(&pr_details),
      avg_pr_size: drilldown::avg_pr_size(&pr_details),
    });

    risks.extend(detect::metric_risks(&metrics, cfg));
    debug!(risks = risks.len(), "risks detected");

    let category_scores = score::category_scores(&risks, &cfg.penalties);
    let overall_score = score::overall_score(&category_scores);

    let trends = self.trends(source, repo, &period, &metrics);

    let result = AnalysisResult {
      analysis_id: analysis_id(repo, &period),
      repository: repo.clone(),
      period,
      category_scores,
      overall_score,
      risks,
      daily_commits: drilldown::daily_commits(&commits, &period),
      hourly_commits: drilldown::hourly_commits(&commits),
      large_files,
      outdated_deps,
      pr_details,
      contributor_details: drilldown::contributor_details(&contributors),
      trends,
      metrics,
      generated_at: now,
    };

    info!(
      repo = %repo.full_name(),
      analysis_id = %result.analysis_id,
      score = result.overall_score.value,
      grade = ?result.overall_score.grade(),
      risks = result.risks.len(),
      "analysis complete"
    );
    Ok(result)
  }

  fn pr_details(
    &self,
    source: &dyn DataSource,
    repo: &Repository,
    closed_prs: &[PullRequest],
  ) -> Vec<PrDetail> {
    drilldown::recent_merged(closed_prs, self.config.max_pr_details)
      .into_iter()
      .map(|pr| {
        let detail = match source.pull_request_detail(repo, pr.number) {
          Ok(d) => Some(d),
          Err(e) => {
            warn!(
              resource = "pull_request_detail",
              pr = pr.number,
              error = %e,
              "pull request detail unavailable"
            );
            None
          }
        };
        let reviews = match source.pull_request_reviews(repo, pr.number) {
          Ok(r) => r,
          Err(e) => {
            warn!(
              resource = "pull_request_reviews",
              pr = pr.number,
              error = %e,
              "pull request reviews unavailable"
            );
            Vec::new()
          }
        };
        drilldown::pr_detail(pr, detail.as_ref(), &reviews)
      })
      .collect()
  }

  /// Empty when either previous-period fetch fails.
  fn trends(
    &self,
    source: &dyn DataSource,
    repo: &Repository,
    period: &DateRange,
    current: &Metrics,
  ) -> Vec<TrendDelta> {
    let prev = period.previous();
    let fetched = source.commits(repo, &prev).and_then(|commits| {
      source
        .issues(repo, StateFilter::All, Some(prev.from))
        .map(|issues| (commits, issues))
    });
    match fetched {
      Ok((commits, issues)) => {
        trend::compare(current, &commits, &issues, &prev, self.config.trend_same_band_pct)
      }
      Err(e) => {
        warn!(resource = "previous_period", error = %e, "trends skipped");
        Vec::new()
      }
    }
  }
}

/// Normalize a snapshot and analyze it with the snapshot's own config.
pub fn analyze_snapshot(
  raw: &InboundSnapshot,
  now: DateTime<Utc>,
) -> Result<AnalysisResult, EngineError> {
  let snapshot = normalize::normalize(raw, now)?;
  let engine = Engine::new(snapshot.config);
  let request = AnalysisRequest {
    repository: snapshot.repository,
    period: snapshot.period,
  };
  engine.analyze_at(&snapshot.source, &request, now)
}

/// Parse snapshot JSON and analyze it.
pub fn analyze_json(input: &str, now: DateTime<Utc>) -> Result<AnalysisResult, EngineError> {
  let raw: InboundSnapshot = serde_json::from_str(input)?;
  analyze_snapshot(&raw, now)
}

fn degraded<T: Default>(resource: &str, fetched: Result<T, SourceError>) -> T {
  fetched.unwrap_or_else(|e| {
    warn!(resource, error = %e, "optional fetch failed; continuing without it");
    T::default()
  })
}

/// Stable id: hash of repository + period bounds.
fn analysis_id(repo: &Repository, period: &DateRange) -> String {
  let mut hasher = blake3::Hasher::new();
  hasher.update(repo.full_name().as_bytes());
  hasher.update(b"|");
  hasher.update(period.from.to_rfc3339().as_bytes());
  hasher.update(b"|");
  hasher.update(period.to.to_rfc3339().as_bytes());
  let hex = hasher.finalize().to_hex();
  format!("ana-{}", &hex[..16])
}
