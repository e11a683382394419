//! Data acquisition seam. The engine reads everything through `DataSource`;
//! `SnapshotSource` answers from one in-memory snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::error::SourceError;
use crate::types::{
  Commit, Contributor, DateRange, Dependency, File, Issue, PullRequest, Release, Repository,
  Review, StateFilter,
};

/// Read-only fetches for one repository. Every call may fail independently.
pub trait DataSource {
  fn commits(&self, repo: &Repository, period: &DateRange) -> Result<Vec<Commit>, SourceError>;

  /// Ranked by contributions, highest first.
  fn contributors(&self, repo: &Repository) -> Result<Vec<Contributor>, SourceError>;

  fn pull_requests(
    &self,
    repo: &Repository,
    state: StateFilter,
  ) -> Result<Vec<PullRequest>, SourceError>;

  /// The same PR with additions and deletions filled in.
  fn pull_request_detail(&self, repo: &Repository, number: u64)
    -> Result<PullRequest, SourceError>;

  fn pull_request_reviews(&self, repo: &Repository, number: u64)
    -> Result<Vec<Review>, SourceError>;

  /// Issues in `state`; with `since`, only issues created or closed at or after it.
  fn issues(
    &self,
    repo: &Repository,
    state: StateFilter,
    since: Option<DateTime<Utc>>,
  ) -> Result<Vec<Issue>, SourceError>;

  fn files(&self, repo: &Repository) -> Result<Vec<File>, SourceError>;

  fn dependencies(&self, repo: &Repository) -> Result<Vec<Dependency>, SourceError>;

  fn releases(&self, repo: &Repository) -> Result<Vec<Release>, SourceError>;
}

// ---------------------------------------------------------------------------
// Snapshot source
// ---------------------------------------------------------------------------

/// In-memory source. `None` sections were never captured and answer `Unavailable`.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
  pub commits: Vec<Commit>,
  pub contributors: Vec<Contributor>,
  pub pull_requests: Vec<PullRequest>,
  /// Reviews keyed by PR number.
  pub reviews: BTreeMap<u64, Vec<Review>>,
  pub issues: Option<Vec<Issue>>,
  pub files: Option<Vec<File>>,
  pub dependencies: Option<Vec<Dependency>>,
  pub releases: Option<Vec<Release>>,
}

fn captured<T: Clone>(section: &Option<Vec<T>>, resource: &str) -> Result<Vec<T>, SourceError> {
  section
    .as_ref()
    .cloned()
    .ok_or_else(|| SourceError::unavailable(resource))
}

impl DataSource for SnapshotSource {
  fn commits(&self, _repo: &Repository, period: &DateRange) -> Result<Vec<Commit>, SourceError> {
    Ok(
      self
        .commits
        .iter()
        .filter(|c| period.contains(&c.timestamp.with_timezone(&Utc)))
        .cloned()
        .collect(),
    )
  }

  fn contributors(&self, _repo: &Repository) -> Result<Vec<Contributor>, SourceError> {
    Ok(self.contributors.clone())
  }

  fn pull_requests(
    &self,
    _repo: &Repository,
    state: StateFilter,
  ) -> Result<Vec<PullRequest>, SourceError> {
    Ok(
      self
        .pull_requests
        .iter()
        .filter(|pr| state.matches(pr.state))
        .cloned()
        .collect(),
    )
  }

  fn pull_request_detail(
    &self,
    _repo: &Repository,
    number: u64,
  ) -> Result<PullRequest, SourceError> {
    self
      .pull_requests
      .iter()
      .find(|pr| pr.number == number)
      .cloned()
      .ok_or_else(|| SourceError::request("pull_request_detail", format!("no PR #{}", number)))
  }

  fn pull_request_reviews(
    &self,
    _repo: &Repository,
    number: u64,
  ) -> Result<Vec<Review>, SourceError> {
    Ok(self.reviews.get(&number).cloned().unwrap_or_default())
  }

  fn issues(
    &self,
    _repo: &Repository,
    state: StateFilter,
    since: Option<DateTime<Utc>>,
  ) -> Result<Vec<Issue>, SourceError> {
    let all = captured(&self.issues, "issues")?;
    Ok(
      all
        .into_iter()
        .filter(|i| state.matches(i.state))
        .filter(|i| match since {
          Some(s) => i.created_at >= s || i.closed_at.map_or(false, |c| c >= s),
          None => true,
        })
        .collect(),
    )
  }

  fn files(&self, _repo: &Repository) -> Result<Vec<File>, SourceError> {
    captured(&self.files, "files")
  }

  fn dependencies(&self, _repo: &Repository) -> Result<Vec<Dependency>, SourceError> {
    captured(&self.dependencies, "dependencies")
  }

  fn releases(&self, _repo: &Repository) -> Result<Vec<Release>, SourceError> {
    captured(&self.releases, "releases")
  }
}
