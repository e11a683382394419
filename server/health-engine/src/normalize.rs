//! Normalize an inbound snapshot into validated raw entities behind a `SnapshotSource`.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};

use crate::config::Config;
use crate::error::EngineError;
use crate::primitives;
use crate::source::SnapshotSource;
use crate::types::*;

/// A validated snapshot, ready for `Engine::analyze`.
#[derive(Debug, Clone)]
pub struct NormalizedSnapshot {
  pub repository: Repository,
  pub period: DateRange,
  pub config: Config,
  pub source: SnapshotSource,
}

/// Parse and validate every section. `now` is the age reference when the
/// snapshot carries no `as_of`.
pub fn normalize(raw: &InboundSnapshot, now: DateTime<Utc>) -> Result<NormalizedSnapshot, EngineError> {
  if raw.repository.owner.is_empty() {
    return Err(EngineError::validation("repository.owner", "must not be empty"));
  }
  if raw.repository.name.is_empty() {
    return Err(EngineError::validation("repository.name", "must not be empty"));
  }

  let from = parse_utc(&raw.period.from, "period.from")?;
  let to = parse_utc(&raw.period.to, "period.to")?;
  if from > to {
    return Err(EngineError::validation("period", "from must not be after to"));
  }

  let as_of = match &raw.as_of {
    Some(s) => parse_utc(s, "as_of")?,
    None => now,
  };

  let commits = raw
    .commits
    .iter()
    .map(|c| {
      if c.sha.is_empty() {
        return Err(EngineError::validation("commits[].sha", "must not be empty"));
      }
      Ok(Commit {
        sha: c.sha.clone(),
        author: c.author.clone(),
        email: c.email.clone(),
        timestamp: parse_fixed(&c.timestamp, "commits[].timestamp")?,
        message: c.message.clone(),
        files: c.files.iter().map(|f| normalize_path(f)).collect(),
      })
    })
    .collect::<Result<Vec<_>, EngineError>>()?;

  let mut contributors: Vec<Contributor> = raw
    .contributors
    .iter()
    .map(|c| Contributor {
      login: c.login.clone(),
      contributions: c.contributions,
    })
    .collect();
  // Stable: equal counts keep their inbound order.
  contributors.sort_by(|a, b| b.contributions.cmp(&a.contributions));

  let mut reviews = BTreeMap::new();
  let mut pull_requests = Vec::with_capacity(raw.pull_requests.len());
  for p in &raw.pull_requests {
    let state = ItemState::from_str_loose(&p.state)
      .ok_or_else(|| EngineError::validation("pull_requests[].state", "expected open|closed|merged"))?;
    let merged_at = p
      .merged_at
      .as_deref()
      .map(|s| parse_utc(s, "pull_requests[].merged_at"))
      .transpose()?;

    let pr_reviews = p
      .reviews
      .iter()
      .map(|r| {
        Ok(Review {
          id: r.id,
          author: r.author.clone(),
          state: r.state.clone(),
          submitted_at: parse_utc(&r.submitted_at, "pull_requests[].reviews[].submitted_at")?,
        })
      })
      .collect::<Result<Vec<_>, EngineError>>()?;
    if !pr_reviews.is_empty() {
      reviews.insert(p.number, pr_reviews);
    }

    pull_requests.push(PullRequest {
      number: p.number,
      title: p.title.clone(),
      author: p.author.clone(),
      head_branch: p.head_branch.clone(),
      state,
      created_at: parse_utc(&p.created_at, "pull_requests[].created_at")?,
      merged_at,
      additions: p.additions.unwrap_or(0),
      deletions: p.deletions.unwrap_or(0),
    });
  }

  let issues = raw
    .issues
    .as_ref()
    .map(|list| list.iter().map(normalize_issue).collect::<Result<Vec<_>, _>>())
    .transpose()?;

  let files = raw.files.as_ref().map(|list| {
    list
      .iter()
      .map(|f| File {
        path: normalize_path(&f.path),
        size: f.size,
      })
      .collect()
  });

  let dependencies = raw
    .dependencies
    .as_ref()
    .map(|list| {
      list
        .iter()
        .map(|d| {
          if d.name.is_empty() {
            return Err(EngineError::validation("dependencies[].name", "must not be empty"));
          }
          let released_at = parse_utc(&d.released_at, "dependencies[].released_at")?;
          Ok(Dependency {
            name: d.name.clone(),
            version: d.version.clone(),
            released_at,
            age_months: d
              .age_months
              .unwrap_or_else(|| primitives::age_in_months(released_at, as_of)),
            ecosystem: d.ecosystem.clone(),
          })
        })
        .collect::<Result<Vec<_>, EngineError>>()
    })
    .transpose()?;

  let releases = raw
    .releases
    .as_ref()
    .map(|list| {
      list
        .iter()
        .map(|r| {
          Ok(Release {
            id: r.id,
            tag_name: r.tag_name.clone(),
            name: r.name.clone(),
            published_at: parse_utc(&r.published_at, "releases[].published_at")?,
          })
        })
        .collect::<Result<Vec<_>, EngineError>>()
    })
    .transpose()?;

  Ok(NormalizedSnapshot {
    repository: raw.repository.clone(),
    period: DateRange::new(from, to),
    config: raw.config.clone().unwrap_or_default(),
    source: SnapshotSource {
      commits,
      contributors,
      pull_requests,
      reviews,
      issues,
      files,
      dependencies,
      releases,
    },
  })
}

fn normalize_issue(i: &InboundIssue) -> Result<Issue, EngineError> {
  let state = ItemState::from_str_loose(&i.state)
    .ok_or_else(|| EngineError::validation("issues[].state", "expected open|closed"))?;
  let closed_at = i
    .closed_at
    .as_deref()
    .map(|s| parse_utc(s, "issues[].closed_at"))
    .transpose()?;
  Ok(Issue {
    number: i.number,
    title: i.title.clone(),
    state,
    labels: i.labels.clone(),
    created_at: parse_utc(&i.created_at, "issues[].created_at")?,
    closed_at,
  })
}

fn parse_fixed(s: &str, field: &str) -> Result<DateTime<FixedOffset>, EngineError> {
  DateTime::parse_from_rfc3339(s)
    .map_err(|e| EngineError::validation(field, &format!("invalid RFC3339: {}", e)))
}

fn parse_utc(s: &str, field: &str) -> Result<DateTime<Utc>, EngineError> {
  Ok(parse_fixed(s, field)?.with_timezone(&Utc))
}

/// Normalize a file path for stable grouping:
/// - backslash -> forward slash
/// - collapse repeated slashes
/// - strip leading ./
///
/// Case is kept; paths are case-sensitive in git.
fn normalize_path(p: &str) -> String {
  let s = p.replace('\\', "/");
  let mut out = String::with_capacity(s.len());
  let mut prev_slash = false;
  for ch in s.chars() {
    if ch == '/' {
      if !prev_slash {
        out.push('/');
      }
      prev_slash = true;
    } else {
      prev_slash = false;
      out.push(ch);
    }
  }
  match out.strip_prefix("./") {
    Some(rest) => rest.to_string(),
    None => out,
  }
}
