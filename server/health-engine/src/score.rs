//! Category scores: severity-weighted penalties from a base of 100, worst-risk
//! diagnosis, and the overall score as the mean of the four categories.

use serde::{Deserialize, Serialize};

use crate::risk::{Category, Risk, Severity};

pub const BASE_SCORE: i32 = 100;

const BASE_LABEL: &str = "Base score";
const HEALTHY_DIAGNOSIS: &str = "In good shape";

// ---------------------------------------------------------------------------
// Score value object
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreBreakdownItem {
  pub label: String,
  /// Positive adds, negative deducts.
  pub points: i32,
  pub detail: String,
}

/// 0..=100 plus the breakdown that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Score {
  pub value: u8,
  pub breakdown: Vec<ScoreBreakdownItem>,
}

impl Score {
  /// Clamps the raw total into 0..=100.
  pub fn new(raw: i32) -> Self {
    Self::with_breakdown(raw, Vec::new())
  }

  pub fn with_breakdown(raw: i32, breakdown: Vec<ScoreBreakdownItem>) -> Self {
    Self {
      value: raw.clamp(0, 100) as u8,
      breakdown,
    }
  }

  pub fn grade(&self) -> Grade {
    Grade::from_value(self.value)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Grade {
  A,
  B,
  C,
  D,
}

impl Grade {
  pub fn from_value(value: u8) -> Self {
    match value {
      80.. => Self::A,
      60..=79 => Self::B,
      40..=59 => Self::C,
      _ => Self::D,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryScore {
  pub category: Category,
  pub score: Score,
  pub diagnosis: String,
}

// ---------------------------------------------------------------------------
// Penalties
// ---------------------------------------------------------------------------

/// Severity to point deduction for one scoring context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PenaltyTable {
  pub high: i32,
  pub medium: i32,
  pub low: i32,
}

impl PenaltyTable {
  pub const CATEGORY: PenaltyTable = PenaltyTable {
    high: -15,
    medium: -10,
    low: -5,
  };

  pub fn penalty(&self, severity: Severity) -> i32 {
    match severity {
      Severity::High => self.high,
      Severity::Medium => self.medium,
      Severity::Low => self.low,
    }
  }
}

impl Default for PenaltyTable {
  fn default() -> Self {
    Self::CATEGORY
  }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Scores every category in `Category::ALL` order; categories without risks score 100.
pub fn category_scores(risks: &[Risk], penalties: &PenaltyTable) -> Vec<CategoryScore> {
  Category::ALL
    .iter()
    .map(|&cat| score_category(cat, risks, penalties))
    .collect()
}

pub fn score_category(category: Category, risks: &[Risk], penalties: &PenaltyTable) -> CategoryScore {
  let mut total = BASE_SCORE;
  let mut breakdown = vec![ScoreBreakdownItem {
    label: BASE_LABEL.to_string(),
    points: BASE_SCORE,
    detail: String::new(),
  }];

  let in_category: Vec<&Risk> = risks.iter().filter(|r| r.category() == category).collect();
  for r in &in_category {
    let points = penalties.penalty(r.severity);
    total += points;
    breakdown.push(ScoreBreakdownItem {
      label: r.risk_type.display_name().to_string(),
      points,
      detail: r.detail(),
    });
  }

  let score = Score::with_breakdown(total, breakdown);
  let worst = worst_risk(&in_category, penalties);
  let diagnosis = diagnosis(&score, worst);

  CategoryScore {
    category,
    score,
    diagnosis,
  }
}

/// Most-penalizing risk; strict less-than keeps the first one seen on ties.
pub fn worst_risk<'a>(risks: &[&'a Risk], penalties: &PenaltyTable) -> Option<&'a Risk> {
  risks
    .iter()
    .fold((None, 0), |(worst, worst_points), &r| {
      let points = penalties.penalty(r.severity);
      if points < worst_points {
        (Some(r), points)
      } else {
        (worst, worst_points)
      }
    })
    .0
}

/// Grade A always reads as healthy; otherwise the worst risk picks the sentence.
pub fn diagnosis(score: &Score, worst: Option<&Risk>) -> String {
  if score.grade() == Grade::A {
    return HEALTHY_DIAGNOSIS.to_string();
  }
  match worst {
    Some(r) => r.risk_type.diagnosis().to_string(),
    None => HEALTHY_DIAGNOSIS.to_string(),
  }
}

/// Integer mean of the category scores; 0 when there are none.
pub fn overall_score(categories: &[CategoryScore]) -> Score {
  if categories.is_empty() {
    return Score::new(0);
  }
  let total: i32 = categories.iter().map(|cs| cs.score.value as i32).sum();
  Score::new(total / categories.len() as i32)
}
