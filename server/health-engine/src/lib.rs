//! Repository Health Analysis Engine: deterministic, threshold-based.
//!
//! Reads one period of repository activity (commits, contributors, PRs, issues,
//! releases, file tree, dependencies) through a `DataSource`, detects risks,
//! computes delivery metrics, scores four categories and compares against the
//! preceding period. Emits a structured `AnalysisResult`.
//!
//! No network, no DB; pure computation over in-memory inputs.

pub mod config;
pub mod detect;
pub mod dora;
pub mod drilldown;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod normalize;
pub mod primitives;
pub mod risk;
pub mod score;
pub mod source;
pub mod trend;
pub mod types;

pub use config::Config;
pub use engine::{analyze_json, analyze_snapshot, AnalysisRequest, Engine};
pub use error::{EngineError, SourceError};
pub use source::{DataSource, SnapshotSource};
pub use types::{AnalysisResult, InboundSnapshot};
