//! Skill hub orchestration.
//!
//! Installs skills from local folders or git repositories into one central
//! store, projects them into the skill directories of several coding tools,
//! and imports skills that already live inside those tools. All filesystem
//! and git work happens behind the [`HubBackend`] command boundary; this
//! crate decides what to call, in which order, and what to report.
//!
//! # Examples
//!
//! ```
//! use skillhub_sync::{dedup_by_skills_dir, ToolInfo};
//!
//! // Two tools reading the same directory are synced once.
//! let tools = vec![
//!     ToolInfo::new("claude_code", "/home/u/.claude/skills", "Claude Code"),
//!     ToolInfo::new("claude_alias", "/home/u/.claude/skills", "Claude (alias)"),
//!     ToolInfo::new("codex", "/home/u/.codex/skills", "Codex"),
//! ];
//! let ids: Vec<String> = tools.iter().map(|t| t.id.clone()).collect();
//! assert_eq!(dedup_by_skills_dir(&ids, &tools), vec!["claude_code", "codex"]);
//! ```

#![deny(unsafe_code)]

pub type Result<T> = std::result::Result<T, HubError>;

pub mod backend;
pub mod busy;
pub mod catalog;
pub mod common;
pub mod config;
pub mod error;
pub mod logging;
pub mod onboarding;
pub mod orchestrator;
pub mod progress;
pub mod registry;
pub mod report;
pub mod selection;

pub use backend::{BackendResult, HubBackend};
pub use busy::{BusyFlag, BusyGuard};
pub use common::{
    Candidate, InstallResult, ManagedSkill, OnboardingGroup, OnboardingPlan, OnboardingVariant,
    SkillTarget, SyncRequest, ToolInfo, ToolStatus, UpdateResult,
};
pub use config::HubConfig;
pub use error::{BackendError, HubError, ValidationError};
pub use onboarding::{ChosenImport, OnboardingPlanState};
pub use orchestrator::{
    AddForm, CandidateSource, ConfirmToken, Confirmed, InstallOutcome, PendingConfirmation,
    Picker, Requested, SkillHub, ToggleOutcome,
};
pub use progress::{FinishGuard, ProgressEvent, ProgressSink};
pub use registry::{dedup_by_skills_dir, group_by_shared_dir, ToolRegistry};
pub use report::{BatchReport, ErrorAggregator, ReportEntry};
pub use selection::{CandidateSelector, Selectable, SyncTargetState};
