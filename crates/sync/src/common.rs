//! Shared data model mirrored from the backend.
//!
//! These types are snapshots: the backend owns them and the orchestrator
//! replaces its copies wholesale after each refresh.

use serde::{Deserialize, Serialize};

/// A consumer tool and the directory it reads skills from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolInfo {
    /// Stable tool key (e.g., "claude_code")
    pub id: String,
    /// Absolute skills directory; tools with identical values share it
    pub skills_dir: String,
    /// Display label
    pub label: String,
}

impl ToolInfo {
    pub fn new(id: impl Into<String>, skills_dir: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            skills_dir: skills_dir.into(),
            label: label.into(),
        }
    }
}

/// Result of tool detection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolStatus {
    pub tools: Vec<ToolInfo>,
    #[serde(default)]
    pub installed: Vec<String>,
    #[serde(default)]
    pub newly_installed: Vec<String>,
}

/// One active projection of a managed skill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkillTarget {
    pub tool: String,
}

/// A skill registered in the central repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagedSkill {
    pub id: String,
    pub name: String,
    pub central_path: String,
    /// "local" | "git" | "import"
    pub source_type: String,
    #[serde(default)]
    pub source_ref: Option<String>,
    /// Tool whose directory the skill was adopted from, if any
    #[serde(default)]
    pub origin_tool: Option<String>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub targets: Vec<SkillTarget>,
}

impl ManagedSkill {
    /// True when a target entry exists for `tool_id`.
    pub fn is_synced_to(&self, tool_id: &str) -> bool {
        self.targets.iter().any(|t| t.tool == tool_id)
    }
}

/// A skill found while scanning a local folder or git repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    /// Identity key within one listing
    pub subpath: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub valid: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Candidate {
    pub fn valid(subpath: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            subpath: subpath.into(),
            name: name.into(),
            description: None,
            valid: true,
            reason: None,
        }
    }

    pub fn invalid(
        subpath: impl Into<String>,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            subpath: subpath.into(),
            name: name.into(),
            description: None,
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// What the backend reports after installing or importing one skill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallResult {
    pub skill_id: String,
    pub central_path: String,
    pub name: String,
}

/// Result of refreshing a managed skill from its source.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateResult {
    pub skill_id: String,
    pub name: String,
    #[serde(default)]
    pub content_changed: bool,
    #[serde(default)]
    pub source_revision: Option<String>,
}

/// A copy of one skill found inside a tool directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OnboardingVariant {
    pub path: String,
    pub tool: String,
}

/// One logical skill name detected in one or more tool directories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OnboardingGroup {
    pub name: String,
    pub variants: Vec<OnboardingVariant>,
}

/// Pre-existing skills offered for first-run import.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OnboardingPlan {
    pub groups: Vec<OnboardingGroup>,
}

/// Arguments of the "sync skill to tool" call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub central_path: String,
    pub skill_id: String,
    pub tool_id: String,
    pub name: String,
    pub overwrite: bool,
}
