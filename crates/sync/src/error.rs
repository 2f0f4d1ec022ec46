//! Error taxonomy for hub operations and the backend boundary.

use thiserror::Error;

/// Failures returned by a [`HubBackend`](crate::HubBackend) call.
///
/// Collaborators that speak the string protocol convert once with
/// [`BackendError::decode`]; nothing downstream re-parses message text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The command boundary could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// Destination occupied by something that is not a managed link.
    #[error("target already exists: {path}")]
    TargetExists { path: String },
    /// The tool vanished between detection and action.
    #[error("tool not installed: {tool_id}")]
    ToolNotInstalled { tool_id: String },
    /// The central repository already holds a skill with this name.
    #[error("skill already exists in central repo")]
    AlreadyInCentralRepo,
    #[error("{0}")]
    Message(String),
}

const TARGET_EXISTS_PREFIX: &str = "TARGET_EXISTS|";
const TOOL_NOT_INSTALLED_PREFIX: &str = "TOOL_NOT_INSTALLED|";
const ALREADY_IN_CENTRAL_REPO: &str = "skill already exists in central repo";

impl BackendError {
    /// Decodes a raw collaborator error string.
    ///
    /// ```
    /// use skillhub_sync::BackendError;
    ///
    /// assert_eq!(
    ///     BackendError::decode("TARGET_EXISTS|/a/b"),
    ///     BackendError::TargetExists { path: "/a/b".into() }
    /// );
    /// assert_eq!(
    ///     BackendError::decode("TOOL_NOT_INSTALLED|codex|/home/u/.codex/skills"),
    ///     BackendError::ToolNotInstalled { tool_id: "codex".into() }
    /// );
    /// assert_eq!(BackendError::decode("boom"), BackendError::Message("boom".into()));
    /// ```
    pub fn decode(raw: &str) -> Self {
        if let Some(path) = raw.strip_prefix(TARGET_EXISTS_PREFIX) {
            return Self::TargetExists {
                path: path.to_string(),
            };
        }
        if let Some(rest) = raw.strip_prefix(TOOL_NOT_INSTALLED_PREFIX) {
            let tool_id = rest.split('|').next().unwrap_or_default();
            return Self::ToolNotInstalled {
                tool_id: tool_id.to_string(),
            };
        }
        if raw.contains(ALREADY_IN_CENTRAL_REPO) {
            return Self::AlreadyInCentralRepo;
        }
        Self::Message(raw.to_string())
    }
}

impl From<String> for BackendError {
    fn from(raw: String) -> Self {
        Self::decode(&raw)
    }
}

impl From<&str> for BackendError {
    fn from(raw: &str) -> Self {
        Self::decode(raw)
    }
}

/// Pre-flight rejections. None of these reach the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    EmptyInput { field: &'static str },
    #[error("select at least one skill")]
    NothingSelected,
    #[error("a custom name can only be used with a single selection")]
    CustomNameRequiresSingleSelection,
    #[error("skill name '{name}' is duplicated or already managed")]
    DuplicateOrExistingName { name: String },
    #[error("no sync targets selected")]
    NoSyncTargets,
}

/// Errors surfaced by [`SkillHub`](crate::SkillHub) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HubError {
    #[error("backend unavailable: {0}")]
    HostUnavailable(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("a skill named '{name}' already exists")]
    NameAlreadyExists { name: String },
    #[error("no skills found to import")]
    NoCandidatesFound,
    #[error("target already exists: {path}")]
    TargetExists { path: String },
    #[error("tool not installed: {tool_id}")]
    ToolNotInstalled { tool_id: String },
    #[error("{0}")]
    Backend(String),
    #[error("another operation is in progress")]
    Busy,
    #[error("onboarding plan has not been loaded")]
    PlanNotLoaded,
    #[error("unknown managed skill: {0}")]
    UnknownSkill(String),
    #[error("unknown or expired confirmation token")]
    UnknownToken,
}

impl From<BackendError> for HubError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unavailable(msg) => Self::HostUnavailable(msg),
            BackendError::TargetExists { path } => Self::TargetExists { path },
            BackendError::ToolNotInstalled { tool_id } => Self::ToolNotInstalled { tool_id },
            other @ BackendError::AlreadyInCentralRepo => Self::Backend(other.to_string()),
            BackendError::Message(msg) => Self::Backend(msg),
        }
    }
}
