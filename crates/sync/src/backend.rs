//! The command boundary between the orchestrator and the skill backend.
//!
//! The backend does the real work (scanning, cloning, copying, linking,
//! persisting settings). The orchestrator only sequences these calls.

use async_trait::async_trait;

use crate::common::{
    Candidate, InstallResult, ManagedSkill, OnboardingPlan, SyncRequest, ToolStatus, UpdateResult,
};
use crate::error::BackendError;

pub type BackendResult<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
use mockall::automock;

/// Capability interface over the skill backend.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HubBackend: Send + Sync {
    // --- Discovery ---

    /// Detect pre-existing skills in tool directories
    async fn fetch_onboarding_plan(&self) -> BackendResult<OnboardingPlan>;

    /// All skills registered in the central repository
    async fn list_managed_skills(&self) -> BackendResult<Vec<ManagedSkill>>;

    /// Detected tools and which of them are installed
    async fn get_tool_status(&self) -> BackendResult<ToolStatus>;

    async fn list_local_candidates(&self, base_path: &str) -> BackendResult<Vec<Candidate>>;

    async fn list_git_candidates(&self, repo_url: &str) -> BackendResult<Vec<Candidate>>;

    // --- Install ---

    async fn install_local_selection(
        &self,
        base_path: &str,
        subpath: &str,
        name: Option<String>,
    ) -> BackendResult<InstallResult>;

    /// Install a URL that already points at one skill folder
    async fn install_git(&self, repo_url: &str, name: Option<String>)
        -> BackendResult<InstallResult>;

    async fn install_git_selection(
        &self,
        repo_url: &str,
        subpath: &str,
        name: Option<String>,
    ) -> BackendResult<InstallResult>;

    /// Adopt a skill that already exists on disk inside a tool directory
    async fn import_existing_skill(
        &self,
        source_path: &str,
        name: &str,
    ) -> BackendResult<InstallResult>;

    // --- Projection ---

    async fn sync_skill_to_tool(&self, request: &SyncRequest) -> BackendResult<()>;

    async fn unsync_skill_from_tool(&self, skill_id: &str, tool_id: &str) -> BackendResult<()>;

    // --- Maintenance ---

    async fn update_managed_skill(&self, skill_id: &str) -> BackendResult<UpdateResult>;

    async fn delete_managed_skill(&self, skill_id: &str) -> BackendResult<()>;

    // --- Settings ---

    async fn get_central_repo_path(&self) -> BackendResult<String>;

    async fn set_central_repo_path(&self, path: &str) -> BackendResult<String>;

    async fn get_git_cache_cleanup_days(&self) -> BackendResult<u32>;

    async fn set_git_cache_cleanup_days(&self, days: u32) -> BackendResult<u32>;

    async fn get_git_cache_ttl_secs(&self) -> BackendResult<u32>;

    async fn set_git_cache_ttl_secs(&self, secs: u32) -> BackendResult<u32>;

    /// Remove cached clones now; returns how many were removed
    async fn clear_git_cache(&self) -> BackendResult<usize>;
}
