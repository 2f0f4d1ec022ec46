//! Managed skill maintenance and settings pass-through.

use super::{required, SkillHub};
use crate::backend::HubBackend;
use crate::common::UpdateResult;
use crate::config::{clamp_cleanup_days, clamp_ttl_secs};
use crate::progress::ProgressEvent;
use crate::Result;

impl<B: HubBackend> SkillHub<B> {
    /// Re-fetches a skill from its source.
    pub async fn update_managed_skill(&mut self, skill_id: &str) -> Result<UpdateResult> {
        let _guard = self.busy.try_acquire()?;
        let _finished = self.progress.finish_on_drop();
        let skill = self.find_skill(skill_id)?;
        self.progress.emit(ProgressEvent::Updating {
            skill_name: skill.name.clone(),
        });
        let result = self.backend.update_managed_skill(&skill.id).await?;
        tracing::info!(
            skill = %result.name,
            content_changed = result.content_changed,
            "Updated managed skill"
        );
        self.reload_skills_quietly().await;
        Ok(result)
    }

    /// Removes a skill from the hub along with its projections.
    pub async fn delete_managed_skill(&mut self, skill_id: &str) -> Result<()> {
        let _guard = self.busy.try_acquire()?;
        let _finished = self.progress.finish_on_drop();
        let skill = self.find_skill(skill_id)?;
        self.progress.emit(ProgressEvent::Removing {
            skill_name: skill.name.clone(),
        });
        self.backend.delete_managed_skill(&skill.id).await?;
        tracing::info!(skill = %skill.name, "Deleted managed skill");
        self.reload_skills_quietly().await;
        Ok(())
    }

    pub async fn central_repo_path(&self) -> Result<String> {
        Ok(self.backend.get_central_repo_path().await?)
    }

    /// Moves the central store and reloads the skills found there.
    pub async fn set_central_repo_path(&mut self, path: &str) -> Result<String> {
        let _guard = self.busy.try_acquire()?;
        let _finished = self.progress.finish_on_drop();
        let path = required(path, "central repo path")?;
        let stored = self.backend.set_central_repo_path(&path).await?;
        tracing::info!(path = %stored, "Central repo path changed");
        self.reload_skills_quietly().await;
        Ok(stored)
    }

    pub async fn git_cache_cleanup_days(&self) -> Result<u32> {
        Ok(self.backend.get_git_cache_cleanup_days().await?)
    }

    /// Stores the cache cleanup interval, clamped to `0..=3650` days.
    pub async fn set_git_cache_cleanup_days(&self, days: i64) -> Result<u32> {
        let days = clamp_cleanup_days(days);
        Ok(self.backend.set_git_cache_cleanup_days(days).await?)
    }

    pub async fn git_cache_ttl_secs(&self) -> Result<u32> {
        Ok(self.backend.get_git_cache_ttl_secs().await?)
    }

    /// Stores the clone cache TTL, clamped to `0..=3600` seconds.
    pub async fn set_git_cache_ttl_secs(&self, secs: i64) -> Result<u32> {
        let secs = clamp_ttl_secs(secs);
        Ok(self.backend.set_git_cache_ttl_secs(secs).await?)
    }

    /// Pushes the configured cache settings to the backend.
    pub async fn apply_configured_cache_settings(&self) -> Result<(u32, u32)> {
        let days = self
            .backend
            .set_git_cache_cleanup_days(self.config.cleanup_days())
            .await?;
        let secs = self
            .backend
            .set_git_cache_ttl_secs(self.config.ttl_secs())
            .await?;
        Ok((days, secs))
    }

    /// Empties the clone cache. Returns how many entries were removed.
    pub async fn clear_git_cache(&self) -> Result<usize> {
        let removed = self.backend.clear_git_cache().await?;
        tracing::info!(removed, "Cleared git cache");
        Ok(removed)
    }
}
