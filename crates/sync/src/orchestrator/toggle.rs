//! Per-skill projection toggles and sync-target changes.
//!
//! Tools reading a shared directory affect each other, so changes to them go
//! through a two-phase request/confirm protocol. Bulk paths skip it.

use super::{ConfirmToken, Pending, PendingAction, PendingConfirmation, SkillHub, SyncSubject};
use crate::backend::HubBackend;
use crate::error::HubError;
use crate::progress::ProgressEvent;
use crate::Result;

/// Result of a toggle that actually ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Synced,
    Unsynced,
}

/// Either applied immediately or parked behind a confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requested<T> {
    Done(T),
    NeedsConfirmation(PendingConfirmation),
}

/// What a confirmed request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmed {
    Toggled(ToggleOutcome),
    SyncTargets { tool_ids: Vec<String>, checked: bool },
}

impl<B: HubBackend> SkillHub<B> {
    /// Projects a managed skill into one tool.
    pub async fn sync_to_tool(&mut self, skill_id: &str, tool_id: &str) -> Result<()> {
        let _guard = self.busy.try_acquire()?;
        let _finished = self.progress.finish_on_drop();
        let skill = self.find_skill(skill_id)?;
        self.progress.emit(ProgressEvent::Sync {
            current: 1,
            total: 1,
            skill_name: skill.name.clone(),
            tool_label: self.registry.label(tool_id).to_string(),
        });
        self.project(SyncSubject::from(&skill), tool_id).await?;
        self.reload_skills_quietly().await;
        Ok(())
    }

    /// Removes a skill's projection from one tool.
    pub async fn unsync_from_tool(&mut self, skill_id: &str, tool_id: &str) -> Result<()> {
        let _guard = self.busy.try_acquire()?;
        let _finished = self.progress.finish_on_drop();
        let skill = self.find_skill(skill_id)?;
        self.unproject(&skill.id, &skill.name, tool_id).await?;
        self.reload_skills_quietly().await;
        Ok(())
    }

    /// Flips the projection of `skill_id` into `tool_id`.
    ///
    /// When the tool shares its directory with others the toggle is parked
    /// and a confirmation naming the affected tools is returned instead.
    pub async fn request_toggle(
        &mut self,
        skill_id: &str,
        tool_id: &str,
    ) -> Result<Requested<ToggleOutcome>> {
        if self.busy.is_busy() {
            return Err(HubError::Busy);
        }
        self.find_skill(skill_id)?;
        if self.registry.shared_group(tool_id).is_some() {
            let pending = self.park(
                tool_id,
                PendingAction::ToggleSkill {
                    skill_id: skill_id.to_string(),
                    tool_id: tool_id.to_string(),
                },
            );
            return Ok(Requested::NeedsConfirmation(pending));
        }
        self.toggle_now(skill_id, tool_id).await.map(Requested::Done)
    }

    /// Checks or unchecks a tool as a target for new installs.
    ///
    /// For a tool in a shared group the change is parked; confirming it
    /// applies the value to every tool of the group.
    pub fn request_sync_target_change(
        &mut self,
        tool_id: &str,
        checked: bool,
    ) -> Result<Requested<()>> {
        if self.busy.is_busy() {
            return Err(HubError::Busy);
        }
        if self.registry.shared_group(tool_id).is_some() {
            let pending = self.park(
                tool_id,
                PendingAction::SetSyncTarget {
                    tool_id: tool_id.to_string(),
                    checked,
                },
            );
            return Ok(Requested::NeedsConfirmation(pending));
        }
        self.sync_targets.set(tool_id, checked);
        Ok(Requested::Done(()))
    }

    /// Token of the outstanding confirmation, if any.
    pub fn pending_confirmation(&self) -> Option<ConfirmToken> {
        self.pending.as_ref().map(|p| p.token)
    }

    /// Runs the parked action behind `token`.
    pub async fn confirm(&mut self, token: ConfirmToken) -> Result<Confirmed> {
        if self.busy.is_busy() {
            return Err(HubError::Busy);
        }
        let action = self.take_pending(token)?;
        match action {
            PendingAction::ToggleSkill { skill_id, tool_id } => self
                .toggle_now(&skill_id, &tool_id)
                .await
                .map(Confirmed::Toggled),
            PendingAction::SetSyncTarget { tool_id, checked } => {
                let tool_ids = self
                    .registry
                    .shared_group(&tool_id)
                    .map(<[String]>::to_vec)
                    .unwrap_or_else(|| vec![tool_id.clone()]);
                self.sync_targets.set_all(&tool_ids, checked);
                tracing::debug!(?tool_ids, checked, "Updated shared sync targets");
                Ok(Confirmed::SyncTargets { tool_ids, checked })
            }
        }
    }

    /// Drops the parked action behind `token` without running it.
    pub fn cancel(&mut self, token: ConfirmToken) -> Result<()> {
        if self.busy.is_busy() {
            return Err(HubError::Busy);
        }
        self.take_pending(token).map(|_| ())
    }

    fn park(&mut self, tool_id: &str, action: PendingAction) -> PendingConfirmation {
        let token = ConfirmToken::new();
        if let Some(previous) = self.pending.replace(Pending { token, action }) {
            tracing::debug!(token = %previous.token, "Replaced unanswered confirmation");
        }
        PendingConfirmation {
            token,
            tool_id: tool_id.to_string(),
            tool_label: self.registry.label(tool_id).to_string(),
            shared_with: self
                .registry
                .shared_peers(tool_id)
                .iter()
                .map(|id| self.registry.label(id).to_string())
                .collect(),
        }
    }

    fn take_pending(&mut self, token: ConfirmToken) -> Result<PendingAction> {
        match self.pending.take() {
            Some(pending) if pending.token == token => Ok(pending.action),
            other => {
                self.pending = other;
                Err(HubError::UnknownToken)
            }
        }
    }

    async fn toggle_now(&mut self, skill_id: &str, tool_id: &str) -> Result<ToggleOutcome> {
        let _guard = self.busy.try_acquire()?;
        let _finished = self.progress.finish_on_drop();
        let skill = self.find_skill(skill_id)?;
        let outcome = if skill.is_synced_to(tool_id) {
            self.unproject(&skill.id, &skill.name, tool_id).await?;
            ToggleOutcome::Unsynced
        } else {
            self.progress.emit(ProgressEvent::Sync {
                current: 1,
                total: 1,
                skill_name: skill.name.clone(),
                tool_label: self.registry.label(tool_id).to_string(),
            });
            self.project(SyncSubject::from(&skill), tool_id).await?;
            ToggleOutcome::Synced
        };
        tracing::info!(skill = %skill.name, tool = %tool_id, ?outcome, "Toggled skill");
        self.reload_skills_quietly().await;
        Ok(outcome)
    }

    async fn unproject(&self, skill_id: &str, skill_name: &str, tool_id: &str) -> Result<()> {
        self.progress.emit(ProgressEvent::Unsync {
            skill_name: skill_name.to_string(),
            tool_label: self.registry.label(tool_id).to_string(),
        });
        self.backend.unsync_skill_from_tool(skill_id, tool_id).await?;
        Ok(())
    }
}
