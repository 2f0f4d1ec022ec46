//! Bulk flows: sync every managed skill, adopt new tools, onboarding import.

use super::{SkillHub, SyncSubject};
use crate::backend::HubBackend;
use crate::error::HubError;
use crate::onboarding::OnboardingPlanState;
use crate::progress::{ProgressEvent, StepQueue};
use crate::report::{BatchReport, ReportEntry};
use crate::Result;

impl<B: HubBackend> SkillHub<B> {
    /// Projects every managed skill into every installed tool of `tool_ids`.
    ///
    /// Tools sharing a directory are visited once. Skills are the outer loop.
    /// A tool that vanished mid-batch is skipped without a report entry; every
    /// other failure is recorded. No confirmation is asked for shared
    /// directories.
    pub async fn batch_sync_all_managed_skills(&mut self, tool_ids: &[String]) -> Result<BatchReport> {
        let _guard = self.busy.try_acquire()?;
        let _finished = self.progress.finish_on_drop();
        let report = self.sync_all_to(tool_ids).await;
        Ok(report)
    }

    /// Makes newly detected tools (and their shared groups) sync targets,
    /// then syncs every managed skill into them.
    pub async fn sync_all_new_tools(&mut self) -> Result<BatchReport> {
        let _guard = self.busy.try_acquire()?;
        let _finished = self.progress.finish_on_drop();
        let newly = self.registry.newly_installed().to_vec();
        if newly.is_empty() {
            return Ok(BatchReport::new());
        }

        for id in &newly {
            let group = self
                .registry
                .shared_group(id)
                .map(<[String]>::to_vec)
                .unwrap_or_else(|| vec![id.clone()]);
            self.sync_targets.set_all(&group, true);
        }
        tracing::info!(tools = ?newly, "Adopting newly installed tools");

        let report = self.sync_all_to(&newly).await;
        Ok(report)
    }

    /// Imports the included onboarding groups, in plan order, from their
    /// chosen variants.
    ///
    /// Each imported skill fans out right away; a target sharing the
    /// variant's directory is overwritten with a link. One group failing does
    /// not stop the rest. Afterwards the managed list and the plan are
    /// fetched again, even when nothing was selected.
    pub async fn import_onboarding_selection(&mut self) -> Result<BatchReport> {
        let _guard = self.busy.try_acquire()?;
        let _finished = self.progress.finish_on_drop();
        let selection = self
            .onboarding
            .as_ref()
            .ok_or(HubError::PlanNotLoaded)?
            .selection();

        tracing::info!(groups = selection.len(), "Importing onboarding selection");
        let mut report = BatchReport::new();
        for step in StepQueue::new(selection) {
            let chosen = step.item;
            self.progress.emit(ProgressEvent::Import {
                current: step.current,
                total: step.total,
                name: chosen.name.clone(),
            });
            match self
                .backend
                .import_existing_skill(&chosen.path, &chosen.name)
                .await
            {
                Ok(created) => {
                    let subject = SyncSubject::installed(&created, chosen.origin_tool.as_deref());
                    self.fan_out(subject, &mut report).await;
                    report.installed.push(created);
                }
                Err(err) => {
                    tracing::warn!(group = %chosen.name, path = %chosen.path, error = %err, "Import failed");
                    report
                        .errors
                        .push(ReportEntry::import_failed(&chosen.name, err.into()));
                }
            }
        }

        self.reload_skills_into(&mut report).await;
        match self.backend.fetch_onboarding_plan().await {
            Ok(plan) => self.onboarding = Some(OnboardingPlanState::new(plan)),
            Err(err) => report
                .errors
                .push(ReportEntry::refresh_failed("onboarding plan", err.into())),
        }
        Ok(report)
    }

    async fn sync_all_to(&mut self, tool_ids: &[String]) -> BatchReport {
        let installed: Vec<String> = tool_ids
            .iter()
            .filter(|id| self.registry.is_installed(id))
            .cloned()
            .collect();
        let targets = self.registry.dedup(&installed);
        let mut report = BatchReport::new();
        if self.skills.is_empty() || targets.is_empty() {
            tracing::debug!(
                skills = self.skills.len(),
                targets = targets.len(),
                "Nothing to sync"
            );
            return report;
        }

        let pairs: Vec<_> = self
            .skills
            .iter()
            .flat_map(|skill| targets.iter().map(move |tool| (skill, tool.as_str())))
            .collect();
        for step in StepQueue::new(pairs) {
            let (skill, tool_id) = step.item;
            let tool_label = self.registry.label(tool_id);
            self.progress.emit(ProgressEvent::Sync {
                current: step.current,
                total: step.total,
                skill_name: skill.name.clone(),
                tool_label: tool_label.to_string(),
            });
            match self.project(SyncSubject::from(skill), tool_id).await {
                Ok(()) => report.synced += 1,
                Err(HubError::ToolNotInstalled { tool_id }) => {
                    tracing::debug!(tool = %tool_id, skill = %skill.name, "Tool disappeared; skipping");
                }
                Err(err) => report
                    .errors
                    .push(ReportEntry::sync_failed(&skill.name, tool_label, err)),
            }
        }

        self.reload_skills_into(&mut report).await;
        report
    }
}
