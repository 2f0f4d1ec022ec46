//! The skill hub orchestrator.
//!
//! [`SkillHub`] owns every piece of mutable flow state (tool snapshot, sync
//! targets, candidate picker, onboarding selection, pending confirmations,
//! add-form inputs) and drives the backend one call at a time. Callers
//! observe progress through [`SkillHub::subscribe`] and read state back
//! through the accessors.

mod batch;
mod install;
mod manage;
mod toggle;

use uuid::Uuid;

use crate::backend::HubBackend;
use crate::busy::BusyFlag;
use crate::common::{Candidate, InstallResult, ManagedSkill, SyncRequest, ToolStatus};
use crate::config::HubConfig;
use crate::error::{HubError, ValidationError};
use crate::onboarding::OnboardingPlanState;
use crate::progress::{ProgressEvent, ProgressSink, StepQueue};
use crate::registry::ToolRegistry;
use crate::report::{BatchReport, ReportEntry};
use crate::selection::{CandidateSelector, SyncTargetState};
use crate::Result;

pub use install::InstallOutcome;
pub use toggle::{Confirmed, Requested, ToggleOutcome};

/// Where the candidates of the open picker came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    Local { base_path: String },
    Git { repo_url: String },
}

impl CandidateSource {
    pub fn location(&self) -> &str {
        match self {
            CandidateSource::Local { base_path } => base_path,
            CandidateSource::Git { repo_url } => repo_url,
        }
    }

    /// Local folders carry a validity verdict per candidate; git listings do not.
    fn respects_validity(&self) -> bool {
        matches!(self, CandidateSource::Local { .. })
    }
}

/// Candidate list awaiting the user's selection.
#[derive(Debug, Clone)]
pub struct Picker {
    source: CandidateSource,
    selector: CandidateSelector<Candidate>,
    /// Name requested by the add call that opened the picker
    desired_name: Option<String>,
}

impl Picker {
    fn open(source: CandidateSource, candidates: Vec<Candidate>, desired_name: Option<String>) -> Self {
        let selector = if source.respects_validity() {
            CandidateSelector::new(candidates, |c: &Candidate| c.valid)
        } else {
            CandidateSelector::new(candidates, |_: &Candidate| true)
        };
        Self {
            source,
            selector,
            desired_name,
        }
    }

    pub fn source(&self) -> &CandidateSource {
        &self.source
    }

    pub fn desired_name(&self) -> Option<&str> {
        self.desired_name.as_deref()
    }

    pub fn candidates(&self) -> &[Candidate] {
        self.selector.items()
    }

    pub fn is_selected(&self, subpath: &str) -> bool {
        self.selector.is_selected(subpath)
    }

    /// Selected candidates in listing order. Invalid local candidates never
    /// make it into an install, even when forced on individually.
    pub fn selected(&self) -> Vec<Candidate> {
        let respects_validity = self.source.respects_validity();
        self.selector
            .selected()
            .into_iter()
            .filter(|c| !respects_validity || c.valid)
            .collect()
    }
}

/// Text inputs of the two add flows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddForm {
    pub local_path: String,
    pub local_name: String,
    pub git_url: String,
    pub git_name: String,
}

impl AddForm {
    fn clear_for(&mut self, source: &CandidateSource) {
        match source {
            CandidateSource::Local { .. } => {
                self.local_path.clear();
                self.local_name.clear();
            }
            CandidateSource::Git { .. } => {
                self.git_url.clear();
                self.git_name.clear();
            }
        }
    }
}

/// Opaque handle for a confirmation the user has not answered yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfirmToken(Uuid);

impl ConfirmToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ConfirmToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// What the user is asked to confirm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConfirmation {
    pub token: ConfirmToken,
    pub tool_id: String,
    pub tool_label: String,
    /// Labels of the other tools reading the same directory
    pub shared_with: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingAction {
    ToggleSkill { skill_id: String, tool_id: String },
    SetSyncTarget { tool_id: String, checked: bool },
}

#[derive(Debug, Clone)]
struct Pending {
    token: ConfirmToken,
    action: PendingAction,
}

/// The skill being projected, plus the tool it was adopted from, if any.
#[derive(Debug, Clone, Copy)]
struct SyncSubject<'a> {
    skill_id: &'a str,
    central_path: &'a str,
    name: &'a str,
    origin_tool: Option<&'a str>,
}

impl<'a> SyncSubject<'a> {
    fn installed(result: &'a InstallResult, origin_tool: Option<&'a str>) -> Self {
        Self {
            skill_id: &result.skill_id,
            central_path: &result.central_path,
            name: &result.name,
            origin_tool,
        }
    }
}

impl<'a> From<&'a ManagedSkill> for SyncSubject<'a> {
    fn from(skill: &'a ManagedSkill) -> Self {
        Self {
            skill_id: &skill.id,
            central_path: &skill.central_path,
            name: &skill.name,
            origin_tool: skill.origin_tool.as_deref(),
        }
    }
}

/// Drives installs, projections and imports against a [`HubBackend`].
pub struct SkillHub<B: HubBackend> {
    backend: B,
    config: HubConfig,
    busy: BusyFlag,
    progress: ProgressSink,
    registry: ToolRegistry,
    sync_targets: SyncTargetState,
    skills: Vec<ManagedSkill>,
    picker: Option<Picker>,
    onboarding: Option<OnboardingPlanState>,
    pending: Option<Pending>,
    form: AddForm,
}

impl<B: HubBackend> SkillHub<B> {
    pub fn new(backend: B, config: HubConfig) -> Self {
        Self {
            backend,
            config,
            busy: BusyFlag::new(),
            progress: ProgressSink::default(),
            registry: ToolRegistry::default(),
            sync_targets: SyncTargetState::default(),
            skills: Vec::new(),
            picker: None,
            onboarding: None,
            pending: None,
            form: AddForm::default(),
        }
    }

    /// Shares an externally owned busy flag, so other components can see
    /// (and respect) the running operation.
    pub fn with_busy_flag(mut self, busy: BusyFlag) -> Self {
        self.busy = busy;
        self
    }

    /// Routes progress events to a fresh receiver. Replaces any previous one.
    pub fn subscribe(&mut self) -> tokio::sync::mpsc::UnboundedReceiver<ProgressEvent> {
        let (sink, rx) = ProgressSink::channel();
        self.progress = sink;
        rx
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn busy_flag(&self) -> &BusyFlag {
        &self.busy
    }

    pub fn is_busy(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn sync_targets(&self) -> &SyncTargetState {
        &self.sync_targets
    }

    pub fn managed_skills(&self) -> &[ManagedSkill] {
        &self.skills
    }

    pub fn picker(&self) -> Option<&Picker> {
        self.picker.as_ref()
    }

    pub fn onboarding(&self) -> Option<&OnboardingPlanState> {
        self.onboarding.as_ref()
    }

    /// Mutable access to the onboarding selection (group inclusion and
    /// chosen variants).
    pub fn onboarding_mut(&mut self) -> Option<&mut OnboardingPlanState> {
        self.onboarding.as_mut()
    }

    pub fn form(&self) -> &AddForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut AddForm {
        &mut self.form
    }

    /// Fetches the tool snapshot, replacing the previous one wholesale.
    ///
    /// The first snapshot seeds the sync targets (configured defaults, or
    /// every installed tool). Returns the ids of newly installed tools.
    pub async fn refresh_tool_status(&mut self) -> Result<Vec<String>> {
        let _guard = self.busy.try_acquire()?;
        let status: ToolStatus = self.backend.get_tool_status().await?;
        tracing::debug!(
            tools = status.tools.len(),
            installed = status.installed.len(),
            newly_installed = status.newly_installed.len(),
            "Refreshed tool status"
        );
        self.registry.replace(status);
        let status = self.registry.status();
        self.sync_targets.initialize(
            &status.tools,
            &status.installed,
            self.config.default_targets(),
        );
        Ok(self.registry.newly_installed().to_vec())
    }

    /// Reloads the managed skill list.
    pub async fn refresh_managed_skills(&mut self) -> Result<&[ManagedSkill]> {
        let _guard = self.busy.try_acquire()?;
        let _finished = self.progress.finish_on_drop();
        self.reload_skills().await?;
        Ok(&self.skills)
    }

    /// Fetches the onboarding plan, discarding any previous selection.
    pub async fn load_onboarding_plan(&mut self) -> Result<&OnboardingPlanState> {
        let _guard = self.busy.try_acquire()?;
        let plan = self.backend.fetch_onboarding_plan().await?;
        tracing::debug!(groups = plan.groups.len(), "Loaded onboarding plan");
        Ok(&*self.onboarding.insert(OnboardingPlanState::new(plan)))
    }

    /// Case-insensitive lookup against the managed skill names.
    pub fn is_name_taken(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.skills.iter().any(|s| s.name.to_lowercase() == wanted)
    }

    /// Builds the projection request for `skill` into `tool_id`.
    ///
    /// `overwrite` is set when the skill was adopted from `tool_id` or from a
    /// tool sharing its directory.
    pub fn sync_request(&self, skill: &ManagedSkill, tool_id: &str) -> SyncRequest {
        self.request_for(SyncSubject::from(skill), tool_id)
    }

    /// Installed tools currently checked as targets, one per directory.
    pub fn fan_out_targets(&self) -> Vec<String> {
        let checked: Vec<String> = self
            .sync_targets
            .checked_ids(self.registry.tools())
            .into_iter()
            .filter(|id| self.registry.is_installed(id))
            .collect();
        self.registry.dedup(&checked)
    }

    fn request_for(&self, subject: SyncSubject<'_>, tool_id: &str) -> SyncRequest {
        let overwrite = subject
            .origin_tool
            .is_some_and(|origin| self.registry.shares_dir(origin, tool_id));
        SyncRequest {
            central_path: subject.central_path.to_string(),
            skill_id: subject.skill_id.to_string(),
            tool_id: tool_id.to_string(),
            name: subject.name.to_string(),
            overwrite,
        }
    }

    async fn project(&self, subject: SyncSubject<'_>, tool_id: &str) -> Result<()> {
        let request = self.request_for(subject, tool_id);
        tracing::debug!(
            skill = %request.name,
            tool = %request.tool_id,
            overwrite = request.overwrite,
            "Syncing skill to tool"
        );
        self.backend.sync_skill_to_tool(&request).await?;
        Ok(())
    }

    /// Projects a freshly installed or imported skill into every fan-out
    /// target, recording failures without stopping.
    async fn fan_out(&self, subject: SyncSubject<'_>, report: &mut BatchReport) {
        let targets = self.fan_out_targets();
        if targets.is_empty() {
            report.errors.push(ReportEntry::unsynced(
                subject.name,
                ValidationError::NoSyncTargets.into(),
            ));
            return;
        }

        for step in StepQueue::new(targets) {
            let tool_label = self.registry.label(&step.item).to_string();
            self.progress.emit(ProgressEvent::Sync {
                current: step.current,
                total: step.total,
                skill_name: subject.name.to_string(),
                tool_label: tool_label.clone(),
            });
            match self.project(subject, &step.item).await {
                Ok(()) => report.synced += 1,
                Err(err) => {
                    tracing::warn!(
                        skill = %subject.name,
                        tool = %step.item,
                        error = %err,
                        "Sync failed"
                    );
                    report
                        .errors
                        .push(ReportEntry::sync_failed(subject.name, &tool_label, err));
                }
            }
        }
    }

    async fn reload_skills(&mut self) -> Result<()> {
        self.progress.emit(ProgressEvent::Refreshing);
        self.skills = self.backend.list_managed_skills().await?;
        tracing::debug!(count = self.skills.len(), "Reloaded managed skills");
        Ok(())
    }

    /// Reloads skills after a batch; a failure becomes part of the report.
    async fn reload_skills_into(&mut self, report: &mut BatchReport) {
        if let Err(err) = self.reload_skills().await {
            report
                .errors
                .push(ReportEntry::refresh_failed("managed skills", err));
        }
    }

    /// Reloads skills after a single-step action. The action already
    /// succeeded, so a failed reload is only logged.
    async fn reload_skills_quietly(&mut self) {
        if let Err(err) = self.reload_skills().await {
            tracing::warn!(error = %err, "Failed to reload managed skills");
        }
    }

    fn find_skill(&self, skill_id: &str) -> Result<ManagedSkill> {
        self.skills
            .iter()
            .find(|s| s.id == skill_id)
            .cloned()
            .ok_or_else(|| HubError::UnknownSkill(skill_id.to_string()))
    }
}

/// Trims an input and drops it when nothing is left.
fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

fn required(value: &str, field: &'static str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyInput { field }.into());
    }
    Ok(trimmed.to_string())
}
