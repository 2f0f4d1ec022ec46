//! In-memory backend for integration tests.
//!
//! Models the central store and per-tool projections closely enough for the
//! orchestrator to observe its own effects, records every mutating call, and
//! lets a test script failures by tool or by candidate.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use skillhub_sync::{
    BackendError, BackendResult, Candidate, HubBackend, InstallResult, ManagedSkill,
    OnboardingPlan, SkillTarget, SyncRequest, ToolInfo, ToolStatus, UpdateResult,
};

/// Calls that reach the backend, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListLocal(String),
    ListGit(String),
    InstallLocal {
        base_path: String,
        subpath: String,
        name: Option<String>,
    },
    InstallGit {
        repo_url: String,
        name: Option<String>,
    },
    InstallGitSelection {
        repo_url: String,
        subpath: String,
        name: Option<String>,
    },
    Import {
        source_path: String,
        name: String,
    },
    Sync(SyncRequest),
    Unsync {
        skill_id: String,
        tool_id: String,
    },
    Update(String),
    Delete(String),
}

#[derive(Default)]
pub struct FakeState {
    pub status: ToolStatus,
    pub skills: Vec<ManagedSkill>,
    pub local: HashMap<String, Vec<Candidate>>,
    pub git: HashMap<String, Vec<Candidate>>,
    pub plan: OnboardingPlan,
    /// Raw error strings returned by "sync skill to tool", keyed by tool id
    pub sync_failures: HashMap<String, String>,
    /// Raw error strings returned by installs, keyed by subpath
    pub install_failures: HashMap<String, String>,
    pub list_failure: Option<String>,
    pub calls: Vec<Call>,
    pub central_path: String,
    pub cleanup_days: u32,
    pub ttl_secs: u32,
    pub cache_entries: usize,
    next_id: usize,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
}

pub fn tool(id: &str, dir: &str, label: &str) -> ToolInfo {
    ToolInfo::new(id, dir, label)
}

/// Claude and an alias share one directory; Codex has its own.
pub fn standard_tools() -> Vec<ToolInfo> {
    vec![
        tool("claude_code", "/home/u/.claude/skills", "Claude Code"),
        tool("claude_alias", "/home/u/.claude/skills", "Claude Alias"),
        tool("codex", "/home/u/.codex/skills", "Codex"),
    ]
}

impl FakeBackend {
    pub fn new(tools: Vec<ToolInfo>, installed: &[&str]) -> Self {
        let backend = Self::default();
        {
            let mut state = backend.state();
            state.status = ToolStatus {
                tools,
                installed: installed.iter().map(|s| s.to_string()).collect(),
                newly_installed: vec![],
            };
            state.central_path = "/home/u/.skillhub/skills".into();
            state.cleanup_days = 30;
            state.ttl_secs = 60;
        }
        backend
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn with_local(self, base_path: &str, candidates: Vec<Candidate>) -> Self {
        self.state().local.insert(base_path.into(), candidates);
        self
    }

    pub fn with_git(self, repo_url: &str, candidates: Vec<Candidate>) -> Self {
        self.state().git.insert(repo_url.into(), candidates);
        self
    }

    pub fn with_skill(self, name: &str, origin_tool: Option<&str>) -> Self {
        {
            let mut state = self.state();
            let mut skill = state.new_skill(name, "local", None);
            skill.origin_tool = origin_tool.map(String::from);
            state.skills.push(skill);
        }
        self
    }

    pub fn with_plan(self, plan: OnboardingPlan) -> Self {
        self.state().plan = plan;
        self
    }

    pub fn fail_sync(self, tool_id: &str, raw: &str) -> Self {
        self.state().sync_failures.insert(tool_id.into(), raw.into());
        self
    }

    pub fn fail_install(self, subpath: &str, raw: &str) -> Self {
        self.state()
            .install_failures
            .insert(subpath.into(), raw.into());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn sync_calls(&self) -> Vec<SyncRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Sync(req) => Some(req),
                _ => None,
            })
            .collect()
    }

    pub fn skill_names(&self) -> Vec<String> {
        self.state().skills.iter().map(|s| s.name.clone()).collect()
    }
}

impl FakeState {
    fn new_skill(&mut self, name: &str, source_type: &str, source_ref: Option<&str>) -> ManagedSkill {
        self.next_id += 1;
        ManagedSkill {
            id: format!("skill-{}", self.next_id),
            name: name.to_string(),
            central_path: format!("{}/{}", self.central_path, name),
            source_type: source_type.to_string(),
            source_ref: source_ref.map(String::from),
            origin_tool: None,
            created_at: self.next_id as i64,
            updated_at: self.next_id as i64,
            targets: vec![],
        }
    }

    fn install(
        &mut self,
        name: &str,
        source_type: &str,
        source_ref: Option<&str>,
    ) -> BackendResult<InstallResult> {
        if self
            .skills
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(name))
        {
            return Err(BackendError::decode("skill already exists in central repo"));
        }
        let skill = self.new_skill(name, source_type, source_ref);
        let result = InstallResult {
            skill_id: skill.id.clone(),
            central_path: skill.central_path.clone(),
            name: skill.name.clone(),
        };
        self.skills.push(skill);
        Ok(result)
    }

    fn candidate_name(list: Option<&Vec<Candidate>>, subpath: &str) -> String {
        list.and_then(|l| l.iter().find(|c| c.subpath == subpath))
            .map(|c| c.name.clone())
            .unwrap_or_else(|| subpath.to_string())
    }

    fn scripted_install_failure(&self, subpath: &str) -> BackendResult<()> {
        match self.install_failures.get(subpath) {
            Some(raw) => Err(BackendError::decode(raw)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl HubBackend for FakeBackend {
    async fn fetch_onboarding_plan(&self) -> BackendResult<OnboardingPlan> {
        Ok(self.state().plan.clone())
    }

    async fn list_managed_skills(&self) -> BackendResult<Vec<ManagedSkill>> {
        Ok(self.state().skills.clone())
    }

    async fn get_tool_status(&self) -> BackendResult<ToolStatus> {
        Ok(self.state().status.clone())
    }

    async fn list_local_candidates(&self, base_path: &str) -> BackendResult<Vec<Candidate>> {
        let mut state = self.state();
        state.calls.push(Call::ListLocal(base_path.into()));
        if let Some(raw) = &state.list_failure {
            return Err(BackendError::decode(raw));
        }
        Ok(state.local.get(base_path).cloned().unwrap_or_default())
    }

    async fn list_git_candidates(&self, repo_url: &str) -> BackendResult<Vec<Candidate>> {
        let mut state = self.state();
        state.calls.push(Call::ListGit(repo_url.into()));
        if let Some(raw) = &state.list_failure {
            return Err(BackendError::decode(raw));
        }
        Ok(state.git.get(repo_url).cloned().unwrap_or_default())
    }

    async fn install_local_selection(
        &self,
        base_path: &str,
        subpath: &str,
        name: Option<String>,
    ) -> BackendResult<InstallResult> {
        let mut state = self.state();
        state.calls.push(Call::InstallLocal {
            base_path: base_path.into(),
            subpath: subpath.into(),
            name: name.clone(),
        });
        state.scripted_install_failure(subpath)?;
        let name =
            name.unwrap_or_else(|| FakeState::candidate_name(state.local.get(base_path), subpath));
        state.install(&name, "local", None)
    }

    async fn install_git(&self, repo_url: &str, name: Option<String>) -> BackendResult<InstallResult> {
        let mut state = self.state();
        state.calls.push(Call::InstallGit {
            repo_url: repo_url.into(),
            name: name.clone(),
        });
        let name = name.unwrap_or_else(|| {
            repo_url
                .trim_end_matches('/')
                .rsplit('/')
                .next()
                .unwrap_or(repo_url)
                .to_string()
        });
        state.install(&name, "git", Some(repo_url))
    }

    async fn install_git_selection(
        &self,
        repo_url: &str,
        subpath: &str,
        name: Option<String>,
    ) -> BackendResult<InstallResult> {
        let mut state = self.state();
        state.calls.push(Call::InstallGitSelection {
            repo_url: repo_url.into(),
            subpath: subpath.into(),
            name: name.clone(),
        });
        state.scripted_install_failure(subpath)?;
        let name =
            name.unwrap_or_else(|| FakeState::candidate_name(state.git.get(repo_url), subpath));
        state.install(&name, "git", Some(repo_url))
    }

    async fn import_existing_skill(
        &self,
        source_path: &str,
        name: &str,
    ) -> BackendResult<InstallResult> {
        let mut state = self.state();
        state.calls.push(Call::Import {
            source_path: source_path.into(),
            name: name.into(),
        });
        state.scripted_install_failure(source_path)?;
        let result = state.install(name, "import", None)?;
        state.plan.groups.retain(|g| g.name != name);
        Ok(result)
    }

    async fn sync_skill_to_tool(&self, request: &SyncRequest) -> BackendResult<()> {
        let mut state = self.state();
        state.calls.push(Call::Sync(request.clone()));
        if let Some(raw) = state.sync_failures.get(&request.tool_id) {
            return Err(BackendError::decode(raw));
        }
        if let Some(skill) = state.skills.iter_mut().find(|s| s.id == request.skill_id) {
            if !skill.is_synced_to(&request.tool_id) {
                skill.targets.push(SkillTarget {
                    tool: request.tool_id.clone(),
                });
            }
        }
        Ok(())
    }

    async fn unsync_skill_from_tool(&self, skill_id: &str, tool_id: &str) -> BackendResult<()> {
        let mut state = self.state();
        state.calls.push(Call::Unsync {
            skill_id: skill_id.into(),
            tool_id: tool_id.into(),
        });
        if let Some(skill) = state.skills.iter_mut().find(|s| s.id == skill_id) {
            skill.targets.retain(|t| t.tool != tool_id);
        }
        Ok(())
    }

    async fn update_managed_skill(&self, skill_id: &str) -> BackendResult<UpdateResult> {
        let mut state = self.state();
        state.calls.push(Call::Update(skill_id.into()));
        let skill = state
            .skills
            .iter_mut()
            .find(|s| s.id == skill_id)
            .ok_or_else(|| BackendError::decode("skill not found"))?;
        skill.updated_at += 100;
        Ok(UpdateResult {
            skill_id: skill.id.clone(),
            name: skill.name.clone(),
            content_changed: true,
            source_revision: None,
        })
    }

    async fn delete_managed_skill(&self, skill_id: &str) -> BackendResult<()> {
        let mut state = self.state();
        state.calls.push(Call::Delete(skill_id.into()));
        state.skills.retain(|s| s.id != skill_id);
        Ok(())
    }

    async fn get_central_repo_path(&self) -> BackendResult<String> {
        Ok(self.state().central_path.clone())
    }

    async fn set_central_repo_path(&self, path: &str) -> BackendResult<String> {
        let mut state = self.state();
        state.central_path = path.to_string();
        Ok(state.central_path.clone())
    }

    async fn get_git_cache_cleanup_days(&self) -> BackendResult<u32> {
        Ok(self.state().cleanup_days)
    }

    async fn set_git_cache_cleanup_days(&self, days: u32) -> BackendResult<u32> {
        self.state().cleanup_days = days;
        Ok(days)
    }

    async fn get_git_cache_ttl_secs(&self) -> BackendResult<u32> {
        Ok(self.state().ttl_secs)
    }

    async fn set_git_cache_ttl_secs(&self, secs: u32) -> BackendResult<u32> {
        self.state().ttl_secs = secs;
        Ok(secs)
    }

    async fn clear_git_cache(&self) -> BackendResult<usize> {
        Ok(std::mem::take(&mut self.state().cache_entries))
    }
}
