//! Local and git install flows, and the candidate picker behind them.

use std::collections::HashSet;

use super::{non_empty, required, CandidateSource, Picker, SkillHub, SyncSubject};
use crate::backend::HubBackend;
use crate::common::{Candidate, InstallResult};
use crate::error::{HubError, ValidationError};
use crate::progress::{ProgressEvent, StepQueue};
use crate::report::{BatchReport, ReportEntry};
use crate::Result;

/// How an add flow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Something was installed and fanned out
    Installed(BatchReport),
    /// Several (or only invalid) candidates were found; the picker is open
    PickerOpened { candidates: usize },
}

/// URLs that already point at one folder inside a repository.
fn is_folder_url(url: &str) -> bool {
    url.contains("/tree/") || url.contains("/blob/")
}

/// Checks a batch selection before any remote call.
fn validate_selection(
    candidates: &[Candidate],
    name_override: Option<&str>,
    is_taken: impl Fn(&str) -> bool,
) -> Result<()> {
    if candidates.is_empty() {
        return Err(ValidationError::NothingSelected.into());
    }
    if candidates.len() > 1 && name_override.is_some() {
        return Err(ValidationError::CustomNameRequiresSingleSelection.into());
    }

    let mut seen = HashSet::new();
    for candidate in candidates {
        let name = name_override.unwrap_or(&candidate.name);
        if !seen.insert(name.to_lowercase()) || is_taken(name) {
            return Err(ValidationError::DuplicateOrExistingName {
                name: name.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

impl<B: HubBackend> SkillHub<B> {
    /// Lists a local folder and installs its only skill, or opens the picker.
    pub async fn install_from_local(
        &mut self,
        base_path: &str,
        desired_name: Option<&str>,
    ) -> Result<InstallOutcome> {
        let _guard = self.busy.try_acquire()?;
        let _finished = self.progress.finish_on_drop();
        let base_path = required(base_path, "local path")?;
        let desired_name = non_empty(desired_name);
        let source = CandidateSource::Local {
            base_path: base_path.clone(),
        };

        tracing::info!(base_path = %base_path, "Listing local candidates");
        self.progress.emit(ProgressEvent::Listing {
            source: base_path.clone(),
        });
        let candidates = self.backend.list_local_candidates(&base_path).await?;
        if candidates.is_empty() {
            return Err(HubError::NoCandidatesFound);
        }

        let outcome = match single_valid(&candidates) {
            Some(candidate) => {
                let name = desired_name.as_deref().unwrap_or(&candidate.name);
                if self.is_name_taken(name) {
                    return Err(HubError::NameAlreadyExists {
                        name: name.to_string(),
                    });
                }
                self.progress.emit(ProgressEvent::Install {
                    current: 1,
                    total: 1,
                    name: name.to_string(),
                });
                let created = self
                    .backend
                    .install_local_selection(&base_path, &candidate.subpath, desired_name.clone())
                    .await?;
                InstallOutcome::Installed(self.complete_direct(&source, created).await)
            }
            None => self.open_picker(source, candidates, desired_name),
        };
        Ok(outcome)
    }

    /// Installs from a repository URL.
    ///
    /// Folder URLs (`/tree/...`, `/blob/...`) install directly without a
    /// listing; repository roots behave like [`Self::install_from_local`].
    pub async fn install_from_git(
        &mut self,
        repo_url: &str,
        desired_name: Option<&str>,
    ) -> Result<InstallOutcome> {
        let _guard = self.busy.try_acquire()?;
        let _finished = self.progress.finish_on_drop();
        let repo_url = required(repo_url, "git url")?;
        let desired_name = non_empty(desired_name);
        let source = CandidateSource::Git {
            repo_url: repo_url.clone(),
        };

        if is_folder_url(&repo_url) {
            if let Some(name) = desired_name.as_deref() {
                if self.is_name_taken(name) {
                    return Err(HubError::NameAlreadyExists {
                        name: name.to_string(),
                    });
                }
            }
            tracing::info!(repo_url = %repo_url, "Installing git folder directly");
            self.progress.emit(ProgressEvent::Install {
                current: 1,
                total: 1,
                name: desired_name.clone().unwrap_or_else(|| repo_url.clone()),
            });
            let created = self.backend.install_git(&repo_url, desired_name).await?;
            let report = self.complete_direct(&source, created).await;
            return Ok(InstallOutcome::Installed(report));
        }

        tracing::info!(repo_url = %repo_url, "Listing git candidates");
        self.progress.emit(ProgressEvent::Listing {
            source: repo_url.clone(),
        });
        let candidates = self.backend.list_git_candidates(&repo_url).await?;
        if candidates.is_empty() {
            return Err(HubError::NoCandidatesFound);
        }

        let outcome = if let [candidate] = candidates.as_slice() {
            let name = desired_name.as_deref().unwrap_or(&candidate.name);
            if self.is_name_taken(name) {
                return Err(HubError::NameAlreadyExists {
                    name: name.to_string(),
                });
            }
            self.progress.emit(ProgressEvent::Install {
                current: 1,
                total: 1,
                name: name.to_string(),
            });
            let created = self
                .backend
                .install_git_selection(&repo_url, &candidate.subpath, desired_name.clone())
                .await?;
            InstallOutcome::Installed(self.complete_direct(&source, created).await)
        } else {
            self.open_picker(source, candidates, desired_name)
        };
        Ok(outcome)
    }

    /// Runs [`Self::install_from_local`] with the add-form inputs.
    pub async fn install_from_local_form(&mut self) -> Result<InstallOutcome> {
        let path = self.form.local_path.clone();
        let name = self.form.local_name.clone();
        self.install_from_local(&path, Some(&name)).await
    }

    /// Runs [`Self::install_from_git`] with the add-form inputs.
    pub async fn install_from_git_form(&mut self) -> Result<InstallOutcome> {
        let url = self.form.git_url.clone();
        let name = self.form.git_name.clone();
        self.install_from_git(&url, Some(&name)).await
    }

    /// Sets one picker entry. Returns false when no picker is open or the
    /// subpath is not listed.
    pub fn toggle_candidate(&mut self, subpath: &str, checked: bool) -> bool {
        self.picker
            .as_mut()
            .is_some_and(|p| p.selector.toggle(subpath, checked))
    }

    /// Selects or clears every picker entry; invalid local candidates stay off.
    pub fn toggle_all_candidates(&mut self, checked: bool) {
        if let Some(picker) = self.picker.as_mut() {
            if picker.source.respects_validity() {
                picker.selector.toggle_all(checked, |c| c.valid);
            } else {
                picker.selector.toggle_all(checked, |_| true);
            }
        }
    }

    /// Closes the picker, dropping its candidates and selection.
    pub fn cancel_picker(&mut self) -> Result<()> {
        if self.busy.is_busy() {
            return Err(HubError::Busy);
        }
        self.picker = None;
        Ok(())
    }

    /// Installs the picker's selection under the name requested when the
    /// picker was opened.
    pub async fn confirm_picker(&mut self) -> Result<BatchReport> {
        let picker = self
            .picker
            .as_ref()
            .ok_or(HubError::Validation(ValidationError::NothingSelected))?;
        let source = picker.source.clone();
        let selected = picker.selected();
        let name_override = picker.desired_name.clone();
        self.install_selected_candidates(source, selected, name_override.as_deref())
            .await
    }

    /// Installs `candidates` one at a time, fanning each out immediately.
    ///
    /// The whole selection is validated first; nothing is sent to the
    /// backend when it is rejected. Per-candidate failures are recorded and
    /// the batch moves on. The picker is closed once the batch has run and
    /// the originating form inputs are cleared.
    pub async fn install_selected_candidates(
        &mut self,
        source: CandidateSource,
        candidates: Vec<Candidate>,
        name_override: Option<&str>,
    ) -> Result<BatchReport> {
        let _guard = self.busy.try_acquire()?;
        let _finished = self.progress.finish_on_drop();
        let name_override = non_empty(name_override);
        validate_selection(&candidates, name_override.as_deref(), |n| {
            self.is_name_taken(n)
        })?;

        tracing::info!(
            source = %source.location(),
            count = candidates.len(),
            "Installing selected candidates"
        );
        let mut report = BatchReport::new();
        for step in StepQueue::new(candidates) {
            let candidate = step.item;
            let name = name_override.clone().unwrap_or_else(|| candidate.name.clone());
            self.progress.emit(ProgressEvent::Install {
                current: step.current,
                total: step.total,
                name: name.clone(),
            });

            let installed = match &source {
                CandidateSource::Local { base_path } => {
                    self.backend
                        .install_local_selection(base_path, &candidate.subpath, name_override.clone())
                        .await
                }
                CandidateSource::Git { repo_url } => {
                    self.backend
                        .install_git_selection(repo_url, &candidate.subpath, name_override.clone())
                        .await
                }
            };
            match installed {
                Ok(created) => {
                    self.fan_out(SyncSubject::installed(&created, None), &mut report)
                        .await;
                    report.installed.push(created);
                }
                Err(err) => {
                    tracing::warn!(candidate = %name, error = %err, "Install failed");
                    report
                        .errors
                        .push(ReportEntry::install_failed(&name, err.into()));
                }
            }
        }

        self.picker = None;
        self.form.clear_for(&source);
        self.reload_skills_into(&mut report).await;
        Ok(report)
    }

    fn open_picker(
        &mut self,
        source: CandidateSource,
        candidates: Vec<Candidate>,
        desired_name: Option<String>,
    ) -> InstallOutcome {
        let count = candidates.len();
        tracing::info!(source = %source.location(), candidates = count, "Opening candidate picker");
        self.picker = Some(Picker::open(source, candidates, desired_name));
        InstallOutcome::PickerOpened { candidates: count }
    }

    /// Fan-out and bookkeeping after a direct single install.
    async fn complete_direct(&mut self, source: &CandidateSource, created: InstallResult) -> BatchReport {
        tracing::info!(skill = %created.name, central_path = %created.central_path, "Installed skill");
        let mut report = BatchReport::new();
        self.fan_out(SyncSubject::installed(&created, None), &mut report)
            .await;
        report.installed.push(created);
        self.picker = None;
        self.form.clear_for(source);
        self.reload_skills_into(&mut report).await;
        report
    }
}

fn single_valid(candidates: &[Candidate]) -> Option<&Candidate> {
    match candidates {
        [only] if only.valid => Some(only),
        _ => None,
    }
}
