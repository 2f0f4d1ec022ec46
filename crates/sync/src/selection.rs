//! Selection state: which candidates will be installed and which tools
//! receive newly installed skills.

use std::collections::HashMap;

use crate::common::{Candidate, ToolInfo};

/// Items that can be tracked by a [`CandidateSelector`].
pub trait Selectable {
    /// Stable identity within one listing.
    fn key(&self) -> &str;
}

impl Selectable for Candidate {
    fn key(&self) -> &str {
        &self.subpath
    }
}

/// Selection flags scoped to exactly one candidate listing.
///
/// Keys not present in the current list are never stored, so replacing the
/// list cannot leave stale entries behind.
#[derive(Debug, Clone)]
pub struct CandidateSelector<T> {
    items: Vec<T>,
    checked: HashMap<String, bool>,
}

impl<T> Default for CandidateSelector<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            checked: HashMap::new(),
        }
    }
}

impl<T: Selectable + Clone> CandidateSelector<T> {
    /// Starts a selection with each item's flag set by `initial`.
    pub fn new(items: Vec<T>, initial: impl Fn(&T) -> bool) -> Self {
        let checked = items
            .iter()
            .map(|item| (item.key().to_string(), initial(item)))
            .collect();
        Self { items, checked }
    }

    /// Replaces the listing; no flag carries over.
    pub fn replace(&mut self, items: Vec<T>, initial: impl Fn(&T) -> bool) {
        *self = Self::new(items, initial);
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Sets one flag unconditionally. Unknown keys are ignored and
    /// reported with `false`.
    pub fn toggle(&mut self, key: &str, checked: bool) -> bool {
        match self.checked.get_mut(key) {
            Some(flag) => {
                *flag = checked;
                true
            }
            None => false,
        }
    }

    /// Sets every flag to `checked && valid(item)`.
    pub fn toggle_all(&mut self, checked: bool, valid: impl Fn(&T) -> bool) {
        for item in &self.items {
            self.checked
                .insert(item.key().to_string(), checked && valid(item));
        }
    }

    pub fn is_selected(&self, key: &str) -> bool {
        self.checked.get(key).copied().unwrap_or(false)
    }

    /// Checked items in listing order.
    pub fn selected(&self) -> Vec<T> {
        self.items
            .iter()
            .filter(|item| self.is_selected(item.key()))
            .cloned()
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| self.is_selected(item.key()))
            .count()
    }
}

/// Which tools should receive newly installed or imported skills.
///
/// Defaulted once, then owned by the user.
#[derive(Debug, Clone, Default)]
pub struct SyncTargetState {
    checked: HashMap<String, bool>,
    initialized: bool,
}

impl SyncTargetState {
    /// Seeds flags the first time tools are known. Later calls are no-ops.
    ///
    /// With `preferred` set, exactly those ids start checked; otherwise the
    /// installed tools do.
    pub fn initialize(
        &mut self,
        tools: &[ToolInfo],
        installed: &[String],
        preferred: Option<&[String]>,
    ) -> bool {
        if self.initialized {
            return false;
        }
        for tool in tools {
            let on = match preferred {
                Some(ids) => ids.iter().any(|id| *id == tool.id),
                None => installed.iter().any(|id| *id == tool.id),
            };
            self.checked.insert(tool.id.clone(), on);
        }
        self.initialized = true;
        true
    }

    pub fn set(&mut self, tool_id: &str, checked: bool) {
        self.checked.insert(tool_id.to_string(), checked);
        self.initialized = true;
    }

    pub fn set_all<'a>(&mut self, tool_ids: impl IntoIterator<Item = &'a String>, checked: bool) {
        for id in tool_ids {
            self.set(id, checked);
        }
    }

    pub fn is_checked(&self, tool_id: &str) -> bool {
        self.checked.get(tool_id).copied().unwrap_or(false)
    }

    /// Checked ids in `tools` order.
    pub fn checked_ids(&self, tools: &[ToolInfo]) -> Vec<String> {
        tools
            .iter()
            .filter(|t| self.is_checked(&t.id))
            .map(|t| t.id.clone())
            .collect()
    }
}
