//! Tool registry: answers installed and shared-directory questions over the
//! latest [`ToolStatus`] snapshot.

use std::collections::{HashMap, HashSet};

use crate::common::{ToolInfo, ToolStatus};

/// Groups tools by identical `skills_dir`.
///
/// Only directories used by two or more tools produce entries; every member
/// maps to the full group in `tools` order. Absence means "not shared".
pub fn group_by_shared_dir(tools: &[ToolInfo]) -> HashMap<String, Vec<String>> {
    let mut by_dir: HashMap<&str, Vec<String>> = HashMap::new();
    for tool in tools {
        by_dir
            .entry(tool.skills_dir.as_str())
            .or_default()
            .push(tool.id.clone());
    }

    let mut out = HashMap::new();
    for ids in by_dir.into_values() {
        if ids.len() < 2 {
            continue;
        }
        for id in &ids {
            out.insert(id.clone(), ids.clone());
        }
    }
    out
}

/// Keeps at most one id per distinct `skills_dir`.
///
/// Output follows `order_source` order and keeps the first id met for each
/// directory. Ids missing from `order_source` are dropped.
///
/// ```
/// use skillhub_sync::{dedup_by_skills_dir, ToolInfo};
///
/// let tools = vec![
///     ToolInfo::new("a", "/x", "A"),
///     ToolInfo::new("b", "/x", "B"),
///     ToolInfo::new("c", "/y", "C"),
/// ];
/// let ids = vec!["b".to_string(), "c".to_string(), "a".to_string()];
/// assert_eq!(dedup_by_skills_dir(&ids, &tools), vec!["a", "c"]);
/// ```
pub fn dedup_by_skills_dir(tool_ids: &[String], order_source: &[ToolInfo]) -> Vec<String> {
    let wanted: HashSet<&str> = tool_ids.iter().map(String::as_str).collect();
    let mut seen_dirs: HashSet<&str> = HashSet::new();
    let mut out = Vec::new();
    for tool in order_source {
        if !wanted.contains(tool.id.as_str()) {
            continue;
        }
        if !seen_dirs.insert(tool.skills_dir.as_str()) {
            continue;
        }
        out.push(tool.id.clone());
    }
    out
}

/// Snapshot-backed view of detected tools.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    status: ToolStatus,
    shared: HashMap<String, Vec<String>>,
    installed: HashSet<String>,
}

impl ToolRegistry {
    pub fn new(status: ToolStatus) -> Self {
        let shared = group_by_shared_dir(&status.tools);
        let installed = status.installed.iter().cloned().collect();
        Self {
            status,
            shared,
            installed,
        }
    }

    /// Replaces the snapshot wholesale.
    pub fn replace(&mut self, status: ToolStatus) {
        *self = Self::new(status);
    }

    pub fn status(&self) -> &ToolStatus {
        &self.status
    }

    pub fn tools(&self) -> &[ToolInfo] {
        &self.status.tools
    }

    pub fn tool(&self, id: &str) -> Option<&ToolInfo> {
        self.status.tools.iter().find(|t| t.id == id)
    }

    /// Display label, falling back to the id for unknown tools.
    pub fn label<'a>(&'a self, id: &'a str) -> &'a str {
        self.tool(id).map(|t| t.label.as_str()).unwrap_or(id)
    }

    pub fn is_installed(&self, id: &str) -> bool {
        self.installed.contains(id)
    }

    pub fn newly_installed(&self) -> &[String] {
        &self.status.newly_installed
    }

    /// The shared group containing `id`, if its directory is shared.
    pub fn shared_group(&self, id: &str) -> Option<&[String]> {
        self.shared.get(id).map(Vec::as_slice)
    }

    /// Other members of the shared group of `id`.
    pub fn shared_peers(&self, id: &str) -> Vec<String> {
        self.shared_group(id)
            .map(|group| group.iter().filter(|other| *other != id).cloned().collect())
            .unwrap_or_default()
    }

    /// True when `a` and `b` are the same tool or read the same directory.
    pub fn shares_dir(&self, a: &str, b: &str) -> bool {
        a == b
            || self
                .shared_group(a)
                .is_some_and(|group| group.iter().any(|id| id == b))
    }

    pub fn dedup(&self, tool_ids: &[String]) -> Vec<String> {
        dedup_by_skills_dir(tool_ids, &self.status.tools)
    }
}
