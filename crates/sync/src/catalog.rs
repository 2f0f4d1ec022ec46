//! View helpers over the managed skill list: search, ordering, and source
//! labels.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::common::ManagedSkill;

/// Ordering of the managed skill list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    /// Most recently updated first
    #[default]
    Updated,
    /// Alphabetical, case-insensitive
    Name,
}

/// Filters by a case-insensitive query over name, central path and source
/// type, then sorts.
pub fn visible_skills<'a>(
    skills: &'a [ManagedSkill],
    query: &str,
    sort: SortBy,
) -> Vec<&'a ManagedSkill> {
    let query = query.trim().to_lowercase();
    let mut out: Vec<&ManagedSkill> = skills
        .iter()
        .filter(|s| {
            query.is_empty()
                || s.name.to_lowercase().contains(&query)
                || s.central_path.to_lowercase().contains(&query)
                || s.source_type.to_lowercase().contains(&query)
        })
        .collect();

    match sort {
        SortBy::Name => out.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        }),
        SortBy::Updated => out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
    }
    out
}

/// Where a skill came from: the git ref for git sources, else the central path.
pub fn source_label(skill: &ManagedSkill) -> &str {
    if skill.source_type.to_lowercase().contains("git") {
        if let Some(source_ref) = skill.source_ref.as_deref() {
            return source_ref;
        }
    }
    &skill.central_path
}

/// A GitHub repository reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubRepo {
    pub owner: String,
    pub repo: String,
}

impl GithubRepo {
    pub fn label(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn href(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

static GITHUB_FALLBACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)github\.com/([^/]+)/([^/#?]+)").expect("Invalid regex pattern")
});

/// Extracts `owner/repo` from a GitHub URL.
///
/// ```
/// use skillhub_sync::catalog::github_info;
///
/// let info = github_info("git+https://github.com/anthropics/skills.git").unwrap();
/// assert_eq!(info.label(), "anthropics/skills");
/// assert!(github_info("https://gitlab.com/a/b").is_none());
/// ```
pub fn github_info(source: &str) -> Option<GithubRepo> {
    let normalized = source.strip_prefix("git+").unwrap_or(source);
    match Url::parse(normalized) {
        Ok(parsed) => {
            if !parsed.host_str()?.contains("github.com") {
                return None;
            }
            let mut parts = parsed.path_segments()?.filter(|p| !p.is_empty());
            let owner = parts.next()?;
            let repo = parts.next()?;
            build_repo(owner, repo)
        }
        Err(_) => {
            let caps = GITHUB_FALLBACK.captures(normalized)?;
            build_repo(caps.get(1)?.as_str(), caps.get(2)?.as_str())
        }
    }
}

fn build_repo(owner: &str, repo: &str) -> Option<GithubRepo> {
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some(GithubRepo {
        owner: owner.to_string(),
        repo: repo.to_string(),
    })
}
