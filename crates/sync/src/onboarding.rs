//! First-run import plan with per-group inclusion and variant choice.

use std::collections::HashMap;

use crate::common::{OnboardingGroup, OnboardingPlan, OnboardingVariant};

/// One group resolved against the current choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChosenImport {
    pub name: String,
    pub path: String,
    /// Tool the chosen copy lives in, when the path matches a variant
    pub origin_tool: Option<String>,
}

/// The last fetched plan plus the user's choices over it.
#[derive(Debug, Clone, Default)]
pub struct OnboardingPlanState {
    plan: OnboardingPlan,
    included: HashMap<String, bool>,
    variant: HashMap<String, String>,
}

impl OnboardingPlanState {
    /// Every group included, each on its first variant.
    pub fn new(plan: OnboardingPlan) -> Self {
        let mut included = HashMap::new();
        let mut variant = HashMap::new();
        for group in &plan.groups {
            included.insert(group.name.clone(), true);
            if let Some(first) = group.variants.first() {
                variant.insert(group.name.clone(), first.path.clone());
            }
        }
        Self {
            plan,
            included,
            variant,
        }
    }

    pub fn plan(&self) -> &OnboardingPlan {
        &self.plan
    }

    pub fn is_empty(&self) -> bool {
        self.plan.groups.is_empty()
    }

    pub fn toggle_group(&mut self, name: &str, checked: bool) {
        if let Some(flag) = self.included.get_mut(name) {
            *flag = checked;
        }
    }

    pub fn toggle_all(&mut self, checked: bool) {
        for flag in self.included.values_mut() {
            *flag = checked;
        }
    }

    /// Picks the variant path for a group. Returns `false` for unknown
    /// groups and for paths that are not one of the group's variants.
    pub fn choose_variant(&mut self, name: &str, path: &str) -> bool {
        let known = self
            .plan
            .groups
            .iter()
            .find(|g| g.name == name)
            .is_some_and(|g| g.variants.iter().any(|v| v.path == path));
        if !known {
            return false;
        }
        self.variant.insert(name.to_string(), path.to_string());
        true
    }

    pub fn is_included(&self, name: &str) -> bool {
        self.included.get(name).copied().unwrap_or(false)
    }

    pub fn chosen_path(&self, name: &str) -> Option<&str> {
        self.variant.get(name).map(String::as_str)
    }

    /// Included groups in plan order, each resolved to its chosen variant.
    ///
    /// Groups with no variants at all are skipped.
    pub fn selection(&self) -> Vec<ChosenImport> {
        self.plan
            .groups
            .iter()
            .filter(|g| self.is_included(&g.name))
            .filter_map(|g| self.resolve(g))
            .collect()
    }

    fn resolve(&self, group: &OnboardingGroup) -> Option<ChosenImport> {
        let path = match self.chosen_path(&group.name) {
            Some(path) => path.to_string(),
            None => group.variants.first()?.path.clone(),
        };
        let origin_tool = group
            .variants
            .iter()
            .find(|v: &&OnboardingVariant| v.path == path)
            .map(|v| v.tool.clone());
        Some(ChosenImport {
            name: group.name.clone(),
            path,
            origin_tool,
        })
    }
}
