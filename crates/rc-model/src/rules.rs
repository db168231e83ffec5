//! Verification rule selection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Rules of one organisation group to run during verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgGroupRules {
    pub organisation: String,
    pub group: String,
    pub rules: Vec<String>,
}

/// Available rules, organisation -> group -> rule labels (e.g. `Period Rule`).
pub type OrgGroupCatalogue = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// Which rules a verification run applies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RuleSelection {
    /// Every rule of every organisation group.
    #[default]
    All,
    Selected { groups: Vec<OrgGroupRules> },
}

impl RuleSelection {
    /// Build the `org_group_rules_list` sent with a verification request.
    ///
    /// Rule labels are reduced to their lowercase first word, so both
    /// `Period Rule` and `period` become `period`. Groups left without
    /// rules are dropped.
    pub fn to_request_list(&self) -> Vec<OrgGroupRules> {
        match self {
            RuleSelection::All => Vec::new(),
            RuleSelection::Selected { groups } => groups
                .iter()
                .filter_map(|group| {
                    let mut rules: Vec<String> = Vec::with_capacity(group.rules.len());
                    for label in &group.rules {
                        let Some(rule) = rule_type(label) else {
                            continue;
                        };
                        if !rules.contains(&rule) {
                            rules.push(rule);
                        }
                    }
                    (!rules.is_empty()).then(|| OrgGroupRules {
                        organisation: group.organisation.clone(),
                        group: group.group.clone(),
                        rules,
                    })
                })
                .collect(),
        }
    }
}

/// Convert a rule label such as `Tenkm Rule` into its rule type, `tenkm`.
pub fn rule_type(label: &str) -> Option<String> {
    label
        .split_whitespace()
        .next()
        .map(str::to_lowercase)
}
