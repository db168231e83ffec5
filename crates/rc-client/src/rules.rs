//! Organisation group rule listings.

use rc_model::OrgGroupCatalogue;
use rc_model::lenient;
use serde::Deserialize;

/// Entry of `GET /rules/org-groups`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrgGroup {
    #[serde(deserialize_with = "lenient::number")]
    pub id: u32,
    pub organisation: String,
    pub group: String,
}

/// Body of `GET /rules/org-groups/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrgGroupDetail {
    pub organisation: String,
    pub group: String,
    #[serde(default)]
    pub rules: Vec<RuleEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleEntry {
    #[serde(alias = "name")]
    pub rule_type: String,
}

/// Display label of a rule type: `period` becomes `Period Rule`.
pub fn rule_label(rule_type: &str) -> String {
    let rule_type = rule_type.trim();
    let mut chars = rule_type.chars();
    match chars.next() {
        Some(first) => format!("{}{} Rule", first.to_uppercase(), chars.as_str()),
        None => String::new(),
    }
}

/// Combine group details into organisation -> group -> rule labels.
pub fn build_catalogue(details: impl IntoIterator<Item = OrgGroupDetail>) -> OrgGroupCatalogue {
    let mut catalogue = OrgGroupCatalogue::new();
    for detail in details {
        let rules = catalogue
            .entry(detail.organisation)
            .or_default()
            .entry(detail.group)
            .or_default();
        for rule in detail.rules {
            let label = rule_label(&rule.rule_type);
            if !label.is_empty() && !rules.contains(&label) {
                rules.push(label);
            }
        }
    }
    catalogue
}
