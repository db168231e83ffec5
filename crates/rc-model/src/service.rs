//! Payloads exchanged with the record cleaning service.

use serde::{Deserialize, Serialize};

use crate::enums::Outcome;
use crate::ids::RecordId;
use crate::lenient;
use crate::record::{Record, Sref};
use crate::rules::OrgGroupRules;

/// Verdict for one submitted record, plus the fields the service echoes or derives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResult {
    pub id: RecordId,
    pub result: Outcome,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub messages: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub tvk: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name: Option<String>,
    #[serde(default)]
    pub sref: Option<Sref>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub vc: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub stage: Option<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub id_difficulty: Vec<String>,
}

impl ServiceResult {
    /// A bare result with no echoed fields.
    pub fn new(id: RecordId, result: Outcome) -> Self {
        Self {
            id,
            result,
            messages: Vec::new(),
            date: None,
            tvk: None,
            name: None,
            sref: None,
            vc: None,
            stage: None,
            id_difficulty: Vec::new(),
        }
    }
}

/// Body of a verification request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// Empty means every rule of every group.
    pub org_group_rules_list: Vec<OrgGroupRules>,
    pub records: Vec<Record>,
}

/// Body of a verification response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub records: Vec<ServiceResult>,
}
