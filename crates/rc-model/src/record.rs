//! The submission unit sent to the record cleaning service.

use serde::{Deserialize, Serialize};

use crate::ids::RecordId;
use crate::lenient;

/// Spatial reference as exchanged with the service.
///
/// A grid reference carries `gridref`; coordinate pairs carry either
/// `easting`/`northing` or `longitude`/`latitude` plus an `accuracy` in metres.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sref {
    #[serde(deserialize_with = "lenient::number")]
    pub srid: u32,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub gridref: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub easting: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub northing: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub longitude: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub latitude: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::opt_string"
    )]
    pub accuracy: Option<String>,
}

impl Sref {
    pub fn gridref(srid: u32, gridref: impl Into<String>) -> Self {
        Self {
            srid,
            gridref: Some(gridref.into()),
            ..Self::default()
        }
    }
}

/// One record submitted for validation or verification.
///
/// Exactly one of `tvk` and `name` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub date: String,
    pub sref: Sref,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvk: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_record_serializes_without_empty_fields() {
        let record = Record {
            id: RecordId::Number(1),
            date: "01/06/2024".into(),
            sref: Sref::gridref(27700, "SM123456"),
            tvk: Some("NHMSYS0000530739".into()),
            name: None,
            vc: None,
            stage: None,
        };
        insta::assert_json_snapshot!(record, @r#"
        {
          "id": 1,
          "date": "01/06/2024",
          "sref": {
            "srid": 27700,
            "gridref": "SM123456"
          },
          "tvk": "NHMSYS0000530739"
        }
        "#);
    }

    #[test]
    fn sref_accepts_numeric_coordinates() {
        let sref: Sref = serde_json::from_str(
            r#"{"srid": "27700", "easting": 612300, "northing": 545600, "accuracy": 100}"#,
        )
        .expect("parse sref");
        assert_eq!(sref.srid, 27700);
        assert_eq!(sref.easting.as_deref(), Some("612300"));
        assert_eq!(sref.accuracy.as_deref(), Some("100"));
        assert_eq!(sref.gridref, None);
    }
}
