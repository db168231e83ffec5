//! Output column plans.
//!
//! A plan is the ordered list of columns written to a result file. Each
//! column carries a [`ColumnFunction`] telling the output writer where its
//! value comes from, and optionally the input column it echoes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::ColumnIndex;

/// Role of an output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnFunction {
    Id,
    Date,
    Tvk,
    Name,
    /// Taxon identifier of whichever kind the session uses.
    Organism,
    Vc,
    Stage,
    Coord1,
    Coord2,
    Precision,
    Additional,
    Result,
    Messages,
    IdDifficulty,
}

impl ColumnFunction {
    pub const ALL: [ColumnFunction; 14] = [
        ColumnFunction::Id,
        ColumnFunction::Date,
        ColumnFunction::Tvk,
        ColumnFunction::Name,
        ColumnFunction::Organism,
        ColumnFunction::Vc,
        ColumnFunction::Stage,
        ColumnFunction::Coord1,
        ColumnFunction::Coord2,
        ColumnFunction::Precision,
        ColumnFunction::Additional,
        ColumnFunction::Result,
        ColumnFunction::Messages,
        ColumnFunction::IdDifficulty,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnFunction::Id => "id",
            ColumnFunction::Date => "date",
            ColumnFunction::Tvk => "tvk",
            ColumnFunction::Name => "name",
            ColumnFunction::Organism => "organism",
            ColumnFunction::Vc => "vc",
            ColumnFunction::Stage => "stage",
            ColumnFunction::Coord1 => "coord1",
            ColumnFunction::Coord2 => "coord2",
            ColumnFunction::Precision => "precision",
            ColumnFunction::Additional => "additional",
            ColumnFunction::Result => "result",
            ColumnFunction::Messages => "messages",
            ColumnFunction::IdDifficulty => "id_difficulty",
        }
    }
}

impl fmt::Display for ColumnFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One column of an output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputColumn {
    /// Header text.
    pub name: String,
    pub function: ColumnFunction,
    /// Input column echoed by this output column, if any.
    pub source: Option<ColumnIndex>,
}

impl OutputColumn {
    pub fn new(name: impl Into<String>, function: ColumnFunction, source: Option<ColumnIndex>) -> Self {
        Self {
            name: name.into(),
            function,
            source,
        }
    }

    /// A column whose value only the service provides.
    pub fn derived(name: impl Into<String>, function: ColumnFunction) -> Self {
        Self::new(name, function, None)
    }
}

/// Ordered output columns for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputColumnPlan {
    columns: Vec<OutputColumn>,
}

impl OutputColumnPlan {
    pub fn new(columns: Vec<OutputColumn>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[OutputColumn] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of the first column with the given function.
    pub fn position(&self, function: ColumnFunction) -> Option<usize> {
        self.columns
            .iter()
            .position(|column| column.function == function)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputColumn> {
        self.columns.iter()
    }
}

impl FromIterator<OutputColumn> for OutputColumnPlan {
    fn from_iter<T: IntoIterator<Item = OutputColumn>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_names_match_serde_form() {
        for function in ColumnFunction::ALL {
            let json = serde_json::to_string(&function).expect("serialize function");
            assert_eq!(json, format!("\"{}\"", function.as_str()));
        }
    }

    #[test]
    fn position_finds_first_match() {
        let plan: OutputColumnPlan = [
            OutputColumn::derived("Id", ColumnFunction::Id),
            OutputColumn::derived("Result", ColumnFunction::Result),
        ]
        .into_iter()
        .collect();
        assert_eq!(plan.position(ColumnFunction::Result), Some(1));
        assert_eq!(plan.position(ColumnFunction::Messages), None);
    }
}
