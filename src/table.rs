//! Assemble per-sample feature rows into a single table and join it with
//! antibiotic resistance labels.

use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use thiserror::Error;

use crate::binner::FeatureRow;

/// All the ways table assembly can fail
#[derive(Debug, Clone, Error)]
pub enum TableError {
    #[error("feature row {id} has {got} windows but the table expects {expected}")]
    WindowCountMismatch {
        id: String,
        expected: usize,
        got: usize,
    },
    #[error("label row {id} does not match the table's label columns")]
    LabelColumnMismatch { id: String },
}

/// An ordered collection of [`FeatureRow`]s sharing a single window-label
/// sequence. Rows keep the order they were pushed in.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FeatureTable {
    /// The window range label of each column
    pub window_labels: Vec<String>,
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new(window_labels: Vec<String>) -> Self {
        Self {
            window_labels,
            rows: Vec::new(),
        }
    }

    /// Build a table from rows in one step, preserving input order.
    pub fn assemble<I: IntoIterator<Item = FeatureRow>>(
        window_labels: Vec<String>,
        rows: I,
    ) -> Result<Self, TableError> {
        let mut table = Self::new(window_labels);
        for row in rows {
            table.push(row)?;
        }
        Ok(table)
    }

    /// Append a row, failing if its width differs from the label sequence.
    pub fn push(&mut self, row: FeatureRow) -> Result<(), TableError> {
        if row.len() != self.window_labels.len() {
            return Err(TableError::WindowCountMismatch {
                id: row.id,
                expected: self.window_labels.len(),
                got: row.intensities.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Left-join this table with `labels` on the sample identifier.
    ///
    /// Every feature row appears in the result; rows without a matching
    /// label keep `None` for their label fields. Label rows that match no
    /// feature row are dropped.
    pub fn join(&self, labels: &LabelTable) -> JoinedTable {
        let rows = self
            .rows
            .iter()
            .map(|row| JoinedRow {
                id: row.id.clone(),
                intensities: row.intensities.clone(),
                labels: labels.get(&row.id).map(|l| l.fields.clone()),
            })
            .collect();
        JoinedTable {
            window_labels: self.window_labels.clone(),
            label_columns: labels.columns.clone(),
            rows,
        }
    }
}

/// One sample's label fields, in column order
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LabelRow {
    pub id: String,
    pub fields: Vec<String>,
}

/// Label rows keyed by sample identifier, all sharing one column set.
///
/// Pushing a second row with an identifier already present replaces the
/// earlier row.
#[derive(Debug, Default, Clone)]
pub struct LabelTable {
    /// The label column names, e.g. antibiotic identifiers
    pub columns: Vec<String>,
    rows: Vec<LabelRow>,
    index: HashMap<String, usize>,
}

impl LabelTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Append a row, failing if its field count differs from the column set.
    pub fn push(&mut self, row: LabelRow) -> Result<(), TableError> {
        if row.fields.len() != self.columns.len() {
            return Err(TableError::LabelColumnMismatch { id: row.id });
        }
        match self.index.get(&row.id) {
            Some(&i) => self.rows[i] = row,
            None => {
                self.index.insert(row.id.clone(), self.rows.len());
                self.rows.push(row);
            }
        }
        Ok(())
    }

    /// Look up a sample's labels by identifier.
    pub fn get(&self, id: &str) -> Option<&LabelRow> {
        self.index.get(id).map(|i| &self.rows[*i])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One row of a [`JoinedTable`]: the feature vector plus the sample's label
/// fields, `None` when no label row matched.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JoinedRow {
    pub id: String,
    pub intensities: Vec<f32>,
    pub labels: Option<Vec<String>>,
}

/// A [`FeatureTable`] left-joined with a [`LabelTable`].
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JoinedTable {
    pub window_labels: Vec<String>,
    pub label_columns: Vec<String>,
    pub rows: Vec<JoinedRow>,
}

#[cfg(test)]
mod test {
    use super::*;

    fn labels3() -> Vec<String> {
        vec!["1000-1003".into(), "1003-1006".into(), "1006-1009".into()]
    }

    #[test]
    fn test_assemble_preserves_order() {
        let table = FeatureTable::assemble(
            labels3(),
            vec![
                FeatureRow::new("sample_b", vec![1.0, 0.0, 0.0]),
                FeatureRow::new("sample_a", vec![0.0, 2.0, 0.0]),
            ],
        )
        .unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].id, "sample_b");
        assert_eq!(table.rows()[1].id, "sample_a");
    }

    #[test]
    fn test_push_rejects_width_mismatch() {
        let mut table = FeatureTable::new(labels3());
        let err = table
            .push(FeatureRow::new("sample_a", vec![1.0, 2.0]))
            .unwrap_err();
        match err {
            TableError::WindowCountMismatch { id, expected, got } => {
                assert_eq!(id, "sample_a");
                assert_eq!(expected, 3);
                assert_eq!(got, 2);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(table.is_empty());
    }

    #[test]
    fn test_label_table_lookup_and_replace() {
        let mut labels = LabelTable::new(vec!["ampicillin".into(), "ciprofloxacin".into()]);
        labels
            .push(LabelRow {
                id: "sample_a".into(),
                fields: vec!["R".into(), "S".into()],
            })
            .unwrap();
        labels
            .push(LabelRow {
                id: "sample_a".into(),
                fields: vec!["S".into(), "S".into()],
            })
            .unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(labels.get("sample_a").unwrap().fields[0], "S");
        assert!(labels.get("sample_z").is_none());

        let err = labels.push(LabelRow {
            id: "sample_b".into(),
            fields: vec!["R".into()],
        });
        assert!(matches!(
            err,
            Err(TableError::LabelColumnMismatch { id }) if id == "sample_b"
        ));
    }

    #[test]
    fn test_left_join_semantics() {
        let table = FeatureTable::assemble(
            labels3(),
            vec![
                FeatureRow::new("sample_a", vec![1.0, 0.0, 0.0]),
                FeatureRow::new("sample_b", vec![0.0, 2.0, 0.0]),
            ],
        )
        .unwrap();

        let mut labels = LabelTable::new(vec!["ampicillin".into()]);
        labels
            .push(LabelRow {
                id: "sample_a".into(),
                fields: vec!["R".into()],
            })
            .unwrap();
        // no matching feature row, must not appear in the join
        labels
            .push(LabelRow {
                id: "sample_c".into(),
                fields: vec!["S".into()],
            })
            .unwrap();

        let joined = table.join(&labels);
        assert_eq!(joined.rows.len(), 2);
        assert_eq!(joined.label_columns, vec!["ampicillin".to_string()]);
        assert_eq!(joined.rows[0].labels.as_deref(), Some(&["R".to_string()][..]));
        assert!(joined.rows[1].labels.is_none());
        assert!(joined.rows.iter().all(|r| r.id != "sample_c"));
    }
}
