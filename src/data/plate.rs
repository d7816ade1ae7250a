//! Plate layout - the shape and initial well contents of one plate
//!
//! This is what the layout endpoint returns. It is consumed once to build the
//! grid and is not touched afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Layout of a plate as delivered by a [`crate::network::LayoutSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateLayout {
    pub rows: usize,
    pub cols: usize,
    pub editable: bool,
    /// Display name, e.g. `AG110`
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub wells: Vec<WellValue>,
}

impl PlateLayout {
    pub fn new(rows: usize, cols: usize, editable: bool) -> Self {
        Self {
            rows,
            cols,
            editable,
            name: None,
            wells: Vec::new(),
        }
    }
}

/// Initial value of a single well
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellValue {
    pub row: usize,
    pub col: usize,
    pub value: String,
}

/// Zero-based address of a well
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct WellPosition {
    pub row: usize,
    pub col: usize,
}

impl WellPosition {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for WellPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_without_wells() {
        let layout: PlateLayout =
            serde_json::from_str(r#"{"rows": 8, "cols": 12, "editable": true}"#).unwrap();
        assert_eq!(layout, PlateLayout::new(8, 12, true));
        assert_eq!(layout.name, None);
    }

    #[test]
    fn test_layout_with_wells() {
        let layout: PlateLayout = serde_json::from_str(
            r#"{"rows": 2, "cols": 3, "editable": false, "name": "AG110",
                "wells": [{"row": 1, "col": 2, "value": "blank"}]}"#,
        )
        .unwrap();
        assert!(!layout.editable);
        assert_eq!(layout.name.as_deref(), Some("AG110"));
        assert_eq!(
            layout.wells,
            vec![WellValue {
                row: 1,
                col: 2,
                value: "blank".to_string()
            }]
        );
    }

    #[test]
    fn test_layout_rejects_negative_rows() {
        let result: Result<PlateLayout, _> =
            serde_json::from_str(r#"{"rows": -1, "cols": 12, "editable": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_position_display() {
        assert_eq!(WellPosition::new(3, 5).to_string(), "(3, 5)");
    }
}
