//! Tunable parameters for lattice reconstruction and cross-page combination.

use serde::{Deserialize, Serialize};

// Lattice defaults
pub(crate) const DEFAULT_REPEATED_LINE_TOLERANCE: f64 = 2.0;
pub(crate) const DEFAULT_REPEATED_LINE_GAP: f64 = 3.0;
pub(crate) const DEFAULT_ALIGNED_TOLERANCE: f64 = 0.2;
pub(crate) const DEFAULT_MISSING_MATCH_TOLERANCE: f64 = 0.1;
pub(crate) const DEFAULT_PERPENDICULAR_EXPAND: f64 = 2.0;
pub(crate) const DEFAULT_COLINEAR_EXPAND: f64 = 1.0;
pub(crate) const DEFAULT_MIN_RULING_LENGTH: f64 = 0.01;
pub(crate) const DEFAULT_CELL_TEXT_EPSILON: f64 = 1.0;

// Combine defaults
pub(crate) const DEFAULT_COMBINE_THRESHOLD: f64 = 0.7;
pub(crate) const DEFAULT_SINGLE_ROW_PENALTY: f64 = 0.3;
pub(crate) const DEFAULT_COLUMN_COUNT_PENALTY: f64 = 0.6;
pub(crate) const DEFAULT_WIDTH_PENALTY: f64 = 0.6;
pub(crate) const DEFAULT_LINE_STRUCTURE_PENALTY: f64 = 0.6;
pub(crate) const DEFAULT_SAME_HEAD_PENALTY: f64 = 0.8;
pub(crate) const DEFAULT_EXIST_HEAD_PENALTY: f64 = 0.5;
pub(crate) const DEFAULT_NO_TEXT_PENALTY: f64 = 0.5;
pub(crate) const DEFAULT_HEADER_SIMILARITY: f64 = 0.95;
pub(crate) const DEFAULT_REPEATED_TEXT_SIMILARITY: f64 = 0.97;

/// Settings for turning rulings into cells.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeParams {
    /// Fixed (x, y) snap tolerance. `None` derives it from the page's
    /// character metrics and language.
    pub snap_tolerance: Option<(f64, f64)>,
    /// Maximum difference of the fixed coordinate for two rulings to be
    /// treated as repeated strokes of one line.
    pub repeated_line_tolerance: f64,
    /// Minimum gap along the primary axis that keeps two repeated strokes apart.
    pub repeated_line_gap: f64,
    /// Tolerance for vertical ruling endpoints to count as aligned.
    pub aligned_tolerance: f64,
    /// Tolerance when matching a synthesised ruling against existing ones.
    pub missing_match_tolerance: f64,
    /// Expansion applied to perpendicular pairs in near-intersection tests.
    pub perpendicular_expand: f64,
    /// Expansion applied to colinear pairs in near-intersection tests.
    pub colinear_expand: f64,
    /// Rulings shorter than this are dropped after collapsing.
    pub min_ruling_length: f64,
    /// Growth applied to a cell's bounds when assigning text chunks.
    pub cell_text_epsilon: f64,
    /// Join runs of dot rulings into dashed lines.
    pub join_dots: bool,
    /// Rotate tables whose text mostly runs vertically.
    pub correct_rotation: bool,
}

impl Default for LatticeParams {
    fn default() -> Self {
        Self {
            snap_tolerance: None,
            repeated_line_tolerance: DEFAULT_REPEATED_LINE_TOLERANCE,
            repeated_line_gap: DEFAULT_REPEATED_LINE_GAP,
            aligned_tolerance: DEFAULT_ALIGNED_TOLERANCE,
            missing_match_tolerance: DEFAULT_MISSING_MATCH_TOLERANCE,
            perpendicular_expand: DEFAULT_PERPENDICULAR_EXPAND,
            colinear_expand: DEFAULT_COLINEAR_EXPAND,
            min_ruling_length: DEFAULT_MIN_RULING_LENGTH,
            cell_text_epsilon: DEFAULT_CELL_TEXT_EPSILON,
            join_dots: true,
            correct_rotation: true,
        }
    }
}

/// Settings for the cross-page decision and merge.
///
/// The penalty factors multiply a running score that starts at 1.0; two
/// tables combine when `1 - score >= threshold`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CombineParams {
    pub enabled: bool,
    pub threshold: f64,
    pub single_row_penalty: f64,
    pub column_count_penalty: f64,
    pub width_penalty: f64,
    pub line_structure_penalty: f64,
    pub same_head_penalty: f64,
    pub exist_head_penalty: f64,
    pub no_text_penalty: f64,
    /// Header rows at least this similar count as the same header.
    pub header_similarity: f64,
    /// Text in the same rectangle of both pages at least this similar is a
    /// running header or footer, not body text.
    pub repeated_text_similarity: f64,
    /// Widths within `avg * ratio` count as equal.
    pub width_tolerance_ratio: f64,
    /// Fraction of the text region height above which the next table must start.
    pub region_top_ratio: f64,
    /// Region height below which the top position check is skipped.
    pub region_min_height: f64,
    /// Fraction of the region bottom the previous table must reach.
    pub region_bottom_ratio: f64,
    /// Fraction of the page height the previous table must reach.
    pub page_bottom_ratio: f64,
    /// Indent above which a first cell is considered offset from the table edge.
    pub left_edge_tolerance: f64,
    /// Column boundaries closer than this collapse into one.
    pub column_merge_tolerance: f64,
    /// Minimum horizontal overlap for a cell to span a column.
    pub column_overlap_epsilon: f64,
    /// Minimum scorer confidence for a split-cell pair.
    pub semantic_confidence: f64,
    /// Share of text cells the scorer must confirm.
    pub semantic_ratio: f64,
}

impl Default for CombineParams {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: DEFAULT_COMBINE_THRESHOLD,
            single_row_penalty: DEFAULT_SINGLE_ROW_PENALTY,
            column_count_penalty: DEFAULT_COLUMN_COUNT_PENALTY,
            width_penalty: DEFAULT_WIDTH_PENALTY,
            line_structure_penalty: DEFAULT_LINE_STRUCTURE_PENALTY,
            same_head_penalty: DEFAULT_SAME_HEAD_PENALTY,
            exist_head_penalty: DEFAULT_EXIST_HEAD_PENALTY,
            no_text_penalty: DEFAULT_NO_TEXT_PENALTY,
            header_similarity: DEFAULT_HEADER_SIMILARITY,
            repeated_text_similarity: DEFAULT_REPEATED_TEXT_SIMILARITY,
            width_tolerance_ratio: 0.05,
            region_top_ratio: 0.4,
            region_min_height: 100.0,
            region_bottom_ratio: 0.8,
            page_bottom_ratio: 0.5,
            left_edge_tolerance: 10.0,
            column_merge_tolerance: 5.0,
            column_overlap_epsilon: 2.0,
            semantic_confidence: 0.75,
            semantic_ratio: 0.6,
        }
    }
}

/// Complete configuration, loadable from a partial JSON document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub lattice: LatticeParams,
    pub combine: CombineParams,
}

impl Config {
    /// Parses a configuration; fields absent from the JSON keep their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_json(r#"{"combine": {"threshold": 0.5}}"#).unwrap();
        assert_eq!(config.combine.threshold, 0.5);
        assert_eq!(config.combine.single_row_penalty, 0.3);
        assert!(config.combine.enabled);
        assert_eq!(config.lattice.repeated_line_tolerance, 2.0);
        assert!(config.lattice.snap_tolerance.is_none());
    }

    #[test]
    fn test_empty_config() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config.combine.header_similarity, 0.95);
        assert!(config.lattice.join_dots);
    }
}
