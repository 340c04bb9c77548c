//! Page input model and text line helpers.

use serde::{Deserialize, Serialize};

use crate::table::clustering::cluster_by_average;
use crate::table::grid::LINE_TOLERANCE;
use crate::table::ruling::Ruling;
use crate::table::types::{BBox, TextChunk};
use crate::utils::has_cjk;

/// Everything known about one page before table reconstruction.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageContext {
    /// 1-based page number.
    pub number: usize,
    pub width: f64,
    pub height: f64,
    /// Region holding the page's body text.
    pub text_bounds: BBox,
    pub min_char_width: f64,
    pub min_char_height: f64,
    pub rulings: Vec<Ruling>,
    pub chunks: Vec<TextChunk>,
}

/// Pages of a document, as read by the command line tool.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DocumentInput {
    pub pages: Vec<PageContext>,
}

/// Chunks merged into one line of text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub bbox: BBox,
    pub text: String,
    /// Set when the line belongs to a detected running header.
    pub is_page_header: bool,
    /// Set when every chunk of the line is pagination.
    pub is_pagination: bool,
}

impl PageContext {
    pub fn new(number: usize, width: f64, height: f64) -> Self {
        Self {
            number,
            width,
            height,
            text_bounds: BBox::new(0.0, 0.0, width, height),
            ..Default::default()
        }
    }

    pub fn bottom(&self) -> f64 {
        self.height
    }

    /// A page counts as Chinese when any chunk holds a CJK character.
    pub fn is_chinese(&self) -> bool {
        self.chunks.iter().any(|c| has_cjk(&c.text))
    }

    /// Chunks whose centre lies in `area`.
    pub fn chunks_in(&self, area: &BBox) -> Vec<&TextChunk> {
        if area.is_empty() {
            return Vec::new();
        }
        self.chunks
            .iter()
            .filter(|c| area.contains_point(c.bbox.center_x(), c.bbox.center_y()))
            .collect()
    }

    /// Lines of text in `area`, top to bottom.
    pub fn lines_in(&self, area: &BBox) -> Vec<TextLine> {
        collect_lines(&self.chunks_in(area))
    }
}

/// Group chunks into lines by vertical centre; chunks within a line are
/// joined left to right.
pub fn collect_lines(chunks: &[&TextChunk]) -> Vec<TextLine> {
    cluster_by_average(chunks, |c| c.bbox.center_y(), LINE_TOLERANCE)
        .into_iter()
        .filter_map(|mut idxs| {
            idxs.sort_by(|&a, &b| {
                chunks[a]
                    .bbox
                    .x0
                    .partial_cmp(&chunks[b].bbox.x0)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let first = chunks[*idxs.first()?];
            let mut line = TextLine {
                bbox: first.bbox,
                text: String::new(),
                is_page_header: false,
                is_pagination: true,
            };
            for &i in &idxs {
                let chunk = chunks[i];
                line.bbox = line.bbox.union(&chunk.bbox);
                line.text.push_str(&chunk.text);
                line.is_page_header |= chunk.is_page_header;
                line.is_pagination &= chunk.is_pagination;
            }
            Some(line)
        })
        .collect()
}
