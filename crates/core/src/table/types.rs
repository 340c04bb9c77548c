//! Geometry and text primitives shared by the table modules.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

// Key types for ordered float maps
pub(crate) type KeyF64 = OrderedFloat<f64>;
pub(crate) type KeyPoint = (KeyF64, KeyF64);

pub(crate) fn key_f64(v: f64) -> KeyF64 {
    OrderedFloat(v)
}

/// Y-first key so map iteration follows reading order.
pub(crate) fn key_point(x: f64, y: f64) -> KeyPoint {
    (OrderedFloat(y), OrderedFloat(x))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Axis-aligned rectangle in page space (y grows downward).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center_x(&self) -> f64 {
        (self.x0 + self.x1) / 2.0
    }

    pub fn center_y(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Smallest box containing both.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            top: self.top.min(other.top),
            x1: self.x1.max(other.x1),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn expand(&self, amount: f64) -> BBox {
        BBox {
            x0: self.x0 - amount,
            top: self.top - amount,
            x1: self.x1 + amount,
            bottom: self.bottom + amount,
        }
    }

    pub fn horizontal_overlap(&self, other: &BBox) -> f64 {
        (self.x1.min(other.x1) - self.x0.max(other.x0)).max(0.0)
    }

    pub fn vertical_overlap(&self, other: &BBox) -> f64 {
        (self.bottom.min(other.bottom) - self.top.max(other.top)).max(0.0)
    }

    /// Strict overlap: touching edges do not count.
    pub fn intersects(&self, other: &BBox) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.top < other.bottom && other.top < self.bottom
    }

    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.top && y <= self.bottom
    }
}

/// How a ruling was drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DrawType {
    #[default]
    Line,
    Dot,
    Rect,
    ImageLine,
    ImageDot,
    ImageGrid,
}

/// Extent below which a shape counts as thin.
pub const THIN_EXTENT: f64 = 2.0;

impl DrawType {
    /// Classifies a vector shape by its extents.
    pub fn from_extent(width: f64, height: f64) -> Self {
        match (width < THIN_EXTENT, height < THIN_EXTENT) {
            (true, true) => DrawType::Dot,
            (true, false) | (false, true) => DrawType::Line,
            (false, false) => DrawType::Rect,
        }
    }

    pub fn is_image(self) -> bool {
        matches!(
            self,
            DrawType::ImageLine | DrawType::ImageDot | DrawType::ImageGrid
        )
    }

    pub fn is_dot(self) -> bool {
        matches!(self, DrawType::Dot | DrawType::ImageDot)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// A positioned text fragment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    pub bbox: BBox,
    pub text: String,
    /// Text direction in degrees (0, 90, 180 or 270).
    #[serde(default)]
    pub rotation: i32,
    /// Part of a running page header.
    #[serde(default)]
    pub is_page_header: bool,
    /// Part of a page number line.
    #[serde(default)]
    pub is_pagination: bool,
}

impl TextChunk {
    pub fn new(bbox: BBox, text: impl Into<String>) -> Self {
        Self {
            bbox,
            text: text.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableType {
    #[default]
    Ruled,
    Unruled,
}

/// Boundary marker for rows on either side of a page break.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrossPageRow {
    #[serde(rename = "lastRow")]
    LastRow,
    #[serde(rename = "firstRow")]
    FirstRow,
}

// Internal ID types for efficient indexing
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub(crate) struct VRulingId(pub usize);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub(crate) struct HRulingId(pub usize);

/// Index of a cell in its container's arena.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct CellId(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_type_from_extent() {
        assert_eq!(DrawType::from_extent(1.0, 1.5), DrawType::Dot);
        assert_eq!(DrawType::from_extent(100.0, 0.5), DrawType::Line);
        assert_eq!(DrawType::from_extent(0.5, 100.0), DrawType::Line);
        assert_eq!(DrawType::from_extent(10.0, 10.0), DrawType::Rect);
    }

    #[test]
    fn test_bbox_overlap() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(5.0, 8.0, 20.0, 30.0);
        assert_eq!(a.horizontal_overlap(&b), 5.0);
        assert_eq!(a.vertical_overlap(&b), 2.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&BBox::new(10.0, 0.0, 20.0, 10.0)));
        assert_eq!(a.union(&b), BBox::new(0.0, 0.0, 20.0, 30.0));
    }

    #[test]
    fn test_cross_page_row_serde() {
        let json = serde_json::to_string(&CrossPageRow::FirstRow).unwrap();
        assert_eq!(json, "\"firstRow\"");
    }
}
