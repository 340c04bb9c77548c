//! Rulings: oriented line segments that make up table grid lines.
//!
//! A ruling is normalized on construction: a segment within one degree of
//! horizontal or vertical becomes exactly horizontal or vertical, with its
//! endpoints ordered left-to-right or top-to-bottom. Anything else is
//! oblique and only supports the orientation-free operations.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TableError};
use crate::utils::{Point, feq, within};

use super::types::{BBox, Color, DrawType, Orientation};

/// Angular tolerance in degrees for snapping to an axis.
const AXIS_ANGLE_TOLERANCE: f64 = 1.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ruling {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    #[serde(default)]
    pub draw_type: DrawType,
    #[serde(default)]
    pub is_fill: bool,
    #[serde(default)]
    pub is_dashed: bool,
    #[serde(default)]
    pub color: Option<Color>,
    /// Shape this ruling was derived from, if any.
    #[serde(default)]
    pub binding_bounds: Option<BBox>,
}

impl Ruling {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let mut ruling = Self {
            x1,
            y1,
            x2,
            y2,
            draw_type: DrawType::Line,
            is_fill: false,
            is_dashed: false,
            color: None,
            binding_bounds: None,
        };
        ruling.normalize();
        ruling
    }

    pub fn horizontal(y: f64, left: f64, right: f64) -> Self {
        Self::new(left, y, right, y)
    }

    pub fn vertical(x: f64, top: f64, bottom: f64) -> Self {
        Self::new(x, top, x, bottom)
    }

    /// Converts a filled rectangle into a ruling through its centre along
    /// the long axis.
    pub fn from_rect(rect: BBox) -> Self {
        let mut ruling = if rect.width() > rect.height() {
            Self::horizontal(rect.center_y(), rect.x0, rect.x1)
        } else {
            Self::vertical(rect.center_x(), rect.top, rect.bottom)
        };
        ruling.draw_type = DrawType::from_extent(rect.width(), rect.height());
        ruling.is_fill = true;
        ruling.binding_bounds = Some(rect);
        ruling
    }

    /// Snaps a nearly axis-aligned segment onto its axis.
    pub fn normalize(&mut self) {
        let angle = self.angle();
        if within(angle, 0.0, AXIS_ANGLE_TOLERANCE)
            || within(angle, 180.0, AXIS_ANGLE_TOLERANCE)
            || within(angle, 360.0, AXIS_ANGLE_TOLERANCE)
        {
            let (left, right) = (self.x1.min(self.x2), self.x1.max(self.x2));
            self.x1 = left;
            self.x2 = right;
            self.y2 = self.y1;
        } else if within(angle, 90.0, AXIS_ANGLE_TOLERANCE)
            || within(angle, 270.0, AXIS_ANGLE_TOLERANCE)
        {
            let (top, bottom) = (self.y1.min(self.y2), self.y1.max(self.y2));
            self.y1 = top;
            self.y2 = bottom;
            self.x2 = self.x1;
        }
    }

    /// Direction in degrees, in `[0, 360)`.
    pub fn angle(&self) -> f64 {
        let angle = (self.y2 - self.y1).atan2(self.x2 - self.x1).to_degrees();
        if angle < 0.0 { angle + 360.0 } else { angle }
    }

    pub fn length(&self) -> f64 {
        (self.x2 - self.x1).hypot(self.y2 - self.y1)
    }

    pub fn is_vertical(&self) -> bool {
        self.length() > 0.0 && feq(self.x1, self.x2)
    }

    pub fn is_horizontal(&self) -> bool {
        self.length() > 0.0 && feq(self.y1, self.y2)
    }

    pub fn is_oblique(&self) -> bool {
        !(self.is_vertical() || self.is_horizontal())
    }

    pub fn orientation(&self) -> Option<Orientation> {
        if self.is_horizontal() {
            Some(Orientation::Horizontal)
        } else if self.is_vertical() {
            Some(Orientation::Vertical)
        } else {
            None
        }
    }

    pub fn left(&self) -> f64 {
        self.x1.min(self.x2)
    }

    pub fn right(&self) -> f64 {
        self.x1.max(self.x2)
    }

    pub fn top(&self) -> f64 {
        self.y1.min(self.y2)
    }

    pub fn bottom(&self) -> f64 {
        self.y1.max(self.y2)
    }

    pub fn to_bbox(&self) -> BBox {
        BBox::new(self.left(), self.top(), self.right(), self.bottom())
    }

    fn oblique_error(&self) -> TableError {
        TableError::ObliqueRuling {
            x1: self.x1,
            y1: self.y1,
            x2: self.x2,
            y2: self.y2,
        }
    }

    /// Fixed coordinate: x for vertical rulings, y for horizontal ones.
    pub fn position(&self) -> Result<f64> {
        match self.orientation() {
            Some(Orientation::Vertical) => Ok(self.left()),
            Some(Orientation::Horizontal) => Ok(self.top()),
            None => Err(self.oblique_error()),
        }
    }

    /// Lower end along the primary axis.
    pub fn start(&self) -> Result<f64> {
        match self.orientation() {
            Some(Orientation::Vertical) => Ok(self.top()),
            Some(Orientation::Horizontal) => Ok(self.left()),
            None => Err(self.oblique_error()),
        }
    }

    /// Upper end along the primary axis.
    pub fn end(&self) -> Result<f64> {
        match self.orientation() {
            Some(Orientation::Vertical) => Ok(self.bottom()),
            Some(Orientation::Horizontal) => Ok(self.right()),
            None => Err(self.oblique_error()),
        }
    }

    pub fn set_position(&mut self, v: f64) -> Result<()> {
        match self.orientation() {
            Some(Orientation::Vertical) => {
                self.x1 = v;
                self.x2 = v;
            }
            Some(Orientation::Horizontal) => {
                self.y1 = v;
                self.y2 = v;
            }
            None => return Err(self.oblique_error()),
        }
        Ok(())
    }

    pub fn set_start(&mut self, v: f64) -> Result<()> {
        match self.orientation() {
            Some(Orientation::Vertical) => self.y1 = v,
            Some(Orientation::Horizontal) => self.x1 = v,
            None => return Err(self.oblique_error()),
        }
        Ok(())
    }

    pub fn set_end(&mut self, v: f64) -> Result<()> {
        match self.orientation() {
            Some(Orientation::Vertical) => self.y2 = v,
            Some(Orientation::Horizontal) => self.x2 = v,
            None => return Err(self.oblique_error()),
        }
        Ok(())
    }

    /// Copy lengthened by `amount` at both ends of its primary axis.
    pub fn expand(&self, amount: f64) -> Result<Ruling> {
        let mut expanded = self.clone();
        expanded.set_start(self.start()? - amount)?;
        expanded.set_end(self.end()? + amount)?;
        Ok(expanded)
    }

    pub fn perpendicular_to(&self, other: &Ruling) -> bool {
        self.is_vertical() == other.is_horizontal()
    }

    /// Exact segment intersection, touching and colinear overlap included.
    pub fn intersects_line(&self, other: &Ruling) -> bool {
        let a = (self.x1, self.y1);
        let b = (self.x2, self.y2);
        let c = (other.x1, other.y1);
        let d = (other.x2, other.y2);
        relative_ccw(a, b, c) * relative_ccw(a, b, d) <= 0
            && relative_ccw(c, d, a) * relative_ccw(c, d, b) <= 0
    }

    /// Intersection test tolerant to small gaps.
    ///
    /// Perpendicular pairs are tested with `self` lengthened by
    /// `perpendicular_expand`; parallel pairs with both lengthened by the
    /// smaller `colinear_expand` so separate strokes are not bridged.
    pub fn nearly_intersects(
        &self,
        other: &Ruling,
        colinear_expand: f64,
        perpendicular_expand: f64,
    ) -> Result<bool> {
        if self.intersects_line(other) {
            return Ok(true);
        }
        if self.perpendicular_to(other) {
            Ok(self.expand(perpendicular_expand)?.intersects_line(other))
        } else {
            Ok(self
                .expand(colinear_expand)?
                .intersects_line(&other.expand(colinear_expand)?))
        }
    }

    /// Crossing point of a horizontal and a vertical ruling, each lengthened
    /// by `expand` first.
    pub fn intersection_point(&self, other: &Ruling, expand: f64) -> Result<Option<Point>> {
        let (horizontal, vertical) = if self.is_horizontal() && other.is_vertical() {
            (self, other)
        } else if self.is_vertical() && other.is_horizontal() {
            (other, self)
        } else {
            return Err(TableError::NotOrthogonal);
        };
        let h = horizontal.expand(expand)?;
        let v = vertical.expand(expand)?;
        if h.intersects_line(&v) {
            Ok(Some((v.left(), h.top())))
        } else {
            Ok(None)
        }
    }

    /// Shared length of two parallel rulings over the shorter one's length.
    pub fn overlap_ratio(&self, other: &Ruling) -> Result<f64> {
        let overlap = (self.end()?.min(other.end()?) - self.start()?.max(other.start()?)).max(0.0);
        let shorter = (self.end()? - self.start()?).min(other.end()? - other.start()?);
        if shorter <= 0.0 {
            return Ok(0.0);
        }
        Ok(overlap / shorter)
    }

    /// The part of this ruling inside `area`, if any.
    pub fn clip(&self, area: &BBox) -> Option<Ruling> {
        let mut clipped = self.clone();
        match self.orientation()? {
            Orientation::Horizontal => {
                if self.top() < area.top || self.top() > area.bottom {
                    return None;
                }
                clipped.x1 = self.left().max(area.x0);
                clipped.x2 = self.right().min(area.x1);
                (clipped.x1 < clipped.x2).then_some(clipped)
            }
            Orientation::Vertical => {
                if self.left() < area.x0 || self.left() > area.x1 {
                    return None;
                }
                clipped.y1 = self.top().max(area.top);
                clipped.y2 = self.bottom().min(area.bottom);
                (clipped.y1 < clipped.y2).then_some(clipped)
            }
        }
    }
}

fn relative_ccw(a: Point, b: Point, p: Point) -> i32 {
    let (bx, by) = (b.0 - a.0, b.1 - a.1);
    let (mut px, mut py) = (p.0 - a.0, p.1 - a.1);
    let mut ccw = px * by - py * bx;
    if ccw == 0.0 {
        // Colinear: classify by projection onto the segment.
        ccw = px * bx + py * by;
        if ccw > 0.0 {
            px -= bx;
            py -= by;
            ccw = px * bx + py * by;
            if ccw < 0.0 {
                ccw = 0.0;
            }
        }
    }
    if ccw < 0.0 {
        -1
    } else if ccw > 0.0 {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_snaps_to_axis() {
        let r = Ruling::new(100.0, 10.0, 0.0, 10.5);
        assert!(r.is_horizontal());
        assert_eq!((r.x1, r.x2), (0.0, 100.0));
        assert_eq!(r.y1, r.y2);

        let r = Ruling::new(5.0, 80.0, 5.3, 0.0);
        assert!(r.is_vertical());
        assert_eq!((r.y1, r.y2), (0.0, 80.0));
        assert_eq!(r.x2, 5.0);
    }

    #[test]
    fn test_oblique_accessors_fail() {
        let mut r = Ruling::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.is_oblique());
        assert!(r.position().is_err());
        assert!(r.start().is_err());
        assert!(r.set_end(3.0).is_err());
        assert!(r.expand(1.0).is_err());
        assert!(matches!(r.position(), Err(TableError::ObliqueRuling { .. })));
    }

    #[test]
    fn test_zero_length_is_neither() {
        let r = Ruling::new(3.0, 3.0, 3.0, 3.0);
        assert!(!r.is_horizontal());
        assert!(!r.is_vertical());
    }

    #[test]
    fn test_nearly_intersects() {
        let h = Ruling::horizontal(10.0, 0.0, 100.0);
        let v = Ruling::vertical(101.5, 0.0, 50.0);
        assert!(!h.intersects_line(&v));
        assert!(h.nearly_intersects(&v, 1.0, 2.0).unwrap());

        let far = Ruling::vertical(104.0, 0.0, 50.0);
        assert!(!h.nearly_intersects(&far, 1.0, 2.0).unwrap());

        let next = Ruling::horizontal(10.0, 101.5, 150.0);
        assert!(h.nearly_intersects(&next, 1.0, 2.0).unwrap());
        let apart = Ruling::horizontal(10.0, 103.0, 150.0);
        assert!(!h.nearly_intersects(&apart, 1.0, 2.0).unwrap());
    }

    #[test]
    fn test_intersection_point() {
        let h = Ruling::horizontal(10.0, 0.0, 100.0);
        let v = Ruling::vertical(100.0, 11.0, 50.0);
        assert_eq!(h.intersection_point(&v, 2.0).unwrap(), Some((100.0, 10.0)));
        assert_eq!(v.intersection_point(&h, 2.0).unwrap(), Some((100.0, 10.0)));

        let other = Ruling::horizontal(20.0, 0.0, 10.0);
        assert!(h.intersection_point(&other, 2.0).is_err());
    }

    #[test]
    fn test_from_rect() {
        let r = Ruling::from_rect(BBox::new(0.0, 10.0, 100.0, 11.0));
        assert!(r.is_horizontal());
        assert_eq!(r.top(), 10.5);
        assert_eq!(r.draw_type, DrawType::Line);

        let dot = Ruling::from_rect(BBox::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(dot.draw_type, DrawType::Dot);
    }

    #[test]
    fn test_clip() {
        let area = BBox::new(10.0, 10.0, 50.0, 50.0);
        let h = Ruling::horizontal(20.0, 0.0, 100.0);
        let clipped = h.clip(&area).unwrap();
        assert_eq!((clipped.left(), clipped.right()), (10.0, 50.0));
        assert!(Ruling::horizontal(60.0, 0.0, 100.0).clip(&area).is_none());
    }
}
