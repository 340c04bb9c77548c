//! Sweep-line search for ruling intersections.
//!
//! Horizontal rulings open and close as the sweep moves along X; each
//! vertical ruling is tested against the horizontals open at its X. This
//! keeps the search at O((H + V) log(H + V)) plus the output size.

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::error::Result;

use super::ruling::Ruling;
use super::types::{HRulingId, KeyF64, KeyPoint, VRulingId, key_f64, key_point};

/// The pair of rulings meeting at an intersection point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Crossing {
    pub h: HRulingId,
    pub v: VRulingId,
}

/// Intersection points of a set of rulings, in reading order.
pub(crate) struct IntersectionIndex {
    /// Horizontal rulings, expanded by the touch tolerance.
    pub h: Vec<Ruling>,
    /// Vertical rulings, expanded by the touch tolerance.
    pub v: Vec<Ruling>,
    pub points: BTreeMap<KeyPoint, Crossing>,
}

impl IntersectionIndex {
    pub fn h(&self, id: HRulingId) -> &Ruling {
        &self.h[id.0]
    }

    pub fn v(&self, id: VRulingId) -> &Ruling {
        &self.v[id.0]
    }

    pub fn get(&self, x: f64, y: f64) -> Option<Crossing> {
        self.points.get(&key_point(x, y)).copied()
    }

    /// Points as (x, y), sorted by Y then X.
    pub fn sorted_points(&self) -> Vec<(f64, f64)> {
        self.points.keys().map(|(y, x)| (x.0, y.0)).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Find all intersections between horizontal and vertical rulings.
///
/// Horizontal rulings enter the sweep `expand` before their left end and
/// leave `expand` after their right end; at equal X an opening comes before
/// a vertical and a vertical before a closing. When two pairs produce the
/// same point the later one wins.
pub(crate) fn find_intersections(
    horizontal: &[Ruling],
    vertical: &[Ruling],
    expand: f64,
) -> Result<IntersectionIndex> {
    #[derive(Clone, Copy)]
    enum EventKind {
        HLeft,
        Vertical,
        HRight,
    }

    struct Event {
        x: f64,
        kind: EventKind,
        idx: usize,
    }

    let kind_order = |kind: EventKind| match kind {
        EventKind::HLeft => 0,
        EventKind::Vertical => 1,
        EventKind::HRight => 2,
    };

    let mut events = Vec::with_capacity(horizontal.len() * 2 + vertical.len());
    for (idx, h) in horizontal.iter().enumerate() {
        events.push(Event {
            x: h.left() - expand,
            kind: EventKind::HLeft,
            idx,
        });
        events.push(Event {
            x: h.right() + expand,
            kind: EventKind::HRight,
            idx,
        });
    }
    for (idx, v) in vertical.iter().enumerate() {
        events.push(Event {
            x: v.left(),
            kind: EventKind::Vertical,
            idx,
        });
    }

    events.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(kind_order(a.kind).cmp(&kind_order(b.kind)))
    });

    // Open horizontals ordered by Y; the index keeps equal-Y rulings apart.
    let mut open: BTreeSet<(KeyF64, usize)> = BTreeSet::new();
    let mut points: BTreeMap<KeyPoint, Crossing> = BTreeMap::new();

    for event in events {
        match event.kind {
            EventKind::HLeft => {
                open.insert((key_f64(horizontal[event.idx].top()), event.idx));
            }
            EventKind::HRight => {
                open.remove(&(key_f64(horizontal[event.idx].top()), event.idx));
            }
            EventKind::Vertical => {
                let v = &vertical[event.idx];
                let low = (key_f64(v.top() - expand), usize::MIN);
                let high = (key_f64(v.bottom() + expand), usize::MAX);
                for &(_, h_idx) in open.range(low..=high) {
                    if let Some((x, y)) = horizontal[h_idx].intersection_point(v, expand)? {
                        points.insert(
                            key_point(x, y),
                            Crossing {
                                h: HRulingId(h_idx),
                                v: VRulingId(event.idx),
                            },
                        );
                    }
                }
            }
        }
    }

    let h = horizontal
        .iter()
        .map(|r| r.expand(expand))
        .collect::<Result<Vec<_>>>()?;
    let v = vertical
        .iter()
        .map(|r| r.expand(expand))
        .collect::<Result<Vec<_>>>()?;

    trace!(points = points.len(), "found ruling intersections");
    Ok(IntersectionIndex { h, v, points })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_intersections() {
        let horizontal: Vec<Ruling> = [0.0, 10.0, 20.0]
            .iter()
            .map(|&y| Ruling::horizontal(y, 0.0, 30.0))
            .collect();
        let vertical: Vec<Ruling> = [0.0, 15.0, 30.0]
            .iter()
            .map(|&x| Ruling::vertical(x, 0.0, 20.0))
            .collect();
        let index = find_intersections(&horizontal, &vertical, 2.0).unwrap();
        assert_eq!(index.len(), 9);
        let points = index.sorted_points();
        assert_eq!(points[0], (0.0, 0.0));
        assert_eq!(points[1], (15.0, 0.0));
        assert_eq!(points[3], (0.0, 10.0));
        let crossing = index.get(15.0, 10.0).unwrap();
        assert_eq!(crossing.h, HRulingId(1));
        assert_eq!(crossing.v, VRulingId(1));
        assert_eq!(index.h(crossing.h).left(), -2.0);
        assert_eq!(index.v(crossing.v).bottom(), 22.0);
    }

    #[test]
    fn test_touching_within_tolerance() {
        // The vertical stops 1.5 short of the horizontal.
        let horizontal = vec![Ruling::horizontal(0.0, 0.0, 30.0)];
        let vertical = vec![Ruling::vertical(31.5, 1.5, 20.0)];
        let index = find_intersections(&horizontal, &vertical, 2.0).unwrap();
        assert_eq!(index.sorted_points(), vec![(31.5, 0.0)]);
    }

    #[test]
    fn test_equal_y_horizontals_both_open() {
        let horizontal = vec![
            Ruling::horizontal(10.0, 0.0, 20.0),
            Ruling::horizontal(10.0, 40.0, 60.0),
        ];
        let vertical = vec![
            Ruling::vertical(10.0, 0.0, 20.0),
            Ruling::vertical(50.0, 0.0, 20.0),
        ];
        let index = find_intersections(&horizontal, &vertical, 2.0).unwrap();
        assert_eq!(index.get(10.0, 10.0).map(|c| c.h), Some(HRulingId(0)));
        assert_eq!(index.get(50.0, 10.0).map(|c| c.h), Some(HRulingId(1)));
    }

    #[test]
    fn test_only_horizontals_within_vertical_span() {
        let horizontal: Vec<Ruling> = [0.0, 32.0, 50.0, 100.0]
            .iter()
            .map(|&y| Ruling::horizontal(y, 0.0, 30.0))
            .collect();
        let vertical = vec![Ruling::vertical(10.0, 0.0, 30.0)];
        let index = find_intersections(&horizontal, &vertical, 2.0).unwrap();
        assert_eq!(index.sorted_points(), vec![(10.0, 0.0), (10.0, 32.0)]);
    }

    #[test]
    fn test_no_rulings() {
        let index = find_intersections(&[], &[], 2.0).unwrap();
        assert!(index.is_empty());
    }
}
