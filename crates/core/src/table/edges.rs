//! Ruling list processing for lattice reconstruction.
//!
//! This module turns the raw rulings of a page into clean, aligned
//! horizontal and vertical rulings suitable for intersection search:
//! dotted lines are joined, endpoints are snapped, segmented strokes are
//! collapsed, repeated strokes are dropped and grid lines implied by
//! aligned vertical endpoints are synthesised.

use tracing::{debug, trace};

use crate::error::Result;
use crate::params::LatticeParams;
use crate::utils::{feq, feq_eps, round_to, within};

use super::clustering::{bbox_union, cluster_by_average};
use super::ruling::Ruling;
use super::types::{BBox, DrawType, Orientation};

/// Distance a dot may sit outside a run's bounds and still extend it.
const DOT_NEIGHBOR_THRESHOLD: f64 = 2.0;
/// Minimum extent of a joined dot run.
const DOT_RUN_MIN_LENGTH: f64 = 4.0;
/// Ruling tops closer than this are ignored when looking for small gaps.
const SMALL_GAP_MIN: f64 = 3.0;
/// Character height above which small gaps are not considered.
const SMALL_GAP_MAX_CHAR_HEIGHT: f64 = 5.5;

/// Snap tolerance for a page.
///
/// CJK pages snap with the smallest character width and half the smallest
/// character height. Other pages use a fine tolerance when rulings are
/// packed closer than a character height and a coarse one otherwise.
pub fn snap_tolerance(
    rulings: &[Ruling],
    min_char_width: f64,
    min_char_height: f64,
    is_chinese: bool,
) -> (f64, f64) {
    if is_chinese {
        return (min_char_width, min_char_height / 2.0);
    }
    if has_small_vertical_gap(rulings, min_char_height) {
        (1.0, 1.0)
    } else {
        (4.0, 4.0)
    }
}

fn has_small_vertical_gap(rulings: &[Ruling], min_char_height: f64) -> bool {
    let mut tops: Vec<f64> = rulings.iter().map(Ruling::top).collect();
    tops.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let min_gap = tops
        .windows(2)
        .map(|w| w[1] - w[0])
        .filter(|gap| *gap > SMALL_GAP_MIN)
        .fold(None, |acc: Option<f64>, gap| Some(acc.map_or(gap, |m| m.min(gap))));
    match min_gap {
        Some(gap) => min_char_height > gap && min_char_height < SMALL_GAP_MAX_CHAR_HEIGHT,
        None => false,
    }
}

/// Replace near-coincident endpoint coordinates with their cluster average,
/// once along X and once along Y.
pub fn snap_points(rulings: &mut [Ruling], x_tolerance: f64, y_tolerance: f64) {
    // (ruling index, second endpoint)
    let endpoints: Vec<(usize, bool)> = (0..rulings.len())
        .flat_map(|i| [(i, false), (i, true)])
        .collect();

    let xs: Vec<f64> = endpoints
        .iter()
        .map(|&(i, second)| if second { rulings[i].x2 } else { rulings[i].x1 })
        .collect();
    for group in cluster_by_average(&xs, |x| *x, x_tolerance) {
        let avg = group.iter().map(|&k| xs[k]).sum::<f64>() / group.len() as f64;
        for k in group {
            let (i, second) = endpoints[k];
            if second {
                rulings[i].x2 = avg;
            } else {
                rulings[i].x1 = avg;
            }
        }
    }

    let ys: Vec<f64> = endpoints
        .iter()
        .map(|&(i, second)| if second { rulings[i].y2 } else { rulings[i].y1 })
        .collect();
    for group in cluster_by_average(&ys, |y| *y, y_tolerance) {
        let avg = group.iter().map(|&k| ys[k]).sum::<f64>() / group.len() as f64;
        for k in group {
            let (i, second) = endpoints[k];
            if second {
                rulings[i].y2 = avg;
            } else {
                rulings[i].y1 = avg;
            }
        }
    }

    for ruling in rulings.iter_mut() {
        ruling.normalize();
    }
}

fn ruling_bounds(ruling: &Ruling) -> BBox {
    ruling.binding_bounds.unwrap_or_else(|| ruling.to_bbox())
}

/// Join runs of dot rulings into dashed lines.
///
/// Dots are grouped by centre X and split into runs along Y; a run of two or
/// more dots taller than the minimum run length becomes a vertical ruling.
/// The same is done by centre Y for horizontal rulings.
pub fn join_dot_rulings(dots: &[Ruling], x_tolerance: f64, y_tolerance: f64) -> Vec<Ruling> {
    let bounds: Vec<BBox> = dots.iter().map(ruling_bounds).collect();
    let mut joined = Vec::new();

    for group in cluster_by_average(&bounds, BBox::center_x, x_tolerance) {
        for run in split_runs(&bounds, group, Orientation::Vertical) {
            if run.len() < 2 {
                continue;
            }
            if let Some(b) = bbox_union(run.iter().map(|&i| &bounds[i]))
                && b.height() > DOT_RUN_MIN_LENGTH
            {
                joined.push(dashed(Ruling::vertical(b.center_x(), b.top, b.bottom)));
            }
        }
    }

    for group in cluster_by_average(&bounds, BBox::center_y, y_tolerance) {
        for run in split_runs(&bounds, group, Orientation::Horizontal) {
            if run.len() < 2 {
                continue;
            }
            if let Some(b) = bbox_union(run.iter().map(|&i| &bounds[i]))
                && b.width() > DOT_RUN_MIN_LENGTH
            {
                joined.push(dashed(Ruling::horizontal(b.center_y(), b.x0, b.x1)));
            }
        }
    }

    trace!(dots = dots.len(), joined = joined.len(), "joined dot rulings");
    joined
}

fn dashed(mut ruling: Ruling) -> Ruling {
    ruling.draw_type = DrawType::Line;
    ruling.is_dashed = true;
    ruling
}

/// Split a cluster of dots into contiguous runs along the given direction.
fn split_runs(bounds: &[BBox], mut group: Vec<usize>, direction: Orientation) -> Vec<Vec<usize>> {
    let start = |b: &BBox| match direction {
        Orientation::Vertical => b.top,
        Orientation::Horizontal => b.x0,
    };
    group.sort_by(|&a, &b| {
        start(&bounds[a])
            .partial_cmp(&start(&bounds[b]))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut runs: Vec<Vec<usize>> = Vec::new();
    let mut run_bounds: Option<BBox> = None;
    for idx in group {
        let b = bounds[idx];
        let extends = run_bounds.is_some_and(|rb| match direction {
            Orientation::Vertical => {
                b.center_y() > rb.top - DOT_NEIGHBOR_THRESHOLD
                    && b.center_y() < rb.bottom + DOT_NEIGHBOR_THRESHOLD
            }
            Orientation::Horizontal => {
                b.center_x() > rb.x0 - DOT_NEIGHBOR_THRESHOLD
                    && b.center_x() < rb.x1 + DOT_NEIGHBOR_THRESHOLD
            }
        });
        match (extends, runs.last_mut(), run_bounds) {
            (true, Some(run), Some(rb)) => {
                run.push(idx);
                run_bounds = Some(rb.union(&b));
            }
            _ => {
                runs.push(vec![idx]);
                run_bounds = Some(b);
            }
        }
    }
    runs
}

/// Split rulings into (horizontal, vertical), dropping oblique ones.
pub fn split_by_orientation(rulings: Vec<Ruling>) -> (Vec<Ruling>, Vec<Ruling>) {
    let mut horizontal = Vec::new();
    let mut vertical = Vec::new();
    for r in rulings {
        match r.orientation() {
            Some(Orientation::Horizontal) => horizontal.push(r),
            Some(Orientation::Vertical) => vertical.push(r),
            None => {}
        }
    }
    (horizontal, vertical)
}

/// Keep the parts of rulings that fall inside `area`.
pub fn clip_rulings(rulings: &[Ruling], area: &BBox) -> Vec<Ruling> {
    rulings.iter().filter_map(|r| r.clip(area)).collect()
}

/// Merge same-orientation rulings that lie on one line and nearly touch.
///
/// Rulings are sorted by fixed coordinate then start; each one either
/// extends the running ruling or starts a new one. Zero-length rulings
/// are dropped.
pub fn collapse_oriented_rulings(rulings: Vec<Ruling>, params: &LatticeParams) -> Result<Vec<Ruling>> {
    let mut keyed: Vec<((f64, f64), Ruling)> = rulings
        .into_iter()
        .map(|r| Ok(((r.position()?, r.start()?), r)))
        .collect::<Result<_>>()?;
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut collapsed: Vec<Ruling> = Vec::new();
    for (_, next) in keyed {
        if let Some(last) = collapsed.last_mut()
            && feq(last.position()?, next.position()?)
            && last.nearly_intersects(&next, params.colinear_expand, params.perpendicular_expand)?
        {
            let start = last.start()?.min(next.start()?);
            let end = last.end()?.max(next.end()?);
            last.set_start(start)?;
            last.set_end(end)?;
            continue;
        }
        if next.length() < params.min_ruling_length {
            continue;
        }
        collapsed.push(next);
    }
    Ok(collapsed)
}

fn fixed(r: &Ruling, orientation: Orientation) -> f64 {
    match orientation {
        Orientation::Horizontal => r.y1,
        Orientation::Vertical => r.x1,
    }
}

fn span(r: &Ruling, orientation: Orientation) -> (f64, f64) {
    match orientation {
        Orientation::Horizontal => (r.x1, r.x2),
        Orientation::Vertical => (r.y1, r.y2),
    }
}

fn set_span_end(r: &mut Ruling, orientation: Orientation, end: f64) {
    match orientation {
        Orientation::Horizontal => r.x2 = end,
        Orientation::Vertical => r.y2 = end,
    }
}

/// Drop repeated strokes of one line.
///
/// Rulings whose fixed coordinates are within `repeated_line_tolerance` of
/// the first in their group are walked in start order; a ruling starting less
/// than `repeated_line_gap` after the running one ends is folded into it.
/// Verticals are only processed when horizontals exist.
pub fn remove_repeated_lines(
    horizontal: Vec<Ruling>,
    vertical: Vec<Ruling>,
    params: &LatticeParams,
) -> (Vec<Ruling>, Vec<Ruling>) {
    if horizontal.is_empty() {
        return (horizontal, vertical);
    }
    let horizontal = dedupe_oriented(horizontal, Orientation::Horizontal, params);
    let vertical = dedupe_oriented(vertical, Orientation::Vertical, params);
    (horizontal, vertical)
}

fn dedupe_oriented(
    mut rulings: Vec<Ruling>,
    orientation: Orientation,
    params: &LatticeParams,
) -> Vec<Ruling> {
    rulings.sort_by(|a, b| {
        fixed(a, orientation)
            .partial_cmp(&fixed(b, orientation))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut groups: Vec<Vec<Ruling>> = Vec::new();
    for r in rulings {
        match groups.last_mut() {
            Some(group)
                if feq_eps(
                    fixed(&group[0], orientation),
                    fixed(&r, orientation),
                    params.repeated_line_tolerance,
                ) =>
            {
                group.push(r)
            }
            _ => groups.push(vec![r]),
        }
    }

    let mut kept = Vec::new();
    for mut group in groups {
        group.sort_by(|a, b| {
            span(a, orientation)
                .0
                .partial_cmp(&span(b, orientation).0)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut base: Option<Ruling> = None;
        for other in group {
            match base.as_mut() {
                Some(b) if span(&other, orientation).0 - span(b, orientation).1 < params.repeated_line_gap => {
                    let end = span(b, orientation).1.max(span(&other, orientation).1);
                    set_span_end(b, orientation, end);
                }
                _ => {
                    if let Some(done) = base.replace(other) {
                        kept.push(done);
                    }
                }
            }
        }
        kept.extend(base);
    }
    kept
}

/// Synthesise horizontal rulings implied by aligned vertical endpoints.
///
/// Verticals whose tops (then bottoms) align are grouped; for each group a
/// horizontal ruling is added at that Y when another horizontal ruling ends
/// at the same right edge and no horizontal ruling already covers the span.
pub fn find_missing_horizontal_rulings(
    vertical: &[Ruling],
    horizontal: &[Ruling],
    params: &LatticeParams,
) -> Vec<Ruling> {
    let mut found: Vec<Ruling> = Vec::new();
    if vertical.is_empty() {
        return found;
    }

    for anchor in [Ruling::top as fn(&Ruling) -> f64, Ruling::bottom] {
        let mut sorted: Vec<&Ruling> = vertical.iter().collect();
        sorted.sort_by(|a, b| {
            (round_to(anchor(a), 2), round_to(a.left(), 2))
                .partial_cmp(&(round_to(anchor(b), 2), round_to(b.left(), 2)))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut aligned: Vec<&Ruling> = Vec::new();
        for r in sorted {
            if let Some(first) = aligned.first()
                && !within(anchor(r), anchor(first), params.aligned_tolerance)
            {
                let missing = missing_at(anchor(first), &aligned, horizontal, &found, params);
                found.extend(missing);
                aligned.clear();
            }
            aligned.push(r);
        }
        if let Some(first) = aligned.first() {
            let missing = missing_at(anchor(first), &aligned, horizontal, &found, params);
            found.extend(missing);
        }
    }

    if !found.is_empty() {
        debug!(count = found.len(), "synthesised missing horizontal rulings");
    }
    found
}

fn missing_at(
    y: f64,
    aligned: &[&Ruling],
    horizontal: &[Ruling],
    already: &[Ruling],
    params: &LatticeParams,
) -> Vec<Ruling> {
    let tol = params.missing_match_tolerance;
    let mut missing: Vec<Ruling> = Vec::new();
    if aligned.len() < 2 {
        return missing;
    }

    let mut start = 0;
    while start < aligned.len() {
        let mut end = aligned.len() - 1;
        while end > start {
            let x1 = aligned[start].left();
            let x2 = aligned[end].right();
            let covers = |hr: &Ruling| {
                within(y, hr.top(), tol)
                    && (within(hr.left(), x1, tol) || x1 >= hr.left())
                    && (within(hr.right(), x2, tol) || x2 <= hr.right())
            };
            let exists = horizontal
                .iter()
                .chain(already)
                .chain(missing.iter())
                .any(covers);
            let has_matching = horizontal.iter().any(|hr| within(hr.right(), x2, tol));
            if has_matching {
                if !exists {
                    missing.push(Ruling::horizontal(y, x1, x2));
                }
                break;
            }
            end -= 1;
        }
        start = end + 1;
    }
    missing
}

/// Full clean-up of a page's horizontal and vertical rulings.
pub fn prepare_rulings(
    horizontal: Vec<Ruling>,
    vertical: Vec<Ruling>,
    params: &LatticeParams,
) -> (Vec<Ruling>, Vec<Ruling>) {
    let (mut horizontal, vertical) = remove_repeated_lines(horizontal, vertical, params);
    let missing = find_missing_horizontal_rulings(&vertical, &horizontal, params);
    horizontal.extend(missing);
    horizontal.retain(Ruling::is_horizontal);
    let vertical: Vec<Ruling> = vertical.into_iter().filter(Ruling::is_vertical).collect();
    trace!(
        horizontal = horizontal.len(),
        vertical = vertical.len(),
        "prepared rulings"
    );
    (horizontal, vertical)
}
