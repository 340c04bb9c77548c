//! Tolerance-based clustering.
//!
//! These functions group rulings, text chunks and coordinates based on
//! proximity along one axis.

use super::types::BBox;

/// Cluster a list of f64 values, chaining neighbours within tolerance.
pub fn cluster_list(mut xs: Vec<f64>, tolerance: f64) -> Vec<Vec<f64>> {
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if xs.len() < 2 {
        return xs.into_iter().map(|x| vec![x]).collect();
    }
    let mut groups: Vec<Vec<f64>> = Vec::new();
    let mut current: Vec<f64> = vec![xs[0]];
    let mut last = xs[0];
    for x in xs.into_iter().skip(1) {
        if x <= last + tolerance {
            current.push(x);
        } else {
            groups.push(current);
            current = vec![x];
        }
        last = x;
    }
    groups.push(current);
    groups
}

/// Sorted, deduplicated boundaries with values closer than `tolerance`
/// collapsed onto the first of their cluster.
pub fn distinct_boundaries(xs: Vec<f64>, tolerance: f64) -> Vec<f64> {
    cluster_list(xs, tolerance)
        .into_iter()
        .filter_map(|group| group.first().copied())
        .collect()
}

/// Cluster item indices by key, comparing each value against the running
/// average of the current cluster.
///
/// Returned clusters are in ascending key order; indices inside a cluster
/// are in ascending key order too.
pub fn cluster_by_average<T, F: Fn(&T) -> f64>(
    items: &[T],
    key_fn: F,
    tolerance: f64,
) -> Vec<Vec<usize>> {
    let mut order: Vec<usize> = (0..items.len()).collect();
    order.sort_by(|&a, &b| {
        key_fn(&items[a])
            .partial_cmp(&key_fn(&items[b]))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut sum = 0.0;
    for idx in order {
        let value = key_fn(&items[idx]);
        if !current.is_empty() && (value - sum / current.len() as f64).abs() >= tolerance {
            groups.push(std::mem::take(&mut current));
            sum = 0.0;
        }
        current.push(idx);
        sum += value;
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

/// Cluster objects by a key, chaining neighbours within tolerance.
/// Groups come out in ascending key order; each group keeps input order.
pub fn cluster_objects<T: Clone, F: Fn(&T) -> f64>(
    xs: &[T],
    key_fn: F,
    tolerance: f64,
) -> Vec<Vec<T>> {
    let mut keyed: Vec<(f64, usize)> = xs.iter().enumerate().map(|(i, x)| (key_fn(x), i)).collect();
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut last: Option<f64> = None;
    for (value, idx) in keyed {
        match (last, groups.last_mut()) {
            (Some(prev), Some(group)) if value <= prev + tolerance => group.push(idx),
            _ => groups.push(vec![idx]),
        }
        last = Some(value);
    }

    groups
        .into_iter()
        .map(|mut group| {
            group.sort_unstable();
            group.into_iter().map(|i| xs[i].clone()).collect()
        })
        .collect()
}

/// Compute the bounding box of a set of boxes.
pub fn bbox_union<'a, I: IntoIterator<Item = &'a BBox>>(boxes: I) -> Option<BBox> {
    boxes.into_iter().fold(None, |acc, b| match acc {
        None => Some(*b),
        Some(a) => Some(a.union(b)),
    })
}
