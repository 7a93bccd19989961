use std::cmp::Ordering;

use crate::models::{SearchResult, SortBy};

/// Order results in place by the requested key
///
/// `sort_by` is stable, so ties keep candidate order. Missing ratings and
/// prices sort after present ones.
pub fn sort_results(results: &mut [SearchResult], sort_by: SortBy) {
    match sort_by {
        SortBy::Distance => results.sort_by(|a, b| a.distance.total_cmp(&b.distance)),
        SortBy::Rating => results.sort_by(|a, b| {
            compare_missing_last(a.business.rating, b.business.rating, |x, y| y.total_cmp(&x))
        }),
        SortBy::Price => results.sort_by(|a, b| {
            compare_missing_last(a.business.starting_price, b.business.starting_price, |x, y| {
                x.total_cmp(&y)
            })
        }),
        // Case-insensitive, folded once per result
        SortBy::Name => results.sort_by_cached_key(|result| result.business.name.to_lowercase()),
    }
}

#[inline]
fn compare_missing_last(a: Option<f64>, b: Option<f64>, cmp: impl Fn(f64, f64) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Take one page out of ranked results
pub fn paginate<T>(results: Vec<T>, offset: usize, limit: usize) -> Vec<T> {
    results.into_iter().skip(offset).take(limit).collect()
}
