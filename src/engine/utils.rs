use crate::types::Vec2;

pub(super) fn manhattan(a: Vec2, b: Vec2) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Highest score wins; on an exact tie the earlier candidate is kept.
pub(super) fn pick_highest<T>(scored: impl IntoIterator<Item = (T, f64)>) -> Option<T> {
    let mut best: Option<(T, f64)> = None;
    for (candidate, score) in scored {
        match &best {
            Some((_, best_score)) if score <= *best_score => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.map(|(candidate, _)| candidate)
}
