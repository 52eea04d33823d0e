use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub class: usize,
    pub score: f32,
}

/// Highest score first, highest class index first among equal scores: the
/// reverse of a stable ascending sort. `total_cmp` puts NaN above every number.
fn rank(a: &Prediction, b: &Prediction) -> Ordering {
    b.score.total_cmp(&a.score).then(b.class.cmp(&a.class))
}

/// The `k` best scoring classes, best first.
///
/// Selects the prefix in linear time and only sorts that, which gives the same
/// result as a full sort truncated to `k` since `rank` is a total order.
pub fn top_k(scores: &[f32], k: usize) -> Vec<Prediction> {
    let mut predictions: Vec<Prediction> = scores
        .iter()
        .enumerate()
        .map(|(class, &score)| Prediction { class, score })
        .collect();
    if k == 0 {
        return vec![];
    }
    if k < predictions.len() {
        predictions.select_nth_unstable_by(k - 1, rank);
        predictions.truncate(k);
    }
    predictions.sort_unstable_by(rank);
    predictions
}
