//! Cost / objective Pareto front

use crate::config::BetterDirection;

/// Indices of the non-dominated `(cost, output)` pairs, cheapest first
///
/// A pair is kept when no cheaper-or-equal pair has an output at least as
/// good. Pairs with a non-finite output never make the front.
pub fn pareto_front_indices(pairs: &[(f64, f64)], direction: BetterDirection) -> Vec<usize> {
    let mut order: Vec<usize> = (0..pairs.len()).filter(|&i| pairs[i].1.is_finite()).collect();
    order.sort_by(|&a, &b| {
        let (cost_a, out_a) = pairs[a];
        let (cost_b, out_b) = pairs[b];
        cost_a
            .total_cmp(&cost_b)
            .then_with(|| (direction.sign() * out_b).total_cmp(&(direction.sign() * out_a)))
    });

    let mut front = Vec::new();
    let mut best: Option<f64> = None;
    for i in order {
        let output = pairs[i].1;
        if best.is_none_or(|b| direction.is_better(output, b)) {
            best = Some(output);
            front.push(i);
        }
    }
    front
}
