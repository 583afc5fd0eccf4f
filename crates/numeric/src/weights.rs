//! Exact Shapley coalition weights.
//!
//! For a game over `n` players, a coalition `S` of size `s` contributes to
//! player `i` with weight `(s−1)!(n−s)!/n!` when `i ∈ S` and is charged
//! `s!(n−s−1)!/n!` when `i ∉ S`. Summing the signed contributions over all
//! `2^n` coalitions yields the exact Shapley value without materializing
//! permutations.
//!
//! Factorials are computed as exact integers and divided as floats, so the
//! weights stay exact well past the practical coalition cap.

/// Largest `n` whose factorial fits in a u128. Coalition sizes are capped far
/// below this by the engines; the assert is a backstop for direct callers.
const MAX_FACTORIAL: usize = 34;

fn factorial(n: usize) -> u128 {
    assert!(n <= MAX_FACTORIAL, "factorial({n}) overflows u128");
    (1..=n as u128).product()
}

/// Weight of a coalition of size `s` (out of `n` players) on a player that
/// belongs to it: `(s−1)!(n−s)!/n!`. Requires `1 ≤ s ≤ n`.
pub fn inclusion_weight(s: usize, n: usize) -> f64 {
    debug_assert!(s >= 1 && s <= n);
    (factorial(s - 1) * factorial(n - s)) as f64 / factorial(n) as f64
}

/// Weight charged to a player absent from a coalition of size `s` (out of
/// `n` players): `s!(n−s−1)!/n!`. Requires `s ≤ n − 1`.
pub fn exclusion_weight(s: usize, n: usize) -> f64 {
    debug_assert!(s < n);
    (factorial(s) * factorial(n - s - 1)) as f64 / factorial(n) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn known_three_player_weights() {
        // n = 3: singletons and the grand coalition both weigh 1/3,
        // pairs weigh 1/6.
        assert!((inclusion_weight(1, 3) - 1.0 / 3.0).abs() < EPS);
        assert!((inclusion_weight(2, 3) - 1.0 / 6.0).abs() < EPS);
        assert!((inclusion_weight(3, 3) - 1.0 / 3.0).abs() < EPS);
        assert!((exclusion_weight(0, 3) - 1.0 / 3.0).abs() < EPS);
        assert!((exclusion_weight(1, 3) - 1.0 / 6.0).abs() < EPS);
        assert!((exclusion_weight(2, 3) - 1.0 / 3.0).abs() < EPS);
    }

    #[test]
    fn weights_sum_to_one_over_a_players_coalitions() {
        // For any player, the inclusion weights over all coalitions that
        // contain it sum to 1, and likewise for exclusion weights over all
        // coalitions that omit it. C(n-1, s-1) coalitions of size s contain
        // a fixed player.
        let n = 6;
        let choose = |n: usize, k: usize| -> f64 {
            (factorial(n) / (factorial(k) * factorial(n - k))) as f64
        };

        let included: f64 = (1..=n)
            .map(|s| choose(n - 1, s - 1) * inclusion_weight(s, n))
            .sum();
        assert!((included - 1.0).abs() < EPS);

        let excluded: f64 = (0..n)
            .map(|s| choose(n - 1, s) * exclusion_weight(s, n))
            .sum();
        assert!((excluded - 1.0).abs() < EPS);
    }

    #[test]
    fn weights_stay_exact_at_the_practical_cap() {
        // 20 players is the documented ceiling; the integer factorials must
        // not have overflowed on the way to the float division.
        let w = inclusion_weight(10, 20);
        assert!(w > 0.0 && w.is_finite());
        let total: f64 = (1..=20)
            .map(|s| {
                ((factorial(19) / (factorial(s - 1) * factorial(20 - s))) as f64)
                    * inclusion_weight(s, 20)
            })
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}
