// src/utils/sampler.rs

use rand::Rng;

/// Clamps a requested test size to `[1, available]`.
/// Returns 0 only when there is nothing to sample from.
pub fn clamp_count(requested: i64, available: usize) -> usize {
    if available == 0 {
        return 0;
    }
    let requested = usize::try_from(requested).unwrap_or(1);
    requested.clamp(1, available)
}

/// Draws `count` distinct ids uniformly at random without replacement.
///
/// `count` is clamped with [`clamp_count`]. An empty population yields an
/// empty sample, which callers treat as "no test possible". The returned
/// order carries no meaning.
pub fn sample_question_ids<R: Rng + ?Sized>(
    population: &[i64],
    count: i64,
    rng: &mut R,
) -> Vec<i64> {
    let amount = clamp_count(count, population.len());
    if amount == 0 {
        return Vec::new();
    }

    rand::seq::index::sample(rng, population.len(), amount)
        .into_iter()
        .map(|idx| population[idx])
        .collect()
}
