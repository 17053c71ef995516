use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// A fixed-dimension `f32` vector used as the unit of work for the
/// quantizer: a flattened 2x2 or 2x4 pixel block, or a flattened run of
/// palette indices.
#[derive(Debug, Clone, Copy)]
pub struct Vector<const N: usize> {
    pub components: [f32; N],
}

impl<const N: usize> Vector<N> {
    #[must_use]
    pub const fn new(components: [f32; N]) -> Self {
        Self { components }
    }

    #[must_use]
    pub const fn zero() -> Self {
        Self { components: [0.0; N] }
    }

    #[must_use]
    pub fn dist_sq(&self, other: &Self) -> f32 {
        self.components
            .iter()
            .zip(other.components.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        let mut out = [0.0f32; N];
        for i in 0..N {
            out[i] = self.components[i] + other.components[i];
        }
        Self::new(out)
    }

    #[must_use]
    pub fn scale(&self, factor: f32) -> Self {
        let mut out = [0.0f32; N];
        for i in 0..N {
            out[i] = self.components[i] * factor;
        }
        Self::new(out)
    }

    /// Approximate equality used to coalesce near-duplicate samples before
    /// training; two vectors within `eps` squared distance are considered
    /// the same sample.
    #[must_use]
    pub fn approx_eq(&self, other: &Self, eps: f32) -> bool {
        self.dist_sq(other) < eps
    }

    /// A hash stable under the same quantization `approx_eq` uses, so
    /// near-duplicate vectors land in the same hash bucket. Components are
    /// snapped to a coarse grid before hashing.
    #[must_use]
    pub fn tolerance_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        for c in self.components {
            let snapped = (c * 64.0).round() as i32;
            snapped.hash(&mut hasher);
        }
        hasher.finish()
    }
}

/// A vector paired with the number of input samples it represents, the
/// unit the run-length compression step and the quantizer operate on.
#[derive(Debug, Clone, Copy)]
pub struct WeightedVector<const N: usize> {
    pub value: Vector<N>,
    pub weight: u32,
}

/// Collapses runs of approximately-equal samples into single weighted
/// entries. Samples do not need to be sorted: a hash-bucketed multiset is
/// used so that equal-enough samples anywhere in the input coalesce, not
/// just adjacent ones.
#[must_use]
pub fn compress<const N: usize>(samples: &[Vector<N>], eps: f32) -> Vec<WeightedVector<N>> {
    let mut buckets: rustc_hash::FxHashMap<u64, Vec<WeightedVector<N>>> = Default::default();
    for sample in samples {
        let bucket = buckets.entry(sample.tolerance_hash()).or_default();
        if let Some(existing) = bucket.iter_mut().find(|w| w.value.approx_eq(sample, eps)) {
            existing.weight += 1;
        } else {
            bucket.push(WeightedVector { value: *sample, weight: 1 });
        }
    }
    buckets.into_values().flatten().collect()
}
