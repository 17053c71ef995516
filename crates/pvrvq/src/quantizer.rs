use crate::vector::{compress, Vector, WeightedVector};

/// Squared-distance convergence threshold for the relocate (Lloyd) step:
/// once no codeword moves further than this between iterations, relocation
/// stops.
const RELOCATE_EPS: f32 = 1e-4;

/// Relative perturbation used when splitting a codeword into two: each
/// child is offset by `0.01` of the codeword's own magnitude along a fixed
/// direction, then relocation pulls the pair apart.
const SPLIT_DELTA: f32 = 0.01;

const MAX_RELOCATE_ITERS: usize = 64;

/// A split-and-relocate vector quantizer: codewords start as a single
/// centroid and are repeatedly split and relocated (a variant of LBG/Lloyd)
/// until the codebook reaches `target_size`, or as close to it as the
/// distinct input population allows.
pub struct VectorQuantizer<const N: usize> {
    codebook: Vec<Vector<N>>,
}

impl<const N: usize> VectorQuantizer<N> {
    /// Trains a codebook of at most `target_size` entries from `samples`.
    /// `eps` is the tolerance used to coalesce near-duplicate samples
    /// before training.
    #[must_use]
    pub fn train(samples: &[Vector<N>], target_size: usize, eps: f32) -> Self {
        assert!(target_size > 0);

        let weighted = compress(samples, eps);
        tracing::debug!(
            input = samples.len(),
            compressed = weighted.len(),
            "vq: run-length compression"
        );

        if weighted.is_empty() {
            return Self { codebook: vec![Vector::zero()] };
        }

        let mut codebook = vec![centroid(&weighted)];

        while codebook.len() * 2 <= target_size {
            codebook = split(&codebook);
            relocate(&mut codebook, &weighted);
            prune_unused(&mut codebook, &weighted);
            tracing::debug!(codes = codebook.len(), "vq: split round");
        }

        while codebook.len() < target_size {
            let Some(victim) = worst_codeword(&codebook, &weighted) else {
                break;
            };
            let split_pair = split_one(codebook[victim]);
            codebook[victim] = split_pair.0;
            codebook.push(split_pair.1);
            relocate(&mut codebook, &weighted);
            prune_unused(&mut codebook, &weighted);
            tracing::debug!(codes = codebook.len(), "vq: repair round");
        }

        tracing::info!(codes = codebook.len(), target = target_size, "vq: converged");
        Self { codebook }
    }

    #[must_use]
    pub fn codebook(&self) -> &[Vector<N>] {
        &self.codebook
    }

    /// Index of the codeword nearest to `sample`.
    #[must_use]
    pub fn nearest(&self, sample: &Vector<N>) -> usize {
        nearest_index(&self.codebook, sample)
    }

    /// Per-codeword usage count and maximum assigned-sample distance,
    /// in codebook order.
    #[must_use]
    pub fn usage_report(&self, samples: &[Vector<N>]) -> Vec<CodeUsage> {
        let mut report: Vec<CodeUsage> = self
            .codebook
            .iter()
            .map(|_| CodeUsage { use_count: 0, max_dist_sq: 0.0 })
            .collect();
        for sample in samples {
            let idx = self.nearest(sample);
            let dist = self.codebook[idx].dist_sq(sample);
            report[idx].use_count += 1;
            if dist > report[idx].max_dist_sq {
                report[idx].max_dist_sq = dist;
            }
        }
        report
    }

    /// Writes a plain-text usage report: one `index use_count max_error`
    /// line per codeword.
    pub fn write_report<W: std::io::Write>(
        &self,
        samples: &[Vector<N>],
        mut out: W,
    ) -> std::io::Result<()> {
        for (idx, usage) in self.usage_report(samples).into_iter().enumerate() {
            writeln!(out, "{idx} {} {}", usage.use_count, usage.max_dist_sq.sqrt())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CodeUsage {
    pub use_count: u32,
    pub max_dist_sq: f32,
}

fn centroid<const N: usize>(weighted: &[WeightedVector<N>]) -> Vector<N> {
    let total_weight: u32 = weighted.iter().map(|w| w.weight).sum();
    let mut sum = Vector::zero();
    for w in weighted {
        sum = sum.add(&w.value.scale(w.weight as f32));
    }
    sum.scale(1.0 / total_weight.max(1) as f32)
}

fn nearest_index<const N: usize>(codebook: &[Vector<N>], sample: &Vector<N>) -> usize {
    codebook
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.dist_sq(sample)
                .partial_cmp(&b.dist_sq(sample))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

/// One Lloyd iteration pass: assign samples to nearest codeword, move each
/// codeword to the weighted centroid of its assignees. Repeats until no
/// codeword moves more than [`RELOCATE_EPS`] squared distance, or the
/// iteration cap is hit.
fn relocate<const N: usize>(codebook: &mut [Vector<N>], weighted: &[WeightedVector<N>]) {
    for _ in 0..MAX_RELOCATE_ITERS {
        let mut sums = vec![Vector::<N>::zero(); codebook.len()];
        let mut weights = vec![0u32; codebook.len()];

        for w in weighted {
            let idx = nearest_index(codebook, &w.value);
            sums[idx] = sums[idx].add(&w.value.scale(w.weight as f32));
            weights[idx] += w.weight;
        }

        let mut max_move = 0.0f32;
        for (code, (sum, weight)) in codebook.iter_mut().zip(sums.into_iter().zip(weights)) {
            if weight == 0 {
                continue;
            }
            let new_pos = sum.scale(1.0 / weight as f32);
            let moved = code.dist_sq(&new_pos);
            if moved > max_move {
                max_move = moved;
            }
            *code = new_pos;
        }

        if max_move < RELOCATE_EPS {
            break;
        }
    }
}

/// Splits every codeword in two: a negatively- and positively-perturbed
/// copy, each offset along the codeword's own vector scaled by
/// [`SPLIT_DELTA`] (or a fixed unit offset, for the degenerate zero
/// codeword).
fn split<const N: usize>(codebook: &[Vector<N>]) -> Vec<Vector<N>> {
    let mut out = Vec::with_capacity(codebook.len() * 2);
    for code in codebook {
        let (a, b) = split_one(*code);
        out.push(a);
        out.push(b);
    }
    out
}

fn split_one<const N: usize>(code: Vector<N>) -> (Vector<N>, Vector<N>) {
    let magnitude = code.dist_sq(&Vector::zero()).sqrt();
    let scale = if magnitude > f32::EPSILON { magnitude * SPLIT_DELTA } else { SPLIT_DELTA };
    let mut delta = [scale; N];
    if N > 0 {
        delta[0] = -delta[0];
    }
    (code.add(&Vector::new(delta).scale(-1.0)), code.add(&Vector::new(delta)))
}

/// Drops codewords with no assigned samples, so a stalled split does not
/// leave dead entries occupying codebook slots.
fn prune_unused<const N: usize>(codebook: &mut Vec<Vector<N>>, weighted: &[WeightedVector<N>]) {
    if codebook.len() <= 1 {
        return;
    }
    let mut used = vec![false; codebook.len()];
    for w in weighted {
        used[nearest_index(codebook, &w.value)] = true;
    }
    let mut idx = 0;
    codebook.retain(|_| {
        let keep = used[idx];
        idx += 1;
        keep
    });
}

/// Finds the codeword whose assigned samples have the largest maximum
/// distance, the candidate the repair phase splits next.
fn worst_codeword<const N: usize>(
    codebook: &[Vector<N>],
    weighted: &[WeightedVector<N>],
) -> Option<usize> {
    let mut max_dist = vec![0.0f32; codebook.len()];
    let mut any_assigned = vec![false; codebook.len()];
    for w in weighted {
        let idx = nearest_index(codebook, &w.value);
        let dist = codebook[idx].dist_sq(&w.value);
        any_assigned[idx] = true;
        if dist > max_dist[idx] {
            max_dist[idx] = dist;
        }
    }
    max_dist
        .into_iter()
        .zip(any_assigned)
        .enumerate()
        .filter(|(_, (_, assigned))| *assigned)
        .max_by(|(_, (a, _)), (_, (b, _))| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(idx, _)| idx)
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample_clusters() -> Vec<Vector<2>> {
        let mut samples = Vec::new();
        for _ in 0..16 {
            samples.push(Vector::new([0.0, 0.0]));
            samples.push(Vector::new([0.1, -0.1]));
            samples.push(Vector::new([10.0, 10.0]));
            samples.push(Vector::new([10.1, 9.9]));
        }
        samples
    }

    #[test]
    fn converges_to_requested_size() {
        let samples = sample_clusters();
        let vq = VectorQuantizer::train(&samples, 4, 1e-6);
        assert!(vq.codebook().len() <= 4);
        assert!(!vq.codebook().is_empty());
    }

    #[test]
    fn separates_distinct_clusters() {
        let samples = sample_clusters();
        let vq = VectorQuantizer::train(&samples, 2, 1e-6);
        let low = vq.nearest(&Vector::new([0.0, 0.0]));
        let high = vq.nearest(&Vector::new([10.0, 10.0]));
        assert_ne!(low, high);
    }

    #[test]
    fn single_code_when_target_is_one() {
        let samples = sample_clusters();
        let vq = VectorQuantizer::train(&samples, 1, 1e-6);
        assert_eq!(vq.codebook().len(), 1);
    }

    #[test]
    fn usage_report_covers_every_sample() {
        let samples = sample_clusters();
        let vq = VectorQuantizer::train(&samples, 2, 1e-6);
        let report = vq.usage_report(&samples);
        let total: u32 = report.iter().map(|r| r.use_count).sum();
        assert_eq!(total as usize, samples.len());
    }
}
