use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::error::ReduceError;
use crate::index::IndexedPixel;
use crate::ClusterConfig;

/// The current mean color of one cluster.
///
/// Channels are kept in `f32` so repeated averaging never truncates to
/// integer steps; conversion back to 8-bit happens only on write-back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Centroid {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Centroid {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_pixel(value: rgb::RGB<u8>) -> Self {
        Self {
            r: value.r as f32,
            g: value.g as f32,
            b: value.b as f32,
        }
    }

    /// Squared Euclidean distance to a pixel value.
    /// Squaring preserves the ordering of the L2 norm, ties included.
    pub fn distance_sq(self, value: rgb::RGB<u8>) -> f32 {
        let dr = value.r as f32 - self.r;
        let dg = value.g as f32 - self.g;
        let db = value.b as f32 - self.b;
        dr * dr + dg * dg + db * db
    }

    /// Round each channel back to 8-bit.
    pub fn to_pixel(self) -> rgb::RGB<u8> {
        rgb::RGB {
            r: self.r.round() as u8,
            g: self.g.round() as u8,
            b: self.b.round() as u8,
        }
    }
}

/// The pixels assigned to one centroid during one iteration.
///
/// Rebuilt from scratch every iteration; membership is never patched
/// incrementally. Members appear in source-image visit order.
#[derive(Debug, Clone, Default)]
pub struct Cluster {
    members: Vec<IndexedPixel>,
}

impl Cluster {
    pub fn members(&self) -> &[IndexedPixel] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Element-wise arithmetic mean of the member colors, or `None` for an
    /// empty cluster. Sums accumulate in f64 for stability on large images.
    pub fn mean(&self) -> Option<Centroid> {
        if self.members.is_empty() {
            return None;
        }

        let mut r_sum = 0.0f64;
        let mut g_sum = 0.0f64;
        let mut b_sum = 0.0f64;
        for px in &self.members {
            r_sum += px.value.r as f64;
            g_sum += px.value.g as f64;
            b_sum += px.value.b as f64;
        }

        let n = self.members.len() as f64;
        Some(Centroid::new(
            (r_sum / n) as f32,
            (g_sum / n) as f32,
            (b_sum / n) as f32,
        ))
    }

    /// Whether this cluster holds the same set of positions as `other`.
    /// Members are always in source visit order, so a positional walk
    /// is a set comparison.
    fn same_membership(&self, other: &Cluster) -> bool {
        self.members.len() == other.members.len()
            && self
                .members
                .iter()
                .zip(&other.members)
                .all(|(a, b)| a.row == b.row && a.col == b.col)
    }
}

/// One full assignment of every indexed pixel to a cluster.
///
/// Length equals the configured cluster count; clusters may be empty.
#[derive(Debug, Clone)]
pub struct ClusterPartition {
    clusters: Vec<Cluster>,
}

impl ClusterPartition {
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    fn same_membership(&self, other: &ClusterPartition) -> bool {
        self.clusters.len() == other.clusters.len()
            && self
                .clusters
                .iter()
                .zip(&other.clusters)
                .all(|(a, b)| a.same_membership(b))
    }
}

/// How a clustering run ended. Both states yield a valid partition;
/// the distinction is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Reassignment no longer changed any cluster's membership.
    Converged,
    /// The iteration cap was hit before membership stabilized.
    MaxIterReached,
}

/// Terminal state of a clustering run.
#[derive(Debug)]
pub struct ClusterOutcome {
    pub partition: ClusterPartition,
    pub termination: Termination,
    /// Refinement cycles performed after the initial assignment.
    pub iterations: u32,
}

/// Iterative k-means over an indexed pixel sequence.
///
/// Owns the centroid and partition state for the duration of one run; the
/// pixel sequence itself is only ever read.
pub struct ClusterEngine<'a> {
    pixels: &'a [IndexedPixel],
    centroids: Vec<Centroid>,
    max_iterations: u32,
}

impl<'a> ClusterEngine<'a> {
    /// Build an engine with initial centroids sampled from the distinct
    /// pixel colors. A seed in the config makes the sampling reproducible;
    /// without one the engine draws from OS entropy.
    pub fn new(pixels: &'a [IndexedPixel], config: &ClusterConfig) -> Result<Self, ReduceError> {
        match config.seed {
            Some(seed) => Self::with_rng(pixels, config, &mut StdRng::seed_from_u64(seed)),
            None => Self::with_rng(pixels, config, &mut StdRng::from_entropy()),
        }
    }

    /// Like [`new`](Self::new), but with a caller-supplied random source.
    pub fn with_rng<R: Rng>(
        pixels: &'a [IndexedPixel],
        config: &ClusterConfig,
        rng: &mut R,
    ) -> Result<Self, ReduceError> {
        if config.clusters == 0 {
            return Err(ReduceError::InvalidClusterCount(config.clusters));
        }
        if config.max_iterations == 0 {
            return Err(ReduceError::InvalidMaxIterations(config.max_iterations));
        }

        let centroids = sample_distinct_centroids(pixels, config.clusters as usize, rng)?;

        Ok(Self {
            pixels,
            centroids,
            max_iterations: config.max_iterations,
        })
    }

    /// Current centroids, in cluster-index order.
    pub fn centroids(&self) -> &[Centroid] {
        &self.centroids
    }

    /// Run assignment and refinement until membership stabilizes or the
    /// iteration cap is hit.
    ///
    /// The initial assignment is not counted: `iterations` is the number of
    /// update-then-reassign cycles that ran after it, so it never exceeds
    /// the configured maximum.
    pub fn run(mut self) -> ClusterOutcome {
        let mut current = self.assign();
        let mut iterations = 0u32;

        let termination = loop {
            self.update_centroids(&current);
            let next = self.assign();
            iterations += 1;
            log::trace!("refinement iteration {iterations} complete");

            let converged = next.same_membership(&current);
            current = next;

            if converged {
                break Termination::Converged;
            }
            if iterations >= self.max_iterations {
                break Termination::MaxIterReached;
            }
        };

        log::debug!(
            "clustering finished after {iterations} iterations ({termination:?}, k={})",
            current.len()
        );

        ClusterOutcome {
            partition: current,
            termination,
            iterations,
        }
    }

    /// Assign every pixel to its nearest centroid.
    fn assign(&self) -> ClusterPartition {
        let mut clusters: Vec<Cluster> = (0..self.centroids.len())
            .map(|_| Cluster::default())
            .collect();

        for &px in self.pixels {
            clusters[nearest_centroid(px.value, &self.centroids)]
                .members
                .push(px);
        }

        ClusterPartition { clusters }
    }

    /// Move each centroid to the mean of its cluster. An empty cluster
    /// keeps its previous centroid unchanged and is never reseeded, even
    /// if that freezes it for the rest of the run.
    fn update_centroids(&mut self, partition: &ClusterPartition) {
        for (centroid, cluster) in self.centroids.iter_mut().zip(&partition.clusters) {
            if let Some(mean) = cluster.mean() {
                *centroid = mean;
            }
        }
    }
}

/// Index of the centroid nearest to `value`. Ties go to the lowest index.
pub fn nearest_centroid(value: rgb::RGB<u8>, centroids: &[Centroid]) -> usize {
    let mut best_idx = 0;
    let mut best_dist = f32::MAX;

    for (i, centroid) in centroids.iter().enumerate() {
        let d = centroid.distance_sq(value);
        if d < best_dist {
            best_dist = d;
            best_idx = i;
        }
    }

    best_idx
}

/// Sample `k` initial centroids from the distinct pixel colors, uniformly
/// at random without replacement. Distinct colors are collected in
/// first-seen order so the draw depends only on the input and the RNG.
fn sample_distinct_centroids<R: Rng>(
    pixels: &[IndexedPixel],
    k: usize,
    rng: &mut R,
) -> Result<Vec<Centroid>, ReduceError> {
    let mut seen = HashSet::new();
    let mut distinct: Vec<rgb::RGB<u8>> = Vec::new();
    for px in pixels {
        if seen.insert(px.value) {
            distinct.push(px.value);
        }
    }

    if distinct.len() < k {
        return Err(ReduceError::InsufficientData {
            distinct: distinct.len(),
            requested: k,
        });
    }

    Ok(distinct
        .choose_multiple(rng, k)
        .map(|&value| Centroid::from_pixel(value))
        .collect())
}
