#![forbid(unsafe_code)]

//! Image color reduction by k-means clustering.
//!
//! Every pixel keeps its grid position through clustering, so the image can
//! be rebuilt with each pixel replaced by its cluster's mean color. File
//! decode/encode and CLI concerns live with the caller.

pub mod error;
pub mod index;
pub mod kmeans;
pub mod restore;

pub use error::ReduceError;
pub use index::{index_pixels, IndexedPixel};
pub use kmeans::{
    Centroid, Cluster, ClusterEngine, ClusterOutcome, ClusterPartition, Termination,
};
pub use restore::restore_image;

/// Configuration for a color reduction run.
#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// Number of colors the image is reduced to (must be at least 1 and at
    /// most the number of distinct colors present).
    pub clusters: u32,
    /// Cap on refinement iterations after the initial assignment.
    pub max_iterations: u32,
    /// Seed for centroid initialization. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            clusters: 10,
            max_iterations: 5,
            seed: None,
        }
    }
}

impl ClusterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clusters(mut self, n: u32) -> Self {
        self.clusters = n;
        self
    }

    pub fn max_iterations(mut self, n: u32) -> Self {
        self.max_iterations = n;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Result of a full color reduction.
#[derive(Debug)]
pub struct ReduceResult {
    pixels: Vec<rgb::RGB<u8>>,
    palette: Vec<rgb::RGB<u8>>,
    iterations: u32,
    termination: Termination,
}

impl ReduceResult {
    /// The color-reduced image, row-major, same shape as the input.
    pub fn pixels(&self) -> &[rgb::RGB<u8>] {
        &self.pixels
    }

    /// Consume the result, keeping only the output pixel buffer.
    pub fn into_pixels(self) -> Vec<rgb::RGB<u8>> {
        self.pixels
    }

    /// The colors actually present in the output: each non-empty cluster's
    /// mean, in cluster-index order.
    pub fn palette(&self) -> &[rgb::RGB<u8>] {
        &self.palette
    }

    /// Refinement iterations the clustering performed. Callers typically
    /// fold this into the output file name alongside the cluster count.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    /// Whether clustering converged or ran into the iteration cap.
    pub fn termination(&self) -> Termination {
        self.termination
    }
}

/// Reduce an image's colors to at most `config.clusters` cluster means.
///
/// Indexes the pixel buffer, clusters the colors, and rebuilds the image in
/// one call. `pixels` is a row-major buffer of `width * height` entries.
pub fn reduce(
    pixels: &[rgb::RGB<u8>],
    width: usize,
    height: usize,
    config: &ClusterConfig,
) -> Result<ReduceResult, ReduceError> {
    let indexed = index_pixels(pixels, width, height)?;
    let outcome = ClusterEngine::new(&indexed, config)?.run();
    let restored = restore_image(&outcome.partition, width, height)?;

    let palette = outcome
        .partition
        .clusters()
        .iter()
        .filter_map(|c| c.mean().map(Centroid::to_pixel))
        .collect();

    Ok(ReduceResult {
        pixels: restored,
        palette,
        iterations: outcome.iterations,
        termination: outcome.termination,
    })
}
