use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReduceError {
    #[error("image dimensions cannot be zero")]
    ZeroDimension,

    #[error("pixel buffer length {len} does not match dimensions {width}x{height}")]
    DimensionMismatch {
        len: usize,
        width: usize,
        height: usize,
    },

    #[error("cluster count must be at least 1, got {0}")]
    InvalidClusterCount(u32),

    #[error("max iterations must be at least 1, got {0}")]
    InvalidMaxIterations(u32),

    #[error("requested {requested} clusters but the image has only {distinct} distinct colors")]
    InsufficientData { distinct: usize, requested: usize },

    #[error("pixel position ({row}, {col}) is not covered by exactly one cluster")]
    InconsistentPartition { row: usize, col: usize },
}
