use crate::error::ReduceError;
use crate::kmeans::ClusterPartition;

/// Rebuild an image from a terminal cluster partition.
///
/// Every position owned by a cluster gets that cluster's mean color. The
/// partition invariant (each pixel in exactly one cluster) is enforced
/// here: a position written twice, left unwritten, or falling outside the
/// grid fails the whole restore rather than producing a partially-correct
/// image. Empty clusters own no positions and contribute nothing.
pub fn restore_image(
    partition: &ClusterPartition,
    width: usize,
    height: usize,
) -> Result<Vec<rgb::RGB<u8>>, ReduceError> {
    if width == 0 || height == 0 {
        return Err(ReduceError::ZeroDimension);
    }

    let mut image = vec![rgb::RGB { r: 0, g: 0, b: 0 }; width * height];
    let mut written = vec![false; width * height];

    for cluster in partition.clusters() {
        let Some(mean) = cluster.mean() else {
            continue;
        };
        let value = mean.to_pixel();

        for px in cluster.members() {
            if px.row >= height || px.col >= width {
                return Err(ReduceError::InconsistentPartition {
                    row: px.row,
                    col: px.col,
                });
            }
            let idx = px.row * width + px.col;
            if written[idx] {
                return Err(ReduceError::InconsistentPartition {
                    row: px.row,
                    col: px.col,
                });
            }
            written[idx] = true;
            image[idx] = value;
        }
    }

    if let Some(idx) = written.iter().position(|&w| !w) {
        return Err(ReduceError::InconsistentPartition {
            row: idx / width,
            col: idx % width,
        });
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::index_pixels;
    use crate::kmeans::ClusterEngine;
    use crate::ClusterConfig;

    fn gray(v: u8) -> rgb::RGB<u8> {
        rgb::RGB { r: v, g: v, b: v }
    }

    fn partition_of(
        pixels: &[rgb::RGB<u8>],
        width: usize,
        height: usize,
        k: u32,
    ) -> ClusterPartition {
        let indexed = index_pixels(pixels, width, height).unwrap();
        let config = ClusterConfig::new().clusters(k).max_iterations(10).seed(5);
        ClusterEngine::new(&indexed, &config).unwrap().run().partition
    }

    #[test]
    fn restores_two_tone_image_exactly() {
        let pixels = vec![gray(0), gray(0), gray(255), gray(255)];
        let partition = partition_of(&pixels, 2, 2, 2);
        let restored = restore_image(&partition, 2, 2).unwrap();
        assert_eq!(restored, pixels);
    }

    #[test]
    fn identity_when_k_equals_distinct_colors() {
        let pixels = vec![gray(10), gray(20), gray(30), gray(10), gray(20), gray(30)];
        let partition = partition_of(&pixels, 3, 2, 3);
        let restored = restore_image(&partition, 3, 2).unwrap();
        assert_eq!(restored, pixels);
    }

    #[test]
    fn zero_dimension_rejected() {
        let pixels = vec![gray(1), gray(2)];
        let partition = partition_of(&pixels, 2, 1, 2);
        assert!(matches!(
            restore_image(&partition, 0, 1),
            Err(ReduceError::ZeroDimension)
        ));
    }

    #[test]
    fn wrong_shape_fails_consistency_check() {
        let pixels = vec![gray(0), gray(60), gray(120), gray(200)];
        let partition = partition_of(&pixels, 4, 1, 4);
        // A 2x1 grid cannot be covered by a partition of a 4x1 image.
        assert!(matches!(
            restore_image(&partition, 2, 1),
            Err(ReduceError::InconsistentPartition { .. })
        ));
    }

    #[test]
    fn larger_shape_leaves_positions_unwritten() {
        let pixels = vec![gray(0), gray(255)];
        let partition = partition_of(&pixels, 2, 1, 2);
        assert!(matches!(
            restore_image(&partition, 2, 2),
            Err(ReduceError::InconsistentPartition { row: 1, col: 0 })
        ));
    }
}
