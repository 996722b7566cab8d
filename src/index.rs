use crate::error::ReduceError;

/// A pixel value paired with its origin position in the source image.
///
/// Created once per run by [`index_pixels`] and read-only thereafter: the
/// clustering engine groups these by color, and the restore step writes each
/// one's cluster mean back to `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedPixel {
    pub value: rgb::RGB<u8>,
    pub row: usize,
    pub col: usize,
}

/// Flatten a row-major pixel buffer into a sequence of indexed pixels.
///
/// Covers every grid position exactly once, in row-major order, so the
/// output length is always `width * height`.
pub fn index_pixels(
    pixels: &[rgb::RGB<u8>],
    width: usize,
    height: usize,
) -> Result<Vec<IndexedPixel>, ReduceError> {
    if width == 0 || height == 0 {
        return Err(ReduceError::ZeroDimension);
    }
    if pixels.len() != width * height {
        return Err(ReduceError::DimensionMismatch {
            len: pixels.len(),
            width,
            height,
        });
    }

    let mut indexed = Vec::with_capacity(pixels.len());
    for row in 0..height {
        for col in 0..width {
            indexed.push(IndexedPixel {
                value: pixels[row * width + col],
                row,
                col,
            });
        }
    }

    Ok(indexed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(v: u8) -> rgb::RGB<u8> {
        rgb::RGB { r: v, g: v, b: v }
    }

    #[test]
    fn covers_every_position_once() {
        let pixels: Vec<rgb::RGB<u8>> = (0..12).map(|i| gray(i as u8)).collect();
        let indexed = index_pixels(&pixels, 4, 3).unwrap();

        assert_eq!(indexed.len(), 12);

        let mut positions: Vec<(usize, usize)> = indexed.iter().map(|p| (p.row, p.col)).collect();
        positions.sort_unstable();
        positions.dedup();
        assert_eq!(positions.len(), 12);
        assert_eq!(positions[0], (0, 0));
        assert_eq!(positions[11], (2, 3));
    }

    #[test]
    fn row_major_order() {
        let pixels: Vec<rgb::RGB<u8>> = (0..6).map(|i| gray(i as u8 * 10)).collect();
        let indexed = index_pixels(&pixels, 3, 2).unwrap();

        assert_eq!(indexed[0].value, gray(0));
        assert_eq!((indexed[0].row, indexed[0].col), (0, 0));
        assert_eq!((indexed[2].row, indexed[2].col), (0, 2));
        assert_eq!((indexed[3].row, indexed[3].col), (1, 0));
        assert_eq!(indexed[5].value, gray(50));
    }

    #[test]
    fn zero_dimension_rejected() {
        assert!(matches!(
            index_pixels(&[gray(0)], 0, 1),
            Err(ReduceError::ZeroDimension)
        ));
        assert!(matches!(
            index_pixels(&[gray(0)], 1, 0),
            Err(ReduceError::ZeroDimension)
        ));
    }

    #[test]
    fn length_mismatch_rejected() {
        let pixels = vec![gray(0); 10];
        assert!(matches!(
            index_pixels(&pixels, 4, 4),
            Err(ReduceError::DimensionMismatch { len: 10, width: 4, height: 4 })
        ));
    }
}
