//! Shape and Strides - Tensor Dimension Management
//!
//! Provides the shape and stride value types, N-ary broadcasting, dimension
//! wrapping and dimension bitsets, and the memory-format helpers the
//! iterator builder uses to pick an output layout.
//!
//! # Key Features
//! - Efficient shape representation with small-vector optimization
//! - Broadcasting over any number of shapes following `NumPy` rules
//! - Negative dimension wrapping and duplicate-free dimension sets
//! - Row-major and channels-last stride layouts
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use smallvec::SmallVec;

use tessera_core::error::{Error, Result};

// =============================================================================
// Type Aliases
// =============================================================================

/// Shape type - dimensions of a tensor.
/// Uses `SmallVec` for stack allocation of small shapes (up to 6 dimensions).
pub type Shape = SmallVec<[usize; 6]>;

/// Strides type - step sizes for each dimension, in elements.
pub type Strides = SmallVec<[isize; 6]>;

/// Largest rank the dimension bitset utilities support.
pub const MAX_DIMS: usize = 64;

// =============================================================================
// Shape Utilities
// =============================================================================

/// Computes the total number of elements from a shape.
#[must_use]
pub fn numel(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Computes the element count, failing on overflow.
pub fn checked_numel(shape: &[usize]) -> Option<usize> {
    shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// Largest element span a dense layout of `shape` strides over, counting
/// zero extents as 1. `None` if that span does not fit in an `isize`.
pub fn checked_stride_span(shape: &[usize]) -> Option<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d.max(1)))
        .filter(|&span| isize::try_from(span).is_ok())
}

fn stride_overflow(shape: &[usize]) -> Error {
    Error::invalid_operation(format!("strides of shape {shape:?} overflow isize"))
}

/// Multiplies a stride by an extent (zero counted as 1), failing on overflow.
fn scale_stride(stride: isize, dim: usize, shape: &[usize]) -> Result<isize> {
    isize::try_from(dim.max(1))
        .ok()
        .and_then(|d| stride.checked_mul(d))
        .ok_or_else(|| stride_overflow(shape))
}

/// Computes row-major (C-order) strides for a shape.
///
/// # Arguments
/// * `shape` - The tensor shape
///
/// # Returns
/// Strides for contiguous row-major layout.
///
/// # Errors
/// `InvalidOperation` if the strides would overflow `isize`.
pub fn contiguous_strides(shape: &[usize]) -> Result<Strides> {
    let mut strides = Strides::with_capacity(shape.len());
    let mut stride = 1isize;

    // Compute strides from right to left
    for &dim in shape.iter().rev() {
        strides.push(stride);
        stride = scale_stride(stride, dim, shape)?;
    }

    strides.reverse();
    Ok(strides)
}

/// Checks if strides represent a contiguous row-major layout.
///
/// Strides of extent-1 dimensions are ignored, and any layout of an empty
/// tensor is contiguous.
#[must_use]
pub fn is_contiguous(shape: &[usize], strides: &[isize]) -> bool {
    if numel(shape) == 0 {
        return true;
    }

    let mut expected = 1isize;
    for (&dim, &stride) in shape.iter().zip(strides.iter()).rev() {
        if dim != 1 {
            if stride != expected {
                return false;
            }
            expected *= dim as isize;
        }
    }
    true
}

/// Checks that every element maps to a distinct offset and the offsets form
/// one gap-free block, in some order of the dimensions.
#[must_use]
pub fn is_non_overlapping_and_dense(shape: &[usize], strides: &[isize]) -> bool {
    if numel(shape) <= 1 {
        return true;
    }

    let mut dims: SmallVec<[usize; 6]> = (0..shape.len()).filter(|&d| shape[d] != 1).collect();
    dims.sort_by_key(|&d| strides[d].unsigned_abs());

    let mut expected = 1usize;
    for d in dims {
        if strides[d].unsigned_abs() != expected {
            return false;
        }
        expected *= shape[d];
    }
    true
}

// =============================================================================
// Broadcasting
// =============================================================================

/// Computes the common shape of any number of shapes.
///
/// Shapes are right-aligned and missing leading dimensions count as 1. At
/// every dimension all extents must be 1 or one shared extent, which becomes
/// the result. An extent of 0 therefore broadcasts against 1 and 0 only.
///
/// # Errors
/// `BroadcastError` naming every shape and the first offending dimension
/// (counted in the result).
pub fn broadcast_shapes<S: AsRef<[usize]>>(shapes: &[S]) -> Result<Shape> {
    let ndim = shapes.iter().map(|s| s.as_ref().len()).max().unwrap_or(0);
    let mut result: Shape = smallvec::smallvec![1; ndim];

    for (d, out) in result.iter_mut().enumerate() {
        let from_right = ndim - 1 - d;
        for shape in shapes {
            let shape = shape.as_ref();
            if from_right >= shape.len() {
                continue;
            }
            let extent = shape[shape.len() - 1 - from_right];
            if extent == 1 || extent == *out {
                continue;
            }
            if *out == 1 {
                *out = extent;
            } else {
                return Err(Error::broadcast(shapes, d));
            }
        }
    }

    Ok(result)
}

/// Computes the broadcast shape of two shapes.
pub fn broadcast_shape(shape1: &[usize], shape2: &[usize]) -> Result<Shape> {
    broadcast_shapes(&[shape1, shape2])
}

/// Checks if two shapes are broadcastable.
#[must_use]
pub fn can_broadcast(shape1: &[usize], shape2: &[usize]) -> bool {
    broadcast_shape(shape1, shape2).is_ok()
}

/// Computes broadcast strides for a shape to match a target shape.
///
/// Leading dimensions missing from `shape`, and dimensions where `shape` has
/// extent 1 but the target does not, get stride 0.
#[must_use]
pub fn broadcast_strides(shape: &[usize], strides: &[isize], target_shape: &[usize]) -> Strides {
    debug_assert!(shape.len() <= target_shape.len());
    let mut result = Strides::with_capacity(target_shape.len());
    let shape_offset = target_shape.len() - shape.len();

    for (i, &target_dim) in target_shape.iter().enumerate() {
        if i < shape_offset {
            result.push(0);
        } else {
            let orig_idx = i - shape_offset;
            if shape[orig_idx] == 1 && target_dim != 1 {
                result.push(0);
            } else {
                result.push(strides[orig_idx]);
            }
        }
    }

    result
}

// =============================================================================
// Dimension Wrapping
// =============================================================================

/// Maps a possibly negative dimension into `[0, ndim)`.
///
/// A 0-dimensional tensor accepts dims `-1` and `0`, as if it had one
/// dimension.
///
/// # Errors
/// `InvalidDimension` if the dim is out of range after wrapping.
pub fn maybe_wrap_dim(dim: i64, ndim: usize) -> Result<usize> {
    let effective = ndim.max(1) as i64;
    let wrapped = if dim < 0 { dim + effective } else { dim };

    if wrapped < 0 || wrapped >= effective {
        return Err(Error::InvalidDimension { index: dim, ndim });
    }

    Ok(wrapped as usize)
}

/// A set of dimension indices below `MAX_DIMS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DimBitset(u64);

impl DimBitset {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Returns true if `dim` is in the set.
    #[must_use]
    pub const fn contains(self, dim: usize) -> bool {
        dim < MAX_DIMS && self.0 & (1u64 << dim) != 0
    }

    /// Adds `dim`, returning false if it was already present.
    pub fn insert(&mut self, dim: usize) -> bool {
        debug_assert!(dim < MAX_DIMS);
        let present = self.contains(dim);
        self.0 |= 1u64 << dim;
        !present
    }

    /// Number of dimensions in the set.
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Iterates over the dimensions in increasing order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..MAX_DIMS).filter(move |&d| self.contains(d))
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }
}

/// Converts a list of possibly negative dims into a set.
///
/// # Errors
/// - `RankOverflow` if `ndim` exceeds `MAX_DIMS`
/// - `InvalidDimension` if a dim is out of range
/// - `DuplicateDimension` if two dims normalize to the same index
pub fn dim_list_to_bitset(dims: &[i64], ndim: usize) -> Result<DimBitset> {
    if ndim > MAX_DIMS {
        return Err(Error::RankOverflow {
            ndim,
            max: MAX_DIMS,
        });
    }

    let mut set = DimBitset::new();
    for &dim in dims {
        let wrapped = maybe_wrap_dim(dim, ndim)?;
        if !set.insert(wrapped) {
            return Err(Error::DuplicateDimension { dim: wrapped });
        }
    }
    Ok(set)
}

// =============================================================================
// Memory Format
// =============================================================================

/// Physical layout of a newly allocated tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemoryFormat {
    /// Row-major, rightmost dimension fastest.
    #[default]
    Contiguous,
    /// `[N, C, H, W]` stored as `N, H, W, C`.
    ChannelsLast,
}

/// Computes channels-last strides for a rank-4 shape.
///
/// # Errors
/// `InvalidOperation` if the shape is not rank 4 or the strides would
/// overflow `isize`.
pub fn channels_last_strides(shape: &[usize]) -> Result<Strides> {
    if shape.len() != 4 {
        return Err(Error::invalid_operation(format!(
            "channels_last requires a rank-4 shape, got {shape:?}"
        )));
    }

    let mut strides: Strides = smallvec::smallvec![0; 4];
    strides[1] = 1;
    strides[3] = scale_stride(1, shape[1], shape)?;
    strides[2] = scale_stride(strides[3], shape[3], shape)?;
    strides[0] = scale_stride(strides[2], shape[2], shape)?;
    scale_stride(strides[0], shape[0], shape)?;
    Ok(strides)
}

/// Computes the strides of `format` for `shape`.
pub fn strides_for_format(shape: &[usize], format: MemoryFormat) -> Result<Strides> {
    match format {
        MemoryFormat::Contiguous => contiguous_strides(shape),
        MemoryFormat::ChannelsLast => channels_last_strides(shape),
    }
}

/// Guesses the layout a view was allocated with.
///
/// Reports `ChannelsLast` only for rank-4 views laid out exactly
/// channels-last that are not also row-major.
#[must_use]
pub fn suggest_memory_format(shape: &[usize], strides: &[isize]) -> MemoryFormat {
    if shape.len() == 4 && !is_contiguous(shape, strides) {
        if let Ok(expected) = channels_last_strides(shape) {
            let matches = shape
                .iter()
                .zip(strides.iter().zip(expected.iter()))
                .all(|(&dim, (&actual, &want))| dim == 1 || actual == want);
            if matches {
                return MemoryFormat::ChannelsLast;
            }
        }
    }
    MemoryFormat::Contiguous
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_core::ErrorKind;

    #[test]
    fn test_numel() {
        assert_eq!(numel(&[2, 3, 4]), 24);
        assert_eq!(numel(&[]), 1);
        assert_eq!(numel(&[0, 5]), 0);
        assert_eq!(checked_numel(&[usize::MAX, 2]), None);
    }

    #[test]
    fn test_contiguous_strides() {
        let strides = contiguous_strides(&[2, 3, 4]).unwrap();
        assert_eq!(strides.as_slice(), &[12, 4, 1]);
        assert_eq!(contiguous_strides(&[0, 3]).unwrap().as_slice(), &[3, 1]);
        assert!(contiguous_strides(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_stride_overflow() {
        let huge = [0, usize::MAX / 2, 4];
        assert_eq!(checked_numel(&huge), Some(0));
        assert_eq!(checked_stride_span(&huge), None);
        assert_eq!(
            contiguous_strides(&huge).unwrap_err().kind(),
            ErrorKind::Internal
        );
        assert!(channels_last_strides(&[1, usize::MAX / 2, 1, 4]).is_err());
        assert!(channels_last_strides(&[usize::MAX / 2, 4, 1, 1]).is_err());
        assert_eq!(checked_stride_span(&[0, 3, 4]), Some(12));
    }

    #[test]
    fn test_is_contiguous() {
        let shape = [2, 3];
        let strides = contiguous_strides(&shape).unwrap();
        assert!(is_contiguous(&shape, &strides));

        let non_contig_strides: Strides = smallvec::smallvec![1, 2];
        assert!(!is_contiguous(&shape, &non_contig_strides));

        // Extent-1 strides carry no meaning.
        assert!(is_contiguous(&[1, 3], &[99, 1]));
    }

    #[test]
    fn test_non_overlapping_and_dense() {
        assert!(is_non_overlapping_and_dense(&[2, 3], &[1, 2]));
        assert!(is_non_overlapping_and_dense(&[2, 3], &[3, 1]));
        assert!(!is_non_overlapping_and_dense(&[2, 3], &[6, 1]));
        assert!(!is_non_overlapping_and_dense(&[2, 3], &[0, 1]));
        assert!(is_non_overlapping_and_dense(&[1], &[0]));
    }

    #[test]
    fn test_broadcast_shapes() {
        assert_eq!(
            broadcast_shapes(&[vec![3, 1, 5], vec![4, 5]]).unwrap().as_slice(),
            &[3, 4, 5]
        );
        assert_eq!(
            broadcast_shapes(&[vec![0, 5], vec![1, 5]]).unwrap().as_slice(),
            &[0, 5]
        );
        assert_eq!(
            broadcast_shapes(&[vec![2, 1], vec![1, 3], vec![3]]).unwrap().as_slice(),
            &[2, 3]
        );
        assert_eq!(broadcast_shape(&[], &[2, 3]).unwrap().as_slice(), &[2, 3]);
        assert!(broadcast_shapes::<Vec<usize>>(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_broadcast_failures() {
        let err = broadcast_shape(&[2, 3], &[4, 3]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
        assert_eq!(
            err,
            Error::BroadcastError {
                shapes: vec![vec![2, 3], vec![4, 3]],
                dim: 0,
            }
        );

        // Empty dims never broadcast against positive extents.
        assert!(broadcast_shape(&[0, 5], &[3, 5]).is_err());
        assert!(!can_broadcast(&[5], &[0]));
    }

    #[test]
    fn test_broadcast_strides() {
        let strides = broadcast_strides(&[3, 1], &[1, 1], &[3, 4]);
        assert_eq!(strides.as_slice(), &[1, 0]);

        let strides = broadcast_strides(&[4], &[1], &[2, 3, 4]);
        assert_eq!(strides.as_slice(), &[0, 0, 1]);
    }

    #[test]
    fn test_maybe_wrap_dim() {
        assert_eq!(maybe_wrap_dim(-1, 4).unwrap(), 3);
        assert_eq!(maybe_wrap_dim(0, 4).unwrap(), 0);
        assert_eq!(maybe_wrap_dim(-4, 4).unwrap(), 0);

        let err = maybe_wrap_dim(4, 4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexError);
        assert!(maybe_wrap_dim(-5, 4).is_err());

        assert_eq!(maybe_wrap_dim(-1, 0).unwrap(), 0);
        assert!(maybe_wrap_dim(1, 0).is_err());
    }

    #[test]
    fn test_dim_list_to_bitset() {
        let set = dim_list_to_bitset(&[0, -1], 3).unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(set.len(), 2);
        assert!(set.contains(2));
        assert!(!set.contains(1));

        let err = dim_list_to_bitset(&[1, -2], 3).unwrap_err();
        assert_eq!(err, Error::DuplicateDimension { dim: 1 });

        let err = dim_list_to_bitset(&[0], 65).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RankOverflow);

        let full: Vec<i64> = (0..64).collect();
        assert_eq!(dim_list_to_bitset(&full, 64).unwrap().bits(), u64::MAX);
    }

    #[test]
    fn test_channels_last() {
        let strides = channels_last_strides(&[2, 3, 4, 5]).unwrap();
        assert_eq!(strides.as_slice(), &[60, 1, 15, 3]);
        assert!(channels_last_strides(&[2, 3]).is_err());

        assert_eq!(
            suggest_memory_format(&[2, 3, 4, 5], &strides),
            MemoryFormat::ChannelsLast
        );
        assert_eq!(
            suggest_memory_format(&[2, 3, 4, 5], &contiguous_strides(&[2, 3, 4, 5]).unwrap()),
            MemoryFormat::Contiguous
        );
        // A single channel is both layouts at once.
        let ambiguous = channels_last_strides(&[2, 1, 4, 5]).unwrap();
        assert_eq!(
            suggest_memory_format(&[2, 1, 4, 5], &ambiguous),
            MemoryFormat::Contiguous
        );
    }
}
