//! Memory Overlap - Aliasing Checks Between Operands
//!
//! Two questions decide how an output may be written:
//!
//! 1. Does the output alias itself? A view whose elements share memory
//!    (a stride of 0 over an extent > 1) cannot be written elementwise with
//!    a well-defined result.
//! 2. Does the output alias an input without being that exact input? Then
//!    writing through it may clobber input values not yet read, and the
//!    iterator writes to a scratch buffer instead.
//!
//! Both checks are conservative: an uncertain answer reports overlap.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use core::ops::Range;

use tessera_core::error::{Error, Result};

use crate::shape::is_non_overlapping_and_dense;
use crate::tensor::Tensor;

// =============================================================================
// Internal Overlap
// =============================================================================

/// Whether the elements of one view share memory locations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemOverlap {
    /// Every element has its own location.
    No,
    /// At least two elements share a location.
    Yes,
    /// Could not be decided cheaply.
    TooHard,
}

/// Classifies the self-aliasing of `tensor`.
#[must_use]
pub fn internal_overlap(tensor: &Tensor) -> MemOverlap {
    if is_non_overlapping_and_dense(tensor.shape(), tensor.strides()) {
        return MemOverlap::No;
    }

    let repeats = tensor
        .shape()
        .iter()
        .zip(tensor.strides())
        .any(|(&dim, &stride)| dim > 1 && stride == 0);
    if repeats {
        MemOverlap::Yes
    } else {
        MemOverlap::TooHard
    }
}

/// Returns true unless `tensor` is known not to alias itself.
#[must_use]
pub fn has_internal_overlap(tensor: &Tensor) -> bool {
    internal_overlap(tensor) != MemOverlap::No
}

/// Fails if `tensor` is known to alias itself.
///
/// `TooHard` passes; only a definite overlap is rejected.
pub fn assert_no_internal_overlap(tensor: &Tensor) -> Result<()> {
    if internal_overlap(tensor) == MemOverlap::Yes {
        return Err(Error::InternalOverlap);
    }
    Ok(())
}

// =============================================================================
// Pairwise Overlap
// =============================================================================

/// A region of an allocation that can be tested for intersection.
pub trait MemoryExtent {
    /// Identifier of the allocation; equal ids mean the same allocation.
    fn storage_id(&self) -> usize;

    /// Byte range of the allocation the view may touch.
    fn byte_range(&self) -> Range<usize>;
}

impl MemoryExtent for Tensor {
    fn storage_id(&self) -> usize {
        Tensor::storage_id(self)
    }

    fn byte_range(&self) -> Range<usize> {
        Tensor::byte_range(self)
    }
}

/// Returns true if `a` and `b` may share any byte.
///
/// Never reports false when a byte is shared. Empty ranges share nothing.
#[must_use]
pub fn may_overlap<A, B>(a: &A, b: &B) -> bool
where
    A: MemoryExtent + ?Sized,
    B: MemoryExtent + ?Sized,
{
    if a.storage_id() != b.storage_id() {
        return false;
    }
    let (ra, rb) = (a.byte_range(), b.byte_range());
    !ra.is_empty() && !rb.is_empty() && ra.start < rb.end && rb.start < ra.end
}

/// Returns true if both tensors view the same elements the same way.
#[must_use]
pub fn is_identical(a: &Tensor, b: &Tensor) -> bool {
    a.storage().same_allocation(b.storage())
        && a.offset() == b.offset()
        && a.kind() == b.kind()
        && a.shape() == b.shape()
        && a.strides() == b.strides()
}

/// Relationship between an output and one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlapStatus {
    /// Disjoint memory.
    No,
    /// The same view.
    Full,
    /// Shared memory through different views.
    Partial,
}

/// Classifies how `a` and `b` share memory.
#[must_use]
pub fn overlap_status(a: &Tensor, b: &Tensor) -> OverlapStatus {
    if is_identical(a, b) {
        OverlapStatus::Full
    } else if may_overlap(a, b) {
        OverlapStatus::Partial
    } else {
        OverlapStatus::No
    }
}

// =============================================================================
// Tests
// =============================================================================
