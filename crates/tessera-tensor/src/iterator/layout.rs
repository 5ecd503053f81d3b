//! Iteration Layout - Dimension Reordering and Coalescing
//!
//! Both passes only change the order in which elements are visited, never
//! which output element receives which result. Stride lists are given per
//! operand with the output first, in logical (row-major) dimension order.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use core::cmp::Ordering;

use smallvec::SmallVec;

use crate::shape::{Shape, Strides};

/// Logical dimension visited at each iteration position, outermost first.
pub type Permutation = SmallVec<[usize; 6]>;

/// Shape and per-operand strides after reordering and coalescing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterLayout {
    /// Iteration shape, last dimension fastest.
    pub shape: Shape,
    /// Strides of each operand over `shape`, output first.
    pub strides: SmallVec<[Strides; 4]>,
    /// Logical dimension order chosen by the reorder pass.
    pub permutation: Permutation,
}

impl IterLayout {
    /// Builds the traversal layout for operands over `shape`.
    pub fn new(shape: &[usize], strides: &[Strides], reorder: bool, coalesce: bool) -> Self {
        let permutation = if reorder {
            reorder_dimensions(shape, strides)
        } else {
            (0..shape.len()).collect()
        };

        let mut layout = Self {
            shape: permutation.iter().map(|&d| shape[d]).collect(),
            strides: strides
                .iter()
                .map(|s| permutation.iter().map(|&d| s[d]).collect())
                .collect(),
            permutation,
        };
        if coalesce {
            coalesce_dimensions(&mut layout.shape, &mut layout.strides);
        }
        layout
    }

    /// Rank of the iteration space.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }
}

// =============================================================================
// Reordering
// =============================================================================

/// Decides whether logical dim `slow` should be visited outside of `fast`.
///
/// `Greater` swaps the two, `Less` keeps them, `Equal` means no operand
/// had an opinion. Broadcast strides carry no information and are skipped.
fn compare_dims(shape: &[usize], strides: &[Strides], fast: usize, slow: usize) -> Ordering {
    for s in strides {
        let (s0, s1) = (s[fast], s[slow]);
        if s0 == 0 || s1 == 0 {
            continue;
        }
        match s0.cmp(&s1) {
            Ordering::Less => return Ordering::Less,
            Ordering::Greater => return Ordering::Greater,
            // equal strides: the smaller extent goes inside
            Ordering::Equal => {
                if shape[fast] > shape[slow] {
                    return Ordering::Greater;
                }
            }
        }
    }
    Ordering::Equal
}

/// Orders dimensions so that the output's smallest stride ends up
/// innermost. Returns the permutation, outermost first.
///
/// Insertion sort over a fastest-first list: ambiguous comparisons keep
/// scanning further out, so an unrelated dimension never blocks a move.
pub fn reorder_dimensions(shape: &[usize], strides: &[Strides]) -> Permutation {
    let ndim = shape.len();
    let mut fastest_first: Permutation = (0..ndim).rev().collect();

    for i in 1..ndim {
        let mut dim1 = i;
        for dim0 in (0..i).rev() {
            match compare_dims(shape, strides, fastest_first[dim0], fastest_first[dim1]) {
                Ordering::Greater => {
                    fastest_first.swap(dim0, dim1);
                    dim1 = dim0;
                }
                Ordering::Less => break,
                Ordering::Equal => {}
            }
        }
    }

    fastest_first.reverse();
    fastest_first
}

// =============================================================================
// Coalescing
// =============================================================================

fn can_coalesce(shape: &[usize], strides: &[Strides], inner: usize, outer: usize) -> bool {
    let (inner_dim, outer_dim) = (shape[inner], shape[outer]);
    if inner_dim == 1 || outer_dim == 1 {
        return true;
    }
    strides
        .iter()
        .all(|s| inner_dim as isize * s[inner] == s[outer])
}

/// Merges adjacent dimensions that every operand walks as one run.
///
/// A dimension of extent 1 always merges. After the pass no two adjacent
/// dimensions can be merged.
pub fn coalesce_dimensions(shape: &mut Shape, strides: &mut [Strides]) {
    let ndim = shape.len();
    if ndim <= 1 {
        return;
    }

    // fastest-first while merging
    shape.reverse();
    for s in strides.iter_mut() {
        s.reverse();
    }

    let mut prev = 0;
    for dim in 1..ndim {
        if can_coalesce(shape, strides, prev, dim) {
            if shape[prev] == 1 {
                for s in strides.iter_mut() {
                    s[prev] = s[dim];
                }
            }
            shape[prev] *= shape[dim];
        } else {
            prev += 1;
            if prev != dim {
                for s in strides.iter_mut() {
                    s[prev] = s[dim];
                }
                shape[prev] = shape[dim];
            }
        }
    }

    shape.truncate(prev + 1);
    shape.reverse();
    for s in strides.iter_mut() {
        s.truncate(prev + 1);
        s.reverse();
    }
}

// =============================================================================
// Tests
// =============================================================================
