//! Strided cursor over an iteration shape.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use smallvec::SmallVec;

use crate::shape::{numel, Shape, Strides};

/// Per-operand element offsets, one entry per operand.
pub type Offsets = SmallVec<[isize; 4]>;

/// Odometer over a shape of any rank that tracks one element offset per
/// operand. The last dimension advances fastest.
#[derive(Debug, Clone)]
pub struct StridedCursor {
    shape: Shape,
    strides: SmallVec<[Strides; 4]>,
    index: Shape,
    offsets: Offsets,
    remaining: usize,
}

impl StridedCursor {
    /// Creates a cursor positioned at the first element.
    ///
    /// `strides[k]` and `base[k]` are the strides and starting offset of
    /// operand `k`; every stride list has the rank of `shape`.
    #[must_use]
    pub fn new(shape: &[usize], strides: &[&[isize]], base: &[isize]) -> Self {
        debug_assert_eq!(strides.len(), base.len());
        debug_assert!(strides.iter().all(|s| s.len() == shape.len()));

        Self {
            shape: Shape::from_slice(shape),
            strides: strides.iter().map(|s| Strides::from_slice(s)).collect(),
            index: smallvec::smallvec![0; shape.len()],
            offsets: Offsets::from_slice(base),
            remaining: numel(shape),
        }
    }

    /// Number of positions not yet visited, including the current one.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.remaining
    }

    /// Offsets of every operand at the current position.
    #[must_use]
    pub fn offsets(&self) -> &[isize] {
        &self.offsets
    }

    /// Moves to the next position. Returns false once every position has
    /// been visited.
    pub fn advance(&mut self) -> bool {
        if self.remaining <= 1 {
            self.remaining = 0;
            return false;
        }
        self.remaining -= 1;

        for d in (0..self.shape.len()).rev() {
            self.index[d] += 1;
            for (offset, strides) in self.offsets.iter_mut().zip(&self.strides) {
                *offset += strides[d];
            }
            if self.index[d] < self.shape[d] {
                return true;
            }
            let extent = self.shape[d] as isize;
            for (offset, strides) in self.offsets.iter_mut().zip(&self.strides) {
                *offset -= strides[d] * extent;
            }
            self.index[d] = 0;
        }
        true
    }

    /// Calls `f` with the offsets of every position, in order.
    pub fn for_each<F: FnMut(&[isize])>(mut self, mut f: F) {
        if self.remaining == 0 {
            return;
        }
        loop {
            f(&self.offsets);
            if !self.advance() {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(cursor: StridedCursor) -> Vec<Vec<isize>> {
        let mut seen = Vec::new();
        cursor.for_each(|o| seen.push(o.to_vec()));
        seen
    }

    #[test]
    fn test_row_major_walk() {
        let cursor = StridedCursor::new(&[2, 3], &[&[3, 1]], &[0]);
        let seen: Vec<isize> = collect(cursor).into_iter().map(|o| o[0]).collect();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_broadcast_and_transposed_operands() {
        // Operand 0 repeats its row, operand 1 is a transposed 3x2 buffer.
        let cursor = StridedCursor::new(&[2, 3], &[&[0, 1], &[1, 2]], &[10, 0]);
        let seen = collect(cursor);
        assert_eq!(
            seen,
            vec![
                vec![10, 0],
                vec![11, 2],
                vec![12, 4],
                vec![10, 1],
                vec![11, 3],
                vec![12, 5],
            ]
        );
    }

    #[test]
    fn test_scalar_and_empty_shapes() {
        assert_eq!(collect(StridedCursor::new(&[], &[&[]], &[7])), vec![vec![7]]);
        assert!(collect(StridedCursor::new(&[3, 0], &[&[1, 1]], &[0])).is_empty());
    }

    #[test]
    fn test_negative_strides() {
        let cursor = StridedCursor::new(&[3], &[&[-1]], &[2]);
        let seen: Vec<isize> = collect(cursor).into_iter().map(|o| o[0]).collect();
        assert_eq!(seen, vec![2, 1, 0]);
    }
}
