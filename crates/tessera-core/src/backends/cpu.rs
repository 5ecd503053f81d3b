//! CPU Backend - Host Memory Loops
//!
//! Contiguous elementwise loops over host slices. A loop whose output holds
//! at least `config::parallel_threshold()` elements is split across the rayon
//! pool; every worker writes only its own output elements.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use rayon::prelude::*;

use super::Backend;
use crate::config::parallel_threshold;
use crate::device::DeviceType;
use crate::dtype::Element;

// =============================================================================
// CPU Backend Struct
// =============================================================================

/// CPU backend for elementwise loops.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuBackend;

impl CpuBackend {
    /// Creates a new CPU backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Backend for CpuBackend {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn device_type(&self) -> DeviceType {
        DeviceType::Cpu
    }

    fn is_available(&self) -> bool {
        true
    }
}

// =============================================================================
// Element-wise Operations
// =============================================================================

impl CpuBackend {
    /// Applies `f` to the `N` source elements at each position of `dst`.
    pub fn map_nary<T, const N: usize, F>(dst: &mut [T], srcs: [&[T]; N], f: F)
    where
        T: Element,
        F: Fn([T; N]) -> T + Sync + Send,
    {
        debug_assert!(srcs.iter().all(|s| s.len() == dst.len()));

        if dst.len() >= parallel_threshold() {
            dst.par_iter_mut().enumerate().for_each(|(i, d)| {
                *d = f(core::array::from_fn(|k| srcs[k][i]));
            });
        } else {
            for (i, d) in dst.iter_mut().enumerate() {
                *d = f(core::array::from_fn(|k| srcs[k][i]));
            }
        }
    }

    /// Returns true if any element equals zero.
    pub fn any_zero<T: Element>(a: &[T]) -> bool {
        if a.len() >= parallel_threshold() {
            a.par_iter().any(|v| v.is_zero())
        } else {
            a.iter().any(|v| v.is_zero())
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_identity() {
        let cpu = CpuBackend::new();
        assert_eq!(cpu.name(), "cpu");
        assert_eq!(cpu.device_type(), DeviceType::Cpu);
        assert!(cpu.is_available());
    }

    #[test]
    fn test_binary_loops() {
        let a = [1.0f32, 2.0, 3.0];
        let b = [4.0f32, 5.0, 6.0];
        let mut dst = [0.0f32; 3];

        CpuBackend::map_nary(&mut dst, [&a[..], &b[..]], |[x, y]| x + y);
        assert_eq!(dst, [5.0, 7.0, 9.0]);

        CpuBackend::map_nary(&mut dst, [&a[..], &b[..]], |[x, y]| x.mul_value(y));
        assert_eq!(dst, [4.0, 10.0, 18.0]);
    }

    #[test]
    fn test_parallel_path_matches_sequential() {
        let n = parallel_threshold() + 17;
        let a: Vec<i32> = (0..n as i32).collect();
        let b: Vec<i32> = (0..n as i32).rev().collect();
        let mut dst = vec![0i32; n];

        CpuBackend::map_nary(&mut dst, [&a[..], &b[..]], |[x, y]| x + y);
        assert!(dst.iter().all(|&v| v == n as i32 - 1));
    }

    #[test]
    fn test_ternary_map() {
        let (a, b, c) = ([1i64, 2], [3i64, 4], [5i64, 6]);
        let mut dst = [0i64; 2];
        CpuBackend::map_nary(&mut dst, [&a[..], &b[..], &c[..]], |[x, y, z]| x * y + z);
        assert_eq!(dst, [8, 14]);
    }

    #[test]
    fn test_unary_and_zero_scan() {
        let a = [1i8, -2, 0];
        let mut dst = [0i8; 3];
        CpuBackend::map_nary(&mut dst, [&a[..]], |[x]| x.neg_value());
        assert_eq!(dst, [-1, 2, 0]);
        assert!(CpuBackend::any_zero(&a));
        assert!(!CpuBackend::any_zero(&[1u8, 2]));
    }
}
