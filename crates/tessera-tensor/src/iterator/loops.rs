//! Plan Loops - Running a Closure over an Iteration Plan
//!
//! Kernels call these with the concrete element type of the plan. A plan
//! whose operands form one contiguous run each goes through
//! `CpuBackend::map_nary`, which may split the run across the rayon pool.
//! Anything else walks a `StridedCursor` on the calling thread.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use smallvec::SmallVec;

use tessera_core::backends::cpu::CpuBackend;
use tessera_core::dtype::Element;
use tessera_core::error::{Error, Result};
use tessera_core::storage::StorageReadGuard;

use super::cursor::StridedCursor;
use super::IterationPlan;

impl IterationPlan {
    /// Writes `f(inputs)` to every element of the write target.
    ///
    /// # Errors
    /// - `DTypeMismatch` if `T` is not the plan's kind
    /// - `InvalidOperation` if `N` is not the number of inputs
    ///
    /// # Locking
    /// Read guards on the inputs are taken before the write guard on the
    /// target and held for the whole loop. Two threads whose plans write
    /// each other's inputs (`x.add_(&y)` racing `y.add_(&x)`) can deadlock;
    /// callers must not share a tensor that another thread is writing.
    pub fn run_nary<T, const N: usize, F>(&self, f: F) -> Result<()>
    where
        T: Element,
        F: Fn([T; N]) -> T + Sync + Send,
    {
        self.check_loop::<T>(N)?;
        if self.numel() == 0 {
            return Ok(());
        }

        let target = self.write_target();
        let aliased: [bool; N] = core::array::from_fn(|k| {
            self.input(k)
                .storage()
                .same_allocation(target.storage())
        });

        if self.is_single_run() && !aliased.contains(&true) {
            self.run_contiguous(f);
        } else {
            self.run_strided(&aliased, f);
        }
        Ok(())
    }

    /// Writes `f(x)` for the single input.
    pub fn run_unary<T, F>(&self, f: F) -> Result<()>
    where
        T: Element,
        F: Fn(T) -> T + Sync + Send,
    {
        self.run_nary::<T, 1, _>(move |[a]| f(a))
    }

    /// Writes `f(lhs, rhs)` for the two inputs.
    pub fn run_binary<T, F>(&self, f: F) -> Result<()>
    where
        T: Element,
        F: Fn(T, T) -> T + Sync + Send,
    {
        self.run_nary::<T, 2, _>(move |[a, b]| f(a, b))
    }

    /// Returns true if any element of input `index` is zero.
    pub fn input_contains_zero<T: Element>(&self, index: usize) -> Result<bool> {
        self.check_kind::<T>()?;
        let input = self.inputs().get(index).ok_or(Error::IndexOutOfBounds {
            index,
            size: self.ninputs(),
        })?;
        Ok(CpuBackend::any_zero(&input.gather_as::<T>()))
    }

    fn check_kind<T: Element>(&self) -> Result<()> {
        if T::KIND != self.dtype() {
            return Err(Error::DTypeMismatch {
                expected: self.dtype(),
                actual: T::KIND,
            });
        }
        Ok(())
    }

    fn check_loop<T: Element>(&self, arity: usize) -> Result<()> {
        self.check_kind::<T>()?;
        if arity != self.ninputs() {
            return Err(Error::invalid_operation(format!(
                "loop takes {} inputs but the plan has {}",
                arity,
                self.ninputs()
            )));
        }
        Ok(())
    }

    /// Every operand is one stride-1 run over the coalesced shape.
    fn is_single_run(&self) -> bool {
        match self.iteration_shape().len() {
            0 => true,
            1 => (0..=self.ninputs()).all(|k| self.iteration_strides(k)[0] == 1),
            _ => false,
        }
    }

    fn run_contiguous<T, const N: usize, F>(&self, f: F)
    where
        T: Element,
        F: Fn([T; N]) -> T + Sync + Send,
    {
        let n = self.numel();
        let guards: [StorageReadGuard<'_>; N] =
            core::array::from_fn(|k| self.input(k).storage().read());
        let srcs: [&[T]; N] = core::array::from_fn(|k| {
            let start = self.input(k).offset();
            &guards[k].typed::<T>()[start..start + n]
        });

        let target = self.write_target();
        let start = target.offset();
        let mut out = target.storage().write();
        let dst = &mut out.typed_mut::<T>()[start..start + n];
        CpuBackend::map_nary(dst, srcs, f);
    }

    fn run_strided<T, const N: usize, F>(&self, aliased: &[bool; N], f: F)
    where
        T: Element,
        F: Fn([T; N]) -> T + Sync + Send,
    {
        // Inputs sharing the target's allocation are read through the
        // write guard.
        let guards: SmallVec<[Option<StorageReadGuard<'_>>; 4]> = (0..N)
            .map(|k| (!aliased[k]).then(|| self.input(k).storage().read()))
            .collect();
        let srcs: SmallVec<[Option<&[T]>; 4]> = guards
            .iter()
            .map(|g| g.as_ref().map(|g| g.typed::<T>()))
            .collect();

        let target = self.write_target();
        let strides: SmallVec<[&[isize]; 4]> = (0..=N).map(|k| self.iteration_strides(k)).collect();
        let base: SmallVec<[isize; 4]> = core::iter::once(target.offset() as isize)
            .chain(self.inputs().iter().map(|t| t.offset() as isize))
            .collect();

        let mut guard = target.storage().write();
        let out = guard.typed_mut::<T>();
        StridedCursor::new(self.iteration_shape(), &strides, &base).for_each(|o| {
            let args: [T; N] = core::array::from_fn(|k| {
                let at = o[k + 1] as usize;
                match srcs[k] {
                    Some(src) => src[at],
                    None => out[at],
                }
            });
            out[o[0] as usize] = f(args);
        });
    }
}

// =============================================================================
// Tests
// =============================================================================
