//! Dispatch Table - Kernel Registry per Operation and Device Type
//!
//! Backends register one kernel per `(operation, device type)` pair while
//! the table is open. The first lookup seals the table: later registrations
//! fail with `RegistrySealed`, and lookups read an immutable map without
//! taking a lock.
//!
//! A missing kernel at dispatch time is a packaging defect and panics.
//!
//! # Example
//! ```rust
//! use tessera_tensor::dispatch::{DispatchTable, OpId};
//! use tessera_tensor::iterator::build_unary_iterator;
//! use tessera_tensor::{DeviceType, Tensor};
//!
//! const SQUARE: OpId = OpId::new("square");
//!
//! let table = DispatchTable::new();
//! table
//!     .register_fn(SQUARE, DeviceType::Cpu, |plan, _args| {
//!         plan.run_unary::<f32, _>(|x| x * x)
//!     })
//!     .unwrap();
//!
//! let x = Tensor::from_vec(vec![1.0f32, 2.0, 3.0], &[3]).unwrap();
//! let plan = build_unary_iterator(None, &x, false).unwrap();
//! table.dispatch(SQUARE, plan.device_type(), &plan, &[]).unwrap();
//! let y = plan.finalize().unwrap();
//! assert_eq!(y.to_vec::<f32>().unwrap(), vec![1.0, 4.0, 9.0]);
//! ```
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use core::fmt;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::Mutex;

use tessera_core::error::{Error, Result};
use tessera_core::scalar::ScalarValue;
use tessera_core::DeviceType;

use crate::iterator::IterationPlan;
use crate::kernels::cpu::register_cpu_kernels;

// =============================================================================
// Operation Identifiers
// =============================================================================

/// Name of an elementwise operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpId(&'static str);

impl OpId {
    /// Addition with an `alpha` multiplier on the second input.
    pub const ADD: Self = Self("add");
    /// Subtraction with an `alpha` multiplier on the second input.
    pub const SUB: Self = Self("sub");
    /// Multiplication.
    pub const MUL: Self = Self("mul");
    /// Division.
    pub const DIV: Self = Self("div");
    /// Negation.
    pub const NEG: Self = Self("neg");
    /// Absolute value.
    pub const ABS: Self = Self("abs");

    /// Creates an identifier; equal names are the same operation.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// Name of the operation.
    pub const fn name(self) -> &'static str {
        self.0
    }
}

impl fmt::Display for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

// =============================================================================
// Kernels
// =============================================================================

/// A backend implementation of one operation.
pub trait Kernel: Send + Sync {
    /// Device type this kernel runs on.
    fn device_type(&self) -> DeviceType;

    /// Computes the operation into the plan's write target.
    fn invoke(&self, plan: &IterationPlan, args: &[ScalarValue]) -> Result<()>;
}

/// A kernel backed by a function or closure.
pub struct FnKernel<F> {
    device_type: DeviceType,
    f: F,
}

impl<F> FnKernel<F>
where
    F: Fn(&IterationPlan, &[ScalarValue]) -> Result<()> + Send + Sync,
{
    /// Wraps `f` as a kernel for `device_type`.
    pub const fn new(device_type: DeviceType, f: F) -> Self {
        Self { device_type, f }
    }
}

impl<F> Kernel for FnKernel<F>
where
    F: Fn(&IterationPlan, &[ScalarValue]) -> Result<()> + Send + Sync,
{
    fn device_type(&self) -> DeviceType {
        self.device_type
    }

    fn invoke(&self, plan: &IterationPlan, args: &[ScalarValue]) -> Result<()> {
        (self.f)(plan, args)
    }
}

impl<F> fmt::Debug for FnKernel<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnKernel")
            .field("device_type", &self.device_type)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Dispatch Table
// =============================================================================

type KernelMap = HashMap<(OpId, DeviceType), Box<dyn Kernel>>;

#[derive(Default)]
struct Pending {
    kernels: KernelMap,
    sealed: bool,
}

/// Registry of kernels keyed by operation and device type.
#[derive(Default)]
pub struct DispatchTable {
    pending: Mutex<Pending>,
    sealed: OnceLock<KernelMap>,
}

impl DispatchTable {
    /// Creates an empty, open table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `kernel` for `op` on the kernel's device type.
    ///
    /// # Errors
    /// - `DuplicateStub` if the pair already has a kernel
    /// - `RegistrySealed` once the table has served a lookup
    pub fn register<K: Kernel + 'static>(&self, op: OpId, kernel: K) -> Result<()> {
        let device_type = kernel.device_type();
        let mut pending = self.pending.lock();
        if pending.sealed {
            return Err(Error::RegistrySealed {
                op: op.name().to_string(),
            });
        }
        match pending.kernels.entry((op, device_type)) {
            Entry::Occupied(_) => Err(Error::DuplicateStub {
                op: op.name().to_string(),
                device_type,
            }),
            Entry::Vacant(slot) => {
                slot.insert(Box::new(kernel));
                tracing::debug!(%op, %device_type, "registered kernel");
                Ok(())
            }
        }
    }

    /// Registers a function as the kernel for `op` on `device_type`.
    pub fn register_fn<F>(&self, op: OpId, device_type: DeviceType, f: F) -> Result<()>
    where
        F: Fn(&IterationPlan, &[ScalarValue]) -> Result<()> + Send + Sync + 'static,
    {
        self.register(op, FnKernel::new(device_type, f))
    }

    /// Closes the table to registration. Idempotent.
    pub fn seal(&self) {
        self.kernels();
    }

    /// Whether registration is closed.
    pub fn is_sealed(&self) -> bool {
        self.sealed.get().is_some()
    }

    /// Whether a kernel is registered for the pair. Does not seal.
    pub fn contains(&self, op: OpId, device_type: DeviceType) -> bool {
        match self.sealed.get() {
            Some(kernels) => kernels.contains_key(&(op, device_type)),
            None => self.pending.lock().kernels.contains_key(&(op, device_type)),
        }
    }

    /// Number of registered kernels.
    pub fn len(&self) -> usize {
        match self.sealed.get() {
            Some(kernels) => kernels.len(),
            None => self.pending.lock().kernels.len(),
        }
    }

    /// Returns true if no kernel is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Runs the kernel for `op` on `device_type`. Seals the table.
    ///
    /// # Panics
    /// If no kernel is registered for the pair.
    pub fn dispatch(
        &self,
        op: OpId,
        device_type: DeviceType,
        plan: &IterationPlan,
        args: &[ScalarValue],
    ) -> Result<()> {
        let Some(kernel) = self.kernels().get(&(op, device_type)) else {
            panic!("no kernel registered for '{op}' on {device_type}");
        };
        tracing::trace!(%op, %device_type, dtype = %plan.dtype(), "dispatching kernel");
        kernel.invoke(plan, args)
    }

    fn kernels(&self) -> &KernelMap {
        self.sealed.get_or_init(|| {
            let mut pending = self.pending.lock();
            pending.sealed = true;
            let kernels = core::mem::take(&mut pending.kernels);
            tracing::debug!(count = kernels.len(), "sealed dispatch table");
            kernels
        })
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("kernels", &self.len())
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

// =============================================================================
// Global Table
// =============================================================================

static GLOBAL_TABLE: OnceLock<DispatchTable> = OnceLock::new();

/// Returns the process-wide table, creating it with the built-in CPU
/// kernels on first use.
pub fn init() -> &'static DispatchTable {
    GLOBAL_TABLE.get_or_init(|| {
        let table = DispatchTable::new();
        register_cpu_kernels(&table).expect("a new table accepts the built-in kernels");
        table
    })
}

/// Registers a function kernel in the global table.
pub fn register_stub<F>(op: OpId, device_type: DeviceType, f: F) -> Result<()>
where
    F: Fn(&IterationPlan, &[ScalarValue]) -> Result<()> + Send + Sync + 'static,
{
    init().register_fn(op, device_type, f)
}

/// Registers a kernel in the global table.
pub fn register_kernel<K: Kernel + 'static>(op: OpId, kernel: K) -> Result<()> {
    init().register(op, kernel)
}

/// Runs `op` through the global table.
///
/// # Panics
/// If no kernel is registered for `op` on `device_type`.
pub fn dispatch(
    op: OpId,
    device_type: DeviceType,
    plan: &IterationPlan,
    args: &[ScalarValue],
) -> Result<()> {
    init().dispatch(op, device_type, plan, args)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterator::build_unary_iterator;
    use crate::tensor::Tensor;
    use tessera_core::ErrorKind;

    const DOUBLE: OpId = OpId::new("double");

    fn doubling(plan: &IterationPlan, _args: &[ScalarValue]) -> Result<()> {
        plan.run_unary::<i32, _>(|x| x * 2)
    }

    #[test]
    fn test_register_and_dispatch() {
        let table = DispatchTable::new();
        table.register_fn(DOUBLE, DeviceType::Cpu, doubling).unwrap();
        assert!(table.contains(DOUBLE, DeviceType::Cpu));
        assert!(!table.contains(DOUBLE, DeviceType::Cuda));
        assert!(!table.is_sealed());

        let x = Tensor::from_vec(vec![1i32, 2, 3], &[3]).unwrap();
        let plan = build_unary_iterator(None, &x, false).unwrap();
        table
            .dispatch(DOUBLE, DeviceType::Cpu, &plan, &[])
            .unwrap();
        assert!(table.is_sealed());
        assert_eq!(plan.finalize().unwrap().to_vec::<i32>().unwrap(), vec![2, 4, 6]);
    }

    #[test]
    fn test_duplicate_registration() {
        let table = DispatchTable::new();
        table.register_fn(DOUBLE, DeviceType::Cpu, doubling).unwrap();
        let err = table
            .register_fn(DOUBLE, DeviceType::Cpu, doubling)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Dispatch);

        // Another device type is another slot.
        table.register_fn(DOUBLE, DeviceType::Vulkan, doubling).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_sealed_table_rejects_registration() {
        let table = DispatchTable::new();
        table.seal();
        table.seal();
        let err = table
            .register_fn(DOUBLE, DeviceType::Cpu, doubling)
            .unwrap_err();
        assert!(matches!(err, Error::RegistrySealed { .. }));
        assert!(table.is_empty());
    }

    #[test]
    #[should_panic(expected = "no kernel registered for 'double' on cuda")]
    fn test_missing_kernel_panics() {
        let table = DispatchTable::new();
        table.register_fn(DOUBLE, DeviceType::Cpu, doubling).unwrap();
        let x = Tensor::from_vec(vec![1i32], &[1]).unwrap();
        let plan = build_unary_iterator(None, &x, false).unwrap();
        let _ = table.dispatch(DOUBLE, DeviceType::Cuda, &plan, &[]);
    }

    #[test]
    fn test_global_table_has_cpu_kernels() {
        let table = init();
        for op in [OpId::ADD, OpId::SUB, OpId::MUL, OpId::DIV, OpId::NEG, OpId::ABS] {
            assert!(table.contains(op, DeviceType::Cpu), "{op}");
        }
        assert_eq!(OpId::ADD.to_string(), "add");
    }
}
