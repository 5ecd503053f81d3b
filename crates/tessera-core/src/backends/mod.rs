//! Backends - Device-Specific Loop Primitives
//!
//! Each backend provides the innermost loops that elementwise kernels run
//! once the iterator has resolved shapes, kinds and strides. Only the CPU
//! backend is compiled into this build.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use crate::device::DeviceType;

// =============================================================================
// Backend Modules
// =============================================================================

pub mod cpu;

// =============================================================================
// Re-exports
// =============================================================================

pub use cpu::CpuBackend;

// =============================================================================
// Backend Trait
// =============================================================================

/// Common trait for all compute backends.
pub trait Backend: Send + Sync {
    /// Returns the name of this backend.
    fn name(&self) -> &'static str;

    /// Returns the device family this backend executes on.
    fn device_type(&self) -> DeviceType;

    /// Returns whether this backend is available on the current system.
    fn is_available(&self) -> bool;
}
