//! Allocator - Storage Allocation Collaborator
//!
//! The iterator builder never creates memory directly. It asks the allocator
//! registered for the output's device. Only the host allocator exists in
//! this build, so any other device reports `DeviceNotAvailable`.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use crate::device::Device;
use crate::error::{Error, Result};
use crate::storage::Storage;

// =============================================================================
// Allocator Trait
// =============================================================================

/// Creates zero-initialized storage on one device.
pub trait Allocator: Send + Sync {
    /// Returns the device this allocator is for.
    fn device(&self) -> Device;

    /// Allocates `nbytes` bytes of zeroed storage.
    fn allocate(&self, nbytes: usize) -> Result<Storage>;
}

// =============================================================================
// Default Allocator
// =============================================================================

/// Default CPU allocator using system memory.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultAllocator;

impl DefaultAllocator {
    /// Creates a new default allocator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Allocator for DefaultAllocator {
    fn device(&self) -> Device {
        Device::Cpu
    }

    fn allocate(&self, nbytes: usize) -> Result<Storage> {
        if nbytes > isize::MAX as usize {
            return Err(Error::AllocationFailed {
                size: nbytes,
                device: Device::Cpu,
            });
        }
        Storage::try_zeros(nbytes, Device::Cpu)
    }
}

static DEFAULT_ALLOCATOR: DefaultAllocator = DefaultAllocator::new();

/// Returns the allocator serving `device`.
pub fn allocator_for(device: Device) -> Result<&'static dyn Allocator> {
    match device {
        Device::Cpu => Ok(&DEFAULT_ALLOCATOR),
        other => Err(Error::DeviceNotAvailable { device: other }),
    }
}

// =============================================================================
// Tests
// =============================================================================
