//! Device Abstraction - Operand Placement Tags
//!
//! Every operand carries the device its storage lives on. The iterator
//! builder uses the device to check that operands agree, and the dispatch
//! table keys kernels by the device's `DeviceType`. Only the host (CPU)
//! has an allocator and kernels in this build; the other variants exist so
//! that placement mismatches and missing registrations can be expressed.
//!
//! # Example
//! ```rust
//! use tessera_core::{Device, DeviceType};
//!
//! let cpu = Device::Cpu;
//! assert!(cpu.is_available());
//! assert_eq!(cpu.device_type(), DeviceType::Cpu);
//! assert_eq!(Device::Cuda(1).to_string(), "cuda:1");
//! ```
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use core::fmt;

// =============================================================================
// Device Type
// =============================================================================

/// Backend family of a device, without its ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeviceType {
    /// Host memory.
    Cpu,
    /// NVIDIA CUDA.
    Cuda,
    /// Vulkan compute.
    Vulkan,
    /// Apple Metal.
    Metal,
    /// WebGPU.
    Wgpu,
}

impl DeviceType {
    /// Returns the lowercase name of this backend family.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
            Self::Vulkan => "vulkan",
            Self::Metal => "metal",
            Self::Wgpu => "wgpu",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Device Enum
// =============================================================================

/// A concrete device an operand is placed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Device {
    /// CPU device (always available).
    #[default]
    Cpu,
    /// CUDA device with index.
    Cuda(usize),
    /// Vulkan device with index.
    Vulkan(usize),
    /// Metal device with index.
    Metal(usize),
    /// WebGPU device with index.
    Wgpu(usize),
}

impl Device {
    /// Returns true if this device can allocate and run kernels.
    #[must_use]
    pub const fn is_available(self) -> bool {
        self.is_cpu()
    }

    /// Returns true if this is a CPU device.
    #[must_use]
    pub const fn is_cpu(self) -> bool {
        matches!(self, Self::Cpu)
    }

    /// Returns the device index for GPU devices, or 0 for CPU.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Cpu => 0,
            Self::Cuda(idx) | Self::Vulkan(idx) | Self::Metal(idx) | Self::Wgpu(idx) => idx,
        }
    }

    /// Returns the backend family of this device.
    #[must_use]
    pub const fn device_type(self) -> DeviceType {
        match self {
            Self::Cpu => DeviceType::Cpu,
            Self::Cuda(_) => DeviceType::Cuda,
            Self::Vulkan(_) => DeviceType::Vulkan,
            Self::Metal(_) => DeviceType::Metal,
            Self::Wgpu(_) => DeviceType::Wgpu,
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            other => write!(f, "{}:{}", other.device_type(), other.index()),
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
    fn test_cpu_device() {
        let device = Device::Cpu;
        assert!(device.is_cpu());
        assert!(device.is_available());
        assert_eq!(device.device_type(), DeviceType::Cpu);
        assert_eq!(device.index(), 0);
    }

    #[test]
    fn test_gpu_devices_unavailable() {
        assert!(!Device::Cuda(0).is_available());
        assert_eq!(Device::Metal(2).device_type(), DeviceType::Metal);
        assert_eq!(Device::Vulkan(3).index(), 3);
    }

    #[test]
    fn test_device_display() {
        assert_eq!(format!("{}", Device::Cpu), "cpu");
        assert_eq!(format!("{}", Device::Wgpu(0)), "wgpu:0");
        assert_eq!(DeviceType::Cuda.to_string(), "cuda");
    }

    #[test]
    fn test_device_default() {
        assert_eq!(Device::default(), Device::Cpu);
    }
}
