//! Storage - Kind-Erased Memory Behind Operands
//!
//! Storage owns one reference-counted byte allocation on a device. Operands
//! are views (kind, shape, strides, element offset) over a storage, so many
//! views may share one allocation. The iterator builder compares storages by
//! identity and byte range to detect aliasing.
//!
//! The buffer is held as 8-byte words so that every supported element type
//! can be viewed in place through `bytemuck`.
//!
//! # Example
//! ```rust
//! use tessera_core::{Device, Storage};
//!
//! let storage = Storage::from_elements(&[1.0f32, 2.0, 3.0], Device::Cpu);
//! assert_eq!(storage.nbytes(), 12);
//! assert_eq!(storage.read().typed::<f32>(), &[1.0, 2.0, 3.0]);
//! ```
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use core::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::device::Device;
use crate::dtype::Element;
use crate::error::{Error, Result};

const WORD: usize = core::mem::size_of::<u64>();

// =============================================================================
// Storage Struct
// =============================================================================

/// Reference-counted, kind-erased memory for tensor data.
///
/// Cloning a `Storage` shares the allocation; use `deep_copy` for a new one.
#[derive(Debug)]
pub struct Storage {
    inner: Arc<RwLock<StorageInner>>,
}

#[derive(Debug)]
struct StorageInner {
    words: Vec<u64>,
    nbytes: usize,
    device: Device,
}

impl StorageInner {
    fn bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<u64, u8>(&self.words)[..self.nbytes]
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        let nbytes = self.nbytes;
        &mut bytemuck::cast_slice_mut::<u64, u8>(&mut self.words)[..nbytes]
    }

    fn typed<T: Element>(&self) -> &[T] {
        let len = self.nbytes / core::mem::size_of::<T>();
        &bytemuck::cast_slice::<u64, T>(&self.words)[..len]
    }

    fn typed_mut<T: Element>(&mut self) -> &mut [T] {
        let len = self.nbytes / core::mem::size_of::<T>();
        &mut bytemuck::cast_slice_mut::<u64, T>(&mut self.words)[..len]
    }
}

impl Storage {
    /// Creates zero-filled storage of `nbytes` bytes.
    #[must_use]
    pub fn zeros(nbytes: usize, device: Device) -> Self {
        let words = vec![0u64; nbytes.div_ceil(WORD)];
        Self {
            inner: Arc::new(RwLock::new(StorageInner {
                words,
                nbytes,
                device,
            })),
        }
    }

    /// Creates zero-filled storage, reporting allocation failure instead of
    /// aborting.
    pub fn try_zeros(nbytes: usize, device: Device) -> Result<Self> {
        let count = nbytes.div_ceil(WORD);
        let mut words = Vec::new();
        words
            .try_reserve_exact(count)
            .map_err(|_| Error::AllocationFailed {
                size: nbytes,
                device,
            })?;
        words.resize(count, 0u64);
        Ok(Self {
            inner: Arc::new(RwLock::new(StorageInner {
                words,
                nbytes,
                device,
            })),
        })
    }

    /// Creates storage holding a copy of `data`.
    #[must_use]
    pub fn from_elements<T: Element>(data: &[T], device: Device) -> Self {
        let storage = Self::zeros(core::mem::size_of_val(data), device);
        storage.write().typed_mut::<T>().copy_from_slice(data);
        storage
    }

    /// Returns the size of the allocation in bytes.
    #[must_use]
    pub fn nbytes(&self) -> usize {
        self.inner.read_recursive().nbytes
    }

    /// Returns the device this storage is on.
    #[must_use]
    pub fn device(&self) -> Device {
        self.inner.read_recursive().device
    }

    /// Returns an identifier unique among live allocations.
    #[must_use]
    pub fn id(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    /// Returns true if both handles refer to the same allocation.
    #[must_use]
    pub fn same_allocation(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Returns true if this storage is uniquely owned (not shared).
    #[must_use]
    pub fn is_unique(&self) -> bool {
        Arc::strong_count(&self.inner) == 1
    }

    /// Locks the storage for reading.
    ///
    /// Read locks are recursive, so one thread may hold several at once.
    #[must_use]
    pub fn read(&self) -> StorageReadGuard<'_> {
        StorageReadGuard {
            guard: self.inner.read_recursive(),
        }
    }

    /// Locks the storage for writing.
    ///
    /// Must not be called while the same thread holds a read guard on this
    /// storage.
    #[must_use]
    pub fn write(&self) -> StorageWriteGuard<'_> {
        StorageWriteGuard {
            guard: self.inner.write(),
        }
    }

    /// Makes a deep copy of this storage.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        let guard = self.inner.read_recursive();
        Self {
            inner: Arc::new(RwLock::new(StorageInner {
                words: guard.words.clone(),
                nbytes: guard.nbytes,
                device: guard.device,
            })),
        }
    }
}

impl Clone for Storage {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

// =============================================================================
// Guard Types for Safe Access
// =============================================================================

/// Read guard over the bytes of a storage.
pub struct StorageReadGuard<'a> {
    guard: RwLockReadGuard<'a, StorageInner>,
}

impl StorageReadGuard<'_> {
    /// Views the whole allocation as elements of type `T`.
    #[must_use]
    pub fn typed<T: Element>(&self) -> &[T] {
        self.guard.typed()
    }
}

impl Deref for StorageReadGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.guard.bytes()
    }
}

/// Write guard over the bytes of a storage.
pub struct StorageWriteGuard<'a> {
    guard: RwLockWriteGuard<'a, StorageInner>,
}

impl StorageWriteGuard<'_> {
    /// Views the whole allocation as elements of type `T`.
    #[must_use]
    pub fn typed<T: Element>(&self) -> &[T] {
        self.guard.typed()
    }

    /// Views the whole allocation as mutable elements of type `T`.
    pub fn typed_mut<T: Element>(&mut self) -> &mut [T] {
        self.guard.typed_mut()
    }
}

impl Deref for StorageWriteGuard<'_> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.guard.bytes()
    }
}

impl DerefMut for StorageWriteGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.guard.bytes_mut()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;

    #[test]
    fn test_storage_zeros() {
        let storage = Storage::zeros(10, Device::Cpu);
        assert_eq!(storage.nbytes(), 10);
        assert!(storage.read().iter().all(|&b| b == 0));
        assert_eq!(storage.read().typed::<i16>().len(), 5);
    }

    #[test]
    fn test_storage_from_elements() {
        let storage = Storage::from_elements(&[1i64, -2, 3], Device::Cpu);
        assert_eq!(storage.nbytes(), 24);
        assert_eq!(storage.read().typed::<i64>(), &[1, -2, 3]);
    }

    #[test]
    fn test_storage_half_view() {
        let data = [f16::from_f32(0.5), f16::from_f32(-1.0), f16::from_f32(2.0)];
        let storage = Storage::from_elements(&data, Device::Cpu);
        assert_eq!(storage.nbytes(), 6);
        assert_eq!(storage.read().typed::<f16>(), &data);
    }

    #[test]
    fn test_storage_clone_shares() {
        let storage1 = Storage::zeros(16, Device::Cpu);
        let storage2 = storage1.clone();

        assert!(storage1.same_allocation(&storage2));
        assert_eq!(storage1.id(), storage2.id());
        assert!(!storage1.is_unique());
    }

    #[test]
    fn test_storage_deep_copy() {
        let storage1 = Storage::from_elements(&[1.0f32, 2.0, 3.0], Device::Cpu);
        let storage2 = storage1.deep_copy();

        assert!(storage1.is_unique());
        assert!(!storage1.same_allocation(&storage2));

        storage2.write().typed_mut::<f32>()[0] = 99.0;
        assert_eq!(storage1.read().typed::<f32>()[0], 1.0);
    }

    #[test]
    fn test_try_zeros_reports_failure() {
        let storage = Storage::try_zeros(3, Device::Cpu).unwrap();
        assert_eq!(storage.nbytes(), 3);

        let err = Storage::try_zeros(usize::MAX, Device::Cpu).unwrap_err();
        assert!(matches!(err, Error::AllocationFailed { .. }));
    }

    #[test]
    fn test_nested_reads() {
        let storage = Storage::from_elements(&[7u8; 4], Device::Cpu);
        let a = storage.read();
        let b = storage.read();
        assert_eq!(a[0], b[3]);
    }
}
