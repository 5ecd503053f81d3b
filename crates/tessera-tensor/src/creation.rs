//! Tensor Creation Functions
//!
//! Allocation entry points used by callers and by the iterator builder when
//! it materializes outputs and scratch buffers. Memory always comes from the
//! allocator registered for the target device.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use tessera_core::allocator::allocator_for;
use tessera_core::dtype::{Element, ScalarKind};
use tessera_core::error::{Error, Result};
use tessera_core::scalar::ScalarValue;
use tessera_core::Device;

use crate::shape::{checked_numel, checked_stride_span, strides_for_format, MemoryFormat, Shape};
use crate::tensor::Tensor;

// =============================================================================
// Uninitialized Allocation
// =============================================================================

/// Allocates a row-major tensor. Contents are zeroed by the allocator.
pub fn empty(shape: &[usize], kind: ScalarKind, device: Device) -> Result<Tensor> {
    empty_with_format(shape, kind, MemoryFormat::Contiguous, device)
}

/// Allocates a dense tensor laid out in `format`.
///
/// # Errors
/// - `UndefinedKind` for `ScalarKind::Undefined`
/// - `AllocationFailed` if the byte size overflows or memory is exhausted
/// - `DeviceNotAvailable` if no allocator serves `device`
/// - `InvalidOperation` if `format` does not apply to the rank of `shape`
pub fn empty_with_format(
    shape: &[usize],
    kind: ScalarKind,
    format: MemoryFormat,
    device: Device,
) -> Result<Tensor> {
    if !kind.is_defined() {
        return Err(Error::UndefinedKind);
    }

    let nbytes = checked_numel(shape)
        .and_then(|n| n.checked_mul(kind.size_of()))
        .filter(|_| checked_stride_span(shape).is_some())
        .ok_or(Error::AllocationFailed {
            size: usize::MAX,
            device,
        })?;
    let strides = strides_for_format(shape, format)?;
    let storage = allocator_for(device)?.allocate(nbytes)?;

    tracing::debug!(?shape, %kind, ?format, %device, nbytes, "allocated tensor");

    Ok(Tensor {
        storage,
        kind,
        shape: Shape::from_slice(shape),
        strides,
        offset: 0,
        wrapped_number: false,
    })
}

/// Allocates a tensor with the shape, kind and device of `other`.
pub fn empty_like(other: &Tensor) -> Result<Tensor> {
    empty(other.shape(), other.kind(), other.device())
}

// =============================================================================
// Initialized Allocation
// =============================================================================

/// Creates a CPU tensor filled with zeros.
pub fn zeros(shape: &[usize], kind: ScalarKind) -> Result<Tensor> {
    empty(shape, kind, Device::Cpu)
}

/// Creates a CPU tensor filled with `value`.
pub fn full<T: Element>(shape: &[usize], value: T) -> Result<Tensor> {
    let count = checked_numel(shape).ok_or(Error::AllocationFailed {
        size: usize::MAX,
        device: Device::Cpu,
    })?;
    Tensor::from_vec(vec![value; count], shape)
}

/// Wraps a bare number as a 0-dimensional tensor.
///
/// Integral values become `Long`, floating values `Double`. The result is
/// flagged as a wrapped number, so it does not widen the kind of the
/// tensors it is combined with.
#[must_use]
pub fn scalar_tensor(value: impl Into<ScalarValue>) -> Tensor {
    match value.into() {
        ScalarValue::Int(v) => Tensor::scalar(v),
        ScalarValue::Float(v) => Tensor::scalar(v),
    }
    .into_wrapped_number()
}

// =============================================================================
// Tests
// =============================================================================
