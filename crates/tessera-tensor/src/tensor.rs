//! Tensor - Strided View over Kind-Erased Storage
//!
//! `Tensor` is the operand type of the iteration core: a storage handle
//! plus the runtime element kind, shape, strides (in elements) and element
//! offset describing one logical array. Views share storage, so two
//! tensors may alias; the overlap checker inspects `storage_id` and
//! `byte_range` to decide when that matters.
//!
//! A tensor created from a bare number is flagged as a *wrapped number*.
//! Wrapped numbers take part in kind resolution with lower priority than
//! real tensors.
//!
//! # Example
//! ```rust
//! use tessera_tensor::{ScalarKind, Tensor};
//!
//! let t = Tensor::from_vec(vec![1i32, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
//! assert_eq!(t.kind(), ScalarKind::Int);
//!
//! let col = t.narrow(1, 1, 1).unwrap();
//! assert_eq!(col.to_vec::<i32>().unwrap(), vec![2, 5]);
//!
//! let tt = t.transpose(0, 1).unwrap();
//! assert_eq!(tt.to_vec::<i32>().unwrap(), vec![1, 4, 2, 5, 3, 6]);
//! ```
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use core::fmt;
use core::ops::Range;

use tessera_core::dispatch_kind;
use tessera_core::dtype::{Element, ScalarKind};
use tessera_core::error::{Error, Result};
use tessera_core::storage::Storage;
use tessera_core::Device;

use crate::iterator::cursor::StridedCursor;
use crate::shape::{
    broadcast_shape, broadcast_strides, checked_numel, contiguous_strides, dim_list_to_bitset,
    is_contiguous, maybe_wrap_dim, numel, Shape, Strides,
};

// =============================================================================
// Tensor Struct
// =============================================================================

/// A strided, kind-tagged view over shared storage.
#[derive(Clone)]
pub struct Tensor {
    /// Underlying data storage (reference-counted).
    pub(crate) storage: Storage,
    /// Element kind of the view.
    pub(crate) kind: ScalarKind,
    /// Shape of the tensor (dimensions).
    pub(crate) shape: Shape,
    /// Strides for each dimension, in elements.
    pub(crate) strides: Strides,
    /// Offset of the first element, in elements.
    pub(crate) offset: usize,
    /// Whether this tensor was created from a bare number.
    pub(crate) wrapped_number: bool,
}

impl Tensor {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Creates a view over existing storage.
    ///
    /// # Errors
    /// - `UndefinedKind` for `ScalarKind::Undefined`
    /// - `InvalidOperation` if `shape` and `strides` differ in rank
    /// - `IndexOutOfBounds` if the view reaches outside the storage
    pub fn from_storage(
        storage: Storage,
        kind: ScalarKind,
        shape: &[usize],
        strides: &[isize],
        offset: usize,
    ) -> Result<Self> {
        if !kind.is_defined() {
            return Err(Error::UndefinedKind);
        }
        Self::checked_view(storage, kind, shape, strides, offset as isize, false)
    }

    /// Creates a contiguous tensor that takes ownership of `data`.
    pub fn from_vec<T: Element>(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        Self::from_slice(&data, shape)
    }

    /// Creates a contiguous tensor holding a copy of `data`.
    pub fn from_slice<T: Element>(data: &[T], shape: &[usize]) -> Result<Self> {
        if checked_numel(shape) != Some(data.len()) {
            return Err(Error::shape_mismatch(&[data.len()], shape));
        }
        Ok(Self {
            storage: Storage::from_elements(data, Device::Cpu),
            kind: T::KIND,
            shape: Shape::from_slice(shape),
            strides: contiguous_strides(shape)?,
            offset: 0,
            wrapped_number: false,
        })
    }

    /// Creates a 0-dimensional tensor.
    #[must_use]
    pub fn scalar<T: Element>(value: T) -> Self {
        Self {
            storage: Storage::from_elements(&[value], Device::Cpu),
            kind: T::KIND,
            shape: Shape::new(),
            strides: Strides::new(),
            offset: 0,
            wrapped_number: false,
        }
    }

    /// Returns a view with new geometry over the same storage.
    pub fn as_strided(&self, shape: &[usize], strides: &[isize], offset: usize) -> Result<Self> {
        Self::checked_view(
            self.storage.clone(),
            self.kind,
            shape,
            strides,
            offset as isize,
            false,
        )
    }

    fn checked_view(
        storage: Storage,
        kind: ScalarKind,
        shape: &[usize],
        strides: &[isize],
        offset: isize,
        wrapped_number: bool,
    ) -> Result<Self> {
        if shape.len() != strides.len() {
            return Err(Error::invalid_operation(format!(
                "shape {shape:?} and strides {strides:?} differ in rank"
            )));
        }

        let capacity = storage.nbytes() / kind.size_of();
        if checked_numel(shape).is_none() {
            return Err(Error::IndexOutOfBounds {
                index: usize::MAX,
                size: capacity,
            });
        }
        if let Some((lo, hi)) = element_span(shape, strides, offset, capacity)? {
            if lo < 0 || hi >= capacity as isize {
                return Err(Error::IndexOutOfBounds {
                    index: if lo < 0 { 0 } else { hi as usize },
                    size: capacity,
                });
            }
        } else if offset < 0 || offset as usize > capacity {
            return Err(Error::IndexOutOfBounds {
                index: offset.max(0) as usize,
                size: capacity,
            });
        }

        Ok(Self {
            storage,
            kind,
            shape: Shape::from_slice(shape),
            strides: Strides::from_slice(strides),
            offset: offset as usize,
            wrapped_number,
        })
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the element kind.
    #[must_use]
    pub const fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// Returns the shape of the tensor.
    #[must_use]
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Returns the strides of the tensor, in elements.
    #[must_use]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }

    /// Returns the offset of the first element, in elements.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the number of dimensions.
    #[must_use]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Returns the total number of elements.
    #[must_use]
    pub fn numel(&self) -> usize {
        numel(&self.shape)
    }

    /// Returns true if the tensor has zero elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numel() == 0
    }

    /// Returns the size of one element in bytes.
    #[must_use]
    pub const fn element_size(&self) -> usize {
        self.kind.size_of()
    }

    /// Returns the size of a specific dimension (supports negative indexing).
    pub fn size(&self, dim: i64) -> Result<usize> {
        if self.shape.is_empty() {
            return Err(Error::InvalidDimension { index: dim, ndim: 0 });
        }
        let idx = maybe_wrap_dim(dim, self.ndim())?;
        Ok(self.shape[idx])
    }

    /// Returns the device this tensor is on.
    #[must_use]
    pub fn device(&self) -> Device {
        self.storage.device()
    }

    /// Returns the underlying storage.
    #[must_use]
    pub const fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Returns an identifier of the underlying allocation.
    #[must_use]
    pub fn storage_id(&self) -> usize {
        self.storage.id()
    }

    /// Returns true if the tensor is row-major contiguous.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        is_contiguous(&self.shape, &self.strides)
    }

    /// Returns true if this tensor is 0-dimensional.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// Returns true if this tensor was created from a bare number.
    #[must_use]
    pub const fn is_wrapped_number(&self) -> bool {
        self.wrapped_number
    }

    /// Marks a 0-dimensional tensor as a wrapped number.
    #[must_use]
    pub fn into_wrapped_number(mut self) -> Self {
        debug_assert!(self.is_scalar());
        self.wrapped_number = self.is_scalar();
        self
    }

    /// Byte range of the storage this view can touch.
    ///
    /// An empty view reports an empty range at its offset.
    #[must_use]
    pub fn byte_range(&self) -> Range<usize> {
        let size = self.element_size();
        match element_span(&self.shape, &self.strides, self.offset as isize) {
            Some((lo, hi)) => (lo as usize * size)..((hi as usize + 1) * size),
            None => {
                let start = self.offset * size;
                start..start
            }
        }
    }

    // =========================================================================
    // Views
    // =========================================================================

    /// Restricts dimension `dim` to `length` entries starting at `start`.
    pub fn narrow(&self, dim: i64, start: usize, length: usize) -> Result<Self> {
        if self.is_scalar() {
            return Err(Error::invalid_operation("narrow() cannot be applied to a 0-dim tensor"));
        }
        let d = maybe_wrap_dim(dim, self.ndim())?;
        let end = start.checked_add(length).unwrap_or(usize::MAX);
        if end > self.shape[d] {
            return Err(Error::IndexOutOfBounds {
                index: end,
                size: self.shape[d],
            });
        }

        let mut shape = self.shape.clone();
        shape[d] = length;
        let offset = if length == 0 {
            self.offset as isize
        } else {
            self.offset as isize + start as isize * self.strides[d]
        };
        Self::checked_view(
            self.storage.clone(),
            self.kind,
            &shape,
            &self.strides,
            offset,
            false,
        )
    }

    /// Swaps two dimensions.
    pub fn transpose(&self, dim0: i64, dim1: i64) -> Result<Self> {
        let d0 = maybe_wrap_dim(dim0, self.ndim())?;
        let d1 = maybe_wrap_dim(dim1, self.ndim())?;

        let mut out = self.clone();
        out.wrapped_number = false;
        if !self.is_scalar() {
            out.shape.swap(d0, d1);
            out.strides.swap(d0, d1);
        }
        Ok(out)
    }

    /// Reorders dimensions; `dims[i]` names the source of output dim `i`.
    pub fn permute(&self, dims: &[i64]) -> Result<Self> {
        if dims.len() != self.ndim() {
            return Err(Error::invalid_operation(format!(
                "permute: expected {} dimensions, got {}",
                self.ndim(),
                dims.len()
            )));
        }
        dim_list_to_bitset(dims, self.ndim())?;

        let mut shape = Shape::with_capacity(dims.len());
        let mut strides = Strides::with_capacity(dims.len());
        for &dim in dims {
            let d = maybe_wrap_dim(dim, self.ndim())?;
            shape.push(self.shape[d]);
            strides.push(self.strides[d]);
        }

        let mut out = self.clone();
        out.wrapped_number = false;
        out.shape = shape;
        out.strides = strides;
        Ok(out)
    }

    /// Broadcasts this view to `shape` without copying.
    ///
    /// # Errors
    /// `BroadcastError` or `ShapeMismatch` if `shape` is not a valid
    /// broadcast target for this tensor.
    pub fn expand(&self, shape: &[usize]) -> Result<Self> {
        let target = broadcast_shape(&self.shape, shape)?;
        if target.as_slice() != shape {
            return Err(Error::shape_mismatch(shape, &target));
        }

        let mut out = self.clone();
        out.wrapped_number = false;
        out.strides = broadcast_strides(&self.shape, &self.strides, shape);
        out.shape = target;
        Ok(out)
    }

    // =========================================================================
    // Data Access
    // =========================================================================

    /// Copies the elements into a vector in row-major order.
    ///
    /// # Errors
    /// `DTypeMismatch` if `T` is not the element type of this tensor.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        if T::KIND != self.kind {
            return Err(Error::DTypeMismatch {
                expected: self.kind,
                actual: T::KIND,
            });
        }
        Ok(self.gather_as::<T>())
    }

    /// Returns the single element of a one-element tensor.
    pub fn item<T: Element>(&self) -> Result<T> {
        if self.numel() != 1 {
            return Err(Error::invalid_operation(format!(
                "item() requires exactly one element, got {}",
                self.numel()
            )));
        }
        let values = self.to_vec::<T>()?;
        Ok(values[0])
    }

    /// Reads every element, converting to `D`, in row-major order.
    pub(crate) fn gather_as<D: Element>(&self) -> Vec<D> {
        let mut out = Vec::with_capacity(self.numel());
        let kind = self.kind;
        dispatch_kind!(kind, S => {
            let guard = self.storage.read();
            let data = guard.typed::<S>();
            StridedCursor::new(&self.shape, &[&self.strides], &[self.offset as isize])
                .for_each(|o| out.push(data[o[0] as usize].cast::<D>()));
        }, _ => {});
        out
    }

    /// Writes `values` (row-major order) into the elements of this view.
    pub(crate) fn scatter<D: Element>(&self, values: &[D]) -> Result<()> {
        if D::KIND != self.kind {
            return Err(Error::DTypeMismatch {
                expected: self.kind,
                actual: D::KIND,
            });
        }
        if values.len() != self.numel() {
            return Err(Error::shape_mismatch(&[self.numel()], &[values.len()]));
        }

        let mut guard = self.storage.write();
        let data = guard.typed_mut::<D>();
        let mut next = values.iter();
        StridedCursor::new(&self.shape, &[&self.strides], &[self.offset as isize]).for_each(|o| {
            if let Some(&v) = next.next() {
                data[o[0] as usize] = v;
            }
        });
        Ok(())
    }

    /// Copies `src` into this view, broadcasting and converting as needed.
    ///
    /// All of `src` is read before anything is written, so `src` may alias
    /// this tensor.
    pub fn copy_from(&self, src: &Tensor) -> Result<()> {
        let src = src.expand(&self.shape)?;
        let kind = self.kind;
        dispatch_kind!(kind, D => {
            let values = src.gather_as::<D>();
            self.scatter(&values)
        }, _ => Err(Error::UndefinedKind))
    }

    /// Returns a copy with elements converted to `kind`.
    pub fn to_kind(&self, kind: ScalarKind) -> Result<Self> {
        if kind == self.kind {
            return Ok(self.clone());
        }
        let out = crate::creation::empty(&self.shape, kind, self.device())?;
        out.copy_from(self)?;
        Ok(out)
    }

    /// Returns a row-major contiguous tensor with the same values.
    pub fn contiguous(&self) -> Result<Self> {
        if self.is_contiguous() {
            return Ok(self.clone());
        }
        let out = crate::creation::empty(&self.shape, self.kind, self.device())?;
        out.copy_from(self)?;
        Ok(out)
    }
}

/// Lowest and highest element offsets a non-empty view touches.
///
/// Returns `Ok(None)` for an empty view and `IndexOutOfBounds` when the
/// span does not fit in an `isize`.
fn element_span(
    shape: &[usize],
    strides: &[isize],
    offset: isize,
    capacity: usize,
) -> Result<Option<(isize, isize)>> {
    if shape.contains(&0) {
        return Ok(None);
    }
    let overflow = || Error::IndexOutOfBounds {
        index: usize::MAX,
        size: capacity,
    };

    let (mut lo, mut hi) = (offset, offset);
    for (&dim, &stride) in shape.iter().zip(strides) {
        let reach = isize::try_from(dim - 1)
            .ok()
            .and_then(|last| last.checked_mul(stride))
            .ok_or_else(overflow)?;
        if reach < 0 {
            lo = lo.checked_add(reach).ok_or_else(overflow)?;
        } else {
            hi = hi.checked_add(reach).ok_or_else(overflow)?;
        }
    }
    Ok(Some((lo, hi)))
}

// =============================================================================
// Debug Implementation
// =============================================================================

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tensor")
            .field("kind", &self.kind)
            .field("shape", &self.shape.as_slice())
            .field("strides", &self.strides.as_slice())
            .field("offset", &self.offset)
            .field("device", &self.device())
            .field("wrapped_number", &self.wrapped_number)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
