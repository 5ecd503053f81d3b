//! Tessera Tensor - Broadcasting Elementwise Iteration
//!
//! This crate provides the strided `Tensor` operand and the machinery that
//! applies an elementwise operation to tensors of different shapes, strides
//! and kinds: broadcasting, kind promotion, overlap checks, output
//! allocation and dimension reordering are all settled by the iterator
//! builder, and the resulting plan is handed to the kernel registered for
//! its device type.
//!
//! # Key Features
//! - NumPy-style broadcasting with stride-0 expansion
//! - Kind resolution with wrapped-number priority and casting policies
//! - Conservative overlap checks with scratch outputs on partial aliasing
//! - Dimension reordering and coalescing for memory-order traversal
//! - Sealed per-operation, per-device kernel table
//!
//! # Example
//! ```rust
//! use tessera_tensor::{ScalarKind, Tensor};
//!
//! let a = Tensor::from_vec(vec![1i32, 2, 3], &[3, 1]).unwrap();
//! let b = Tensor::from_vec(vec![0.5f32, 1.5], &[2]).unwrap();
//!
//! let c = a.mul(&b).unwrap();
//! assert_eq!(c.kind(), ScalarKind::Float);
//! assert_eq!(c.shape(), &[3, 2]);
//!
//! let d = c.add_scalar(1).unwrap();
//! assert_eq!(d.to_vec::<f32>().unwrap(), vec![1.5, 2.5, 2.0, 4.0, 2.5, 5.5]);
//! ```
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// ML/tensor-specific allowances
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::ptr_arg)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::not_unsafe_ptr_arg_deref)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unreadable_literal)]
#![allow(clippy::if_same_then_else)]
#![allow(clippy::needless_range_loop)]
#![allow(clippy::trivially_copy_pass_by_ref)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::unused_self)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::single_match_else)]
#![allow(clippy::fn_params_excessive_bools)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::format_push_string)]
#![allow(clippy::erasing_op)]
#![allow(clippy::type_repetition_in_bounds)]
#![allow(clippy::iter_without_into_iter)]
#![allow(clippy::should_implement_trait)]
#![allow(clippy::use_debug)]
#![allow(clippy::case_sensitive_file_extension_comparisons)]
#![allow(clippy::large_enum_variant)]
#![allow(clippy::panic)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::assigning_clones)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::explicit_iter_loop)]
#![allow(clippy::default_trait_access)]
#![allow(clippy::only_used_in_recursion)]
#![allow(clippy::manual_clamp)]
#![allow(clippy::ref_option)]
#![allow(clippy::multiple_bound_locations)]
#![allow(clippy::comparison_chain)]
#![allow(clippy::manual_assert)]
#![allow(clippy::unnecessary_debug_formatting)]

// =============================================================================
// Modules
// =============================================================================

pub mod creation;
pub mod dispatch;
pub mod iterator;
pub mod kernels;
pub mod ops;
pub mod overlap;
pub mod shape;
pub mod tensor;

// =============================================================================
// Re-exports
// =============================================================================

pub use creation::*;
pub use dispatch::{DispatchTable, Kernel, OpId};
pub use iterator::{
    build, build_binary_iterator, build_unary_iterator, IterConfig, IterationPlan,
    TensorIteratorBuilder,
};
pub use overlap::{has_internal_overlap, may_overlap, MemOverlap, OverlapStatus};
pub use shape::{broadcast_shapes, maybe_wrap_dim, MemoryFormat, Shape, Strides};
pub use tensor::Tensor;
pub use tessera_core::{
    f16, promote_types, CastingPolicy, Device, DeviceType, Element, Error, ErrorKind, Result,
    ScalarKind, ScalarValue,
};

// =============================================================================
// Prelude
// =============================================================================

/// Convenient imports for common usage.
pub mod prelude {
    pub use crate::iterator::{build_binary_iterator, IterConfig, IterationPlan};
    pub use crate::shape::{Shape, Strides};
    pub use crate::tensor::Tensor;
    pub use crate::{empty, full, scalar_tensor, zeros};
    pub use tessera_core::{Device, Error, Result, ScalarKind, ScalarValue};
}
