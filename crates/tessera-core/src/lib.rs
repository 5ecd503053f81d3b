//! Tessera Core - Element Kinds, Storage and Devices
//!
//! This crate provides the leaf abstractions of the tessera elementwise
//! iteration core: the `ScalarKind` enumeration with its promotion table,
//! runtime scalars, device tags, kind-erased reference-counted storage, the
//! allocator collaborator, and the CPU loop primitives kernels are built on.
//!
//! # Key Features
//! - Static 9x9 promotion lattice (`promote_types`)
//! - Casting policies for writes into pre-supplied outputs
//! - `Element` trait and `dispatch_kind!` for monomorphized kernels
//! - Reference-counted storage shared between views
//! - Unified `Error` type with coarse `ErrorKind` categories
//!
//! # Example
//! ```rust
//! use tessera_core::{promote_types, Device, ScalarKind, Storage};
//!
//! let kind = promote_types(ScalarKind::Int, ScalarKind::Float);
//! assert_eq!(kind, ScalarKind::Float);
//!
//! let storage = Storage::zeros(4 * kind.size_of(), Device::Cpu);
//! assert_eq!(storage.nbytes(), 16);
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

pub mod allocator;
pub mod backends;
pub mod config;
pub mod device;
pub mod dtype;
pub mod error;
pub mod scalar;
pub mod storage;

// =============================================================================
// Re-exports
// =============================================================================

pub use allocator::{allocator_for, Allocator, DefaultAllocator};
pub use backends::{Backend, CpuBackend};
pub use device::{Device, DeviceType};
pub use dtype::{promote_all, promote_types, CastingPolicy, Element, ScalarKind};
pub use error::{Error, ErrorKind, Result};
pub use half::f16;
pub use scalar::ScalarValue;
pub use storage::Storage;

// =============================================================================
// Prelude
// =============================================================================

/// Convenient imports for common usage.
pub mod prelude {
    pub use crate::device::{Device, DeviceType};
    pub use crate::dtype::{promote_types, CastingPolicy, Element, ScalarKind};
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::scalar::ScalarValue;
    pub use crate::storage::Storage;
}
