//! Tensor Operations - Elementwise Arithmetic
//!
//! Every operation follows the same path: build an iteration plan, dispatch
//! the kernel registered for the plan's device type, finalize the plan.
//!
//! # Categories
//!
//! ## Binary Operations
//! - `add`, `sub` - with an `alpha` multiplier on the second operand
//! - `mul`, `div`
//! - `rsub` - subtraction with swapped operands
//!
//! ## Unary Operations
//! - `neg`, `abs`
//!
//! Each has an `_out` form and an in-place form (trailing underscore).
//!
//! # Example
//!
//! ```rust
//! use tessera_tensor::ops::add;
//! use tessera_tensor::Tensor;
//!
//! let a = Tensor::from_vec(vec![1.0f32, 2.0, 3.0], &[3, 1]).unwrap();
//! let b = Tensor::from_vec(vec![10.0f32, 20.0], &[2]).unwrap();
//!
//! let c = add(&a, &b, 2).unwrap();
//! assert_eq!(c.shape(), &[3, 2]);
//! assert_eq!(c.to_vec::<f32>().unwrap(), vec![21.0, 41.0, 22.0, 42.0, 23.0, 43.0]);
//! ```
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

pub mod binary;
pub mod unary;

pub use binary::{
    add, add_, add_out, div, div_, div_out, mul, mul_, mul_out, rsub, sub, sub_, sub_out,
};
pub use unary::{abs, abs_out, neg, neg_out};
