//! Unary Operations - neg, abs
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use tessera_core::error::Result;

use crate::dispatch::{dispatch, OpId};
use crate::iterator::build_unary_iterator;
use crate::tensor::Tensor;

fn unary_op(op: OpId, output: Option<&Tensor>, input: &Tensor) -> Result<Tensor> {
    let plan = build_unary_iterator(output, input, output.is_some())?;
    dispatch(op, plan.device_type(), &plan, &[])?;
    plan.finalize()
}

/// `-input`. Integral negation wraps.
pub fn neg(input: &Tensor) -> Result<Tensor> {
    unary_op(OpId::NEG, None, input)
}

/// `-input`, written into `out`.
pub fn neg_out(out: &Tensor, input: &Tensor) -> Result<Tensor> {
    unary_op(OpId::NEG, Some(out), input)
}

/// `|input|`.
pub fn abs(input: &Tensor) -> Result<Tensor> {
    unary_op(OpId::ABS, None, input)
}

/// `|input|`, written into `out`.
pub fn abs_out(out: &Tensor, input: &Tensor) -> Result<Tensor> {
    unary_op(OpId::ABS, Some(out), input)
}

impl Tensor {
    /// Element-wise negation.
    pub fn neg(&self) -> Result<Tensor> {
        neg(self)
    }

    /// In-place negation.
    pub fn neg_(&self) -> Result<Tensor> {
        neg_out(self, self)
    }

    /// Element-wise absolute value.
    pub fn abs(&self) -> Result<Tensor> {
        abs(self)
    }

    /// In-place absolute value.
    pub fn abs_(&self) -> Result<Tensor> {
        abs_out(self, self)
    }
}
