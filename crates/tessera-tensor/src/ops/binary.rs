//! Binary Operations - add, sub, mul, div, rsub
//!
//! Each operation comes in three forms:
//!
//! - functional (`add`): allocates the result
//! - `_out` (`add_out`): writes into a caller tensor of the broadcast shape,
//!   with overlap checks on
//! - in-place (`add_`): `add_out(self, self, other)`
//!
//! `add` and `sub` compute `lhs ± alpha * rhs`. A floating `alpha` is
//! rejected when the computation is integral.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use tessera_core::dtype::ScalarKind;
use tessera_core::error::{Error, Result};
use tessera_core::scalar::ScalarValue;

use crate::creation::scalar_tensor;
use crate::dispatch::{dispatch, OpId};
use crate::iterator::build_binary_iterator;
use crate::tensor::Tensor;

/// Builds, dispatches and finalizes one binary operation.
fn binary_op(
    op: OpId,
    output: Option<&Tensor>,
    lhs: &Tensor,
    rhs: &Tensor,
    alpha: Option<ScalarValue>,
) -> Result<Tensor> {
    let plan = build_binary_iterator(output, lhs, rhs, output.is_some())?;
    let args = match alpha {
        Some(alpha) => {
            check_alpha(plan.dtype(), alpha)?;
            vec![alpha]
        }
        None => Vec::new(),
    };
    dispatch(op, plan.device_type(), &plan, &args)?;
    plan.finalize()
}

fn check_alpha(kind: ScalarKind, alpha: ScalarValue) -> Result<()> {
    if kind.is_floating() || alpha.is_integral() {
        Ok(())
    } else {
        Err(Error::InvalidAlpha { kind })
    }
}

// =============================================================================
// Addition and Subtraction
// =============================================================================

/// `lhs + alpha * rhs`.
pub fn add(lhs: &Tensor, rhs: &Tensor, alpha: impl Into<ScalarValue>) -> Result<Tensor> {
    binary_op(OpId::ADD, None, lhs, rhs, Some(alpha.into()))
}

/// `lhs + alpha * rhs`, written into `out`.
pub fn add_out(
    out: &Tensor,
    lhs: &Tensor,
    rhs: &Tensor,
    alpha: impl Into<ScalarValue>,
) -> Result<Tensor> {
    binary_op(OpId::ADD, Some(out), lhs, rhs, Some(alpha.into()))
}

/// `this += alpha * other`.
pub fn add_(this: &Tensor, other: &Tensor, alpha: impl Into<ScalarValue>) -> Result<Tensor> {
    add_out(this, this, other, alpha)
}

/// `lhs - alpha * rhs`.
pub fn sub(lhs: &Tensor, rhs: &Tensor, alpha: impl Into<ScalarValue>) -> Result<Tensor> {
    binary_op(OpId::SUB, None, lhs, rhs, Some(alpha.into()))
}

/// `lhs - alpha * rhs`, written into `out`.
pub fn sub_out(
    out: &Tensor,
    lhs: &Tensor,
    rhs: &Tensor,
    alpha: impl Into<ScalarValue>,
) -> Result<Tensor> {
    binary_op(OpId::SUB, Some(out), lhs, rhs, Some(alpha.into()))
}

/// `this -= alpha * other`.
pub fn sub_(this: &Tensor, other: &Tensor, alpha: impl Into<ScalarValue>) -> Result<Tensor> {
    sub_out(this, this, other, alpha)
}

/// `other - alpha * this`.
pub fn rsub(this: &Tensor, other: &Tensor, alpha: impl Into<ScalarValue>) -> Result<Tensor> {
    sub(other, this, alpha)
}

// =============================================================================
// Multiplication and Division
// =============================================================================

/// `lhs * rhs`.
pub fn mul(lhs: &Tensor, rhs: &Tensor) -> Result<Tensor> {
    binary_op(OpId::MUL, None, lhs, rhs, None)
}

/// `lhs * rhs`, written into `out`.
pub fn mul_out(out: &Tensor, lhs: &Tensor, rhs: &Tensor) -> Result<Tensor> {
    binary_op(OpId::MUL, Some(out), lhs, rhs, None)
}

/// `this *= other`.
pub fn mul_(this: &Tensor, other: &Tensor) -> Result<Tensor> {
    mul_out(this, this, other)
}

/// `lhs / rhs`; integral division truncates and fails on a zero divisor.
pub fn div(lhs: &Tensor, rhs: &Tensor) -> Result<Tensor> {
    binary_op(OpId::DIV, None, lhs, rhs, None)
}

/// `lhs / rhs`, written into `out`.
pub fn div_out(out: &Tensor, lhs: &Tensor, rhs: &Tensor) -> Result<Tensor> {
    binary_op(OpId::DIV, Some(out), lhs, rhs, None)
}

/// `this /= other`.
pub fn div_(this: &Tensor, other: &Tensor) -> Result<Tensor> {
    div_out(this, this, other)
}

// =============================================================================
// Tensor Methods
// =============================================================================

impl Tensor {
    /// Element-wise addition with broadcasting.
    pub fn add(&self, other: &Tensor) -> Result<Tensor> {
        add(self, other, 1)
    }

    /// Element-wise subtraction with broadcasting.
    pub fn sub(&self, other: &Tensor) -> Result<Tensor> {
        sub(self, other, 1)
    }

    /// Element-wise multiplication with broadcasting.
    pub fn mul(&self, other: &Tensor) -> Result<Tensor> {
        mul(self, other)
    }

    /// Element-wise division with broadcasting.
    pub fn div(&self, other: &Tensor) -> Result<Tensor> {
        div(self, other)
    }

    /// `other - self`.
    pub fn rsub(&self, other: &Tensor) -> Result<Tensor> {
        rsub(self, other, 1)
    }

    /// In-place addition.
    pub fn add_(&self, other: &Tensor) -> Result<Tensor> {
        add_(self, other, 1)
    }

    /// In-place subtraction.
    pub fn sub_(&self, other: &Tensor) -> Result<Tensor> {
        sub_(self, other, 1)
    }

    /// In-place multiplication.
    pub fn mul_(&self, other: &Tensor) -> Result<Tensor> {
        mul_(self, other)
    }

    /// In-place division.
    pub fn div_(&self, other: &Tensor) -> Result<Tensor> {
        div_(self, other)
    }

    /// Adds a number to every element.
    pub fn add_scalar(&self, value: impl Into<ScalarValue>) -> Result<Tensor> {
        self.add(&scalar_tensor(value))
    }

    /// Subtracts a number from every element.
    pub fn sub_scalar(&self, value: impl Into<ScalarValue>) -> Result<Tensor> {
        self.sub(&scalar_tensor(value))
    }

    /// Multiplies every element by a number.
    pub fn mul_scalar(&self, value: impl Into<ScalarValue>) -> Result<Tensor> {
        self.mul(&scalar_tensor(value))
    }

    /// Divides every element by a number.
    pub fn div_scalar(&self, value: impl Into<ScalarValue>) -> Result<Tensor> {
        self.div(&scalar_tensor(value))
    }

    /// Subtracts every element from a number.
    pub fn rsub_scalar(&self, value: impl Into<ScalarValue>) -> Result<Tensor> {
        self.rsub(&scalar_tensor(value))
    }
}

// =============================================================================
// Tests
// =============================================================================
