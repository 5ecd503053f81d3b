//! CPU Kernels - Host Implementations of the Built-in Operations
//!
//! Every kernel selects the element type from the plan's kind and hands a
//! closure to the plan loops. `add` and `sub` take `alpha` as their first
//! scalar argument (default 1).
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

use tessera_core::dispatch_kind;
use tessera_core::dtype::Element;
use tessera_core::error::{Error, Result};
use tessera_core::scalar::ScalarValue;
use tessera_core::DeviceType;

use crate::dispatch::{DispatchTable, OpId};
use crate::iterator::IterationPlan;

/// Registers the host kernels for every built-in operation.
pub fn register_cpu_kernels(table: &DispatchTable) -> Result<()> {
    table.register_fn(OpId::ADD, DeviceType::Cpu, add_kernel)?;
    table.register_fn(OpId::SUB, DeviceType::Cpu, sub_kernel)?;
    table.register_fn(OpId::MUL, DeviceType::Cpu, mul_kernel)?;
    table.register_fn(OpId::DIV, DeviceType::Cpu, div_kernel)?;
    table.register_fn(OpId::NEG, DeviceType::Cpu, neg_kernel)?;
    table.register_fn(OpId::ABS, DeviceType::Cpu, abs_kernel)?;
    Ok(())
}

fn alpha(args: &[ScalarValue]) -> ScalarValue {
    args.first().copied().unwrap_or_default()
}

// =============================================================================
// Binary Kernels
// =============================================================================

fn add_kernel(plan: &IterationPlan, args: &[ScalarValue]) -> Result<()> {
    let alpha = alpha(args);
    dispatch_kind!(plan.dtype(), T => {
        if alpha.is_one() {
            plan.run_binary::<T, _>(|a, b| a.add_value(b))
        } else {
            let alpha: T = alpha.to_element();
            plan.run_binary::<T, _>(move |a, b| a.add_value(alpha.mul_value(b)))
        }
    }, _ => Err(Error::UndefinedKind))
}

fn sub_kernel(plan: &IterationPlan, args: &[ScalarValue]) -> Result<()> {
    let alpha = alpha(args);
    dispatch_kind!(plan.dtype(), T => {
        if alpha.is_one() {
            plan.run_binary::<T, _>(|a, b| a.sub_value(b))
        } else {
            let alpha: T = alpha.to_element();
            plan.run_binary::<T, _>(move |a, b| a.sub_value(alpha.mul_value(b)))
        }
    }, _ => Err(Error::UndefinedKind))
}

fn mul_kernel(plan: &IterationPlan, _args: &[ScalarValue]) -> Result<()> {
    dispatch_kind!(plan.dtype(), T => {
        plan.run_binary::<T, _>(|a, b| a.mul_value(b))
    }, _ => Err(Error::UndefinedKind))
}

fn div_kernel(plan: &IterationPlan, _args: &[ScalarValue]) -> Result<()> {
    dispatch_kind!(plan.dtype(), T => {
        // checked up front so nothing is written on failure; an empty
        // iteration divides nothing
        if T::KIND.is_integral() && plan.numel() > 0 && plan.input_contains_zero::<T>(1)? {
            return Err(Error::ZeroDivision);
        }
        plan.run_binary::<T, _>(|a, b| a.div_value(b))
    }, _ => Err(Error::UndefinedKind))
}

// =============================================================================
// Unary Kernels
// =============================================================================

fn neg_kernel(plan: &IterationPlan, _args: &[ScalarValue]) -> Result<()> {
    dispatch_kind!(plan.dtype(), T => {
        plan.run_unary::<T, _>(|a| a.neg_value())
    }, _ => Err(Error::UndefinedKind))
}

fn abs_kernel(plan: &IterationPlan, _args: &[ScalarValue]) -> Result<()> {
    dispatch_kind!(plan.dtype(), T => {
        plan.run_unary::<T, _>(|a| a.abs_value())
    }, _ => Err(Error::UndefinedKind))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iterator::{build_binary_iterator, build_unary_iterator};
    use crate::tensor::Tensor;

    fn run_binary(
        kernel: fn(&IterationPlan, &[ScalarValue]) -> Result<()>,
        lhs: &Tensor,
        rhs: &Tensor,
        args: &[ScalarValue],
    ) -> Result<Tensor> {
        let plan = build_binary_iterator(None, lhs, rhs, false)?;
        kernel(&plan, args)?;
        plan.finalize()
    }

    #[test]
    fn test_add_with_alpha() {
        let a = Tensor::from_vec(vec![1i64, 2, 3], &[3]).unwrap();
        let b = Tensor::from_vec(vec![10i64, 20, 30], &[3]).unwrap();
        let out = run_binary(add_kernel, &a, &b, &[]).unwrap();
        assert_eq!(out.to_vec::<i64>().unwrap(), vec![11, 22, 33]);

        let out = run_binary(add_kernel, &a, &b, &[ScalarValue::Int(-2)]).unwrap();
        assert_eq!(out.to_vec::<i64>().unwrap(), vec![-19, -38, -57]);
    }

    #[test]
    fn test_sub_with_alpha() {
        let a = Tensor::from_vec(vec![1.0f64, 2.0], &[2]).unwrap();
        let b = Tensor::from_vec(vec![0.5f64, 0.25], &[2]).unwrap();
        let out = run_binary(sub_kernel, &a, &b, &[ScalarValue::Float(2.0)]).unwrap();
        assert_eq!(out.to_vec::<f64>().unwrap(), vec![0.0, 1.5]);
    }

    #[test]
    fn test_mul_and_div() {
        let a = Tensor::from_vec(vec![6i16, -7, 8], &[3]).unwrap();
        let b = Tensor::from_vec(vec![2i16, 2, -3], &[3]).unwrap();
        let out = run_binary(mul_kernel, &a, &b, &[]).unwrap();
        assert_eq!(out.to_vec::<i16>().unwrap(), vec![12, -14, -24]);

        let out = run_binary(div_kernel, &a, &b, &[]).unwrap();
        assert_eq!(out.to_vec::<i16>().unwrap(), vec![3, -3, -2]);
    }

    #[test]
    fn test_integer_division_by_zero() {
        let a = Tensor::from_vec(vec![1i32, 2], &[2]).unwrap();
        let b = Tensor::from_vec(vec![1i32, 0], &[2]).unwrap();
        let err = run_binary(div_kernel, &a, &b, &[]).unwrap_err();
        assert_eq!(err, Error::ZeroDivision);

        let a = Tensor::from_vec(vec![1.0f32], &[1]).unwrap();
        let b = Tensor::from_vec(vec![0.0f32], &[1]).unwrap();
        let out = run_binary(div_kernel, &a, &b, &[]).unwrap();
        assert!(out.item::<f32>().unwrap().is_infinite());
    }

    #[test]
    fn test_empty_division_ignores_zero_divisor() {
        let a = Tensor::from_vec(Vec::<i32>::new(), &[0, 2]).unwrap();
        let b = Tensor::from_vec(vec![1i32, 0], &[2]).unwrap();
        let out = run_binary(div_kernel, &a, &b, &[]).unwrap();
        assert_eq!(out.shape(), &[0, 2]);
        assert_eq!(out.kind(), tessera_core::ScalarKind::Int);
        assert!(out.to_vec::<i32>().unwrap().is_empty());
    }

    #[test]
    fn test_unary_kernels() {
        let a = Tensor::from_vec(vec![-1i8, 2, i8::MIN], &[3]).unwrap();
        let plan = build_unary_iterator(None, &a, false).unwrap();
        neg_kernel(&plan, &[]).unwrap();
        assert_eq!(
            plan.finalize().unwrap().to_vec::<i8>().unwrap(),
            vec![1, -2, i8::MIN]
        );

        let h = Tensor::from_vec(
            vec![tessera_core::f16::from_f32(-1.5), tessera_core::f16::from_f32(2.0)],
            &[2],
        )
        .unwrap();
        let plan = build_unary_iterator(None, &h, false).unwrap();
        abs_kernel(&plan, &[]).unwrap();
        let out = plan.finalize().unwrap();
        assert_eq!(
            out.to_vec::<tessera_core::f16>().unwrap(),
            vec![tessera_core::f16::from_f32(1.5), tessera_core::f16::from_f32(2.0)]
        );
    }

    #[test]
    fn test_registration() {
        let table = DispatchTable::new();
        register_cpu_kernels(&table).unwrap();
        assert_eq!(table.len(), 6);
        assert!(register_cpu_kernels(&table).is_err());
    }
}
