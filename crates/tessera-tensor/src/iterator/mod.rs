//! Tensor Iterator - Elementwise Operation Planning
//!
//! Turns a set of input tensors and an optional output into an
//! [`IterationPlan`]: the common kind, the common device, the broadcast
//! shape, the effective strides of every operand and the traversal layout.
//! Everything that could go wrong is decided here, before a kernel runs.
//!
//! Build steps, in order:
//!
//! 1. Resolve the common kind (wrapped numbers rank below tensors; a
//!    pre-supplied output is folded in and checked against the casting rule)
//! 2. Broadcast the input shapes; a pre-supplied output must match exactly
//! 3. Check that the operands share one device
//! 4. Cast inputs of a different kind into fresh tensors
//! 5. Allocate the output when none was given, following the inputs' layout
//! 6. Redirect writes to a scratch tensor on partial overlap or narrowing
//! 7. Compute broadcast strides, then reorder and coalesce dimensions
//!
//! # Example
//! ```rust
//! use tessera_tensor::iterator::build_binary_iterator;
//! use tessera_tensor::{ScalarKind, Tensor};
//!
//! let lhs = Tensor::from_vec(vec![1.0f32, 2.0, 3.0], &[3, 1]).unwrap();
//! let rhs = Tensor::from_vec(vec![10.0f32, 20.0, 30.0, 40.0], &[1, 4]).unwrap();
//!
//! let plan = build_binary_iterator(None, &lhs, &rhs, false).unwrap();
//! assert_eq!(plan.shape(), &[3, 4]);
//! assert_eq!(plan.dtype(), ScalarKind::Float);
//! assert_eq!(plan.input_strides(0), &[1, 0]);
//! assert_eq!(plan.input_strides(1), &[0, 1]);
//! ```
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

pub mod cursor;
pub mod layout;
mod loops;

pub use cursor::StridedCursor;
pub use layout::{IterLayout, Permutation};

use smallvec::SmallVec;

use tessera_core::config::default_casting;
use tessera_core::dtype::{promote_all, promote_types, CastingPolicy, ScalarKind};
use tessera_core::error::{Error, Result};
use tessera_core::{Device, DeviceType};

use crate::creation::empty_with_format;
use crate::overlap::{assert_no_internal_overlap, overlap_status, OverlapStatus};
use crate::shape::{
    broadcast_shapes, broadcast_strides, numel, suggest_memory_format, MemoryFormat, Shape,
    Strides, MAX_DIMS,
};
use crate::tensor::Tensor;

// =============================================================================
// Configuration
// =============================================================================

/// Options for building an iteration plan.
#[derive(Debug, Clone)]
pub struct IterConfig {
    /// Check the output for self-aliasing and for partial overlap with an
    /// input. Set by the `_out` and in-place operator forms.
    pub check_internal_overlap: bool,
    /// Rule for writing the common kind into a narrower output.
    pub casting: CastingPolicy,
    /// Reorder dimensions so the output is walked in memory order.
    pub reorder_dimensions: bool,
    /// Merge dimensions every operand walks as one run.
    pub coalesce_dimensions: bool,
    /// Allocate outputs in the layout the inputs agree on.
    pub infer_memory_format: bool,
}

impl Default for IterConfig {
    fn default() -> Self {
        Self {
            check_internal_overlap: false,
            casting: default_casting(),
            reorder_dimensions: true,
            coalesce_dimensions: true,
            infer_memory_format: true,
        }
    }
}

impl IterConfig {
    /// Creates a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: enable overlap checks on the output.
    pub fn check_internal_overlap(mut self, check: bool) -> Self {
        self.check_internal_overlap = check;
        self
    }

    /// Builder: set the casting rule for pre-supplied outputs.
    pub fn casting(mut self, casting: CastingPolicy) -> Self {
        self.casting = casting;
        self
    }

    /// Builder: enable or disable dimension reordering.
    pub fn reorder_dimensions(mut self, reorder: bool) -> Self {
        self.reorder_dimensions = reorder;
        self
    }

    /// Builder: enable or disable dimension coalescing.
    pub fn coalesce_dimensions(mut self, coalesce: bool) -> Self {
        self.coalesce_dimensions = coalesce;
        self
    }

    /// Builder: enable or disable output layout inference.
    pub fn infer_memory_format(mut self, infer: bool) -> Self {
        self.infer_memory_format = infer;
        self
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Collects operands and options for [`build`].
#[derive(Debug, Clone, Default)]
pub struct TensorIteratorBuilder {
    inputs: SmallVec<[Tensor; 4]>,
    output: Option<Tensor>,
    config: IterConfig,
}

impl TensorIteratorBuilder {
    /// Creates an empty builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an input operand.
    pub fn add_input(mut self, input: &Tensor) -> Self {
        self.inputs.push(input.clone());
        self
    }

    /// Sets the output operand. Without one, the plan allocates it.
    pub fn add_output(mut self, output: &Tensor) -> Self {
        self.output = Some(output.clone());
        self
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: IterConfig) -> Self {
        self.config = config;
        self
    }

    /// Builder: enable overlap checks on the output.
    pub fn check_internal_overlap(mut self, check: bool) -> Self {
        self.config.check_internal_overlap = check;
        self
    }

    /// Builder: set the casting rule for a pre-supplied output.
    pub fn casting(mut self, casting: CastingPolicy) -> Self {
        self.config.casting = casting;
        self
    }

    /// Builds the plan.
    pub fn build(&self) -> Result<IterationPlan> {
        let inputs: SmallVec<[&Tensor; 4]> = self.inputs.iter().collect();
        build(&inputs, self.output.as_ref(), &self.config)
    }
}

/// Plans a binary elementwise operation.
pub fn build_binary_iterator(
    output: Option<&Tensor>,
    lhs: &Tensor,
    rhs: &Tensor,
    check_internal_overlap: bool,
) -> Result<IterationPlan> {
    let config = IterConfig::default().check_internal_overlap(check_internal_overlap);
    build(&[lhs, rhs], output, &config)
}

/// Plans a unary elementwise operation.
pub fn build_unary_iterator(
    output: Option<&Tensor>,
    input: &Tensor,
    check_internal_overlap: bool,
) -> Result<IterationPlan> {
    let config = IterConfig::default().check_internal_overlap(check_internal_overlap);
    build(&[input], output, &config)
}

/// Plans an elementwise operation over `inputs`, writing into `output` or
/// into a freshly allocated tensor.
///
/// # Errors
/// - `BroadcastError` if the input shapes do not broadcast
/// - `ShapeMismatch` if `output` does not have the broadcast shape
/// - `InvalidCast` if the casting rule refuses to narrow into `output`
/// - `RankOverflow` if the broadcast rank exceeds `MAX_DIMS`
/// - `DeviceMismatch` if the operands live on different devices
/// - `InternalOverlap` if overlap checks are on and `output` aliases itself
/// - allocation errors for the output or scratch tensor
pub fn build(
    inputs: &[&Tensor],
    output: Option<&Tensor>,
    config: &IterConfig,
) -> Result<IterationPlan> {
    if inputs.is_empty() {
        return Err(Error::invalid_operation(
            "an elementwise operation needs at least one input",
        ));
    }

    let dtype = resolve_kind(inputs, output, config.casting)?;

    let shapes: SmallVec<[&[usize]; 4]> = inputs.iter().map(|t| t.shape()).collect();
    let shape = broadcast_shapes(&shapes)?;
    if shape.len() > MAX_DIMS {
        return Err(Error::RankOverflow {
            ndim: shape.len(),
            max: MAX_DIMS,
        });
    }
    if let Some(out) = output {
        if out.shape() != shape.as_slice() {
            return Err(Error::shape_mismatch(&shape, out.shape()));
        }
    }

    let device = resolve_device(inputs, output)?;

    let format = if output.is_none() && config.infer_memory_format {
        infer_memory_format(inputs, &shape)
    } else {
        MemoryFormat::Contiguous
    };

    let inputs: SmallVec<[Tensor; 4]> = inputs
        .iter()
        .enumerate()
        .map(|(i, t)| {
            if t.kind() == dtype {
                Ok((*t).clone())
            } else {
                tracing::debug!(input = i, from = %t.kind(), to = %dtype, "casting input");
                t.to_kind(dtype)
            }
        })
        .collect::<Result<_>>()?;

    let (output, output_allocated) = match output {
        Some(out) => (out.clone(), false),
        None => (empty_with_format(&shape, dtype, format, device)?, true),
    };

    let mut needs_temporary = false;
    if config.check_internal_overlap && !output_allocated {
        assert_no_internal_overlap(&output)?;
        for (i, input) in inputs.iter().enumerate() {
            if overlap_status(&output, input) == OverlapStatus::Partial {
                tracing::debug!(input = i, "output partially overlaps an input");
                needs_temporary = true;
            }
        }
    }

    let needs_cast = output.kind() != dtype;
    if needs_cast {
        tracing::debug!(from = %dtype, to = %output.kind(), "narrowing result into output");
    }

    let temporary = if needs_temporary || needs_cast {
        let format = suggest_memory_format(output.shape(), output.strides());
        Some(empty_with_format(&shape, dtype, format, device)?)
    } else {
        None
    };

    let target = temporary.as_ref().unwrap_or(&output);
    let output_strides = Strides::from_slice(target.strides());
    let input_strides: SmallVec<[Strides; 4]> = inputs
        .iter()
        .map(|t| broadcast_strides(t.shape(), t.strides(), &shape))
        .collect();

    let operand_strides: SmallVec<[Strides; 4]> = core::iter::once(output_strides.clone())
        .chain(input_strides.iter().cloned())
        .collect();
    let layout = IterLayout::new(
        &shape,
        &operand_strides,
        config.reorder_dimensions,
        config.coalesce_dimensions,
    );

    tracing::trace!(
        %dtype,
        %device,
        shape = ?shape.as_slice(),
        iteration_shape = ?layout.shape.as_slice(),
        needs_temporary,
        needs_cast,
        "built iteration plan"
    );

    Ok(IterationPlan {
        dtype,
        device,
        shape,
        inputs,
        input_strides,
        output,
        output_strides,
        output_allocated,
        temporary,
        needs_temporary,
        needs_cast,
        layout,
    })
}

/// Common kind of the operands.
///
/// Wrapped numbers only matter when they are the only operands, or when
/// a floating number meets integral tensors (the result then becomes the
/// default floating kind). A pre-supplied output widens the result, and
/// an output narrower than the inputs' kind must pass `casting`.
fn resolve_kind(
    inputs: &[&Tensor],
    output: Option<&Tensor>,
    casting: CastingPolicy,
) -> Result<ScalarKind> {
    if inputs
        .iter()
        .copied()
        .chain(output)
        .any(|t| !t.kind().is_defined())
    {
        return Err(Error::UndefinedKind);
    }

    let wrapped = promote_all(
        inputs
            .iter()
            .filter(|t| t.is_wrapped_number())
            .map(|t| t.kind()),
    );
    let kind = if inputs.iter().all(|t| t.is_wrapped_number()) {
        wrapped
    } else {
        let tensors = promote_all(
            inputs
                .iter()
                .filter(|t| !t.is_wrapped_number())
                .map(|t| t.kind()),
        );
        if tensors.is_integral() && wrapped.is_floating() {
            promote_types(tensors, ScalarKind::default_float())
        } else {
            tensors
        }
    };

    let Some(out) = output else {
        return Ok(kind);
    };
    if !casting.allows(kind, out.kind()) {
        return Err(Error::InvalidCast {
            from: kind,
            to: out.kind(),
            policy: casting,
        });
    }
    Ok(promote_types(kind, out.kind()))
}

/// Device every operand must live on. 0-dim CPU tensors join any device.
fn resolve_device(inputs: &[&Tensor], output: Option<&Tensor>) -> Result<Device> {
    let mut device = output.map(Tensor::device);
    for t in inputs {
        if t.is_scalar() && t.device().is_cpu() {
            continue;
        }
        match device {
            None => device = Some(t.device()),
            Some(expected) if expected != t.device() => {
                return Err(Error::DeviceMismatch {
                    expected,
                    actual: t.device(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(device.unwrap_or(Device::Cpu))
}

/// Layout for a new output: channels-last only if every input that already
/// has the full shape is channels-last.
fn infer_memory_format(inputs: &[&Tensor], shape: &[usize]) -> MemoryFormat {
    let mut voters = inputs.iter().filter(|t| t.shape() == shape).peekable();
    if voters.peek().is_none() {
        return MemoryFormat::Contiguous;
    }
    if voters.all(|t| suggest_memory_format(t.shape(), t.strides()) == MemoryFormat::ChannelsLast)
    {
        MemoryFormat::ChannelsLast
    } else {
        MemoryFormat::Contiguous
    }
}

// =============================================================================
// Iteration Plan
// =============================================================================

/// A fully resolved elementwise operation, ready for a kernel.
///
/// Inputs are already in the common kind. Kernels write through
/// [`write_target`](Self::write_target); [`finalize`](Self::finalize)
/// then makes the result visible in the output.
#[derive(Debug)]
pub struct IterationPlan {
    dtype: ScalarKind,
    device: Device,
    shape: Shape,
    inputs: SmallVec<[Tensor; 4]>,
    input_strides: SmallVec<[Strides; 4]>,
    output: Tensor,
    output_strides: Strides,
    output_allocated: bool,
    temporary: Option<Tensor>,
    needs_temporary: bool,
    needs_cast: bool,
    layout: IterLayout,
}

impl IterationPlan {
    /// Kind the computation runs in.
    pub const fn dtype(&self) -> ScalarKind {
        self.dtype
    }

    /// Device every operand lives on.
    pub const fn device(&self) -> Device {
        self.device
    }

    /// Device type used to select a kernel.
    pub const fn device_type(&self) -> DeviceType {
        self.device.device_type()
    }

    /// Broadcast shape of the operation.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of elements written.
    pub fn numel(&self) -> usize {
        numel(&self.shape)
    }

    /// Number of inputs.
    pub fn ninputs(&self) -> usize {
        self.inputs.len()
    }

    /// Input `index`, in the common kind.
    pub fn input(&self, index: usize) -> &Tensor {
        &self.inputs[index]
    }

    /// All inputs, in the common kind.
    pub fn inputs(&self) -> &[Tensor] {
        &self.inputs
    }

    /// Strides of input `index` over [`shape`](Self::shape); broadcast
    /// dimensions have stride 0.
    pub fn input_strides(&self, index: usize) -> &[isize] {
        &self.input_strides[index]
    }

    /// Strides of the write target over [`shape`](Self::shape).
    pub fn output_strides(&self) -> &[isize] {
        &self.output_strides
    }

    /// The tensor returned to the caller.
    pub const fn output(&self) -> &Tensor {
        &self.output
    }

    /// Whether the plan allocated the output itself.
    pub const fn is_output_allocated(&self) -> bool {
        self.output_allocated
    }

    /// The tensor kernels write into: the scratch tensor if one is in use,
    /// the output otherwise.
    pub fn write_target(&self) -> &Tensor {
        self.temporary.as_ref().unwrap_or(&self.output)
    }

    /// Whether writes go to a scratch tensor because the output partially
    /// overlaps an input.
    pub const fn needs_temporary(&self) -> bool {
        self.needs_temporary
    }

    /// Whether the result is converted into a narrower output at finalize.
    pub const fn needs_cast(&self) -> bool {
        self.needs_cast
    }

    /// Shape walked by the loops after reordering and coalescing.
    pub fn iteration_shape(&self) -> &[usize] {
        &self.layout.shape
    }

    /// Strides of operand `index` over the iteration shape; operand 0 is
    /// the write target, operand `k + 1` is input `k`.
    pub fn iteration_strides(&self, index: usize) -> &[isize] {
        &self.layout.strides[index]
    }

    /// Logical dimension at each iteration position, before coalescing.
    pub fn permutation(&self) -> &[usize] {
        &self.layout.permutation
    }

    /// Copies the scratch tensor into the output if one was used and
    /// returns the output.
    pub fn finalize(self) -> Result<Tensor> {
        if let Some(temporary) = self.temporary {
            tracing::trace!(
                from = %temporary.kind(),
                to = %self.output.kind(),
                "copying result into output"
            );
            self.output.copy_from(&temporary)?;
        }
        Ok(self.output)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::creation::{scalar_tensor, zeros};
    use tessera_core::ErrorKind;

    fn floats(shape: &[usize]) -> Tensor {
        let n = numel(shape);
        Tensor::from_vec((0..n).map(|v| v as f32).collect(), shape).unwrap()
    }

    #[test]
    fn test_broadcast_plan() {
        let lhs = floats(&[3, 1]);
        let rhs = floats(&[1, 4]);
        let plan = build_binary_iterator(None, &lhs, &rhs, false).unwrap();

        assert_eq!(plan.shape(), &[3, 4]);
        assert_eq!(plan.dtype(), ScalarKind::Float);
        assert_eq!(plan.device(), Device::Cpu);
        assert_eq!(plan.input_strides(0), &[1, 0]);
        assert_eq!(plan.input_strides(1), &[0, 1]);
        assert_eq!(plan.output_strides(), &[4, 1]);
        assert!(plan.is_output_allocated());
        assert!(!plan.needs_temporary());
        assert!(!plan.needs_cast());
        assert_eq!(plan.iteration_shape(), &[3, 4]);
    }

    #[test]
    fn test_contiguous_plan_coalesces() {
        let a = floats(&[2, 3, 4]);
        let plan = build_binary_iterator(None, &a, &a, false).unwrap();
        assert_eq!(plan.iteration_shape(), &[24]);
        assert_eq!(plan.iteration_strides(0), &[1]);
        assert_eq!(plan.permutation(), &[0, 1, 2]);
    }

    #[test]
    fn test_kind_resolution() {
        let ints = Tensor::from_vec(vec![1i32, 2], &[2]).unwrap();
        let bytes = Tensor::from_vec(vec![1u8, 2], &[2]).unwrap();
        let plan = build_binary_iterator(None, &ints, &bytes, false).unwrap();
        assert_eq!(plan.dtype(), ScalarKind::Int);
        assert_eq!(plan.input(1).kind(), ScalarKind::Int);

        // A wrapped integer does not widen the tensor.
        let plan = build_binary_iterator(None, &bytes, &scalar_tensor(1000), false).unwrap();
        assert_eq!(plan.dtype(), ScalarKind::Byte);

        // A wrapped float moves integral tensors to the default float.
        let plan = build_binary_iterator(None, &ints, &scalar_tensor(0.5), false).unwrap();
        assert_eq!(plan.dtype(), ScalarKind::Float);

        // Two wrapped numbers use their own promotion.
        let plan =
            build_binary_iterator(None, &scalar_tensor(1), &scalar_tensor(0.5), false).unwrap();
        assert_eq!(plan.dtype(), ScalarKind::Double);
        assert_eq!(plan.shape(), &[] as &[usize]);
    }

    #[test]
    fn test_output_kind_is_folded_in() {
        let a = Tensor::from_vec(vec![1i32, 2], &[2]).unwrap();
        let out = zeros(&[2], ScalarKind::Double).unwrap();
        let plan = build_binary_iterator(Some(&out), &a, &a, false).unwrap();
        assert_eq!(plan.dtype(), ScalarKind::Double);
        assert!(!plan.needs_cast());
    }

    #[test]
    fn test_narrowing_output() {
        let a = floats(&[2]);
        let out = zeros(&[2], ScalarKind::Int).unwrap();

        let plan = build_binary_iterator(Some(&out), &a, &a, false).unwrap();
        assert!(plan.needs_cast());
        assert_eq!(plan.write_target().kind(), ScalarKind::Float);
        assert!(!plan.write_target().storage().same_allocation(out.storage()));

        let config = IterConfig::new().casting(CastingPolicy::SameKind);
        let err = build(&[&a, &a], Some(&out), &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TypeError);
    }

    #[test]
    fn test_output_shape_must_match() {
        let a = floats(&[3, 1]);
        let b = floats(&[1, 4]);
        let out = zeros(&[4, 3], ScalarKind::Float).unwrap();
        let err = build_binary_iterator(Some(&out), &a, &b, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);

        // The output is not broadcast.
        let out = zeros(&[1, 4], ScalarKind::Float).unwrap();
        assert!(build_binary_iterator(Some(&out), &a, &b, false).is_err());
    }

    #[test]
    fn test_incompatible_shapes() {
        let err = build_binary_iterator(None, &floats(&[2, 3]), &floats(&[4, 3]), false)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    }

    #[test]
    fn test_rank_overflow() {
        let deep = floats(&[1; MAX_DIMS + 1]);
        let err = build_binary_iterator(None, &deep, &scalar_tensor(1.0), false).unwrap_err();
        assert_eq!(
            err,
            Error::RankOverflow {
                ndim: MAX_DIMS + 1,
                max: MAX_DIMS
            }
        );
        assert_eq!(err.kind(), ErrorKind::RankOverflow);

        let widest = floats(&[1; MAX_DIMS]);
        let plan = build_unary_iterator(None, &widest, false).unwrap();
        assert_eq!(plan.shape().len(), MAX_DIMS);
    }

    #[test]
    fn test_partial_overlap_uses_temporary() {
        let base = floats(&[8]);
        let out = base.narrow(0, 1, 7).unwrap();
        let input = base.narrow(0, 0, 7).unwrap();

        let plan = build_unary_iterator(Some(&out), &input, true).unwrap();
        assert!(plan.needs_temporary());
        assert!(!plan.write_target().storage().same_allocation(base.storage()));

        let unchecked = build_unary_iterator(Some(&out), &input, false).unwrap();
        assert!(!unchecked.needs_temporary());
    }

    #[test]
    fn test_identical_output_is_written_directly() {
        let a = floats(&[4]);
        let plan = build_binary_iterator(Some(&a), &a, &floats(&[4]), true).unwrap();
        assert!(!plan.needs_temporary());
        assert!(plan.write_target().storage().same_allocation(a.storage()));
    }

    #[test]
    fn test_self_overlapping_output_is_rejected() {
        let out = floats(&[1, 4]).expand(&[3, 4]).unwrap();
        let err = build_unary_iterator(Some(&out), &floats(&[3, 4]), true).unwrap_err();
        assert_eq!(err, Error::InternalOverlap);
    }

    #[test]
    fn test_channels_last_inputs_give_channels_last_output() {
        let nhwc = floats(&[2, 4, 5, 3]).permute(&[0, 3, 1, 2]).unwrap();
        assert_eq!(nhwc.shape(), &[2, 3, 4, 5]);

        let plan = build_binary_iterator(None, &nhwc, &nhwc, false).unwrap();
        assert_eq!(plan.output().strides(), &[60, 1, 15, 3]);

        let mixed = build_binary_iterator(None, &nhwc, &floats(&[2, 3, 4, 5]), false).unwrap();
        assert_eq!(mixed.output().strides(), &[60, 20, 5, 1]);
    }

    #[test]
    fn test_device_mismatch() {
        let storage = tessera_core::Storage::zeros(16, Device::Cuda(0));
        let gpu = Tensor::from_storage(storage, ScalarKind::Float, &[4], &[1], 0).unwrap();
        let err = build_binary_iterator(None, &gpu, &floats(&[4]), false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Device);

        // 0-dim CPU tensors join any device.
        let out = Tensor::from_storage(
            tessera_core::Storage::zeros(16, Device::Cuda(0)),
            ScalarKind::Float,
            &[4],
            &[1],
            0,
        )
        .unwrap();
        let plan = build_binary_iterator(Some(&out), &gpu, &Tensor::scalar(1.0f32), false).unwrap();
        assert_eq!(plan.device_type(), DeviceType::Cuda);
    }

    #[test]
    fn test_builder() {
        let a = floats(&[2, 2]);
        let plan = TensorIteratorBuilder::new()
            .add_input(&a)
            .add_input(&a)
            .add_input(&a)
            .build()
            .unwrap();
        assert_eq!(plan.ninputs(), 3);

        assert!(TensorIteratorBuilder::new().build().is_err());
    }

    #[test]
    fn test_finalize_narrows() {
        let a = Tensor::from_vec(vec![1.5f32, -2.5], &[2]).unwrap();
        let out = zeros(&[2], ScalarKind::Int).unwrap();
        let plan = build_unary_iterator(Some(&out), &a, false).unwrap();
        plan.run_unary::<f32, _>(|x| x * 2.0).unwrap();
        let result = plan.finalize().unwrap();
        assert!(result.storage().same_allocation(out.storage()));
        assert_eq!(out.to_vec::<i32>().unwrap(), vec![3, -5]);
    }
}
