//! End-to-end tests: build, dispatch and finalize through the public API.

use std::sync::Arc;
use std::thread;

use tessera_tensor::dispatch::{self, OpId};
use tessera_tensor::ops::{add, add_out, div, mul, sub_out};
use tessera_tensor::{
    build_binary_iterator, scalar_tensor, zeros, ErrorKind, IterConfig, ScalarKind, Tensor,
    TensorIteratorBuilder,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_broadcast_add_end_to_end() {
    init_tracing();

    let lhs = Tensor::from_vec(vec![1.0f32, 2.0, 3.0], &[3, 1]).expect("lhs");
    let rhs = Tensor::from_vec(vec![0.1f32, 0.2, 0.3, 0.4], &[1, 4]).expect("rhs");

    let plan = build_binary_iterator(None, &lhs, &rhs, false).expect("plan");
    assert_eq!(plan.shape(), &[3, 4]);
    assert_eq!(plan.dtype(), ScalarKind::Float);
    assert_eq!(plan.input_strides(0), &[1, 0]);
    assert_eq!(plan.input_strides(1), &[0, 1]);

    dispatch::dispatch(OpId::ADD, plan.device_type(), &plan, &[]).expect("dispatch");
    let out = plan.finalize().expect("finalize");

    assert_eq!(out.shape(), &[3, 4]);
    assert_eq!(out.kind(), ScalarKind::Float);
    let expected: Vec<f32> = [1.0f32, 2.0, 3.0]
        .iter()
        .flat_map(|a| [0.1f32, 0.2, 0.3, 0.4].map(|b| a + b))
        .collect();
    assert_eq!(out.to_vec::<f32>().expect("values"), expected);
}

#[test]
fn test_shifted_output_gets_a_temporary() {
    init_tracing();

    // Writing base[1..] = base[..4] + 0 element by element without a
    // temporary would smear base[0] across the whole tensor.
    let base = Tensor::from_vec(vec![1i32, 2, 4, 8, 16], &[5]).expect("base");
    let out = base.narrow(0, 1, 4).expect("out");
    let input = base.narrow(0, 0, 4).expect("input");

    add_out(&out, &input, &scalar_tensor(0), 1).expect("add_out");
    assert_eq!(base.to_vec::<i32>().expect("values"), vec![1, 1, 2, 4, 8]);
}

#[test]
fn test_out_forms_on_views() {
    let a = Tensor::from_vec((0..12).map(|v| v as f64).collect(), &[3, 4]).expect("a");
    let out = zeros(&[4, 3], ScalarKind::Double)
        .expect("out")
        .transpose(0, 1)
        .expect("view");

    sub_out(&out, &a, &a.mul_scalar(2).expect("twice"), 1).expect("sub_out");
    let expected: Vec<f64> = (0..12).map(|v| -(v as f64)).collect();
    assert_eq!(out.to_vec::<f64>().expect("values"), expected);
}

#[test]
fn test_mixed_kinds() {
    let bytes = Tensor::from_vec(vec![200u8, 100], &[2]).expect("bytes");
    let chars = Tensor::from_vec(vec![-1i8, 50], &[2]).expect("chars");
    let sum = bytes.add(&chars).expect("sum");
    assert_eq!(sum.kind(), ScalarKind::Short);
    assert_eq!(sum.to_vec::<i16>().expect("values"), vec![199, 150]);

    let halves = Tensor::from_vec(
        vec![tessera_tensor::f16::from_f32(0.5), tessera_tensor::f16::from_f32(1.5)],
        &[2],
    )
    .expect("halves");
    let ints = Tensor::from_vec(vec![2i32, 3], &[2]).expect("ints");
    let prod = mul(&halves, &ints).expect("prod");
    assert_eq!(prod.kind(), ScalarKind::Double);
    assert_eq!(prod.to_vec::<f64>().expect("values"), vec![1.0, 4.5]);
}

#[test]
fn test_error_categories() {
    let a = Tensor::from_vec(vec![1i64, 2, 3, 4, 5, 6], &[2, 3]).expect("a");
    let b = Tensor::from_vec(vec![1i64, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12], &[4, 3]).expect("b");

    assert_eq!(a.add(&b).unwrap_err().kind(), ErrorKind::ShapeMismatch);
    assert_eq!(add(&a, &a, 1.5).unwrap_err().kind(), ErrorKind::TypeError);
    assert_eq!(
        div(&a, &zeros(&[3], ScalarKind::Long).expect("zeros"))
            .unwrap_err()
            .kind(),
        ErrorKind::Arithmetic
    );
    assert_eq!(a.transpose(0, 2).unwrap_err().kind(), ErrorKind::IndexError);
    assert_eq!(a.permute(&[1, -1]).unwrap_err().kind(), ErrorKind::IndexError);

    let narrow = zeros(&[2, 3], ScalarKind::Int).expect("narrow");
    let strict = IterConfig::new().casting(tessera_tensor::CastingPolicy::Safe);
    let err = TensorIteratorBuilder::new()
        .add_input(&a)
        .add_input(&a)
        .add_output(&narrow)
        .config(strict)
        .build()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeError);
}

#[test]
fn test_large_tensors_split_across_threads() {
    let n = 20_000;
    let a = Tensor::from_vec((0..n).map(|v| v as f32).collect(), &[n]).expect("a");
    let b = Tensor::from_vec(vec![2.0f32; n], &[n]).expect("b");

    let c = a.mul(&b).expect("mul");
    let values = c.to_vec::<f32>().expect("values");
    assert!(values.iter().enumerate().all(|(i, &v)| v == 2.0 * i as f32));

    // Strided input takes the sequential path; the result must agree.
    let wide = Tensor::from_vec((0..2 * n).map(|v| v as f32).collect(), &[n, 2]).expect("wide");
    let column = wide.narrow(1, 0, 1).expect("column");
    let doubled = column.add(&column).expect("add");
    let values = doubled.to_vec::<f32>().expect("values");
    assert!(values.iter().enumerate().all(|(i, &v)| v == 4.0 * i as f32));
}

#[test]
fn test_concurrent_dispatch() {
    let shared = Arc::new(Tensor::from_vec((0..64).collect::<Vec<i64>>(), &[8, 8]).expect("t"));

    let handles: Vec<_> = (0..8)
        .map(|k| {
            let t = Arc::clone(&shared);
            thread::spawn(move || {
                let row = t.narrow(0, k, 1).expect("row");
                let sum = row.add(&t).expect("add");
                sum.to_vec::<i64>().expect("values")
            })
        })
        .collect();

    for (k, handle) in handles.into_iter().enumerate() {
        let values = handle.join().expect("thread");
        let expected: Vec<i64> = (0..64).map(|i| i + (k as i64 * 8 + i % 8)).collect();
        assert_eq!(values, expected);
    }
    assert!(dispatch::init().is_sealed());
}
