//! Kernels - Backend Implementations of Elementwise Operations
//!
//! Each backend module exposes a `register_*_kernels` function that fills a
//! [`DispatchTable`](crate::dispatch::DispatchTable). Only the host backend
//! ships kernels; other device types have no entries and fail at dispatch.
//!
//! @version 0.1.0
//! @author `AutomataNexus` Development Team

pub mod cpu;

pub use cpu::register_cpu_kernels;
