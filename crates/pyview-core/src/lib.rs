//! # pyview-core
//!
//! A `[Python view]` node for native values in a mixed-mode debugger.
//!
//! When a native frame holds a pointer into a Python interpreter's heap, the
//! host debugger shows the raw C struct. This crate adds a second node next
//! to it that renders the same object the way the Python evaluator sees it.
//!
//! ## Components
//!
//! - [`symbols`]: native type name of the value
//! - [`object`]: validates the CPython object header at the address
//! - [`context`]: derives the Python-language evaluation context
//! - [`host`]: traits for everything the host debugger provides
//! - [`visualizer`]: the request pipeline and fallback policy
//!
//! ## Why unsafe code is needed
//!
//! The Linux live-process reader calls `process_vm_readv(2)` through `libc`.
//! That call is wrapped in a safe [`MemoryReader`](memory::MemoryReader)
//! implementation; nothing else in the crate uses `unsafe`.

#![allow(unsafe_code)] // Required for process_vm_readv

pub mod context;
pub mod error;
pub mod host;
pub mod intrinsic;
pub mod memory;
pub mod object;
pub mod platform;
pub mod prelude;
pub mod symbols;
pub mod types;
pub mod visualizer;

// Re-export commonly used types
pub use error::{Result, VisualizerError};
pub use visualizer::{Visualizer, VisualizerBuilder};
