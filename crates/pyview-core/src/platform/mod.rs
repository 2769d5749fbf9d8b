//! # Platform-Specific Implementations
//!
//! Direct access to a live debuggee, for hosts that do not provide their own
//! [`MemoryReader`](crate::memory::MemoryReader).
//!
//! - **Linux**: `process_vm_readv(2)`
//!   - See: [process_vm_readv(2) man page](https://man7.org/linux/man-pages/man2/process_vm_readv.2.html)
//!
//! Other platforms rely on the host debugger's memory access.

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(target_os = "linux")]
pub use linux::LiveProcessMemory;
