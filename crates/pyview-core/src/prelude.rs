//! Common module for library exports

pub use crate::error::{Result, VisualizerError};
pub use crate::host::{Diagnostics, DisplayOptions, ExpressionEvaluator, NativeEvaluator, ProcessServices};
pub use crate::intrinsic::{Intrinsic, IntrinsicRequest, IntrinsicResponse};
pub use crate::memory::{MemoryReader, MemorySnapshot, ProcessMemory};
pub use crate::object::PyObject;
#[cfg(target_os = "linux")]
pub use crate::platform::LiveProcessMemory;
pub use crate::symbols::{DwarfSymbols, SymbolProvider};
pub use crate::types::address::Address;
pub use crate::types::process::{Architecture, ProcessId, StackFrame, ThreadId};
pub use crate::visualizer::Visualizer;
