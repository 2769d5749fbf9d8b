//! # Types
//!
//! Plain data exchanged between the host debugger and the visualizer.
//!
//! None of these types own debuggee resources; they only describe where a
//! value lives, how it should be evaluated, and what the host gets back.

pub mod address;
pub mod inspection;
pub mod process;
pub mod result;
pub mod value;

// Re-export all public types
pub use address::Address;
pub use inspection::{
    CompilerId, EvaluationFlags, FuncEvalFlags, InspectionContext, Language, RuntimeId, RuntimeInstance, SessionId,
};
pub use process::{Architecture, ProcessId, StackFrame, ThreadId};
pub use result::{
    EvaluationResult, FailedResult, ResultAccess, ResultCategory, ResultFlags, SuccessResult, PYTHON_VIEW_NAME,
    PYTHON_VIEW_UNAVAILABLE,
};
pub use value::{LexicalPosition, ValueHome, ValueOrigin, VisualizedValue};
