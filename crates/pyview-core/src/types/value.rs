//! Values handed to the visualizer by the host.

use super::{Address, InspectionContext, StackFrame};
use crate::memory::ProcessMemory;

/// Where a value is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueHome
{
    /// The value lives at a fixed address in debuggee memory.
    Pointer(Address),
    /// Any other storage (register, computed expression, ...).
    ///
    /// The string names the storage kind for diagnostics.
    Other(String),
}

/// Source position of a variable, used to find its declared type in the
/// debug information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalPosition
{
    /// Instruction address inside the scope that declares the variable,
    /// relative to the image's preferred load address
    pub instruction: Address,
    /// Variable name as declared
    pub variable: String,
}

/// How the host arrived at a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueOrigin
{
    /// A child node expanded from an already evaluated parent. Carries the
    /// type string that evaluation reported, if it succeeded.
    Child
    {
        /// Type reported by the parent's evaluation result
        result_type: Option<String>,
    },
    /// A root expression; its type comes from debug symbols.
    Root
    {
        /// Where the expression's variable is declared, when known
        position: Option<LexicalPosition>,
    },
}

/// A value the host asks the visualizer to render.
#[derive(Debug, Clone)]
pub struct VisualizedValue
{
    /// Process handle, used for memory reads
    pub process: ProcessMemory,
    /// Frame the value was evaluated in
    pub frame: StackFrame,
    /// Caller's inspection context (native language)
    pub context: InspectionContext,
    /// Storage of the value
    pub home: ValueHome,
    /// How the value was produced
    pub origin: ValueOrigin,
}
