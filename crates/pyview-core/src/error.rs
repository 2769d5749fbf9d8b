//! # Error Types
//!
//! Error handling for the visualizer.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.
//!
//! ## Boundary policy
//!
//! Only [`VisualizerError`] ever reaches the host. It signals a protocol
//! mismatch (the host called an operation this visualizer does not implement,
//! or asked for an intrinsic it does not know). Every other error type in this
//! module describes a runtime condition and is converted into the
//! "`[Python view]` unavailable" result at the point where it occurs.

use thiserror::Error;

use crate::types::Address;

/// Faults returned to the host debugger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VisualizerError
{
    /// The host invoked an operation this visualizer leaves to the
    /// declarative description (child enumeration, string get/set).
    ///
    /// The string names the operation.
    #[error("Operation not implemented: {0}")]
    NotImplemented(&'static str),

    /// The operation exists but cannot be carried out for this request.
    ///
    /// Raised by `get_default_behavior` when no view could be produced.
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// An intrinsic id outside the set this visualizer defines.
    #[error("Unknown intrinsic id {0}")]
    UnknownIntrinsic(u32),
}

/// Convenience type alias for `Result<T, VisualizerError>`
///
/// ```rust
/// use pyview_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, VisualizerError>;

/// Failure to read debuggee memory.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError
{
    /// Some byte in `[address, address + len)` could not be read.
    #[error("Unable to read {len} bytes at {address}")]
    Unreadable
    {
        /// First address of the failed read
        address: Address,
        /// Requested length
        len: usize,
    },

    /// The address range wraps around the end of the address space.
    #[error("Address range at {address} with length {len} overflows")]
    Overflow
    {
        /// First address of the failed read
        address: Address,
        /// Requested length
        len: usize,
    },

    /// The platform rejected the read outright (bad pid, no permission).
    #[error("Memory read failed: {0}")]
    Os(String),
}

/// The bytes at an address are not a well-formed interpreter object.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaterializeError
{
    /// The object header, type object or type name could not be read.
    #[error("Object at {address} is unreadable: {source}")]
    Unreadable
    {
        /// Address of the object being materialized
        address: Address,
        /// Underlying memory failure
        #[source]
        source: MemoryError,
    },

    /// Memory was readable but does not satisfy the object layout.
    #[error("Object at {address} is malformed: {reason}")]
    Malformed
    {
        /// Address of the object being materialized
        address: Address,
        /// Which layout check failed
        reason: String,
    },
}

impl MaterializeError
{
    pub(crate) fn malformed(address: Address, reason: impl Into<String>) -> Self
    {
        Self::Malformed {
            address,
            reason: reason.into(),
        }
    }
}

/// Failure inside the per-process expression evaluator service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError
{
    /// The native evaluation engine could not be created for this frame.
    #[error("Native evaluator unavailable: {0}")]
    EvaluatorUnavailable(String),

    /// The evaluation exceeded the inspection context's timeout.
    #[error("Evaluation timed out")]
    Timeout,

    /// Any other failure while producing the renderable result.
    #[error("Evaluation failed: {0}")]
    Failed(String),
}

/// Failure while loading or walking debug information.
#[derive(Error, Debug)]
pub enum SymbolError
{
    /// The image file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The image is not a recognized object file.
    #[error("Failed to parse object file: {0}")]
    Object(String),

    /// Malformed DWARF.
    #[error("DWARF error while {context}: {source}")]
    Dwarf
    {
        /// What was being read when the error occurred
        context: &'static str,
        /// Underlying gimli error
        #[source]
        source: gimli::Error,
    },
}

impl SymbolError
{
    pub(crate) fn dwarf(context: &'static str) -> impl FnOnce(gimli::Error) -> Self
    {
        move |source| Self::Dwarf { context, source }
    }
}
