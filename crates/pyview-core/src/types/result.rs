//! Evaluation results returned to the host.

use super::{Address, InspectionContext, StackFrame};

/// Label of the node this visualizer produces.
pub const PYTHON_VIEW_NAME: &str = "[Python view]";

/// Message shown when no Python view can be produced.
pub const PYTHON_VIEW_UNAVAILABLE: &str = "Python view is unavailable for this object";

/// Presentation category of a result node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCategory
{
    /// Regular data value
    Data,
    /// Synthesized property
    Property,
    /// Other / unknown
    Other,
}

/// Access level shown next to a result node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultAccess
{
    /// No access decoration
    None,
    /// Public member
    Public,
    /// Private member
    Private,
}

/// Flags attached to a result node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ResultFlags(pub u32);

impl ResultFlags
{
    /// No flags.
    pub const NONE: Self = Self(0);
    /// The node can be expanded.
    pub const EXPANDABLE: Self = Self(0x1);
    /// The node does not represent a valid value.
    pub const INVALID: Self = Self(0x8);

    /// Whether every bit in `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool
    {
        self.0 & other.0 == other.0
    }
}

/// A rendered node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessResult
{
    /// Node label
    pub name: String,
    /// Formatted value
    pub value: String,
    /// Type shown in the type column
    pub type_name: Option<String>,
    /// Address of the object the node renders, if it renders one
    pub address: Option<Address>,
    /// Presentation category
    pub category: ResultCategory,
    /// Access decoration
    pub access: ResultAccess,
    /// Result flags
    pub flags: ResultFlags,
    /// Context the node was evaluated in; children are evaluated in it too
    pub context: InspectionContext,
    /// Frame the node was evaluated in
    pub frame: StackFrame,
}

/// A node explaining why no value could be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedResult
{
    /// Node label
    pub name: String,
    /// Human readable explanation, never empty
    pub message: String,
    /// Result flags, always including [`ResultFlags::INVALID`]
    pub flags: ResultFlags,
    /// Context of the request
    pub context: InspectionContext,
    /// Frame of the request
    pub frame: StackFrame,
}

impl FailedResult
{
    /// The fixed "`[Python view]` unavailable" node.
    pub fn python_view_unavailable(context: InspectionContext, frame: StackFrame) -> Self
    {
        Self {
            name: PYTHON_VIEW_NAME.to_string(),
            message: PYTHON_VIEW_UNAVAILABLE.to_string(),
            flags: ResultFlags::INVALID,
            context,
            frame,
        }
    }
}

/// Exactly one of these is produced per evaluation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvaluationResult
{
    /// The value was rendered.
    Success(SuccessResult),
    /// The value could not be rendered.
    Failed(FailedResult),
}

impl EvaluationResult
{
    /// Node label.
    pub fn name(&self) -> &str
    {
        match self {
            EvaluationResult::Success(result) => &result.name,
            EvaluationResult::Failed(result) => &result.name,
        }
    }

    /// Whether this is a rendered node.
    pub fn is_success(&self) -> bool
    {
        matches!(self, EvaluationResult::Success(_))
    }

    /// Context the node belongs to.
    pub fn context(&self) -> &InspectionContext
    {
        match self {
            EvaluationResult::Success(result) => &result.context,
            EvaluationResult::Failed(result) => &result.context,
        }
    }
}
