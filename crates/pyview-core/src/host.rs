//! # Host Collaborators
//!
//! Everything the visualizer needs from the debugger that hosts it.
//!
//! The host owns runtime detection, the per-process expression evaluator
//! service, display options and the diagnostics channel. The visualizer only
//! reads through these traits and never keeps anything it gets back beyond
//! one request.
//!
//! ## Traits
//!
//! - [`ProcessServices`]: runtime instance and evaluator service per process
//! - [`ExpressionEvaluator`]: the bridge that turns a materialized object into
//!   a renderable result
//! - [`NativeEvaluator`]: native evaluation engine handed to the bridge
//! - [`DisplayOptions`]: the global "show view nodes" flag
//! - [`Diagnostics`]: engineering diagnostics for unexpected input shapes

use std::fmt;
use std::sync::Arc;

use pyview_utils::DebuggerOptions;
use tracing::error;

use crate::error::BridgeError;
use crate::object::PyObject;
use crate::types::{
    EvaluationResult, InspectionContext, ProcessId, ResultAccess, ResultCategory, RuntimeInstance, StackFrame,
    PYTHON_VIEW_NAME,
};

/// Per-process services tracked by the host.
pub trait ProcessServices: Send + Sync
{
    /// The Python runtime loaded in `process`, if the host has seen one.
    fn runtime_instance(&self, process: ProcessId) -> Option<RuntimeInstance>;

    /// The evaluator service cached for `process`.
    fn expression_evaluator(&self, process: ProcessId) -> Option<Arc<dyn ExpressionEvaluator>>;
}

/// Native evaluation engine for one frame.
///
/// The Python evaluator falls back to it for the native members of an
/// object (the C struct fields behind a `PyObject *`).
pub trait NativeEvaluator: Send + Sync
{
    /// Evaluate a native expression in the frame this evaluator was made for.
    ///
    /// ## Errors
    ///
    /// Any [`BridgeError`]; the caller renders it, the visualizer never sees it.
    fn evaluate(&self, expression: &str) -> Result<EvaluationResult, BridgeError>;
}

/// The Python expression evaluator service of one process.
pub trait ExpressionEvaluator: Send + Sync
{
    /// Native evaluator for `frame` under the native `context`.
    ///
    /// ## Errors
    ///
    /// Any [`BridgeError`]; the visualizer turns it into "unavailable".
    fn native_evaluator(
        &self,
        context: &InspectionContext,
        frame: &StackFrame,
    ) -> Result<Arc<dyn NativeEvaluator>, BridgeError>;

    /// Build the renderable result for a materialized object.
    ///
    /// ## Errors
    ///
    /// Any [`BridgeError`]; the visualizer turns it into "unavailable".
    fn create_object_result(&self, request: ObjectResultRequest) -> Result<EvaluationResult, BridgeError>;
}

/// The wrapped view of a materialized object passed to the bridge.
#[derive(Debug, Clone)]
pub struct ObjectView
{
    /// Display name of the node
    pub name: String,
    /// Object the node shows
    pub object: PyObject,
    /// Node category
    pub category: ResultCategory,
    /// Node access
    pub access: ResultAccess,
}

impl ObjectView
{
    /// The `[Python view]` property node for `object`.
    pub fn python_view(object: PyObject) -> Self
    {
        Self {
            name: PYTHON_VIEW_NAME.to_string(),
            object,
            category: ResultCategory::Property,
            access: ResultAccess::Private,
        }
    }
}

/// Everything the bridge needs to render one object.
#[derive(Clone)]
pub struct ObjectResultRequest
{
    /// Python-language context derived from the caller's native context
    pub context: InspectionContext,
    /// Frame the value was inspected in
    pub frame: StackFrame,
    /// Parent result; the view node is attached by the host, so always `None`
    pub parent: Option<EvaluationResult>,
    /// Wrapped object view
    pub view: ObjectView,
    /// Native engine for the native members
    pub native_evaluator: Arc<dyn NativeEvaluator>,
    /// Native type name of the value, when known
    pub type_name: Option<String>,
    /// Whether the host already shows a native view of the value
    pub has_native_view: bool,
}

impl fmt::Debug for ObjectResultRequest
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("ObjectResultRequest")
            .field("context", &self.context)
            .field("frame", &self.frame)
            .field("parent", &self.parent)
            .field("view", &self.view)
            .field("type_name", &self.type_name)
            .field("has_native_view", &self.has_native_view)
            .finish_non_exhaustive()
    }
}

/// Read-only display options.
pub trait DisplayOptions: Send + Sync
{
    /// Whether native objects get an extra `[Python view]` child node.
    fn show_python_view_nodes(&self) -> bool;
}

impl DisplayOptions for DebuggerOptions
{
    fn show_python_view_nodes(&self) -> bool
    {
        DebuggerOptions::show_python_view_nodes(self)
    }
}

/// [`DisplayOptions`] backed by [`DebuggerOptions::global`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalOptions;

impl DisplayOptions for GlobalOptions
{
    fn show_python_view_nodes(&self) -> bool
    {
        DebuggerOptions::global().show_python_view_nodes()
    }
}

/// Sink for engineering diagnostics.
///
/// A report means the host handed over input the visualizer was not built
/// for. It is never shown to the user.
pub trait Diagnostics: Send + Sync
{
    /// Record one diagnostic.
    fn report(&self, message: &str);
}

/// [`Diagnostics`] that logs every report at `error` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics
{
    fn report(&self, message: &str)
    {
        error!(target: "pyview::diagnostics", "{message}");
    }
}
