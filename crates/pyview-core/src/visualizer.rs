//! # Visualizer
//!
//! The surface the host debugger calls for a native value that may be a
//! Python object.
//!
//! ## Pipeline
//!
//! [`Visualizer::evaluate`] runs each request through the same steps and
//! stops at the first one that cannot complete:
//!
//! 1. **Gate**: the process must have a Python runtime loaded.
//! 2. **Location**: the value must live at a direct address. A null address
//!    means the object does not exist yet and ends the request silently; any
//!    other kind of location is reported to [`Diagnostics`].
//! 3. **Service**: the process must have an [`ExpressionEvaluator`]. A
//!    missing service with a loaded runtime is reported to [`Diagnostics`].
//! 4. **Type name**: best effort, see [`resolve_type_name`].
//! 5. **Materialize**: [`PyObject::from_address`] must accept the bytes.
//! 6. **Context**: [`build_secondary_context`].
//! 7. **Bridge**: the evaluator builds the final result.
//!
//! Failure at any step yields the `[Python view]` failed result. Nothing
//! partial is ever returned and nothing is kept between requests.
//!
//! ## Unsupported operations
//!
//! Child enumeration and string get/set are left to the declarative
//! description the host loads next to this visualizer. Calling them is a
//! protocol mismatch and fails with [`VisualizerError::NotImplemented`].

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::context::build_secondary_context;
use crate::error::{Result, VisualizerError};
use crate::host::{
    Diagnostics, DisplayOptions, ExpressionEvaluator, GlobalOptions, ObjectResultRequest, ObjectView, ProcessServices,
    TracingDiagnostics,
};
use crate::intrinsic::{Intrinsic, IntrinsicRequest, IntrinsicResponse};
use crate::object::PyObject;
use crate::symbols::{resolve_type_name, NoSymbols, SymbolProvider};
use crate::types::{Address, EvaluationResult, FailedResult, InspectionContext, ValueHome, VisualizedValue};

/// Python view visualizer for native values.
///
/// Holds only shared, read-only collaborators; one instance can serve
/// concurrent requests from every evaluation thread.
#[derive(Clone)]
pub struct Visualizer
{
    services: Arc<dyn ProcessServices>,
    symbols: Arc<dyn SymbolProvider>,
    options: Arc<dyn DisplayOptions>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl fmt::Debug for Visualizer
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("Visualizer")
            .field("show_python_view_nodes", &self.options.show_python_view_nodes())
            .finish_non_exhaustive()
    }
}

impl Visualizer
{
    /// Start configuring a visualizer over the host's `services`.
    pub fn builder(services: Arc<dyn ProcessServices>) -> VisualizerBuilder
    {
        VisualizerBuilder::new(services)
    }

    /// Produce the `[Python view]` node for `value`.
    ///
    /// Always returns a result: the rendered view, or the failed result
    /// named `[Python view]` whose message says the view is unavailable.
    pub fn evaluate(&self, value: &VisualizedValue) -> EvaluationResult
    {
        self.render(value).unwrap_or_else(|| {
            EvaluationResult::Failed(FailedResult::python_view_unavailable(value.context.clone(), value.frame))
        })
    }

    /// The host shows its default rendering of `value` plus this result.
    ///
    /// Returns `(true, result)`.
    ///
    /// ## Errors
    ///
    /// `NotSupported` when no `[Python view]` could be produced.
    pub fn get_default_behavior(&self, value: &VisualizedValue) -> Result<(bool, EvaluationResult)>
    {
        match self.render(value) {
            Some(result) => Ok((true, result)),
            None => Err(VisualizerError::NotSupported(format!(
                "no Python view for value at {:?}",
                value.home
            ))),
        }
    }

    /// Not implemented; children come from the declarative description.
    ///
    /// ## Errors
    ///
    /// Always `NotImplemented`.
    pub fn get_children(&self, _value: &VisualizedValue, _initial_request_size: usize) -> Result<Vec<EvaluationResult>>
    {
        Err(VisualizerError::NotImplemented("get_children"))
    }

    /// Not implemented; children come from the declarative description.
    ///
    /// ## Errors
    ///
    /// Always `NotImplemented`.
    pub fn get_items(&self, _value: &VisualizedValue, _start: usize, _count: usize) -> Result<Vec<EvaluationResult>>
    {
        Err(VisualizerError::NotImplemented("get_items"))
    }

    /// Not implemented.
    ///
    /// ## Errors
    ///
    /// Always `NotImplemented`.
    pub fn get_underlying_string(&self, _value: &VisualizedValue) -> Result<String>
    {
        Err(VisualizerError::NotImplemented("get_underlying_string"))
    }

    /// Not implemented; the view is read-only.
    ///
    /// ## Errors
    ///
    /// Always `NotImplemented`.
    pub fn set_value_as_string(&self, _value: &VisualizedValue, _text: &str) -> Result<()>
    {
        Err(VisualizerError::NotImplemented("set_value_as_string"))
    }

    /// Answer an intrinsic call.
    ///
    /// [`Intrinsic::ShowPythonViewNodes`] replies with byte `1` when the
    /// calling process has a Python runtime loaded and the display option
    /// is on, `0` otherwise. Arguments are ignored.
    ///
    /// ## Errors
    ///
    /// `UnknownIntrinsic` for any other id.
    pub fn execute_intrinsic(&self, request: &IntrinsicRequest) -> Result<IntrinsicResponse>
    {
        match Intrinsic::try_from(request.id)? {
            Intrinsic::ShowPythonViewNodes => {
                let loaded = self.services.runtime_instance(request.frame.process).is_some();
                let show = loaded && self.options.show_python_view_nodes();
                trace!("show Python view nodes for {}: {show}", request.frame.process);
                Ok(IntrinsicResponse::flag(request.source_id, show))
            }
        }
    }

    fn render(&self, value: &VisualizedValue) -> Option<EvaluationResult>
    {
        let process = value.process.id();

        let Some(runtime) = self.services.runtime_instance(process) else {
            trace!("no Python runtime in process {process}");
            return None;
        };

        let address = self.object_address(value)?;

        let Some(evaluator) = self.services.expression_evaluator(process) else {
            self.report(&format!("process {process} has a Python runtime but no expression evaluator"));
            return None;
        };

        let type_name = resolve_type_name(value, self.symbols.as_ref());

        let object = match PyObject::from_address(&value.process, address) {
            Ok(Some(object)) => object,
            Ok(None) => return None,
            Err(err) => {
                debug!("not a Python object: {err}");
                return None;
            }
        };
        trace!("materialized {} at {address}", object.type_name());

        let context = build_secondary_context(&value.context, value.context.session, &runtime, value.frame.thread);

        self.bridge(evaluator.as_ref(), value, object, context, type_name)
    }

    fn object_address(&self, value: &VisualizedValue) -> Option<Address>
    {
        match &value.home {
            ValueHome::Pointer(address) if address.is_null() => None,
            ValueHome::Pointer(address) => Some(*address),
            ValueHome::Other(kind) => {
                self.report(&format!("expected a pointer value home, got {kind}"));
                None
            }
        }
    }

    fn bridge(
        &self,
        evaluator: &dyn ExpressionEvaluator,
        value: &VisualizedValue,
        object: PyObject,
        context: InspectionContext,
        type_name: Option<String>,
    ) -> Option<EvaluationResult>
    {
        let native_evaluator = match evaluator.native_evaluator(&value.context, &value.frame) {
            Ok(native) => native,
            Err(err) => {
                debug!("native evaluator unavailable: {err}");
                return None;
            }
        };

        let request = ObjectResultRequest {
            context,
            frame: value.frame,
            parent: None,
            view: ObjectView::python_view(object),
            native_evaluator,
            type_name,
            has_native_view: true,
        };

        match evaluator.create_object_result(request) {
            Ok(result) => Some(result),
            Err(err) => {
                debug!("Python view bridge failed: {err}");
                None
            }
        }
    }

    fn report(&self, message: &str)
    {
        self.diagnostics.report(message);
    }
}

/// Builder for [`Visualizer`].
///
/// Defaults: no debug symbols, the global [`DebuggerOptions`] and
/// diagnostics logged through `tracing`.
///
/// [`DebuggerOptions`]: pyview_utils::DebuggerOptions
///
/// ## Example
///
/// ```rust,no_run
/// use std::sync::Arc;
///
/// use pyview_core::host::ProcessServices;
/// use pyview_core::symbols::DwarfSymbols;
/// use pyview_core::visualizer::Visualizer;
///
/// # fn services() -> Arc<dyn ProcessServices> { unimplemented!() }
/// let visualizer = Visualizer::builder(services())
///     .with_symbols(Arc::new(DwarfSymbols::open("/usr/lib/libpython3.12.so.1.0")))
///     .build();
/// ```
pub struct VisualizerBuilder
{
    services: Arc<dyn ProcessServices>,
    symbols: Option<Arc<dyn SymbolProvider>>,
    options: Option<Arc<dyn DisplayOptions>>,
    diagnostics: Option<Arc<dyn Diagnostics>>,
}

impl fmt::Debug for VisualizerBuilder
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("VisualizerBuilder")
            .field("symbols", &self.symbols.is_some())
            .field("options", &self.options.is_some())
            .field("diagnostics", &self.diagnostics.is_some())
            .finish_non_exhaustive()
    }
}

impl VisualizerBuilder
{
    /// Builder over the host's `services`.
    pub fn new(services: Arc<dyn ProcessServices>) -> Self
    {
        Self {
            services,
            symbols: None,
            options: None,
            diagnostics: None,
        }
    }

    /// Look up root values' types in `symbols`.
    #[must_use]
    pub fn with_symbols(mut self, symbols: Arc<dyn SymbolProvider>) -> Self
    {
        self.symbols = Some(symbols);
        self
    }

    /// Read display options from `options`.
    #[must_use]
    pub fn with_options(mut self, options: Arc<dyn DisplayOptions>) -> Self
    {
        self.options = Some(options);
        self
    }

    /// Send diagnostics to `diagnostics`.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self
    {
        self.diagnostics = Some(diagnostics);
        self
    }

    /// Finish.
    pub fn build(self) -> Visualizer
    {
        Visualizer {
            services: self.services,
            symbols: self.symbols.unwrap_or_else(|| Arc::new(NoSymbols)),
            options: self.options.unwrap_or_else(|| Arc::new(GlobalOptions)),
            diagnostics: self.diagnostics.unwrap_or_else(|| Arc::new(TracingDiagnostics)),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::types::{ProcessId, RuntimeInstance};

    struct Empty;

    impl ProcessServices for Empty
    {
        fn runtime_instance(&self, _process: ProcessId) -> Option<RuntimeInstance>
        {
            None
        }

        fn expression_evaluator(&self, _process: ProcessId) -> Option<Arc<dyn ExpressionEvaluator>>
        {
            None
        }
    }

    #[test]
    fn test_builder_defaults()
    {
        let builder = Visualizer::builder(Arc::new(Empty));
        assert!(format!("{builder:?}").contains("symbols: false"));
        let visualizer = builder.build();
        assert!(format!("{visualizer:?}").starts_with("Visualizer"));
    }
}
