//! # Cross-Runtime Evaluation Context
//!
//! The host hands the visualizer an inspection context in the native language
//! of the frame. Evaluation of the Python view happens in the Python runtime,
//! so the visualizer derives a second context that keeps the caller's
//! evaluation policy and swaps the language.
//!
//! Derivation is a pure function; the result is built per request and dropped
//! with it.

use crate::types::{InspectionContext, Language, RuntimeInstance, SessionId, ThreadId};

/// Derive the Python-language context from the native `primary` context.
///
/// Copied from `primary`: timeout, evaluation flags, function-evaluation
/// flags and radix. Taken from the arguments: session, runtime and thread.
/// The language is always [`Language::PYTHON`].
///
/// Only call this once a runtime instance is known; there is no fallback
/// for a missing runtime.
///
/// ## Example
///
/// ```rust
/// use pyview_core::context::build_secondary_context;
/// use pyview_core::types::{InspectionContext, Language, ProcessId, RuntimeId, RuntimeInstance, SessionId, ThreadId};
///
/// let native = InspectionContext::native(SessionId(1), ThreadId(7));
/// let runtime = RuntimeInstance {
///     id: RuntimeId(3),
///     process: ProcessId(42),
/// };
///
/// let python = build_secondary_context(&native, SessionId(1), &runtime, ThreadId(7));
/// assert!(python.language.same_identity(&Language::PYTHON));
/// assert_eq!(python.timeout, native.timeout);
/// assert_eq!(python.runtime, Some(RuntimeId(3)));
/// ```
pub fn build_secondary_context(
    primary: &InspectionContext,
    session: SessionId,
    runtime: &RuntimeInstance,
    thread: ThreadId,
) -> InspectionContext
{
    InspectionContext {
        session,
        runtime: Some(runtime.id),
        thread,
        timeout: primary.timeout,
        evaluation_flags: primary.evaluation_flags,
        func_eval_flags: primary.func_eval_flags,
        radix: primary.radix,
        language: Language::PYTHON,
    }
}

#[cfg(test)]
mod tests
{
    use std::time::Duration;

    use super::*;
    use crate::types::{EvaluationFlags, FuncEvalFlags, ProcessId, RuntimeId};

    fn runtime() -> RuntimeInstance
    {
        RuntimeInstance {
            id: RuntimeId(9),
            process: ProcessId(100),
        }
    }

    #[test]
    fn test_policy_is_copied_verbatim()
    {
        let mut native = InspectionContext::native(SessionId(1), ThreadId(5));
        native.timeout = Duration::from_millis(1234);
        native.evaluation_flags = EvaluationFlags::NO_SIDE_EFFECTS | EvaluationFlags::HIDE_NON_PUBLIC_MEMBERS;
        native.func_eval_flags = FuncEvalFlags::RUN_ALL_THREADS;
        native.radix = 16;

        let python = build_secondary_context(&native, SessionId(1), &runtime(), ThreadId(5));

        assert_eq!(python.timeout, Duration::from_millis(1234));
        assert_eq!(python.evaluation_flags, native.evaluation_flags);
        assert_eq!(python.func_eval_flags, FuncEvalFlags::RUN_ALL_THREADS);
        assert_eq!(python.radix, 16);
    }

    #[test]
    fn test_language_and_runtime_are_replaced()
    {
        let native = InspectionContext::native(SessionId(1), ThreadId(5));
        let python = build_secondary_context(&native, SessionId(2), &runtime(), ThreadId(6));

        assert_eq!(python.language, Language::PYTHON);
        assert!(!python.language.same_identity(&native.language));
        assert_eq!(python.runtime, Some(RuntimeId(9)));
        assert_eq!(python.session, SessionId(2));
        assert_eq!(python.thread, ThreadId(6));
    }

    #[test]
    fn test_primary_is_untouched()
    {
        let native = InspectionContext::native(SessionId(1), ThreadId(5));
        let before = native.clone();
        let _ = build_secondary_context(&native, SessionId(1), &runtime(), ThreadId(5));
        assert_eq!(native, before);
    }
}
