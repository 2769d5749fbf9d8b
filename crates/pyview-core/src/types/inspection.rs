//! Inspection contexts and language identity.
//!
//! An [`InspectionContext`] carries the caller's evaluation policy (timeout,
//! flags, radix) together with the language the evaluation is performed in.
//! The visualizer receives one in the native language of the frame and derives
//! a second one in the Python language, see [`crate::context`].

use std::borrow::Cow;
use std::fmt;
use std::ops::BitOr;
use std::time::Duration;

use uuid::Uuid;

use super::{ProcessId, ThreadId};

/// Vendor id shared by the native and Python compiler identities.
pub const MICROSOFT_VENDOR_ID: Uuid = Uuid::from_u128(0x994b45c4_e6e9_11d2_903f_00c04fa302a1);

/// Language id of C++.
pub const CPP_LANGUAGE_ID: Uuid = Uuid::from_u128(0x3a12d0b7_c26c_11d0_b442_00a0244a1dd2);

/// Language id of Python.
pub const PYTHON_LANGUAGE_ID: Uuid = Uuid::from_u128(0xda3c7d59_f9e4_4697_bee7_3a0703af6bff);

/// Identity of the compiler (front end) that produced a frame's code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompilerId
{
    /// Vendor GUID
    pub vendor: Uuid,
    /// Language GUID
    pub language: Uuid,
}

/// A language an expression can be evaluated in.
///
/// Two languages are the same when their compiler ids match; the name is for
/// display only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Language
{
    /// Display name
    pub name: Cow<'static, str>,
    /// Compiler identity
    pub compiler: CompilerId,
}

impl Language
{
    /// The embedded interpreter's language.
    pub const PYTHON: Language = Language {
        name: Cow::Borrowed("Python"),
        compiler: CompilerId {
            vendor: MICROSOFT_VENDOR_ID,
            language: PYTHON_LANGUAGE_ID,
        },
    };

    /// The native language frames hosting the interpreter are usually written in.
    pub const CPP: Language = Language {
        name: Cow::Borrowed("C++"),
        compiler: CompilerId {
            vendor: MICROSOFT_VENDOR_ID,
            language: CPP_LANGUAGE_ID,
        },
    };

    /// Whether `self` and `other` identify the same compiler.
    pub fn same_identity(&self, other: &Language) -> bool
    {
        self.compiler == other.compiler
    }
}

impl fmt::Display for Language
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.name)
    }
}

/// Flags controlling how an expression is evaluated.
///
/// The visualizer never interprets these; it copies them from one context to
/// the next so the caller's policy survives the language switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EvaluationFlags(pub u32);

impl EvaluationFlags
{
    /// No flags.
    pub const NONE: Self = Self(0);
    /// Evaluate as an expression rather than a statement.
    pub const TREAT_AS_EXPRESSION: Self = Self(0x1);
    /// Reject evaluations with side effects.
    pub const NO_SIDE_EFFECTS: Self = Self(0x4);
    /// Hide non-public members.
    pub const HIDE_NON_PUBLIC_MEMBERS: Self = Self(0x200);

    /// Whether every bit in `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool
    {
        self.0 & other.0 == other.0
    }
}

impl BitOr for EvaluationFlags
{
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output
    {
        Self(self.0 | rhs.0)
    }
}

/// Flags controlling function evaluation (calls into the debuggee).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FuncEvalFlags(pub u32);

impl FuncEvalFlags
{
    /// No flags.
    pub const NONE: Self = Self(0);
    /// Run all threads during function evaluation.
    pub const RUN_ALL_THREADS: Self = Self(0x1);
}

/// Inspection session id. Sessions group evaluations of one debugger window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub u64);

/// Identifier of a runtime instance inside a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuntimeId(pub u64);

/// A loaded instance of the embedded interpreter.
///
/// The host reports one when it has recognized a compatible Python runtime
/// in the process; before that the visualizer does nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeInstance
{
    /// Runtime id, unique within the process
    pub id: RuntimeId,
    /// Process the runtime lives in
    pub process: ProcessId,
}

/// Evaluation policy and language for one inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectionContext
{
    /// Session the evaluation belongs to
    pub session: SessionId,
    /// Runtime the evaluation targets, `None` for the native runtime
    pub runtime: Option<RuntimeId>,
    /// Thread evaluations run on
    pub thread: ThreadId,
    /// Evaluation timeout
    pub timeout: Duration,
    /// Expression evaluation flags
    pub evaluation_flags: EvaluationFlags,
    /// Function evaluation flags
    pub func_eval_flags: FuncEvalFlags,
    /// Numeric radix for formatting (10 or 16)
    pub radix: u32,
    /// Language of the evaluation
    pub language: Language,
}

impl InspectionContext
{
    /// Default timeout the host uses for watch-window evaluations.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

    /// A native C++ context with default policy.
    pub fn native(session: SessionId, thread: ThreadId) -> Self
    {
        Self {
            session,
            runtime: None,
            thread,
            timeout: Self::DEFAULT_TIMEOUT,
            evaluation_flags: EvaluationFlags::TREAT_AS_EXPRESSION,
            func_eval_flags: FuncEvalFlags::NONE,
            radix: 10,
            language: Language::CPP,
        }
    }
}
