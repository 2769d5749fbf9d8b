//! Process, thread, and stack frame identity.

use std::fmt;

use super::Address;

/// Process identifier (PID)
///
/// The host debugger identifies the debuggee by PID; every per-process lookup
/// (loaded runtimes, cached evaluator services) is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(pub u32);

impl From<u32> for ProcessId
{
    fn from(pid: u32) -> Self
    {
        ProcessId(pid)
    }
}

impl From<ProcessId> for u32
{
    fn from(pid: ProcessId) -> Self
    {
        pid.0
    }
}

impl fmt::Display for ProcessId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}

/// Thread identifier
///
/// Stored as a `u64` so both kernel TIDs and host-assigned thread handles fit.
///
/// ```rust
/// use pyview_core::types::ThreadId;
///
/// let thread = ThreadId::from(12345);
/// assert_eq!(thread.raw(), 12345);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadId(pub u64);

impl ThreadId
{
    /// Get the raw `u64` representation of the thread identifier
    pub fn raw(&self) -> u64
    {
        self.0
    }
}

impl From<u64> for ThreadId
{
    fn from(value: u64) -> Self
    {
        Self(value)
    }
}

/// CPU architecture of the debuggee
///
/// The visualizer only needs the pointer width, which fixes every field
/// offset in the interpreter's object header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture
{
    /// 64-bit ARM
    Arm64,
    /// 64-bit x86 (Intel/AMD)
    X86_64,
    /// 32-bit ARM
    Arm,
    /// 32-bit x86
    X86,
    /// Any other architecture, assumed 64-bit
    ///
    /// The `&'static str` contains the architecture name (e.g., "riscv64").
    Unknown(&'static str),
}

impl Architecture
{
    /// Get the architecture of the currently running binary
    ///
    /// A reasonable default for the debuggee when the host does not say otherwise.
    pub const fn current() -> Self
    {
        #[cfg(target_arch = "aarch64")]
        {
            Architecture::Arm64
        }

        #[cfg(target_arch = "x86_64")]
        {
            Architecture::X86_64
        }

        #[cfg(target_arch = "arm")]
        {
            Architecture::Arm
        }

        #[cfg(target_arch = "x86")]
        {
            Architecture::X86
        }

        #[cfg(not(any(
            target_arch = "aarch64",
            target_arch = "x86_64",
            target_arch = "arm",
            target_arch = "x86"
        )))]
        {
            Architecture::Unknown(std::env::consts::ARCH)
        }
    }

    /// Size of a pointer in bytes for this architecture.
    #[must_use]
    pub const fn pointer_size_bytes(self) -> u8
    {
        match self {
            Architecture::Arm | Architecture::X86 => 4,
            Architecture::Arm64 | Architecture::X86_64 | Architecture::Unknown(_) => 8,
        }
    }
}

impl fmt::Display for Architecture
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            Architecture::Arm64 => write!(f, "arm64"),
            Architecture::X86_64 => write!(f, "x86_64"),
            Architecture::Arm => write!(f, "arm"),
            Architecture::X86 => write!(f, "x86"),
            Architecture::Unknown(name) => write!(f, "{name}"),
        }
    }
}

/// A stack frame selected in the host's UI
///
/// Identifies where an evaluation happens: which process, which thread, and
/// which frame on that thread's stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StackFrame
{
    /// Debuggee process
    pub process: ProcessId,
    /// Thread owning the frame
    pub thread: ThreadId,
    /// Zero-based depth, 0 being the innermost frame
    pub depth: u32,
    /// Current instruction address of the frame
    pub instruction: Address,
}

impl StackFrame
{
    /// Innermost frame of `thread`.
    pub const fn top(process: ProcessId, thread: ThreadId, instruction: Address) -> Self
    {
        Self {
            process,
            thread,
            depth: 0,
            instruction,
        }
    }
}
