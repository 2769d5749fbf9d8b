//! # Linux Live-Process Memory
//!
//! Reads another process's memory with `process_vm_readv(2)`.
//!
//! The call needs the same permission as `ptrace` attach: either the caller
//! is the tracer of the target, or `/proc/sys/kernel/yama/ptrace_scope`
//! allows it. The target does not have to be stopped, but reads from a
//! running process can observe torn objects; the object layout checks
//! reject most of those.

use std::io;

use libc::{c_void, iovec, pid_t};

use crate::error::MemoryError;
use crate::memory::MemoryReader;
use crate::types::{Address, ProcessId};

/// [`MemoryReader`] for a running process on the local machine.
#[derive(Debug, Clone, Copy)]
pub struct LiveProcessMemory
{
    pid: ProcessId,
}

impl LiveProcessMemory
{
    /// Reader for `pid`. Nothing is checked until the first read.
    pub fn new(pid: ProcessId) -> Self
    {
        Self { pid }
    }
}

impl MemoryReader for LiveProcessMemory
{
    fn read_exact(&self, address: Address, buf: &mut [u8]) -> Result<(), MemoryError>
    {
        if buf.is_empty() {
            return Ok(());
        }

        let pid = pid_t::try_from(self.pid.0).map_err(|_| MemoryError::Os(format!("invalid pid {}", self.pid)))?;
        let remote_base = usize::try_from(address.value()).map_err(|_| MemoryError::Overflow {
            address,
            len: buf.len(),
        })?;

        let local = iovec {
            iov_base: buf.as_mut_ptr().cast::<c_void>(),
            iov_len: buf.len(),
        };
        let remote = iovec {
            iov_base: remote_base as *mut c_void,
            iov_len: buf.len(),
        };

        // SAFETY: `local` describes exactly `buf`, which is exclusively borrowed
        // for the duration of the call. `remote` is only dereferenced by the
        // kernel inside the target's address space.
        let read = unsafe { libc::process_vm_readv(pid, &local, 1, &remote, 1, 0) };

        if read < 0 {
            let err = io::Error::last_os_error();
            return match err.raw_os_error() {
                Some(libc::EFAULT) | Some(libc::EIO) => Err(MemoryError::Unreadable {
                    address,
                    len: buf.len(),
                }),
                _ => Err(MemoryError::Os(format!("process_vm_readv on pid {}: {err}", self.pid))),
            };
        }

        // Partial transfers stop at the first unreadable page.
        if read as usize != buf.len() {
            return Err(MemoryError::Unreadable {
                address,
                len: buf.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    // Sandboxes may forbid process_vm_readv entirely; that shows up as `Os`.
    #[test]
    fn test_reads_own_memory()
    {
        let secret: u64 = 0x5079_7669_6577_2121;
        let reader = LiveProcessMemory::new(ProcessId(std::process::id()));
        let mut buf = [0u8; 8];
        match reader.read_exact(Address::new(std::ptr::addr_of!(secret) as u64), &mut buf) {
            Ok(()) => assert_eq!(u64::from_le_bytes(buf), secret),
            Err(MemoryError::Os(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_null_page_is_unreadable()
    {
        let reader = LiveProcessMemory::new(ProcessId(std::process::id()));
        let mut buf = [0u8; 8];
        let err = reader.read_exact(Address::new(0x10), &mut buf).unwrap_err();
        assert!(matches!(err, MemoryError::Unreadable { .. } | MemoryError::Os(_)));
    }
}
