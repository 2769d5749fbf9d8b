//! # Debuggee Memory
//!
//! Read access to the address space of the process being debugged.
//!
//! The host owns the actual connection to the debuggee (it may even be
//! remote), so memory access sits behind the [`MemoryReader`] trait. Two
//! implementations ship with the crate:
//!
//! - [`MemorySnapshot`]: a set of captured regions, for crash dumps and tests
//! - `LiveProcessMemory` (Linux): reads a running process directly
//!
//! All multi-byte values are little-endian, matching every architecture in
//! [`Architecture`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::MemoryError;
use crate::types::{Address, Architecture, ProcessId};

/// Granularity of memory protection; string reads never cross it in one call.
const PAGE_SIZE: u64 = 0x1000;

/// Synchronous reads from debuggee memory.
///
/// Implementations must be usable from several evaluation threads at once.
pub trait MemoryReader: Send + Sync
{
    /// Fill `buf` with the bytes at `address`.
    ///
    /// ## Errors
    ///
    /// - `Unreadable`: any byte of the range is not mapped or not readable.
    ///   A short read is reported as `Unreadable`, never as success.
    /// - `Os`: the platform refused the read.
    fn read_exact(&self, address: Address, buf: &mut [u8]) -> Result<(), MemoryError>;
}

/// Handle to a debuggee process: identity, pointer width and memory access.
///
/// Cloning is cheap; the reader is shared.
#[derive(Clone)]
pub struct ProcessMemory
{
    id: ProcessId,
    architecture: Architecture,
    reader: Arc<dyn MemoryReader>,
}

impl fmt::Debug for ProcessMemory
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.debug_struct("ProcessMemory")
            .field("id", &self.id)
            .field("architecture", &self.architecture)
            .finish_non_exhaustive()
    }
}

impl ProcessMemory
{
    /// Wrap a reader for process `id`.
    pub fn new(id: ProcessId, architecture: Architecture, reader: Arc<dyn MemoryReader>) -> Self
    {
        Self {
            id,
            architecture,
            reader,
        }
    }

    /// Process id.
    pub fn id(&self) -> ProcessId
    {
        self.id
    }

    /// Debuggee architecture.
    pub fn architecture(&self) -> Architecture
    {
        self.architecture
    }

    /// Pointer width in bytes.
    pub fn pointer_size(&self) -> u64
    {
        u64::from(self.architecture.pointer_size_bytes())
    }

    /// Fill `buf` with the bytes at `address`.
    ///
    /// ## Errors
    ///
    /// See [`MemoryReader::read_exact`].
    pub fn read_exact(&self, address: Address, buf: &mut [u8]) -> Result<(), MemoryError>
    {
        if address.checked_add(buf.len() as u64).is_none() {
            return Err(MemoryError::Overflow {
                address,
                len: buf.len(),
            });
        }
        self.reader.read_exact(address, buf)
    }

    /// Read a pointer-sized unsigned value.
    ///
    /// ## Errors
    ///
    /// See [`MemoryReader::read_exact`].
    pub fn read_pointer(&self, address: Address) -> Result<Address, MemoryError>
    {
        if self.pointer_size() == 4 {
            let mut raw = [0u8; 4];
            self.read_exact(address, &mut raw)?;
            Ok(Address::new(u64::from(u32::from_le_bytes(raw))))
        } else {
            let mut raw = [0u8; 8];
            self.read_exact(address, &mut raw)?;
            Ok(Address::new(u64::from_le_bytes(raw)))
        }
    }

    /// Read a pointer-sized signed value (`Py_ssize_t`).
    ///
    /// ## Errors
    ///
    /// See [`MemoryReader::read_exact`].
    pub fn read_ssize(&self, address: Address) -> Result<i64, MemoryError>
    {
        if self.pointer_size() == 4 {
            let mut raw = [0u8; 4];
            self.read_exact(address, &mut raw)?;
            Ok(i64::from(i32::from_le_bytes(raw)))
        } else {
            let mut raw = [0u8; 8];
            self.read_exact(address, &mut raw)?;
            Ok(i64::from_le_bytes(raw))
        }
    }

    /// Read bytes up to (not including) a NUL terminator.
    ///
    /// Returns `Ok(None)` when no terminator occurs within `max_len` bytes.
    /// Reads whole chunks that never cross a page boundary. When a chunk is
    /// unreadable it is rescanned byte by byte, so a string ending right
    /// before an unmapped range is still found.
    ///
    /// ## Errors
    ///
    /// See [`MemoryReader::read_exact`].
    pub fn read_c_string(&self, address: Address, max_len: usize) -> Result<Option<Vec<u8>>, MemoryError>
    {
        let limit = max_len + 1;
        let mut bytes = Vec::new();
        let mut cursor = address;
        while bytes.len() < limit {
            let to_page_end = PAGE_SIZE - cursor.value() % PAGE_SIZE;
            let len = (to_page_end as usize).min(limit - bytes.len());
            let mut chunk = vec![0u8; len];
            match self.read_exact(cursor, &mut chunk) {
                Ok(()) => {}
                Err(MemoryError::Unreadable { .. }) => return self.read_c_string_bytewise(cursor, bytes, len),
                Err(err) => return Err(err),
            }
            if let Some(nul) = chunk.iter().position(|&byte| byte == 0) {
                bytes.extend_from_slice(&chunk[..nul]);
                return Ok(Some(bytes));
            }
            bytes.extend_from_slice(&chunk);
            cursor = cursor + len as u64;
        }
        Ok(None)
    }

    /// Finish a [`read_c_string`](Self::read_c_string) one byte at a time
    /// within a chunk that failed as a whole. The terminator must occur
    /// inside those `len` bytes, otherwise the failing read is the error.
    fn read_c_string_bytewise(
        &self,
        mut cursor: Address,
        mut bytes: Vec<u8>,
        len: usize,
    ) -> Result<Option<Vec<u8>>, MemoryError>
    {
        for _ in 0..len {
            let mut byte = [0u8; 1];
            self.read_exact(cursor, &mut byte)?;
            if byte[0] == 0 {
                return Ok(Some(bytes));
            }
            bytes.push(byte[0]);
            cursor = cursor + 1;
        }
        // The chunk read failed, so some byte in it is unreadable.
        Err(MemoryError::Unreadable { address: cursor, len: 1 })
    }
}

/// Captured regions of a process's memory.
///
/// Reads may span adjacent regions but fail on any gap.
///
/// ## Example
///
/// ```rust
/// use pyview_core::memory::{MemoryReader, MemorySnapshot};
/// use pyview_core::types::Address;
///
/// let mut snapshot = MemorySnapshot::new();
/// snapshot.insert(Address::new(0x1000), vec![1, 2, 3, 4]);
///
/// let mut buf = [0u8; 2];
/// snapshot.read_exact(Address::new(0x1002), &mut buf).unwrap();
/// assert_eq!(buf, [3, 4]);
/// assert!(snapshot.read_exact(Address::new(0x1003), &mut buf).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshot
{
    regions: BTreeMap<u64, Vec<u8>>,
}

impl MemorySnapshot
{
    /// An empty snapshot; every read fails.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Add a region starting at `start`. A region starting at the same
    /// address is replaced.
    pub fn insert(&mut self, start: Address, bytes: Vec<u8>)
    {
        self.regions.insert(start.value(), bytes);
    }

    /// Write `bytes` into already captured memory, growing nothing.
    ///
    /// ## Errors
    ///
    /// `Unreadable` if the range is not fully covered by existing regions.
    pub fn patch(&mut self, address: Address, bytes: &[u8]) -> Result<(), MemoryError>
    {
        // Check coverage first so a failed patch leaves the snapshot untouched.
        let mut scratch = vec![0u8; bytes.len()];
        self.read_exact(address, &mut scratch)?;

        let mut cursor = address.value();
        let mut written = 0usize;
        while written < bytes.len() {
            let Some((start, region)) = self.regions.range_mut(..=cursor).next_back() else {
                break;
            };
            let offset = (cursor - *start) as usize;
            let chunk = (region.len() - offset).min(bytes.len() - written);
            region[offset..offset + chunk].copy_from_slice(&bytes[written..written + chunk]);
            written += chunk;
            cursor += chunk as u64;
        }
        Ok(())
    }
}

impl MemoryReader for MemorySnapshot
{
    fn read_exact(&self, address: Address, buf: &mut [u8]) -> Result<(), MemoryError>
    {
        let len = buf.len();
        let unreadable = || MemoryError::Unreadable { address, len };
        let mut cursor = address.value();
        let mut filled = 0usize;
        while filled < len {
            let (start, region) = self.regions.range(..=cursor).next_back().ok_or_else(unreadable)?;
            let offset = usize::try_from(cursor - *start).map_err(|_| unreadable())?;
            if offset >= region.len() {
                return Err(unreadable());
            }
            let chunk = (region.len() - offset).min(len - filled);
            buf[filled..filled + chunk].copy_from_slice(&region[offset..offset + chunk]);
            filled += chunk;
            cursor += chunk as u64;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn process(snapshot: MemorySnapshot, architecture: Architecture) -> ProcessMemory
    {
        ProcessMemory::new(ProcessId(1), architecture, Arc::new(snapshot))
    }

    #[test]
    fn test_read_spans_adjacent_regions()
    {
        let mut snapshot = MemorySnapshot::new();
        snapshot.insert(Address::new(0x1000), vec![0xaa; 4]);
        snapshot.insert(Address::new(0x1004), vec![0xbb; 4]);

        let mut buf = [0u8; 6];
        snapshot.read_exact(Address::new(0x1001), &mut buf).unwrap();
        assert_eq!(buf, [0xaa, 0xaa, 0xaa, 0xbb, 0xbb, 0xbb]);
    }

    #[test]
    fn test_read_fails_on_gap()
    {
        let mut snapshot = MemorySnapshot::new();
        snapshot.insert(Address::new(0x1000), vec![0; 4]);
        snapshot.insert(Address::new(0x1008), vec![0; 4]);

        let mut buf = [0u8; 8];
        let err = snapshot.read_exact(Address::new(0x1000), &mut buf).unwrap_err();
        assert_eq!(
            err,
            MemoryError::Unreadable {
                address: Address::new(0x1000),
                len: 8
            }
        );
    }

    #[test]
    fn test_read_running_off_last_region_fails()
    {
        let mut snapshot = MemorySnapshot::new();
        snapshot.insert(Address::new(0x1000), vec![1; 4]);
        snapshot.insert(Address::new(0x1004), vec![2; 4]);

        let mut buf = [0u8; 8];
        snapshot.read_exact(Address::new(0x1000), &mut buf).unwrap();
        assert_eq!(buf, [1, 1, 1, 1, 2, 2, 2, 2]);

        let err = snapshot.read_exact(Address::new(0x1002), &mut buf).unwrap_err();
        assert_eq!(
            err,
            MemoryError::Unreadable {
                address: Address::new(0x1002),
                len: 8
            }
        );
    }

    #[test]
    fn test_read_below_first_region_fails()
    {
        let mut snapshot = MemorySnapshot::new();
        snapshot.insert(Address::new(0x1000), vec![0; 4]);
        let mut buf = [0u8; 1];
        assert!(snapshot.read_exact(Address::new(0xfff), &mut buf).is_err());
    }

    #[test]
    fn test_pointer_width_follows_architecture()
    {
        let mut snapshot = MemorySnapshot::new();
        snapshot.insert(Address::new(0x10), 0x1122_3344_5566_7788u64.to_le_bytes().to_vec());

        let wide = process(snapshot.clone(), Architecture::X86_64);
        assert_eq!(wide.read_pointer(Address::new(0x10)).unwrap(), Address::new(0x1122_3344_5566_7788));

        let narrow = process(snapshot, Architecture::X86);
        assert_eq!(narrow.read_pointer(Address::new(0x10)).unwrap(), Address::new(0x5566_7788));
    }

    #[test]
    fn test_read_ssize_is_signed()
    {
        let mut snapshot = MemorySnapshot::new();
        snapshot.insert(Address::new(0x10), (-2i64).to_le_bytes().to_vec());
        let memory = process(snapshot, Architecture::Arm64);
        assert_eq!(memory.read_ssize(Address::new(0x10)).unwrap(), -2);
    }

    #[test]
    fn test_read_c_string()
    {
        let mut snapshot = MemorySnapshot::new();
        snapshot.insert(Address::new(0x100), b"dict\0".to_vec());
        snapshot.insert(Address::new(0x200), b"unterminated".to_vec());
        let memory = process(snapshot, Architecture::X86_64);

        assert_eq!(memory.read_c_string(Address::new(0x100), 16).unwrap(), Some(b"dict".to_vec()));
        assert_eq!(memory.read_c_string(Address::new(0x200), 4).unwrap(), None);
        // Runs off the end of the region before finding a terminator
        assert!(memory.read_c_string(Address::new(0x200), 64).is_err());
    }

    struct CountingReader
    {
        inner: MemorySnapshot,
        reads: AtomicUsize,
    }

    impl MemoryReader for CountingReader
    {
        fn read_exact(&self, address: Address, buf: &mut [u8]) -> Result<(), MemoryError>
        {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.read_exact(address, buf)
        }
    }

    fn counted(start: u64, bytes: &[u8]) -> (ProcessMemory, Arc<CountingReader>)
    {
        let mut inner = MemorySnapshot::new();
        inner.insert(Address::new(start), bytes.to_vec());
        let reader = Arc::new(CountingReader {
            inner,
            reads: AtomicUsize::new(0),
        });
        let memory = ProcessMemory::new(ProcessId(1), Architecture::X86_64, reader.clone());
        (memory, reader)
    }

    #[test]
    fn test_read_c_string_reads_whole_chunks()
    {
        let mut region = b"PyCapsule\0".to_vec();
        region.resize(512, 0xee);
        let (memory, reader) = counted(0x1000, &region);

        assert_eq!(memory.read_c_string(Address::new(0x1000), 256).unwrap(), Some(b"PyCapsule".to_vec()));
        assert_eq!(reader.reads.load(Ordering::SeqCst), 1);

        // A region shorter than the chunk falls back to single-byte reads
        let (short, reader) = counted(0x1000, b"int\0");
        assert_eq!(short.read_c_string(Address::new(0x1000), 256).unwrap(), Some(b"int".to_vec()));
        assert_eq!(reader.reads.load(Ordering::SeqCst), 1 + 4);
    }

    #[test]
    fn test_read_c_string_splits_at_page_boundary()
    {
        let mut region = vec![0xee; 0x10];
        region[..12].copy_from_slice(b"abcdefghijk\0");
        let (memory, reader) = counted(0x1ffc, &region);

        // Two page-bounded chunks cover the string when both are readable.
        assert_eq!(memory.read_c_string(Address::new(0x1ffc), 8).unwrap(), None);
        assert_eq!(reader.reads.load(Ordering::SeqCst), 2);

        reader.reads.store(0, Ordering::SeqCst);
        assert_eq!(memory.read_c_string(Address::new(0x1ffc), 12).unwrap(), Some(b"abcdefghijk".to_vec()));
        // 4 bytes up to the page end, then a 9-byte chunk holding the NUL
        assert_eq!(reader.reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_overflowing_read_is_rejected()
    {
        let memory = process(MemorySnapshot::new(), Architecture::X86_64);
        let mut buf = [0u8; 8];
        let err = memory.read_exact(Address::new(u64::MAX - 2), &mut buf).unwrap_err();
        assert!(matches!(err, MemoryError::Overflow { .. }));
    }

    #[test]
    fn test_patch_requires_existing_region()
    {
        let mut snapshot = MemorySnapshot::new();
        snapshot.insert(Address::new(0x1000), vec![0; 4]);
        snapshot.patch(Address::new(0x1002), &[7, 7]).unwrap();
        assert!(snapshot.patch(Address::new(0x1003), &[1, 1]).is_err());

        let mut buf = [0u8; 4];
        snapshot.read_exact(Address::new(0x1000), &mut buf).unwrap();
        assert_eq!(buf, [0, 0, 7, 7]);
    }
}
