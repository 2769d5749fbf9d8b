//! # Object Materializer
//!
//! Builds a validated view of a CPython object from a raw address.
//!
//! Every CPython object starts with the same header:
//!
//! ```text
//! offset 0   Py_ssize_t    ob_refcnt
//! offset W   PyTypeObject *ob_type
//! ```
//!
//! and every type object is a variable-size object whose fourth word is the
//! type name:
//!
//! ```text
//! offset 0   Py_ssize_t    ob_refcnt
//! offset W   PyTypeObject *ob_type      (the metatype)
//! offset 2W  Py_ssize_t    ob_size
//! offset 3W  const char   *tp_name
//! ```
//!
//! where `W` is the pointer width. [`PyObject::from_address`] reads that chain
//! and rejects anything that does not look like it. Construction is
//! all-or-nothing: a `PyObject` only exists once every check has passed.

use crate::error::MaterializeError;
use crate::memory::ProcessMemory;
use crate::types::Address;

/// Longest `tp_name` accepted, excluding the terminator.
pub const MAX_TYPE_NAME_LEN: usize = 256;

/// Upper bound for a 64-bit refcount. Far above any real count, but still
/// rejects the pointer-shaped garbage found in freed or uninitialized memory.
pub const MAX_REFCOUNT: i64 = 1 << 48;

/// Field offsets of the object header for one pointer width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectLayout
{
    pointer_size: u64,
}

impl ObjectLayout
{
    /// Layout for a pointer width of `pointer_size` bytes (4 or 8).
    pub const fn new(pointer_size: u64) -> Self
    {
        Self { pointer_size }
    }

    /// Layout matching `process`'s architecture.
    pub fn for_process(process: &ProcessMemory) -> Self
    {
        Self::new(process.pointer_size())
    }

    /// Offset of `ob_refcnt`.
    pub const fn refcount_offset(&self) -> u64
    {
        0
    }

    /// Offset of `ob_type`.
    pub const fn type_offset(&self) -> u64
    {
        self.pointer_size
    }

    /// Offset of `tp_name` inside a type object.
    pub const fn type_name_offset(&self) -> u64
    {
        3 * self.pointer_size
    }

    /// Size of the fixed object header.
    pub const fn header_size(&self) -> u64
    {
        2 * self.pointer_size
    }

    fn refcount_in_range(&self, refcount: i64) -> bool
    {
        if refcount <= 0 {
            return false;
        }
        self.pointer_size == 4 || refcount < MAX_REFCOUNT
    }
}

/// A validated CPython object in the debuggee.
///
/// Holds the process handle it was read from; the fields are a snapshot
/// taken at construction and are not refreshed.
#[derive(Debug, Clone)]
pub struct PyObject
{
    process: ProcessMemory,
    address: Address,
    type_address: Address,
    type_name: String,
    refcount: i64,
}

impl PyObject
{
    /// Materialize the object at `address`.
    ///
    /// Returns `Ok(None)` for the null address: there is no object yet, which
    /// is not an error.
    ///
    /// ## Errors
    ///
    /// - `Unreadable`: the header, the type object, or the type name could
    ///   not be read
    /// - `Malformed`: a read succeeded but the bytes violate the layout
    ///   (bad refcount, null or misaligned type pointer, missing metatype,
    ///   unterminated or non-printable type name)
    ///
    /// ## Example
    ///
    /// ```rust
    /// use std::sync::Arc;
    ///
    /// use pyview_core::memory::{MemorySnapshot, ProcessMemory};
    /// use pyview_core::object::PyObject;
    /// use pyview_core::types::{Address, Architecture, ProcessId};
    ///
    /// let process = ProcessMemory::new(ProcessId(1), Architecture::X86_64, Arc::new(MemorySnapshot::new()));
    /// assert!(PyObject::from_address(&process, Address::ZERO).unwrap().is_none());
    /// assert!(PyObject::from_address(&process, Address::new(0x1000)).is_err());
    /// ```
    pub fn from_address(process: &ProcessMemory, address: Address) -> Result<Option<Self>, MaterializeError>
    {
        if address.is_null() {
            return Ok(None);
        }

        let layout = ObjectLayout::for_process(process);
        let unreadable = |source| MaterializeError::Unreadable { address, source };

        if !address.is_aligned(layout.pointer_size) {
            return Err(MaterializeError::malformed(address, "object address is not pointer-aligned"));
        }

        let refcount = process
            .read_ssize(address + layout.refcount_offset())
            .map_err(unreadable)?;
        if !layout.refcount_in_range(refcount) {
            return Err(MaterializeError::malformed(
                address,
                format!("implausible refcount {refcount}"),
            ));
        }

        let type_address = process.read_pointer(address + layout.type_offset()).map_err(unreadable)?;
        if type_address.is_null() {
            return Err(MaterializeError::malformed(address, "ob_type is null"));
        }
        if !type_address.is_aligned(layout.pointer_size) {
            return Err(MaterializeError::malformed(
                address,
                format!("ob_type {type_address} is not pointer-aligned"),
            ));
        }

        let metatype = process
            .read_pointer(type_address + layout.type_offset())
            .map_err(unreadable)?;
        if metatype.is_null() {
            return Err(MaterializeError::malformed(
                address,
                format!("type object {type_address} has no metatype"),
            ));
        }

        let name_address = process
            .read_pointer(type_address + layout.type_name_offset())
            .map_err(unreadable)?;
        if name_address.is_null() {
            return Err(MaterializeError::malformed(address, "tp_name is null"));
        }
        let raw_name = process
            .read_c_string(name_address, MAX_TYPE_NAME_LEN)
            .map_err(unreadable)?
            .ok_or_else(|| MaterializeError::malformed(address, "tp_name is not terminated"))?;
        let type_name = validate_type_name(raw_name).ok_or_else(|| {
            MaterializeError::malformed(address, "tp_name is empty or contains non-printable bytes")
        })?;

        Ok(Some(Self {
            process: process.clone(),
            address,
            type_address,
            type_name,
            refcount,
        }))
    }

    /// Process the object lives in.
    pub fn process(&self) -> &ProcessMemory
    {
        &self.process
    }

    /// Address of the object header.
    pub fn address(&self) -> Address
    {
        self.address
    }

    /// Address of the object's type object.
    pub fn type_address(&self) -> Address
    {
        self.type_address
    }

    /// `tp_name` of the object's type, e.g. `dict` or `collections.OrderedDict`.
    pub fn type_name(&self) -> &str
    {
        &self.type_name
    }

    /// Refcount at the time the object was materialized.
    pub fn refcount(&self) -> i64
    {
        self.refcount
    }
}

fn validate_type_name(raw: Vec<u8>) -> Option<String>
{
    if raw.is_empty() || !raw.iter().all(|byte| (0x20..=0x7e).contains(byte)) {
        return None;
    }
    String::from_utf8(raw).ok()
}

#[cfg(test)]
mod tests
{
    use std::sync::Arc;

    use super::*;
    use crate::error::MemoryError;
    use crate::memory::MemorySnapshot;
    use crate::types::{Architecture, ProcessId};

    const OBJECT: u64 = 0x1000;
    const TYPE: u64 = 0x2000;
    const METATYPE: u64 = 0x3000;
    const NAME: u64 = 0x4000;

    fn word(value: u64) -> Vec<u8>
    {
        value.to_le_bytes().to_vec()
    }

    fn header(refcount: u64, ob_type: u64) -> Vec<u8>
    {
        [word(refcount), word(ob_type)].concat()
    }

    fn type_object(metatype: u64, name: u64) -> Vec<u8>
    {
        [word(1), word(metatype), word(0), word(name)].concat()
    }

    /// A well-formed 64-bit `dict` instance at `OBJECT`.
    fn dict_snapshot() -> MemorySnapshot
    {
        let mut snapshot = MemorySnapshot::new();
        snapshot.insert(Address::new(OBJECT), header(3, TYPE));
        snapshot.insert(Address::new(TYPE), type_object(METATYPE, NAME));
        snapshot.insert(Address::new(METATYPE), header(1, METATYPE));
        snapshot.insert(Address::new(NAME), b"dict\0".to_vec());
        snapshot
    }

    fn process(snapshot: MemorySnapshot) -> ProcessMemory
    {
        ProcessMemory::new(ProcessId(7), Architecture::X86_64, Arc::new(snapshot))
    }

    fn materialize(snapshot: MemorySnapshot) -> Result<Option<PyObject>, MaterializeError>
    {
        PyObject::from_address(&process(snapshot), Address::new(OBJECT))
    }

    #[test]
    fn test_materializes_well_formed_object()
    {
        let object = materialize(dict_snapshot()).unwrap().unwrap();
        assert_eq!(object.address(), Address::new(OBJECT));
        assert_eq!(object.type_address(), Address::new(TYPE));
        assert_eq!(object.type_name(), "dict");
        assert_eq!(object.refcount(), 3);
        assert_eq!(object.process().id(), ProcessId(7));
    }

    #[test]
    fn test_null_address_is_not_an_object()
    {
        let result = PyObject::from_address(&process(dict_snapshot()), Address::ZERO).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_unmapped_address_is_unreadable()
    {
        let err = PyObject::from_address(&process(dict_snapshot()), Address::new(0x9000)).unwrap_err();
        assert!(matches!(
            err,
            MaterializeError::Unreadable {
                source: MemoryError::Unreadable { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_misaligned_object()
    {
        let err = PyObject::from_address(&process(dict_snapshot()), Address::new(OBJECT + 4)).unwrap_err();
        assert!(matches!(err, MaterializeError::Malformed { .. }));
    }

    #[test]
    fn test_rejects_bad_refcounts()
    {
        for refcount in [0u64, (-1i64) as u64, 1 << 50] {
            let mut snapshot = dict_snapshot();
            snapshot.insert(Address::new(OBJECT), header(refcount, TYPE));
            let err = materialize(snapshot).unwrap_err();
            assert!(matches!(err, MaterializeError::Malformed { .. }), "refcount {refcount:#x}");
        }
    }

    #[test]
    fn test_accepts_immortal_refcount()
    {
        let mut snapshot = dict_snapshot();
        snapshot.insert(Address::new(OBJECT), header(u64::from(u32::MAX), TYPE));
        assert!(materialize(snapshot).unwrap().is_some());
    }

    #[test]
    fn test_rejects_null_type()
    {
        let mut snapshot = dict_snapshot();
        snapshot.insert(Address::new(OBJECT), header(1, 0));
        let err = materialize(snapshot).unwrap_err();
        assert_eq!(err, MaterializeError::malformed(Address::new(OBJECT), "ob_type is null"));
    }

    #[test]
    fn test_rejects_type_without_metatype()
    {
        let mut snapshot = dict_snapshot();
        snapshot.insert(Address::new(TYPE), type_object(0, NAME));
        assert!(matches!(materialize(snapshot).unwrap_err(), MaterializeError::Malformed { .. }));
    }

    #[test]
    fn test_rejects_unreadable_type_object()
    {
        let mut snapshot = dict_snapshot();
        snapshot.insert(Address::new(OBJECT), header(1, 0x8000));
        assert!(matches!(materialize(snapshot).unwrap_err(), MaterializeError::Unreadable { .. }));
    }

    #[test]
    fn test_rejects_garbage_type_name()
    {
        let mut snapshot = dict_snapshot();
        snapshot.insert(Address::new(NAME), vec![0xff, 0xfe, 0x00]);
        assert!(matches!(materialize(snapshot).unwrap_err(), MaterializeError::Malformed { .. }));

        let mut snapshot = dict_snapshot();
        snapshot.insert(Address::new(NAME), vec![0x00]);
        assert!(matches!(materialize(snapshot).unwrap_err(), MaterializeError::Malformed { .. }));
    }

    #[test]
    fn test_rejects_unterminated_type_name()
    {
        let mut snapshot = dict_snapshot();
        snapshot.insert(Address::new(NAME), vec![b'a'; MAX_TYPE_NAME_LEN + 8]);
        assert!(matches!(materialize(snapshot).unwrap_err(), MaterializeError::Malformed { .. }));
    }

    #[test]
    fn test_32_bit_layout()
    {
        let narrow = |value: u32| value.to_le_bytes().to_vec();
        let mut snapshot = MemorySnapshot::new();
        snapshot.insert(Address::new(0x100), [narrow(2), narrow(0x200)].concat());
        snapshot.insert(
            Address::new(0x200),
            [narrow(1), narrow(0x300), narrow(0), narrow(0x400)].concat(),
        );
        snapshot.insert(Address::new(0x400), b"list\0".to_vec());

        let process = ProcessMemory::new(ProcessId(7), Architecture::X86, Arc::new(snapshot));
        let object = PyObject::from_address(&process, Address::new(0x100)).unwrap().unwrap();
        assert_eq!(object.type_name(), "list");
        assert_eq!(ObjectLayout::for_process(&process).type_name_offset(), 12);
    }
}
