//! Memory address type.

use std::fmt;
use std::ops::Add;

/// Strongly typed address in the debuggee's address space
///
/// This wrapper around `u64` keeps object pointers, type pointers and
/// instruction addresses from being mixed up with sizes, offsets or
/// refcounts that the object layout code also handles as `u64`.
///
/// ## Example
///
/// ```rust
/// use pyview_core::types::Address;
///
/// let object = Address::from(0x1000);
/// let ob_type = object + 8; // field offset
/// assert_eq!(ob_type.value(), 0x1008);
/// assert!(!object.is_null());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    ///
    /// A direct-address value whose address is null does not point at an
    /// object yet; the visualizer treats it as "not applicable".
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value
    ///
    /// This is equivalent to `Address::from(value)` but can be used in const contexts.
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Whether this is the null address.
    pub const fn is_null(self) -> bool
    {
        self.0 == 0
    }

    /// Whether the address is a multiple of `alignment` (a power of two).
    ///
    /// ```rust
    /// use pyview_core::types::Address;
    ///
    /// assert!(Address::new(0x1008).is_aligned(8));
    /// assert!(!Address::new(0x1004).is_aligned(8));
    /// ```
    pub const fn is_aligned(self, alignment: u64) -> bool
    {
        alignment != 0 && self.0 % alignment == 0
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// Returns `Some(new_address)` if the addition doesn't overflow, or `None` if it does.
    ///
    /// ```rust
    /// use pyview_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_add(0x100), Some(Address::from(0x1100)));
    /// assert_eq!(addr.checked_add(u64::MAX), None);
    /// ```
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}
