//! # Symbol Resolver
//!
//! Finds the native (compile-time) type name of a visualized value.
//!
//! The Python evaluator uses that name to decide how much of the native
//! structure to show next to the Python view (a `PyDictObject *` and a plain
//! `PyObject *` pointing at the same dict render differently).
//!
//! ## Sources
//!
//! The name comes from exactly one place, picked by [`TypeNameSource::of`]:
//!
//! - **Parent result**: the value is a child node of an evaluation that
//!   already reported a type string. No symbol lookup happens.
//! - **Debug symbols**: the value is a root expression; a
//!   [`SymbolProvider`] looks up the declared type of its variable.
//! - **None**: the parent evaluation reported no type.
//!
//! ## Handle lifetime
//!
//! Symbol handles may wrap host resources (COM-style interface pointers in
//! some debuggers). Every handle is held in a [`SymbolGuard`] which releases
//! it exactly once when it goes out of scope, whichever way the lookup ends.

pub mod dwarf;

pub use dwarf::DwarfSymbols;

use tracing::trace;

use crate::types::{ValueOrigin, VisualizedValue};

/// A type symbol obtained from a [`SymbolProvider`].
pub trait TypeSymbol: Send
{
    /// The type's name, if the symbol has one.
    fn name(&self) -> Option<String>;

    /// Give the underlying handle back to its owner.
    ///
    /// Called exactly once, by [`SymbolGuard`]'s `Drop`. The default does
    /// nothing, for symbols that own no external resource.
    fn release(&mut self) {}
}

/// Debug-symbol lookup for values that have no parent evaluation.
pub trait SymbolProvider: Send + Sync
{
    /// The type symbol of `value`, or `None` when none is available.
    ///
    /// Implementations must not panic on missing or malformed symbols;
    /// those are `None`.
    fn type_symbol(&self, value: &VisualizedValue) -> Option<Box<dyn TypeSymbol>>;
}

/// Scoped ownership of a [`TypeSymbol`].
///
/// Releases the symbol when dropped.
///
/// ## Example
///
/// ```rust
/// use pyview_core::symbols::{SymbolGuard, TypeSymbol};
///
/// struct Named(&'static str);
///
/// impl TypeSymbol for Named
/// {
///     fn name(&self) -> Option<String>
///     {
///         Some(self.0.to_string())
///     }
/// }
///
/// let guard = SymbolGuard::new(Box::new(Named("PyObject")));
/// assert_eq!(guard.name().as_deref(), Some("PyObject"));
/// // released here
/// ```
pub struct SymbolGuard
{
    symbol: Option<Box<dyn TypeSymbol>>,
}

impl SymbolGuard
{
    /// Take ownership of `symbol`.
    pub fn new(symbol: Box<dyn TypeSymbol>) -> Self
    {
        Self { symbol: Some(symbol) }
    }

    /// Query `provider` for `value`'s type symbol.
    pub fn acquire(provider: &dyn SymbolProvider, value: &VisualizedValue) -> Option<Self>
    {
        provider.type_symbol(value).map(Self::new)
    }

    /// Name of the held symbol.
    pub fn name(&self) -> Option<String>
    {
        self.symbol.as_ref().and_then(|symbol| symbol.name())
    }
}

impl Drop for SymbolGuard
{
    fn drop(&mut self)
    {
        if let Some(mut symbol) = self.symbol.take() {
            symbol.release();
        }
    }
}

/// Where a value's type name comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeNameSource<'a>
{
    /// Type string reported by the parent evaluation.
    ParentResult(&'a str),
    /// Declared type from debug symbols.
    DebugSymbols,
    /// No source.
    None,
}

impl<'a> TypeNameSource<'a>
{
    /// Pick the source for `value`.
    pub fn of(value: &'a VisualizedValue) -> Self
    {
        match &value.origin {
            ValueOrigin::Child {
                result_type: Some(result_type),
            } => TypeNameSource::ParentResult(result_type),
            ValueOrigin::Child { result_type: None } => TypeNameSource::None,
            ValueOrigin::Root { .. } => TypeNameSource::DebugSymbols,
        }
    }
}

/// Resolve the native type name of `value`.
///
/// Best effort: `None` when no source has a name. Never fails.
pub fn resolve_type_name(value: &VisualizedValue, provider: &dyn SymbolProvider) -> Option<String>
{
    let name = match TypeNameSource::of(value) {
        TypeNameSource::ParentResult(result_type) => Some(result_type.to_string()),
        TypeNameSource::DebugSymbols => SymbolGuard::acquire(provider, value).and_then(|guard| guard.name()),
        TypeNameSource::None => None,
    };
    trace!(type_name = ?name, "resolved native type name");
    name
}

/// A provider with no symbols; every lookup yields `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSymbols;

impl SymbolProvider for NoSymbols
{
    fn type_symbol(&self, _value: &VisualizedValue) -> Option<Box<dyn TypeSymbol>>
    {
        None
    }
}
