//! DWARF-backed [`SymbolProvider`].
//!
//! Looks up the declared type of a variable by its lexical position: the
//! innermost scope (function, inlined call, block) containing the instruction
//! address that declares a variable of that name wins. Unit-level globals
//! match at any address.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gimli::{
    constants, AttributeValue, DebugTypeSignature, DebuggingInformationEntry, Dwarf, EndianArcSlice, EntriesTreeNode,
    Reader, RunTimeEndian, SectionId, Unit, UnitOffset, UnitSectionOffset, UnitType,
};
use object::{Object, ObjectSection};
use once_cell::sync::OnceCell;
use tracing::{debug, trace};

use super::{SymbolProvider, TypeSymbol};
use crate::error::SymbolError;
use crate::types::{LexicalPosition, ValueOrigin, VisualizedValue};

type OwnedReader = EndianArcSlice<RunTimeEndian>;
type OwnedDwarf = Dwarf<OwnedReader>;

const MAX_TYPE_REF_DEPTH: usize = 32;

const DWARF_SECTIONS: &[(&str, &[&str])] = &[
    (".debug_abbrev", &[".debug_abbrev", "__debug_abbrev"]),
    (".debug_addr", &[".debug_addr", "__debug_addr"]),
    (".debug_info", &[".debug_info", "__debug_info"]),
    (".debug_line", &[".debug_line", "__debug_line"]),
    (".debug_line_str", &[".debug_line_str", "__debug_line_str"]),
    (".debug_ranges", &[".debug_ranges", "__debug_ranges"]),
    (".debug_rnglists", &[".debug_rnglists", "__debug_rnglists"]),
    (".debug_str", &[".debug_str", "__debug_str"]),
    (".debug_str_offsets", &[".debug_str_offsets", "__debug_str_offsets"]),
    (".debug_types", &[".debug_types", "__debug_types"]),
];

/// Raw DWARF sections of one image.
struct DebugImage
{
    endian: RunTimeEndian,
    sections: HashMap<&'static str, Arc<[u8]>>,
}

impl DebugImage
{
    fn load(path: &Path) -> Result<Self, SymbolError>
    {
        let bytes = fs::read(path)?;
        let file = object::File::parse(&*bytes)
            .map_err(|err| SymbolError::Object(format!("failed to parse {}: {err}", path.display())))?;

        let endian = if file.is_little_endian() {
            RunTimeEndian::Little
        } else {
            RunTimeEndian::Big
        };

        let mut sections = HashMap::new();
        for (canonical, aliases) in DWARF_SECTIONS {
            if let Some(data) = load_section_bytes(&file, aliases)? {
                sections.insert(*canonical, data);
            }
        }

        Ok(Self { endian, sections })
    }

    fn has_debug_info(&self) -> bool
    {
        self.sections.get(".debug_info").is_some_and(|data| !data.is_empty())
    }

    fn dwarf(&self) -> Result<OwnedDwarf, SymbolError>
    {
        Dwarf::load(|section| Ok::<_, gimli::Error>(self.section_reader(section)))
            .map_err(SymbolError::dwarf("loading sections"))
    }

    fn section_reader(&self, id: SectionId) -> OwnedReader
    {
        let data = self
            .sections
            .get(id.name())
            .cloned()
            .unwrap_or_else(|| Arc::<[u8]>::from(Vec::new()));
        EndianArcSlice::new(data, self.endian)
    }
}

/// Parsed DWARF of one image plus every unit header in it.
///
/// Built once per [`DwarfSymbols`]; lookups only walk the DIE trees.
struct ParsedDwarf
{
    dwarf: OwnedDwarf,
    units: Vec<Unit<OwnedReader>>,
}

impl ParsedDwarf
{
    /// `Ok(None)` for an image without `.debug_info`.
    fn load(path: &Path) -> Result<Option<Self>, SymbolError>
    {
        let image = DebugImage::load(path)?;
        if !image.has_debug_info() {
            return Ok(None);
        }
        let dwarf = image.dwarf()?;

        let mut units = Vec::new();
        let mut headers = dwarf.units();
        while let Some(header) = headers.next().map_err(SymbolError::dwarf("reading .debug_info unit header"))? {
            units.push(dwarf.unit(header).map_err(SymbolError::dwarf("parsing compilation unit"))?);
        }

        let mut type_headers = dwarf.type_units();
        while let Some(header) = type_headers
            .next()
            .map_err(SymbolError::dwarf("reading .debug_types unit header"))?
        {
            units.push(dwarf.unit(header).map_err(SymbolError::dwarf("parsing type unit"))?);
        }

        Ok(Some(Self { dwarf, units }))
    }
}

fn load_section_bytes(file: &object::File<'_>, names: &[&str]) -> Result<Option<Arc<[u8]>>, SymbolError>
{
    for name in names {
        if let Some(section) = file.section_by_name(name) {
            let data = section
                .uncompressed_data()
                .map_err(|err| SymbolError::Object(format!("failed to read {name}: {err}")))?;
            return Ok(Some(match data {
                Cow::Borrowed(bytes) => Arc::<[u8]>::from(bytes.to_vec()),
                Cow::Owned(vec) => vec.into(),
            }));
        }
    }
    Ok(None)
}

/// Debug symbols of one binary image.
///
/// The file is read and its units parsed on the first lookup; later lookups
/// reuse them. A file that cannot be read or has no DWARF is remembered as
/// empty and never retried.
///
/// ## Example
///
/// ```rust,no_run
/// use pyview_core::symbols::DwarfSymbols;
/// use pyview_core::types::{Address, LexicalPosition};
///
/// let symbols = DwarfSymbols::open("/usr/bin/python3.12");
/// let position = LexicalPosition {
///     instruction: Address::new(0x1c2f40),
///     variable: "op".to_string(),
/// };
/// println!("{:?}", symbols.declared_type(&position));
/// ```
pub struct DwarfSymbols
{
    path: PathBuf,
    parsed: OnceCell<Option<ParsedDwarf>>,
}

impl std::fmt::Debug for DwarfSymbols
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("DwarfSymbols")
            .field("path", &self.path)
            .field("loaded", &self.parsed.get().map(Option::is_some))
            .finish()
    }
}

impl DwarfSymbols
{
    /// Symbols of the image at `path`. Nothing is read yet.
    pub fn open(path: impl Into<PathBuf>) -> Self
    {
        Self {
            path: path.into(),
            parsed: OnceCell::new(),
        }
    }

    /// Path of the image.
    pub fn path(&self) -> &Path
    {
        &self.path
    }

    /// Declared type name of the variable at `position`.
    ///
    /// `None` when the image has no usable DWARF or no variable of that name
    /// is visible at that address.
    pub fn declared_type(&self, position: &LexicalPosition) -> Option<String>
    {
        let parsed = self.parsed()?;
        match ScopeSearch::new(parsed).declared_type(position.instruction.value(), &position.variable) {
            Ok(name) => {
                trace!(variable = %position.variable, instruction = %position.instruction, type_name = ?name, "DWARF lookup");
                name
            }
            Err(err) => {
                debug!("DWARF lookup in {} failed: {err}", self.path.display());
                None
            }
        }
    }

    fn parsed(&self) -> Option<&ParsedDwarf>
    {
        self.parsed
            .get_or_init(|| match ParsedDwarf::load(&self.path) {
                Ok(Some(parsed)) => Some(parsed),
                Ok(None) => {
                    debug!("{} has no DWARF debug info", self.path.display());
                    None
                }
                Err(err) => {
                    debug!("failed to load symbols from {}: {err}", self.path.display());
                    None
                }
            })
            .as_ref()
    }
}

impl SymbolProvider for DwarfSymbols
{
    fn type_symbol(&self, value: &VisualizedValue) -> Option<Box<dyn TypeSymbol>>
    {
        let ValueOrigin::Root { position: Some(position) } = &value.origin else {
            return None;
        };
        let name = self.declared_type(position)?;
        Some(Box::new(DwarfTypeSymbol { name }))
    }
}

/// Type symbol produced from DWARF; owns nothing external.
#[derive(Debug, Clone)]
struct DwarfTypeSymbol
{
    name: String,
}

impl TypeSymbol for DwarfTypeSymbol
{
    fn name(&self) -> Option<String>
    {
        Some(self.name.clone())
    }
}

/// One pass over every unit of a [`ParsedDwarf`].
struct ScopeSearch<'a>
{
    dwarf: &'a OwnedDwarf,
    units: &'a [Unit<OwnedReader>],
}

/// Best match so far: scope depth, unit index and the variable's DIE.
type Candidate = Option<(usize, usize, UnitOffset<usize>)>;

impl<'a> ScopeSearch<'a>
{
    fn new(parsed: &'a ParsedDwarf) -> Self
    {
        Self {
            dwarf: &parsed.dwarf,
            units: &parsed.units,
        }
    }

    fn declared_type(&self, pc: u64, variable: &str) -> Result<Option<String>, SymbolError>
    {
        let mut best: Candidate = None;
        for (index, unit) in self.units.iter().enumerate() {
            let mut tree = unit.entries_tree(None).map_err(SymbolError::dwarf("building unit tree"))?;
            let root = tree.root().map_err(SymbolError::dwarf("navigating unit root"))?;
            self.search_scope(index, root, pc, variable, 0, &mut best)?;
        }

        let Some((_, index, offset)) = best else {
            return Ok(None);
        };
        let unit = &self.units[index];
        let die = unit.entry(offset).map_err(SymbolError::dwarf("reading variable"))?;
        match die.attr(constants::DW_AT_type).map_err(SymbolError::dwarf("reading variable type"))? {
            Some(attr) => self.type_name(unit, attr.value(), 0),
            None => Ok(None),
        }
    }

    fn search_scope(
        &self,
        index: usize,
        node: EntriesTreeNode<'_, '_, '_, OwnedReader>,
        pc: u64,
        variable: &str,
        depth: usize,
        best: &mut Candidate,
    ) -> Result<(), SymbolError>
    {
        let unit = &self.units[index];
        let mut children = node.children();
        while let Some(child) = children.next().map_err(SymbolError::dwarf("iterating scope children"))? {
            let entry = child.entry().clone();
            match entry.tag() {
                constants::DW_TAG_variable | constants::DW_TAG_formal_parameter => {
                    let deeper = best.map_or(true, |(found, _, _)| depth > found);
                    if deeper && self.entry_name(unit, &entry)?.as_deref() == Some(variable) {
                        *best = Some((depth, index, entry.offset()));
                    }
                }
                constants::DW_TAG_subprogram | constants::DW_TAG_inlined_subroutine | constants::DW_TAG_lexical_block => {
                    if self.scope_contains(unit, &entry, pc)? {
                        self.search_scope(index, child, pc, variable, depth + 1, best)?;
                    }
                }
                // Namespaces group declarations without opening a lexical scope.
                constants::DW_TAG_namespace => self.search_scope(index, child, pc, variable, depth, best)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn scope_contains(
        &self,
        unit: &Unit<OwnedReader>,
        entry: &DebuggingInformationEntry<'_, '_, OwnedReader>,
        pc: u64,
    ) -> Result<bool, SymbolError>
    {
        let mut ranges = self
            .dwarf
            .die_ranges(unit, entry)
            .map_err(SymbolError::dwarf("reading scope ranges"))?;
        while let Some(range) = ranges.next().map_err(SymbolError::dwarf("iterating scope ranges"))? {
            if range.begin <= pc && pc < range.end {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn type_name(
        &self,
        unit: &Unit<OwnedReader>,
        value: AttributeValue<OwnedReader>,
        depth: usize,
    ) -> Result<Option<String>, SymbolError>
    {
        if depth >= MAX_TYPE_REF_DEPTH {
            return Ok(None);
        }

        match value {
            AttributeValue::UnitRef(offset) => self.type_name_at_offset(unit, offset, depth + 1),
            AttributeValue::DebugInfoRef(offset) => {
                let target = UnitSectionOffset::from(offset);
                match self.find_unit_for_offset(target) {
                    Some((target_unit, unit_offset)) => self.type_name_at_offset(target_unit, unit_offset, depth + 1),
                    None => Ok(None),
                }
            }
            AttributeValue::DebugTypesRef(signature) => self.type_name_for_signature(signature, depth + 1),
            _ => Ok(None),
        }
    }

    fn type_name_at_offset(
        &self,
        unit: &Unit<OwnedReader>,
        offset: UnitOffset<usize>,
        depth: usize,
    ) -> Result<Option<String>, SymbolError>
    {
        let die = unit.entry(offset).map_err(SymbolError::dwarf("resolving type reference"))?;
        if let Some(name) = self.entry_name(unit, &die)? {
            return Ok(Some(name));
        }

        let inner = match die.attr(constants::DW_AT_type).map_err(SymbolError::dwarf("reading nested type"))? {
            Some(attr) => self.type_name(unit, attr.value(), depth + 1)?,
            None => None,
        };

        Ok(match die.tag() {
            // A pointer or qualifier without DW_AT_type applies to void.
            constants::DW_TAG_pointer_type => Some(format!("{} *", inner.as_deref().unwrap_or("void"))),
            constants::DW_TAG_const_type => Some(format!("const {}", inner.as_deref().unwrap_or("void"))),
            _ => inner,
        })
    }

    fn type_name_for_signature(&self, signature: DebugTypeSignature, depth: usize) -> Result<Option<String>, SymbolError>
    {
        for unit in self.units {
            match unit.header.type_() {
                UnitType::Type {
                    type_signature,
                    type_offset,
                }
                | UnitType::SplitType {
                    type_signature,
                    type_offset,
                } if type_signature == signature => {
                    return self.type_name_at_offset(unit, type_offset, depth + 1);
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn find_unit_for_offset(&self, target: UnitSectionOffset<usize>) -> Option<(&Unit<OwnedReader>, UnitOffset<usize>)>
    {
        self.units
            .iter()
            .find_map(|unit| target.to_unit_offset(unit).map(|offset| (unit, offset)))
    }

    fn entry_name(
        &self,
        unit: &Unit<OwnedReader>,
        entry: &DebuggingInformationEntry<'_, '_, OwnedReader>,
    ) -> Result<Option<String>, SymbolError>
    {
        let Some(attr) = entry.attr(constants::DW_AT_name).map_err(SymbolError::dwarf("reading DW_AT_name"))? else {
            return Ok(None);
        };
        let reader = self
            .dwarf
            .attr_string(unit, attr.value())
            .map_err(SymbolError::dwarf("resolving DWARF string"))?;
        let name = reader
            .to_string_lossy()
            .map_err(SymbolError::dwarf("decoding DWARF string"))?
            .into_owned();
        Ok(Some(name))
    }
}
