//! Typed flag sets and the process-wide flag name registry.
//!
//! Flag sets are `bitflags` types over a `u32`. Their constant names are
//! collected into a `FlagRegistry` so diagnostics and serialization can go
//! from a raw value back to a name. The global registry is populated exactly
//! once, by `init()` or `init_with()`; nothing registers itself at load time.
//!
//! Values that were never registered render as hex (`0xBEEF`) instead of
//! failing.

use std::any::type_name;
use std::borrow::Cow;
use std::fmt::Write as _;
use std::sync::OnceLock;

use bitflags::bitflags;
use indexmap::IndexMap;

use crate::error::{GuiError, Result};

bitflags! {
    /// Behavior flags carried by every window.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct WndFlags: u32 {
        /// Receives mouse input; non-interactive windows are transparent to hit-testing.
        const INTERACTIVE = 1 << 0;
        /// Can be moved by dragging with the left button.
        const DRAGABLE = 1 << 1;
        /// Can be resized by dragging its lower-right corner.
        const RESIZABLE = 1 << 2;
        /// Stays in front of non-ONTOP top-level windows.
        const ONTOP = 1 << 3;
        /// Captures all input while running modally.
        const MODAL = 1 << 4;
    }
}

bitflags! {
    /// Placement of a child inside its layout cell.
    ///
    /// An empty set means "fill the cell".
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Alignment: u32 {
        const TOP = 1 << 0;
        const VCENTER = 1 << 1;
        const BOTTOM = 1 << 2;
        const LEFT = 1 << 3;
        const CENTER = 1 << 4;
        const RIGHT = 1 << 5;
    }
}

impl Alignment {
    pub const VERTICAL: Self = Self::TOP.union(Self::VCENTER).union(Self::BOTTOM);
    pub const HORIZONTAL: Self = Self::LEFT.union(Self::CENTER).union(Self::RIGHT);
}

/// Name/value table for one flag type, in registration order.
#[derive(Debug, Default, Clone)]
pub struct FlagTable {
    by_value: IndexMap<u32, &'static str>,
    by_name: IndexMap<&'static str, u32>,
}

impl FlagTable {
    fn insert(&mut self, name: &'static str, value: u32) {
        // First registration of a value wins its canonical name.
        self.by_value.entry(value).or_insert(name);
        self.by_name.insert(name, value);
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Iterate `(name, value)` pairs in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        self.by_name.iter().map(|(name, value)| (*name, *value))
    }
}

/// Registry of flag names keyed by flag type.
#[derive(Debug, Default, Clone)]
pub struct FlagRegistry {
    types: IndexMap<&'static str, FlagTable>,
}

impl FlagRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the flag types defined by this crate.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register::<WndFlags>().register::<Alignment>();
        registry
    }

    /// Register every named constant of `F`. Registering twice is a no-op.
    pub fn register<F>(&mut self) -> &mut Self
    where
        F: bitflags::Flags<Bits = u32> + 'static,
    {
        let table = self.types.entry(type_name::<F>()).or_default();
        for flag in F::FLAGS {
            table.insert(flag.name(), flag.value().bits());
        }
        self
    }

    pub fn is_registered<F: 'static>(&self) -> bool {
        self.types.contains_key(type_name::<F>())
    }

    pub fn table<F: 'static>(&self) -> Option<&FlagTable> {
        self.types.get(type_name::<F>())
    }

    /// Canonical name of a single registered value, or its hex rendering.
    pub fn name_of<F: 'static>(&self, value: u32) -> Cow<'static, str> {
        match self.table::<F>().and_then(|t| t.by_value.get(&value)) {
            Some(name) => Cow::Borrowed(*name),
            None => Cow::Owned(hex(value)),
        }
    }

    /// Look up the value registered under `name`.
    pub fn value_of<F: 'static>(&self, name: &str) -> Result<u32> {
        self.table::<F>()
            .and_then(|t| t.by_name.get(name).copied())
            .ok_or_else(|| GuiError::UnknownFlagName {
                flag_type: type_name::<F>(),
                name: name.to_string(),
            })
    }

    /// Render a composite value as `A | B`, with leftover unnamed bits in hex.
    pub fn describe<F: 'static>(&self, value: u32) -> String {
        if let Some(name) = self.table::<F>().and_then(|t| t.by_value.get(&value)) {
            return (*name).to_string();
        }

        let mut out = String::new();
        let mut remaining = value;
        if let Some(table) = self.table::<F>() {
            for (&bits, name) in &table.by_value {
                if bits != 0 && bits & remaining == bits {
                    if !out.is_empty() {
                        out.push_str(" | ");
                    }
                    out.push_str(name);
                    remaining &= !bits;
                }
            }
        }
        if remaining != 0 || out.is_empty() {
            if !out.is_empty() {
                out.push_str(" | ");
            }
            let _ = write!(out, "{:#X}", remaining);
        }
        out
    }
}

fn hex(value: u32) -> String {
    format!("{:#X}", value)
}

static REGISTRY: OnceLock<FlagRegistry> = OnceLock::new();

/// Populate the global registry with the built-in flag types.
///
/// Safe to call more than once; only the first call does any work.
pub fn init() -> &'static FlagRegistry {
    REGISTRY.get_or_init(|| {
        tracing::debug!("initializing flag registry");
        FlagRegistry::with_builtins()
    })
}

/// Populate the global registry with the built-ins plus application flag types.
///
/// Fails if the registry was already initialized.
pub fn init_with(extend: impl FnOnce(&mut FlagRegistry)) -> Result<&'static FlagRegistry> {
    let mut registry = FlagRegistry::with_builtins();
    extend(&mut registry);
    REGISTRY
        .set(registry)
        .map_err(|_| GuiError::FlagsAlreadyInitialized)?;
    Ok(init())
}

/// The global registry. Initializes it with the built-ins if `init` was never called.
pub fn registry() -> &'static FlagRegistry {
    init()
}

#[cfg(test)]
mod tests {
    use super::*;

    bitflags! {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        struct TestFlags: u32 {
            const ALPHA = 0x1;
            const BETA = 0x2;
        }
    }

    #[test]
    fn builtin_names_round_trip() {
        let registry = FlagRegistry::with_builtins();
        assert_eq!(registry.name_of::<WndFlags>(WndFlags::DRAGABLE.bits()), "DRAGABLE");
        assert_eq!(
            registry.value_of::<WndFlags>("MODAL").unwrap(),
            WndFlags::MODAL.bits()
        );
        assert_eq!(registry.name_of::<Alignment>(Alignment::VCENTER.bits()), "VCENTER");
    }

    #[test]
    fn unregistered_value_falls_back_to_hex() {
        let registry = FlagRegistry::with_builtins();
        assert_eq!(registry.name_of::<WndFlags>(0xBEEF), "0xBEEF");
    }

    #[test]
    fn unregistered_type_falls_back_to_hex() {
        let registry = FlagRegistry::new();
        assert!(!registry.is_registered::<TestFlags>());
        assert_eq!(registry.name_of::<TestFlags>(0x1), "0x1");
    }

    #[test]
    fn unknown_name_is_an_error() {
        let registry = FlagRegistry::with_builtins();
        let err = registry.value_of::<WndFlags>("FLOATING").unwrap_err();
        assert!(matches!(err, GuiError::UnknownFlagName { .. }));
    }

    #[test]
    fn register_is_idempotent() {
        let mut registry = FlagRegistry::new();
        registry.register::<TestFlags>().register::<TestFlags>();
        assert_eq!(registry.table::<TestFlags>().unwrap().len(), 2);
        assert_eq!(registry.name_of::<TestFlags>(0x2), "BETA");
    }

    #[test]
    fn describe_composite_values() {
        let registry = FlagRegistry::with_builtins();
        let flags = WndFlags::INTERACTIVE | WndFlags::DRAGABLE;
        assert_eq!(registry.describe::<WndFlags>(flags.bits()), "INTERACTIVE | DRAGABLE");
        assert_eq!(
            registry.describe::<WndFlags>(WndFlags::MODAL.bits() | 0x8000),
            "MODAL | 0x8000"
        );
        assert_eq!(registry.describe::<WndFlags>(0), "0x0");
    }

    #[test]
    fn global_registry_has_builtins() {
        let registry = init();
        assert!(registry.is_registered::<WndFlags>());
        assert!(registry.is_registered::<Alignment>());
        assert!(std::ptr::eq(registry, super::registry()));
        assert!(matches!(
            init_with(|r| {
                r.register::<TestFlags>();
            }),
            Err(GuiError::FlagsAlreadyInitialized)
        ));
    }
}
