//! Layout identifier → parser constructor lookup.
//!
//! Adding a bank layout means writing one `LayoutParser` and one
//! `register` call; nothing else changes.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use bankscan_core::{Error, Result};

use crate::parsers::{
    BeijingBank, BocV1, BocV2, BocV3, CcbV1, CcbV2, CcbV3, CebV1, CebV2, LayoutParser,
};

type Constructor = fn() -> Box<dyn LayoutParser>;

fn construct<P: LayoutParser + Default>() -> Box<dyn LayoutParser> {
    Box::new(P::default())
}

#[derive(Debug, Clone, Default)]
pub struct ParserRegistry {
    parsers: BTreeMap<String, Constructor>,
}

impl ParserRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in bank layout.
    pub fn with_default_layouts() -> Self {
        let mut registry = Self::new();
        registry.register::<BeijingBank>("beijing_bank");
        registry.register::<BocV1>("boc_v1");
        registry.register::<BocV2>("boc_v2");
        registry.register::<BocV3>("boc_v3");
        registry.register::<CcbV1>("ccb_v1");
        registry.register::<CcbV2>("ccb_v2");
        registry.register::<CcbV3>("ccb_v3");
        registry.register::<CebV1>("ceb_v1");
        registry.register::<CebV2>("ceb_v2");
        registry
    }

    /// Add or replace a layout. Other registrations are untouched.
    pub fn register<P: LayoutParser + Default>(&mut self, layout: impl Into<String>) -> &mut Self {
        let layout = layout.into();
        if self.parsers.insert(layout.clone(), construct::<P>).is_some() {
            tracing::warn!(layout = %layout, "layout re-registered, previous parser replaced");
        }
        self
    }

    /// Fresh parser for `layout`.
    pub fn get(&self, layout: &str) -> Result<Box<dyn LayoutParser>> {
        self.parsers
            .get(layout)
            .map(|make| make())
            .ok_or_else(|| Error::UnsupportedLayout(layout.to_string()))
    }

    pub fn contains(&self, layout: &str) -> bool {
        self.parsers.contains_key(layout)
    }

    /// Registered layout ids, sorted.
    pub fn layouts(&self) -> impl Iterator<Item = &str> {
        self.parsers.keys().map(String::as_str)
    }
}

/// Process-wide registry of the built-in layouts.
pub fn default_registry() -> &'static ParserRegistry {
    static REGISTRY: OnceLock<ParserRegistry> = OnceLock::new();
    REGISTRY.get_or_init(ParserRegistry::with_default_layouts)
}
