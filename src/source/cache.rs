//! Identity-keyed cache of schema source representations.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::base::SourceIdentifier;

use super::error::SourceError;
use super::text::{AstSchemaSource, YangTextSource};
use super::yin::{YinDomSource, YinSource, YinXmlSource};

/// The representation variants a source can be held in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepresentationKind {
    YangText,
    YangAst,
    YinXml,
    YinDom,
}

impl RepresentationKind {
    /// The variant this one is derived from, if it is a derived form.
    pub fn derived_from(self) -> Option<RepresentationKind> {
        match self {
            Self::YangAst => Some(Self::YangText),
            Self::YinDom => Some(Self::YinXml),
            Self::YangText | Self::YinXml => None,
        }
    }
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::YangText => "YANG text",
            Self::YangAst => "YANG tree",
            Self::YinXml => "YIN XML",
            Self::YinDom => "YIN DOM",
        };
        f.write_str(name)
    }
}

/// One representation of a schema source.
#[derive(Debug, Clone)]
pub enum SchemaSource {
    YangText(Arc<YangTextSource>),
    YangAst(Arc<AstSchemaSource>),
    YinXml(Arc<YinXmlSource>),
    YinDom(Arc<YinDomSource>),
}

impl SchemaSource {
    pub fn identifier(&self) -> &SourceIdentifier {
        match self {
            Self::YangText(s) => s.identifier(),
            Self::YangAst(s) => s.identifier(),
            Self::YinXml(s) => s.identifier(),
            Self::YinDom(s) => s.identifier(),
        }
    }

    pub fn name(&self) -> &Arc<str> {
        match self {
            Self::YangText(s) => s.name(),
            Self::YangAst(s) => s.name(),
            Self::YinXml(s) => s.name(),
            Self::YinDom(s) => s.name(),
        }
    }

    pub fn kind(&self) -> RepresentationKind {
        match self {
            Self::YangText(_) => RepresentationKind::YangText,
            Self::YangAst(_) => RepresentationKind::YangAst,
            Self::YinXml(_) => RepresentationKind::YinXml,
            Self::YinDom(_) => RepresentationKind::YinDom,
        }
    }

    fn same_instance(&self, other: &SchemaSource) -> bool {
        match (self, other) {
            (Self::YangText(a), Self::YangText(b)) => Arc::ptr_eq(a, b),
            (Self::YangAst(a), Self::YangAst(b)) => Arc::ptr_eq(a, b),
            (Self::YinXml(a), Self::YinXml(b)) => Arc::ptr_eq(a, b),
            (Self::YinDom(a), Self::YinDom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Derive the representation of `kind` from this one, if there is a
    /// transformation between them.
    fn derive(&self, kind: RepresentationKind) -> Option<Result<SchemaSource, SourceError>> {
        match (self, kind) {
            (Self::YangText(text), RepresentationKind::YangAst) => {
                Some(text.to_ast().map(SchemaSource::YangAst))
            }
            (Self::YinXml(xml), RepresentationKind::YinDom) => Some(Ok(SchemaSource::YinDom(
                YinDomSource::lazy_transform(YinSource::Xml(xml.clone())),
            ))),
            _ => None,
        }
    }
}

impl From<YangTextSource> for SchemaSource {
    fn from(source: YangTextSource) -> Self {
        Self::YangText(Arc::new(source))
    }
}

impl From<AstSchemaSource> for SchemaSource {
    fn from(source: AstSchemaSource) -> Self {
        Self::YangAst(Arc::new(source))
    }
}

impl From<YinXmlSource> for SchemaSource {
    fn from(source: YinXmlSource) -> Self {
        Self::YinXml(Arc::new(source))
    }
}

impl From<YinDomSource> for SchemaSource {
    fn from(source: YinDomSource) -> Self {
        Self::YinDom(Arc::new(source))
    }
}

type Entries = FxHashMap<RepresentationKind, SchemaSource>;

/// Thread-safe cache of source representations keyed by identifier.
///
/// Derived variants are computed on demand from a stored variant and then
/// published, so every caller observes the same instance. Failed
/// derivations are returned to the caller and never stored; a later `get`
/// with a freshly `put` source may retry.
#[derive(Debug, Default)]
pub struct SchemaSourceCache {
    sources: RwLock<FxHashMap<SourceIdentifier, Entries>>,
}

impl SchemaSourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a representation, replacing any previous one of the same kind.
    /// Variants derived from a replaced source are dropped.
    pub fn put(&self, source: impl Into<SchemaSource>) {
        let source = source.into();
        let kind = source.kind();
        let mut sources = self.sources.write();
        let entries = sources.entry(source.identifier().clone()).or_default();
        entries.retain(|existing, _| existing.derived_from() != Some(kind));
        entries.insert(kind, source);
    }

    /// The representation of `kind` for `identifier`, deriving it when only
    /// its source variant is stored. `Ok(None)` means nothing usable is
    /// cached.
    pub fn get(
        &self,
        identifier: &SourceIdentifier,
        kind: RepresentationKind,
    ) -> Result<Option<SchemaSource>, SourceError> {
        loop {
            let origin = {
                let sources = self.sources.read();
                let Some(entries) = sources.get(identifier) else {
                    return Ok(None);
                };
                if let Some(found) = entries.get(&kind) {
                    return Ok(Some(found.clone()));
                }
                match kind.derived_from().and_then(|from| entries.get(&from)) {
                    Some(origin) => origin.clone(),
                    None => return Ok(None),
                }
            };

            // The derivation itself is memoized on the origin instance, so
            // racing callers compute it once and publish the same value.
            let Some(derived) = origin.derive(kind) else {
                return Ok(None);
            };
            if let Some(published) = self.publish(identifier, kind, &origin, derived?) {
                return Ok(Some(published));
            }
            tracing::trace!("{}: {} replaced while deriving {}, retrying", identifier, origin.kind(), kind);
        }
    }

    /// Store `derived` unless `origin` is no longer the stored source it was
    /// derived from. Returns the published representation.
    fn publish(
        &self,
        identifier: &SourceIdentifier,
        kind: RepresentationKind,
        origin: &SchemaSource,
        derived: SchemaSource,
    ) -> Option<SchemaSource> {
        let mut sources = self.sources.write();
        let entries = sources.get_mut(identifier)?;
        if !entries.get(&origin.kind())?.same_instance(origin) {
            return None;
        }
        Some(entries.entry(kind).or_insert(derived).clone())
    }

    pub fn contains(&self, identifier: &SourceIdentifier) -> bool {
        self.sources.read().contains_key(identifier)
    }

    /// All identifiers currently cached, in no particular order.
    pub fn identifiers(&self) -> Vec<SourceIdentifier> {
        self.sources.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sources.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.read().is_empty()
    }
}
