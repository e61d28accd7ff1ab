//! YIN (XML) schema sources.
//!
//! Two representations share one identifier:
//! - [`YinXmlSource`] holds raw XML text as read from disk.
//! - [`YinDomSource`] exposes the normalized, namespace-resolved element
//!   tree ([`YinDocument`]). It is either created directly from a document
//!   or transformed lazily from an XML source on first access.

use std::fmt;
use std::sync::{Arc, OnceLock};

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use smol_str::SmolStr;

use crate::base::constants::YIN_NAMESPACE;
use crate::base::{LineCol, LineIndex, SourceIdentifier, TextSize};

use super::error::SourceError;
use super::memo::Memoized;

/// One element of a YIN document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YinElement {
    namespace: Option<SmolStr>,
    name: SmolStr,
    attributes: Vec<(SmolStr, String)>,
    children: Vec<YinElement>,
    text: String,
    position: LineCol,
}

impl YinElement {
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Local name of the element.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_builtin(&self) -> bool {
        self.namespace.as_deref() == Some(YIN_NAMESPACE)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> &[(SmolStr, String)] {
        &self.attributes
    }

    pub fn children(&self) -> &[YinElement] {
        &self.children
    }

    /// Concatenated character data directly inside this element.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn position(&self) -> LineCol {
        self.position
    }
}

/// A parsed YIN document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YinDocument {
    root: YinElement,
}

impl YinDocument {
    pub fn root(&self) -> &YinElement {
        &self.root
    }

    /// Parse XML text into a document. `name` is used for error reporting.
    pub fn parse(name: &str, xml: &str) -> Result<Self, SourceError> {
        let index = LineIndex::new(xml);
        let mut reader = NsReader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<YinElement> = Vec::new();
        let mut root: Option<YinElement> = None;

        loop {
            let start = reader.buffer_position();
            let (namespace, event) = match reader.read_resolved_event() {
                Ok((resolved, event)) => (resolve_namespace(name, resolved)?, event),
                Err(e) => {
                    return Err(SourceError::xml(
                        name,
                        format!("parse error at position {}: {e}", reader.error_position()),
                    ));
                }
            };
            let mut offset = start as usize;
            while xml.as_bytes().get(offset).is_some_and(u8::is_ascii_whitespace) {
                offset += 1;
            }
            let position = index.line_col(TextSize::new(offset as u32));
            match event {
                Event::Start(ref e) => {
                    stack.push(element(name, namespace, e, position)?);
                }
                Event::Empty(ref e) => {
                    // Self-closing element - handle as start + end
                    let finished = element(name, namespace, e, position)?;
                    attach(name, &mut stack, &mut root, finished)?;
                }
                Event::End(_) => {
                    let finished = stack
                        .pop()
                        .ok_or_else(|| SourceError::xml(name, "unbalanced end tag"))?;
                    attach(name, &mut stack, &mut root, finished)?;
                }
                Event::Text(ref t) => {
                    if let Some(top) = stack.last_mut() {
                        let text = t
                            .unescape()
                            .map_err(|e| SourceError::xml(name, format!("text error: {e}")))?;
                        top.text.push_str(&text);
                    }
                }
                Event::CData(ref c) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&c.clone().into_inner()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(SourceError::xml(name, "unexpected end of document"));
        }
        root.map(|root| Self { root })
            .ok_or_else(|| SourceError::xml(name, "document has no root element"))
    }
}

fn resolve_namespace(name: &str, resolved: ResolveResult<'_>) -> Result<Option<SmolStr>, SourceError> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(SmolStr::new(String::from_utf8_lossy(ns.as_ref())))),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(SourceError::xml(
            name,
            format!("unknown namespace prefix '{}'", String::from_utf8_lossy(&prefix)),
        )),
    }
}

fn element(
    name: &str,
    namespace: Option<SmolStr>,
    start: &BytesStart<'_>,
    position: LineCol,
) -> Result<YinElement, SourceError> {
    let local = start.local_name();
    let local = std::str::from_utf8(local.as_ref())
        .map_err(|e| SourceError::xml(name, format!("invalid tag name: {e}")))?;

    let mut attributes = Vec::new();
    for attr_result in start.attributes() {
        let attr = attr_result.map_err(|e| SourceError::xml(name, format!("attribute error: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| SourceError::xml(name, format!("attribute key error: {e}")))?;
        if key == "xmlns" || key.starts_with("xmlns:") {
            continue;
        }
        let value = attr
            .unescape_value()
            .map_err(|e| SourceError::xml(name, format!("attribute value error: {e}")))?;
        attributes.push((SmolStr::new(key), value.into_owned()));
    }

    Ok(YinElement {
        namespace,
        name: SmolStr::new(local),
        attributes,
        children: Vec::new(),
        text: String::new(),
        position,
    })
}

fn attach(
    name: &str,
    stack: &mut [YinElement],
    root: &mut Option<YinElement>,
    finished: YinElement,
) -> Result<(), SourceError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(finished),
        None if root.is_none() => *root = Some(finished),
        None => return Err(SourceError::xml(name, "multiple root elements")),
    }
    Ok(())
}

// ============================================================================
// Representations
// ============================================================================

/// Raw YIN text.
#[derive(Debug)]
pub struct YinXmlSource {
    identifier: SourceIdentifier,
    name: Arc<str>,
    xml: Arc<str>,
    dom: OnceLock<Arc<YinDomSource>>,
}

impl YinXmlSource {
    pub fn new(identifier: SourceIdentifier, name: impl Into<Arc<str>>, xml: impl Into<Arc<str>>) -> Self {
        Self {
            identifier,
            name: name.into(),
            xml: xml.into(),
            dom: OnceLock::new(),
        }
    }

    pub fn identifier(&self) -> &SourceIdentifier {
        &self.identifier
    }

    /// Display name used in diagnostics, usually the file path.
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    pub fn xml(&self) -> &str {
        &self.xml
    }

    /// The lazily transforming DOM view of this source. Every call returns
    /// the same instance.
    pub fn to_dom(&self) -> Arc<YinDomSource> {
        self.dom
            .get_or_init(|| Arc::new(YinDomSource::transforming(Arc::new(self.detached()), default_transformer())))
            .clone()
    }

    /// A copy sharing the text but not the DOM cell, so the DOM can own its
    /// input without keeping this source alive.
    fn detached(&self) -> Self {
        Self::new(self.identifier.clone(), self.name.clone(), self.xml.clone())
    }
}

/// Transformation from XML text to a document.
pub type XmlTransformer = Arc<dyn Fn(&YinXmlSource) -> Result<YinDocument, SourceError> + Send + Sync>;

fn default_transformer() -> XmlTransformer {
    Arc::new(|source: &YinXmlSource| YinDocument::parse(source.name(), source.xml()))
}

/// Either YIN representation.
#[derive(Debug, Clone)]
pub enum YinSource {
    Xml(Arc<YinXmlSource>),
    Dom(Arc<YinDomSource>),
}

/// The normalized element-tree view of a YIN source.
pub struct YinDomSource {
    identifier: SourceIdentifier,
    name: Arc<str>,
    inner: DomInner,
}

enum DomInner {
    Simple(Arc<YinDocument>),
    Transforming {
        xml: Arc<YinXmlSource>,
        transformer: XmlTransformer,
        document: Memoized<YinDocument>,
    },
}

impl YinDomSource {
    /// Create a DOM source from an already-built document.
    pub fn create(identifier: SourceIdentifier, name: impl Into<Arc<str>>, document: YinDocument) -> Self {
        Self {
            identifier,
            name: name.into(),
            inner: DomInner::Simple(Arc::new(document)),
        }
    }

    fn transforming(xml: Arc<YinXmlSource>, transformer: XmlTransformer) -> Self {
        Self {
            identifier: xml.identifier().clone(),
            name: xml.name().clone(),
            inner: DomInner::Transforming {
                xml,
                transformer,
                document: Memoized::new(),
            },
        }
    }

    /// A DOM view that transforms on first access. A DOM source is returned
    /// as the same instance.
    pub fn lazy_transform(source: YinSource) -> Arc<Self> {
        match source {
            YinSource::Dom(dom) => dom,
            YinSource::Xml(xml) => xml.to_dom(),
        }
    }

    /// Like [`Self::lazy_transform`] with a caller-supplied transformation.
    pub fn lazy_transform_with(xml: Arc<YinXmlSource>, transformer: XmlTransformer) -> Arc<Self> {
        Arc::new(Self::transforming(xml, transformer))
    }

    /// A DOM view that is transformed immediately.
    pub fn transform(source: YinSource) -> Result<Arc<Self>, SourceError> {
        let dom = Self::lazy_transform(source);
        dom.document()?;
        Ok(dom)
    }

    pub fn identifier(&self) -> &SourceIdentifier {
        &self.identifier
    }

    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    /// The document, transforming on first access. All callers observe the
    /// same instance; a failed transformation is reported with this source's
    /// identifier and the underlying cause.
    pub fn document(&self) -> Result<Arc<YinDocument>, SourceError> {
        match &self.inner {
            DomInner::Simple(document) => Ok(document.clone()),
            DomInner::Transforming {
                xml,
                transformer,
                document,
            } => document.get_or_compute(&self.identifier, || transformer(xml)),
        }
    }

    pub fn is_transformed(&self) -> bool {
        match &self.inner {
            DomInner::Simple(_) => true,
            DomInner::Transforming { document, .. } => document.is_computed(),
        }
    }
}

impl fmt::Debug for YinDomSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("YinDomSource");
        s.field("identifier", &self.identifier);
        match &self.inner {
            DomInner::Simple(_) => s.field("source", &"document"),
            DomInner::Transforming { document, .. } => s.field("xmlSchemaSource", document),
        };
        s.finish()
    }
}
