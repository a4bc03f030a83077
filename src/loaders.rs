//! Secure document loading
//!
//! Turns untrusted XML text, bytes or file content into an owned
//! [`XmlDocument`], refusing unsafe input. The parser is configured per
//! call with DTD support disabled, so external entities and DOCTYPE
//! declarations can never reach the resulting tree; there is no
//! process-global parser state to toggle or restore.

use crate::documents::{XmlDocument, XmlElement};
use crate::error::{Error, ParseDiagnostic, Result};
use crate::namespaces::QName;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Secure loader for untrusted XML documents
///
/// Parsing uses a hardened, per-call parser configuration: DOCTYPE
/// declarations are refused outright and no network or filesystem access
/// is ever performed while parsing. Node count is unbounded by default
/// so legitimately large documents are not rejected purely on size.
#[derive(Debug, Clone)]
pub struct SecureLoader {
    nodes_limit: u32,
}

impl SecureLoader {
    /// Create a loader with default settings
    pub fn new() -> Self {
        Self {
            nodes_limit: u32::MAX,
        }
    }

    /// Set the maximum number of nodes a document may contain
    pub fn with_nodes_limit(mut self, limit: u32) -> Self {
        self.nodes_limit = limit;
        self
    }

    /// Parse an XML document from text
    ///
    /// Fails with [`Error::InvalidInput`] for empty or whitespace-only
    /// text, [`Error::UnsafeDocument`] when the input carries a DOCTYPE
    /// declaration, and [`Error::Unparseable`] for malformed markup.
    pub fn parse(&self, text: &str) -> Result<XmlDocument> {
        if text.trim().is_empty() {
            return Err(Error::InvalidInput);
        }

        tracing::debug!(bytes = text.len(), "parsing XML document");

        let options = roxmltree::ParsingOptions {
            allow_dtd: false,
            nodes_limit: self.nodes_limit,
            ..roxmltree::ParsingOptions::default()
        };

        let parsed =
            roxmltree::Document::parse_with_options(text, options).map_err(map_parse_error)?;

        let mut document = XmlDocument::new("1.0", None);
        document.set_document_element(convert_element(parsed.root_element()));
        Ok(document)
    }

    /// Parse an XML document from bytes
    ///
    /// The bytes must be valid UTF-8; otherwise the failure is reported
    /// as [`Error::Unparseable`].
    pub fn parse_bytes(&self, data: &[u8]) -> Result<XmlDocument> {
        let text = std::str::from_utf8(data).map_err(|e| {
            Error::Unparseable(ParseDiagnostic::new(format!("invalid UTF-8: {}", e), 1, 1))
        })?;
        self.parse(text)
    }

    /// Parse an XML document from a file
    ///
    /// The path must name an existing, readable regular file with
    /// non-empty content; the whole file is read into memory and handed
    /// to [`SecureLoader::parse`].
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<XmlDocument> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(Error::NotFound(path.display().to_string()));
        }

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                return Err(Error::NotReadable(path.display().to_string()));
            }
            Err(e) => {
                return Err(Error::Io {
                    path: path.display().to_string(),
                    source: e,
                });
            }
        };

        if text.trim().is_empty() {
            return Err(Error::InvalidInput);
        }

        self.parse(&text)
    }

    /// Create an empty, writable document
    ///
    /// For callers that build XML programmatically rather than parse it;
    /// carries no safety checks since there is no untrusted input.
    /// Version defaults to `"1.0"`, encoding to unspecified.
    pub fn new_document(version: Option<&str>, encoding: Option<&str>) -> XmlDocument {
        XmlDocument::new(version.unwrap_or("1.0"), encoding)
    }
}

impl Default for SecureLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn map_parse_error(error: roxmltree::Error) -> Error {
    match error {
        roxmltree::Error::DtdDetected => {
            tracing::warn!("rejected XML input containing a DOCTYPE declaration");
            Error::UnsafeDocument("DOCTYPE nodes are not allowed in the XML body".to_string())
        }
        other => {
            let pos = other.pos();
            Error::Unparseable(ParseDiagnostic::new(other.to_string(), pos.row, pos.col))
        }
    }
}

/// Convert a borrowed parse node into an owned element tree
fn convert_element(node: roxmltree::Node<'_, '_>) -> XmlElement {
    let tag = node.tag_name();
    let qname = match tag.namespace() {
        Some(ns) => QName::namespaced(ns, tag.name()),
        None => QName::local(tag.name()),
    };

    let mut element = XmlElement::new(qname);

    for attr in node.attributes() {
        let attr_qname = match attr.namespace() {
            Some(ns) => QName::namespaced(ns, attr.name()),
            None => QName::local(attr.name()),
        };
        element.set_attribute(attr_qname, attr.value());
    }

    let text: String = node
        .children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .collect();
    if !text.trim().is_empty() {
        element.set_text(text);
    }

    for child in node.children().filter(|c| c.is_element()) {
        element.add_child(convert_element(child));
    }

    element
}
