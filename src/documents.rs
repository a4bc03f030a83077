//! XML document model
//!
//! Owned, in-memory document trees as produced by the secure loader or
//! built programmatically, and serialization back to XML text.

use crate::error::{Error, Result};
use crate::namespaces::QName;
use indexmap::IndexMap;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// XML element in the document tree
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Element qualified name
    pub qname: QName,
    /// Element attributes, in document order
    pub attributes: IndexMap<QName, String>,
    /// Text content (if any)
    pub text: Option<String>,
    /// Child elements
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Create a new element
    pub fn new(qname: QName) -> Self {
        Self {
            qname,
            attributes: IndexMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.qname.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.qname.namespace.as_deref()
    }

    /// Get an attribute value by local name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(qname, _)| qname.local_name == name)
            .map(|(_, value)| value.as_str())
    }

    /// Get an attribute value by qualified name
    pub fn get_attribute_qname(&self, qname: &QName) -> Option<&str> {
        self.attributes.get(qname).map(|s| s.as_str())
    }

    /// Set an attribute value
    pub fn set_attribute(&mut self, qname: QName, value: impl Into<String>) {
        self.attributes.insert(qname, value.into());
    }

    /// Add a child element
    pub fn add_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Set text content
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Find child elements by local name
    pub fn find_children(&self, local_name: &str) -> Vec<&XmlElement> {
        self.children
            .iter()
            .filter(|e| e.local_name() == local_name)
            .collect()
    }
}

/// XML document representation
///
/// A successfully loaded document holds exactly one root element. The
/// tree is exclusively owned by the caller; the loader never keeps a
/// reference to it.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    /// XML version from the declaration
    pub version: String,
    /// Document encoding, if declared
    pub encoding: Option<String>,
    /// Root element of the document
    root: Option<XmlElement>,
}

impl XmlDocument {
    /// Create a new empty, writable document
    pub fn new(version: impl Into<String>, encoding: Option<&str>) -> Self {
        Self {
            version: version.into(),
            encoding: encoding.map(String::from),
            root: None,
        }
    }

    /// Get the document element
    pub fn document_element(&self) -> Option<&XmlElement> {
        self.root.as_ref()
    }

    /// Get the document element mutably
    pub fn document_element_mut(&mut self) -> Option<&mut XmlElement> {
        self.root.as_mut()
    }

    /// Set the document element, replacing any previous one
    pub fn set_document_element(&mut self, root: XmlElement) {
        self.root = Some(root);
    }

    /// Serialize the document to XML text
    ///
    /// Emits the XML declaration and the element tree. Namespaced
    /// elements are written with a default-namespace declaration wherever
    /// the namespace changes relative to the parent; namespaced
    /// attributes get generated prefixes declared on their element.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());

        let decl = BytesDecl::new(&self.version, self.encoding.as_deref(), None);
        writer
            .write_event(Event::Decl(decl))
            .map_err(|e| Error::Serialize(e.to_string()))?;

        if let Some(ref root) = self.root {
            write_element(&mut writer, root, None)?;
        }

        String::from_utf8(writer.into_inner()).map_err(|e| Error::Serialize(e.to_string()))
    }
}

impl Default for XmlDocument {
    fn default() -> Self {
        Self::new("1.0", None)
    }
}

fn write_element(
    writer: &mut Writer<Vec<u8>>,
    element: &XmlElement,
    inherited_namespace: Option<&str>,
) -> Result<()> {
    let mut start = BytesStart::new(element.local_name());

    // Default-namespace declaration when the namespace changes.
    let namespace = element.namespace();
    if namespace != inherited_namespace {
        start.push_attribute(("xmlns", namespace.unwrap_or("")));
    }

    let mut prefix_count = 0usize;
    for (qname, value) in &element.attributes {
        match qname.namespace.as_deref() {
            Some(ns) => {
                let prefix = format!("n{}", prefix_count);
                prefix_count += 1;
                start.push_attribute((format!("xmlns:{}", prefix).as_str(), ns));
                start.push_attribute((
                    format!("{}:{}", prefix, qname.local_name).as_str(),
                    value.as_str(),
                ));
            }
            None => start.push_attribute((qname.local_name.as_str(), value.as_str())),
        }
    }

    if element.children.is_empty() && element.text.is_none() {
        writer
            .write_event(Event::Empty(start))
            .map_err(|e| Error::Serialize(e.to_string()))?;
        return Ok(());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| Error::Serialize(e.to_string()))?;

    if let Some(ref text) = element.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| Error::Serialize(e.to_string()))?;
    }

    for child in &element.children {
        write_element(writer, child, namespace)?;
    }

    writer
        .write_event(Event::End(BytesEnd::new(element.local_name())))
        .map_err(|e| Error::Serialize(e.to_string()))?;

    Ok(())
}
