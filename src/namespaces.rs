//! XML namespace handling
//!
//! Qualified names and the fixed catalog of well-known namespace URIs and
//! `xs:any` attribute vocabularies used across a SAML processing stack.

/// The namespace for XML.
pub const NS_XML: &str = "http://www.w3.org/XML/1998/namespace";

/// The namespace for XML Schema.
pub const NS_XS: &str = "http://www.w3.org/2001/XMLSchema";

/// The namespace for XML Schema instance.
pub const NS_XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// The namespace for the ECP profile.
pub const NS_ECP: &str = "urn:oasis:names:tc:SAML:2.0:profiles:SSO:ecp";

/// The namespace for the Holder-of-Key Web Browser SSO profile.
pub const NS_HOK: &str = "urn:oasis:names:tc:SAML:2.0:profiles:holder-of-key:SSO:browser";

/// The namespace for SAML 2 metadata.
pub const NS_MD: &str = "urn:oasis:names:tc:SAML:2.0:metadata";

/// The namespace for SAML 2 assertions.
pub const NS_SAML: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// The namespace for the SAML 2 protocol.
pub const NS_SAMLP: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// The namespace for the SOAP envelope.
pub const NS_SOAP: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// The namespace for XML encryption.
pub const NS_XENC: &str = "http://www.w3.org/2001/04/xmlenc#";

/// The namespace for XML signatures.
pub const NS_XDSIG: &str = "http://www.w3.org/2000/09/xmldsig#";

/// The `namespace`-attribute value `##any` for `xs:any` elements.
pub const XS_ANY_NS_ANY: &str = "##any";

/// The `namespace`-attribute value `##local` for `xs:any` elements.
pub const XS_ANY_NS_LOCAL: &str = "##local";

/// The `namespace`-attribute value `##other` for `xs:any` elements.
pub const XS_ANY_NS_OTHER: &str = "##other";

/// The `namespace`-attribute value `##targetNamespace` for `xs:any` elements.
pub const XS_ANY_NS_TARGET: &str = "##targetNamespace";

/// The closed set of scalar `namespace`-attribute values for `xs:any`.
pub const XS_ANY_NS: [&str; 4] = [
    XS_ANY_NS_ANY,
    XS_ANY_NS_LOCAL,
    XS_ANY_NS_OTHER,
    XS_ANY_NS_TARGET,
];

/// The `processContents`-attribute value `lax` for `xs:any` elements.
pub const XS_ANY_PROCESS_LAX: &str = "lax";

/// The `processContents`-attribute value `skip` for `xs:any` elements.
pub const XS_ANY_PROCESS_SKIP: &str = "skip";

/// The `processContents`-attribute value `strict` for `xs:any` elements.
pub const XS_ANY_PROCESS_STRICT: &str = "strict";

/// The closed set of `processContents`-attribute values for `xs:any`.
pub const XS_ANY_PROCESS: [&str; 3] = [
    XS_ANY_PROCESS_LAX,
    XS_ANY_PROCESS_SKIP,
    XS_ANY_PROCESS_STRICT,
];

/// XML Namespace URI
pub type NamespaceUri = String;

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}
