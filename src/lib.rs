//! # xml-common
//!
//! Secure XML document loading and `xs:any` extension-point validation,
//! the validation boundary for XML documents consumed by a SAML
//! processing stack.
//!
//! ## Features
//!
//! - Hardened parsing of untrusted XML: DOCTYPE declarations and
//!   external entities are refused, malformed markup is reported with
//!   line/column diagnostics
//! - Owned, namespace-resolved document trees with serialization back to
//!   XML text
//! - The `xs:any` namespace-policy vocabulary (`##any`, `##local`,
//!   `##other`, `##targetNamespace`, explicit lists) as closed enums
//! - Batch validation of extension-point children with structured
//!   diagnostics
//!
//! ## Example
//!
//! ```rust,ignore
//! use xml_common::{NamespacePolicy, SecureLoader};
//!
//! let loader = SecureLoader::new();
//! let doc = loader.parse("<md:Extensions xmlns:md=\"urn:oasis:names:tc:SAML:2.0:metadata\"/>")?;
//! let root = doc.document_element().unwrap();
//!
//! let policy = NamespacePolicy::from_attr("##other")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod documents;
pub mod error;
pub mod extensions;
pub mod loaders;
pub mod namespaces;

// Re-exports for convenience
pub use documents::{XmlDocument, XmlElement};
pub use error::{Error, ParseDiagnostic, Result, SchemaViolation};
pub use extensions::{ExtensionChild, ExtensionPoint, ListEntry, NamespacePolicy, ProcessContents};
pub use loaders::SecureLoader;
pub use namespaces::QName;

/// Version of the xml-common library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
