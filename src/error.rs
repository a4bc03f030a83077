//! Error types for xml-common
//!
//! This module defines all error types used throughout the library.
//! Every operation reports failures synchronously as typed results;
//! nothing is retried and nothing terminates the caller.

use std::fmt;
use thiserror::Error;

/// Result type alias using xml-common Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xml-common operations
#[derive(Error, Debug)]
pub enum Error {
    /// Input text was empty or whitespace-only
    #[error("XML input is empty or whitespace-only")]
    InvalidInput,

    /// Path does not name an existing regular file
    #[error("path '{0}' is not a file")]
    NotFound(String),

    /// File exists but cannot be read
    #[error("file '{0}' is not readable")]
    NotReadable(String),

    /// I/O failure while reading a file
    #[error("I/O error reading '{path}': {source}")]
    Io {
        /// Path that was being read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Malformed XML, with the parser's diagnostic
    #[error("unparseable XML: {0}")]
    Unparseable(ParseDiagnostic),

    /// Structurally valid XML carrying a dangerous construct
    #[error("dangerous XML detected, {0}")]
    UnsafeDocument(String),

    /// Malformed namespace-policy value or shape
    #[error("invalid namespace policy: {0}")]
    InvalidPolicy(String),

    /// Child elements violate the active namespace policy
    #[error("schema violation: {0}")]
    SchemaViolation(#[from] SchemaViolation),

    /// Failure while writing a document back to XML text
    #[error("XML serialization error: {0}")]
    Serialize(String),
}

/// Parse diagnostic from the underlying XML parser
///
/// Line and column are 1-based, as reported by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// Error message
    pub message: String,
    /// Line where the error was detected
    pub line: u32,
    /// Column where the error was detected
    pub column: u32,
}

impl ParseDiagnostic {
    /// Create a new parse diagnostic
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            message: message.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (line {}, column {})",
            self.message, self.line, self.column
        )
    }
}

/// Namespace-policy violation with context
///
/// Carries the rendered policy, the enclosing element's namespace and the
/// offending namespaces so callers can produce precise diagnostics.
#[derive(Debug, Clone)]
pub struct SchemaViolation {
    /// Short statement of what was violated
    pub reason: String,
    /// Rendering of the active policy (`##any`, `##local`, a list, ...)
    pub policy: String,
    /// Namespace of the enclosing element, if any
    pub element_namespace: Option<String>,
    /// Display forms of the namespaces that failed the policy
    pub offending_namespaces: Vec<String>,
}

impl SchemaViolation {
    /// Create a new schema violation
    pub fn new(reason: impl Into<String>, policy: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            policy: policy.into(),
            element_namespace: None,
            offending_namespaces: Vec::new(),
        }
    }

    /// Set the enclosing element's namespace
    pub fn with_element_namespace(mut self, namespace: Option<&str>) -> Self {
        self.element_namespace = namespace.map(String::from);
        self
    }

    /// Set the offending namespaces
    pub fn with_offending(mut self, namespaces: Vec<String>) -> Self {
        self.offending_namespaces = namespaces;
        self
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)?;
        write!(f, "\nPolicy: {}", self.policy)?;

        if let Some(ref ns) = self.element_namespace {
            write!(f, "\nElement namespace: {}", ns)?;
        }

        if !self.offending_namespaces.is_empty() {
            write!(
                f,
                "\nOffending namespaces: [ {} ]",
                self.offending_namespaces.join(", ")
            )?;
        }

        Ok(())
    }
}

impl std::error::Error for SchemaViolation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_diagnostic_display() {
        let diag = ParseDiagnostic::new("unexpected end of stream", 3, 17);
        let msg = format!("{}", diag);
        assert!(msg.contains("unexpected end of stream"));
        assert!(msg.contains("line 3"));
        assert!(msg.contains("column 17"));
    }

    #[test]
    fn test_schema_violation_display() {
        let violation = SchemaViolation::new(
            "elements from disallowed namespaces are present",
            "##targetNamespace",
        )
        .with_element_namespace(Some("urn:x"))
        .with_offending(vec!["urn:z".to_string()]);

        let msg = format!("{}", violation);
        assert!(msg.contains("Policy: ##targetNamespace"));
        assert!(msg.contains("Element namespace: urn:x"));
        assert!(msg.contains("urn:z"));
    }

    #[test]
    fn test_error_conversion() {
        let violation = SchemaViolation::new("test", "##any");
        let err: Error = violation.into();
        assert!(matches!(err, Error::SchemaViolation(_)));
    }
}
