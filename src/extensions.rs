//! Extension-point (xs:any) validation
//!
//! Schema-governed elements may declare an extension point: a position
//! where child elements from a constrained or unconstrained set of
//! namespaces are legal. This module implements the `xs:any` `namespace`
//! attribute semantics as a closed vocabulary of policies evaluated over
//! a candidate child list.
//!
//! Reference: https://www.w3.org/TR/xmlschema11-1/#Wildcards

use crate::documents::XmlElement;
use crate::error::{Error, Result, SchemaViolation};
use crate::namespaces::{
    XS_ANY_NS_ANY, XS_ANY_NS_LOCAL, XS_ANY_NS_OTHER, XS_ANY_NS_TARGET, XS_ANY_PROCESS_LAX,
    XS_ANY_PROCESS_SKIP, XS_ANY_PROCESS_STRICT,
};
use indexmap::IndexSet;
use std::fmt;

/// Process contents mode for extension points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessContents {
    /// Validate if a declaration is found, otherwise accept
    #[default]
    Lax,
    /// Skip validation entirely
    Skip,
    /// Validate strictly - every child must be declared
    Strict,
}

impl ProcessContents {
    /// Parse from the `processContents` attribute value
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            XS_ANY_PROCESS_LAX => Some(Self::Lax),
            XS_ANY_PROCESS_SKIP => Some(Self::Skip),
            XS_ANY_PROCESS_STRICT => Some(Self::Strict),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lax => f.write_str(XS_ANY_PROCESS_LAX),
            Self::Skip => f.write_str(XS_ANY_PROCESS_SKIP),
            Self::Strict => f.write_str(XS_ANY_PROCESS_STRICT),
        }
    }
}

/// One entry of an explicit namespace list
///
/// The `##any` and `##other` markers only make sense as the single,
/// exclusive policy value and therefore have no list form here.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListEntry {
    /// An explicit namespace URI
    Uri(String),
    /// Resolved to the enclosing element's namespace at evaluation time
    TargetNamespace,
    /// Resolved to "no namespace" at evaluation time
    Local,
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uri(uri) => f.write_str(uri),
            Self::TargetNamespace => f.write_str(XS_ANY_NS_TARGET),
            Self::Local => f.write_str(XS_ANY_NS_LOCAL),
        }
    }
}

/// Namespace-matching policy for one extension point
///
/// Mirrors the `xs:any` `namespace` attribute: one of the four scalar
/// keywords, or an explicit list of allowed namespace values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamespacePolicy {
    /// Any namespace is allowed (`##any`)
    Any,
    /// Every child must be namespace-less (`##local`)
    Local,
    /// Every child's namespace must differ from the enclosing element's (`##other`)
    Other,
    /// Every child's namespace must equal the enclosing element's (`##targetNamespace`)
    TargetNamespace,
    /// Explicit, non-empty set of allowed namespace values
    List(IndexSet<ListEntry>),
}

impl Default for NamespacePolicy {
    fn default() -> Self {
        Self::Any
    }
}

impl NamespacePolicy {
    /// Create an explicit-list policy
    ///
    /// Fails with [`Error::InvalidPolicy`] if the list is empty. The
    /// `##any` and `##other` markers are unrepresentable in a list by
    /// construction.
    pub fn list(entries: impl IntoIterator<Item = ListEntry>) -> Result<Self> {
        let entries: IndexSet<ListEntry> = entries.into_iter().collect();
        if entries.is_empty() {
            return Err(Error::InvalidPolicy(
                "an explicit namespace list must not be empty".to_string(),
            ));
        }
        Ok(Self::List(entries))
    }

    /// Parse a policy from the `namespace` attribute value
    ///
    /// A scalar keyword yields the corresponding policy; any other value
    /// is treated as a whitespace-separated list of namespace URIs and
    /// resolvable markers. `##any` and `##other` inside a list, unknown
    /// `##` tokens and empty lists fail with [`Error::InvalidPolicy`].
    pub fn from_attr(value: &str) -> Result<Self> {
        match value.trim() {
            XS_ANY_NS_ANY => Ok(Self::Any),
            XS_ANY_NS_LOCAL => Ok(Self::Local),
            XS_ANY_NS_OTHER => Ok(Self::Other),
            XS_ANY_NS_TARGET => Ok(Self::TargetNamespace),
            list => {
                let mut entries = Vec::new();
                for token in list.split_whitespace() {
                    match token {
                        XS_ANY_NS_LOCAL => entries.push(ListEntry::Local),
                        XS_ANY_NS_TARGET => entries.push(ListEntry::TargetNamespace),
                        XS_ANY_NS_ANY | XS_ANY_NS_OTHER => {
                            return Err(Error::InvalidPolicy(format!(
                                "'{}' is not allowed inside an explicit namespace list",
                                token
                            )));
                        }
                        t if t.starts_with("##") => {
                            return Err(Error::InvalidPolicy(format!(
                                "unknown namespace keyword '{}'",
                                t
                            )));
                        }
                        uri => entries.push(ListEntry::Uri(uri.to_string())),
                    }
                }
                Self::list(entries)
            }
        }
    }

    /// Validate the policy's own shape
    ///
    /// An explicit list must be non-empty; the scalar policies carry no
    /// further shape constraints.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::List(entries) if entries.is_empty() => Err(Error::InvalidPolicy(
                "an explicit namespace list must not be empty".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for NamespacePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str(XS_ANY_NS_ANY),
            Self::Local => f.write_str(XS_ANY_NS_LOCAL),
            Self::Other => f.write_str(XS_ANY_NS_OTHER),
            Self::TargetNamespace => f.write_str(XS_ANY_NS_TARGET),
            Self::List(entries) => {
                let rendered: Vec<String> = entries.iter().map(ToString::to_string).collect();
                f.write_str(&rendered.join(" "))
            }
        }
    }
}

/// Capability interface for children stored at an extension point
///
/// Concrete element wrappers implement this without needing a shared
/// base type; the validator only ever asks for the namespace and the
/// emptiness of a child.
pub trait ExtensionChild {
    /// Namespace URI of the child element, if any
    fn namespace_of(&self) -> Option<&str>;

    /// Whether the child would serialize to empty content
    fn is_empty_content(&self) -> bool;
}

impl ExtensionChild for XmlElement {
    fn namespace_of(&self) -> Option<&str> {
        self.namespace()
    }

    fn is_empty_content(&self) -> bool {
        self.children.is_empty() && self.text.is_none()
    }
}

/// An extension point holding a policy and its validated children
///
/// Children are set as a batch through validation, never incrementally;
/// a failed validation leaves the previously stored children untouched.
#[derive(Debug, Clone)]
pub struct ExtensionPoint<C> {
    policy: NamespacePolicy,
    process_contents: ProcessContents,
    children: Vec<C>,
}

impl<C: ExtensionChild> ExtensionPoint<C> {
    /// Create an extension point with the default `##any` policy
    pub fn new() -> Self {
        Self {
            policy: NamespacePolicy::default(),
            process_contents: ProcessContents::default(),
            children: Vec::new(),
        }
    }

    /// Create an extension point with the given policy
    pub fn with_policy(policy: NamespacePolicy) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            policy,
            process_contents: ProcessContents::default(),
            children: Vec::new(),
        })
    }

    /// Get the active namespace policy
    pub fn policy(&self) -> &NamespacePolicy {
        &self.policy
    }

    /// Replace the namespace policy
    ///
    /// Validates the policy's shape only; stored children are not
    /// re-checked until the next [`ExtensionPoint::set_children`].
    pub fn set_policy(&mut self, policy: NamespacePolicy) -> Result<()> {
        policy.validate()?;
        self.policy = policy;
        Ok(())
    }

    /// Get the process contents mode
    pub fn process_contents(&self) -> ProcessContents {
        self.process_contents
    }

    /// Set the process contents mode
    pub fn set_process_contents(&mut self, mode: ProcessContents) {
        self.process_contents = mode;
    }

    /// Get the stored children
    pub fn children(&self) -> &[C] {
        &self.children
    }

    /// Validate a candidate child list and store it
    ///
    /// `own_namespace` is the enclosing element's declared namespace; the
    /// `##other`/`##targetNamespace` policies and the list markers are
    /// evaluated against it. On failure nothing is stored and the error
    /// names the policy, the enclosing namespace and the offending
    /// namespaces.
    pub fn set_children(&mut self, children: Vec<C>, own_namespace: Option<&str>) -> Result<()> {
        check_children(&self.policy, own_namespace, &children)?;
        self.children = children;
        Ok(())
    }

    /// Whether the extension point would produce empty content
    ///
    /// True iff there are no children, or every child reports empty
    /// content. All children are inspected.
    pub fn is_empty_content(&self) -> bool {
        self.children
            .iter()
            .fold(true, |empty, child| empty & child.is_empty_content())
    }
}

impl<C: ExtensionChild> Default for ExtensionPoint<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Decide admissibility of a candidate child list under a policy
fn check_children<C: ExtensionChild>(
    policy: &NamespacePolicy,
    own_namespace: Option<&str>,
    children: &[C],
) -> Result<()> {
    let namespaces: Vec<Option<&str>> = children.iter().map(|c| c.namespace_of()).collect();

    match policy {
        NamespacePolicy::Local => {
            let offending = collect_offending(&namespaces, |ns| ns.is_some());
            if !offending.is_empty() {
                return Err(SchemaViolation::new(
                    "all child elements must be unqualified (no namespace)",
                    policy.to_string(),
                )
                .with_element_namespace(own_namespace)
                .with_offending(offending)
                .into());
            }
        }
        NamespacePolicy::List(entries) => {
            // Resolve the ##targetNamespace and ##local markers.
            let allowed: IndexSet<Option<&str>> = entries
                .iter()
                .map(|entry| match entry {
                    ListEntry::Uri(uri) => Some(uri.as_str()),
                    ListEntry::TargetNamespace => own_namespace,
                    ListEntry::Local => None,
                })
                .collect();

            let offending = collect_offending(&namespaces, |ns| !allowed.contains(ns));
            if !offending.is_empty() {
                return Err(SchemaViolation::new(
                    "elements from namespaces outside the allowed set are present",
                    policy.to_string(),
                )
                .with_element_namespace(own_namespace)
                .with_offending(offending)
                .into());
            }
        }
        NamespacePolicy::Any | NamespacePolicy::Other | NamespacePolicy::TargetNamespace => {
            let unqualified = collect_offending(&namespaces, |ns| ns.is_none());
            if !unqualified.is_empty() {
                return Err(SchemaViolation::new(
                    "all child elements must be namespaced",
                    policy.to_string(),
                )
                .with_element_namespace(own_namespace)
                .with_offending(unqualified)
                .into());
            }

            match policy {
                NamespacePolicy::Other => {
                    let offending = collect_offending(&namespaces, |ns| *ns == own_namespace);
                    if !offending.is_empty() {
                        return Err(SchemaViolation::new(
                            "child elements must not use the enclosing element's namespace",
                            policy.to_string(),
                        )
                        .with_element_namespace(own_namespace)
                        .with_offending(offending)
                        .into());
                    }
                }
                NamespacePolicy::TargetNamespace => {
                    let offending = collect_offending(&namespaces, |ns| *ns != own_namespace);
                    if !offending.is_empty() {
                        return Err(SchemaViolation::new(
                            "child elements must use the enclosing element's namespace",
                            policy.to_string(),
                        )
                        .with_element_namespace(own_namespace)
                        .with_offending(offending)
                        .into());
                    }
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// Collect display forms of the namespaces matching a predicate, deduplicated
fn collect_offending<F>(namespaces: &[Option<&str>], mut is_offending: F) -> Vec<String>
where
    F: FnMut(&Option<&str>) -> bool,
{
    let mut seen: IndexSet<String> = IndexSet::new();
    for ns in namespaces {
        if is_offending(ns) {
            seen.insert(display_namespace(*ns));
        }
    }
    seen.into_iter().collect()
}

fn display_namespace(ns: Option<&str>) -> String {
    match ns {
        Some(uri) => uri.to_string(),
        None => "(no namespace)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Child {
        ns: Option<String>,
        empty: bool,
    }

    impl ExtensionChild for Child {
        fn namespace_of(&self) -> Option<&str> {
            self.ns.as_deref()
        }

        fn is_empty_content(&self) -> bool {
            self.empty
        }
    }

    fn child(ns: Option<&str>) -> Child {
        Child {
            ns: ns.map(String::from),
            empty: false,
        }
    }

    fn empty_child(ns: Option<&str>) -> Child {
        Child {
            ns: ns.map(String::from),
            empty: true,
        }
    }

    #[test]
    fn test_process_contents_from_str() {
        assert_eq!(ProcessContents::from_str("strict"), Some(ProcessContents::Strict));
        assert_eq!(ProcessContents::from_str("lax"), Some(ProcessContents::Lax));
        assert_eq!(ProcessContents::from_str("skip"), Some(ProcessContents::Skip));
        assert_eq!(ProcessContents::from_str("invalid"), None);
    }

    #[test]
    fn test_policy_from_attr_scalars() {
        assert_eq!(NamespacePolicy::from_attr("##any").unwrap(), NamespacePolicy::Any);
        assert_eq!(NamespacePolicy::from_attr("##local").unwrap(), NamespacePolicy::Local);
        assert_eq!(NamespacePolicy::from_attr("##other").unwrap(), NamespacePolicy::Other);
        assert_eq!(
            NamespacePolicy::from_attr("##targetNamespace").unwrap(),
            NamespacePolicy::TargetNamespace
        );
    }

    #[test]
    fn test_policy_from_attr_list() {
        let policy = NamespacePolicy::from_attr("urn:a ##targetNamespace ##local").unwrap();
        match &policy {
            NamespacePolicy::List(entries) => {
                assert!(entries.contains(&ListEntry::Uri("urn:a".to_string())));
                assert!(entries.contains(&ListEntry::TargetNamespace));
                assert!(entries.contains(&ListEntry::Local));
            }
            other => panic!("expected List, got {:?}", other),
        }
    }

    #[test]
    fn test_policy_list_rejects_any_and_other() {
        assert!(matches!(
            NamespacePolicy::from_attr("urn:a ##any"),
            Err(Error::InvalidPolicy(_))
        ));
        assert!(matches!(
            NamespacePolicy::from_attr("##other urn:a"),
            Err(Error::InvalidPolicy(_))
        ));
    }

    #[test]
    fn test_policy_list_rejects_unknown_keyword() {
        assert!(matches!(
            NamespacePolicy::from_attr("##bogus"),
            Err(Error::InvalidPolicy(_))
        ));
    }

    #[test]
    fn test_policy_list_rejects_empty() {
        assert!(matches!(
            NamespacePolicy::from_attr(""),
            Err(Error::InvalidPolicy(_))
        ));
        assert!(matches!(
            NamespacePolicy::list(Vec::new()),
            Err(Error::InvalidPolicy(_))
        ));
    }

    #[test]
    fn test_policy_display_round_trip() {
        for attr in ["##any", "##local", "##other", "##targetNamespace", "urn:a ##local"] {
            let policy = NamespacePolicy::from_attr(attr).unwrap();
            assert_eq!(NamespacePolicy::from_attr(&policy.to_string()).unwrap(), policy);
        }
    }

    #[test]
    fn test_local_policy() {
        let mut point: ExtensionPoint<Child> =
            ExtensionPoint::with_policy(NamespacePolicy::Local).unwrap();

        assert!(point.set_children(vec![child(None)], None).is_ok());
        assert!(matches!(
            point.set_children(vec![child(Some("urn:a"))], None),
            Err(Error::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_other_policy() {
        let mut point: ExtensionPoint<Child> =
            ExtensionPoint::with_policy(NamespacePolicy::Other).unwrap();

        assert!(point
            .set_children(vec![child(Some("urn:y"))], Some("urn:x"))
            .is_ok());
        assert!(matches!(
            point.set_children(vec![child(Some("urn:x"))], Some("urn:x")),
            Err(Error::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_target_namespace_policy() {
        let mut point: ExtensionPoint<Child> =
            ExtensionPoint::with_policy(NamespacePolicy::TargetNamespace).unwrap();

        assert!(point
            .set_children(vec![child(Some("urn:x"))], Some("urn:x"))
            .is_ok());
        assert!(matches!(
            point.set_children(vec![child(Some("urn:y"))], Some("urn:x")),
            Err(Error::SchemaViolation(_))
        ));
    }

    #[test]
    fn test_scalar_policies_require_namespaced_children() {
        for policy in [
            NamespacePolicy::Any,
            NamespacePolicy::Other,
            NamespacePolicy::TargetNamespace,
        ] {
            let mut point: ExtensionPoint<Child> = ExtensionPoint::with_policy(policy).unwrap();
            assert!(matches!(
                point.set_children(vec![child(None)], Some("urn:x")),
                Err(Error::SchemaViolation(_))
            ));
        }
    }

    #[test]
    fn test_list_policy_resolves_markers() {
        let policy = NamespacePolicy::from_attr("urn:a ##targetNamespace").unwrap();
        let mut point: ExtensionPoint<Child> = ExtensionPoint::with_policy(policy).unwrap();

        assert!(point
            .set_children(
                vec![child(Some("urn:a")), child(Some("urn:x"))],
                Some("urn:x")
            )
            .is_ok());

        match point.set_children(vec![child(Some("urn:z"))], Some("urn:x")) {
            Err(Error::SchemaViolation(violation)) => {
                assert!(violation.offending_namespaces.contains(&"urn:z".to_string()));
                assert_eq!(violation.element_namespace.as_deref(), Some("urn:x"));
            }
            other => panic!("expected SchemaViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_list_policy_local_marker() {
        let policy = NamespacePolicy::from_attr("urn:a ##local").unwrap();
        let mut point: ExtensionPoint<Child> = ExtensionPoint::with_policy(policy).unwrap();

        assert!(point
            .set_children(vec![child(None), child(Some("urn:a"))], Some("urn:x"))
            .is_ok());
    }

    #[test]
    fn test_failed_validation_keeps_previous_children() {
        let mut point: ExtensionPoint<Child> =
            ExtensionPoint::with_policy(NamespacePolicy::TargetNamespace).unwrap();

        point
            .set_children(vec![child(Some("urn:x"))], Some("urn:x"))
            .unwrap();
        assert_eq!(point.children().len(), 1);

        let result = point.set_children(
            vec![child(Some("urn:x")), child(Some("urn:y"))],
            Some("urn:x"),
        );
        assert!(result.is_err());
        assert_eq!(point.children().len(), 1);
    }

    #[test]
    fn test_is_empty_content() {
        let mut point: ExtensionPoint<Child> = ExtensionPoint::new();
        assert!(point.is_empty_content());

        point
            .set_children(vec![empty_child(Some("urn:a")), empty_child(Some("urn:b"))], None)
            .unwrap();
        assert!(point.is_empty_content());

        point
            .set_children(vec![empty_child(Some("urn:a")), child(Some("urn:b"))], None)
            .unwrap();
        assert!(!point.is_empty_content());
    }

    #[test]
    fn test_xml_element_as_extension_child() {
        use crate::namespaces::QName;

        let elem = XmlElement::new(QName::namespaced("urn:a", "ext"));
        assert_eq!(elem.namespace_of(), Some("urn:a"));
        assert!(elem.is_empty_content());

        let mut full = XmlElement::new(QName::local("ext"));
        full.set_text("payload");
        assert!(!full.is_empty_content());
    }
}
