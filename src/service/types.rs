//! Customer service data types.
//!
//! This module defines the identifiers and documents that flow through a
//! reconciliation run, and the two customer sets the diff is computed from.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Opaque, non-empty name of a customer within the service's namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(String);

impl CustomerId {
    /// Creates an identifier, rejecting empty or whitespace-only names.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Extracts an identifier from a JSON scalar.
    ///
    /// Strings are taken as-is and integers are stringified; anything else
    /// yields `None`.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Self::new(s.as_str()),
            serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => Self::new(n.to_string()),
            _ => None,
        }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CustomerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The full declared configuration body for one customer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDocument {
    /// Customer the document belongs to.
    pub customer: CustomerId,
    /// File the document was loaded from.
    pub source: PathBuf,
    /// Request payload, keyed under the service's resource name.
    pub payload: serde_json::Value,
    /// SHA-256 digest of the payload.
    pub digest: String,
}

impl ServiceDocument {
    /// Returns the first twelve characters of the digest.
    #[must_use]
    pub fn short_digest(&self) -> &str {
        self.digest.get(..12).unwrap_or(&self.digest)
    }
}

/// Declared customers and their documents, in load order.
#[derive(Debug, Clone, Default)]
pub struct DeclaredSet {
    documents: Vec<ServiceDocument>,
    index: HashMap<CustomerId, usize>,
}

impl DeclaredSet {
    /// Creates an empty declared set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a document.
    ///
    /// # Errors
    ///
    /// Returns the source path of the earlier document if the customer is
    /// already declared; the set is left unchanged.
    pub fn insert(&mut self, document: ServiceDocument) -> std::result::Result<(), PathBuf> {
        if let Some(&existing) = self.index.get(&document.customer) {
            return Err(self.documents[existing].source.clone());
        }
        self.index
            .insert(document.customer.clone(), self.documents.len());
        self.documents.push(document);
        Ok(())
    }

    /// Returns true if the customer is declared.
    #[must_use]
    pub fn contains(&self, customer: &CustomerId) -> bool {
        self.index.contains_key(customer)
    }

    /// Returns the document declared for a customer.
    #[must_use]
    pub fn get(&self, customer: &CustomerId) -> Option<&ServiceDocument> {
        self.index.get(customer).map(|&i| &self.documents[i])
    }

    /// Iterates documents in load order.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceDocument> {
        self.documents.iter()
    }

    /// Returns the number of declared customers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns true if no customer is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Customers currently known to the controller, in enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObservedSet {
    customers: Vec<CustomerId>,
    seen: HashSet<CustomerId>,
}

impl ObservedSet {
    /// Creates an empty observed set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a customer; returns false if it was already present.
    pub fn insert(&mut self, customer: CustomerId) -> bool {
        if self.seen.insert(customer.clone()) {
            self.customers.push(customer);
            true
        } else {
            false
        }
    }

    /// Returns true if the customer is present.
    #[must_use]
    pub fn contains(&self, customer: &CustomerId) -> bool {
        self.seen.contains(customer)
    }

    /// Iterates customers in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = &CustomerId> {
        self.customers.iter()
    }

    /// Returns the number of observed customers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    /// Returns true if no customer is observed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }
}

impl FromIterator<CustomerId> for ObservedSet {
    fn from_iter<I: IntoIterator<Item = CustomerId>>(iter: I) -> Self {
        let mut set = Self::new();
        for customer in iter {
            set.insert(customer);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn id(s: &str) -> CustomerId {
        CustomerId::new(s).expect("valid id")
    }

    fn doc(customer: &str, source: &str) -> ServiceDocument {
        ServiceDocument {
            customer: id(customer),
            source: PathBuf::from(source),
            payload: json!({}),
            digest: String::from("0123456789abcdef"),
        }
    }

    #[test]
    fn test_customer_id_rejects_empty() {
        assert!(CustomerId::new("").is_none());
        assert!(CustomerId::new("  ").is_none());
        assert_eq!(id("acme").as_str(), "acme");
    }

    #[test]
    fn test_customer_id_from_json() {
        assert_eq!(CustomerId::from_json(&json!("acme")), Some(id("acme")));
        assert_eq!(CustomerId::from_json(&json!(4711)), Some(id("4711")));
        assert_eq!(CustomerId::from_json(&json!(1.5)), None);
        assert_eq!(CustomerId::from_json(&json!(null)), None);
        assert_eq!(CustomerId::from_json(&json!({"name": "acme"})), None);
    }

    #[test]
    fn test_declared_set_rejects_duplicates() {
        let mut declared = DeclaredSet::new();
        declared.insert(doc("acme", "a.yaml")).expect("first insert");

        let err = declared
            .insert(doc("acme", "b.yaml"))
            .expect_err("duplicate rejected");
        assert_eq!(err, PathBuf::from("a.yaml"));
        assert_eq!(declared.len(), 1);
        assert_eq!(
            declared.get(&id("acme")).map(|d| d.source.clone()),
            Some(PathBuf::from("a.yaml"))
        );
    }

    #[test]
    fn test_declared_set_keeps_load_order() {
        let mut declared = DeclaredSet::new();
        for name in ["zeta", "alpha", "mid"] {
            declared
                .insert(doc(name, &format!("{name}.yaml")))
                .expect("insert");
        }
        let order: Vec<&str> = declared.iter().map(|d| d.customer.as_str()).collect();
        assert_eq!(order, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_observed_set_dedupes_in_order() {
        let observed: ObservedSet = ["b", "c", "b", "a"].into_iter().map(id).collect();
        let order: Vec<&str> = observed.iter().map(CustomerId::as_str).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert!(observed.contains(&id("a")));
    }

    #[test]
    fn test_short_digest() {
        assert_eq!(doc("acme", "a.yaml").short_digest(), "0123456789ab");
    }
}
