//! Projection expressions for scan and query requests.
//!
//! Attribute names are always sent through placeholders (`#p0`, `#p1`, ...)
//! because common names such as `name` are reserved words in DynamoDB.

use std::collections::HashMap;

use super::{Result, StorageError};

/// A built projection: the expression string plus its placeholder map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    attributes: Vec<String>,
    expression: String,
    names: HashMap<String, String>,
}

impl Projection {
    /// Builds a projection over `attributes`, in the given order.
    ///
    /// Fails with [`StorageError::QueryBuild`] when the list is empty,
    /// contains an empty name or repeats a name.
    pub fn new<I, S>(attributes: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let attributes: Vec<String> = attributes.into_iter().map(Into::into).collect();

        if attributes.is_empty() {
            return Err(StorageError::QueryBuild(
                "projection needs at least one attribute".to_string(),
            ));
        }

        let mut names = HashMap::with_capacity(attributes.len());
        let mut placeholders = Vec::with_capacity(attributes.len());

        for (idx, attribute) in attributes.iter().enumerate() {
            if attribute.is_empty() {
                return Err(StorageError::QueryBuild(format!(
                    "projection attribute #{idx} has an empty name"
                )));
            }
            if names.values().any(|existing| existing == attribute) {
                return Err(StorageError::QueryBuild(format!(
                    "duplicate projection attribute: {attribute}"
                )));
            }

            let placeholder = format!("#p{idx}");
            names.insert(placeholder.clone(), attribute.clone());
            placeholders.push(placeholder);
        }

        Ok(Self {
            expression: placeholders.join(", "),
            attributes,
            names,
        })
    }

    /// The projection expression, e.g. `#p0, #p1`.
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Placeholder to attribute name map for `ExpressionAttributeNames`.
    pub fn names(&self) -> &HashMap<String, String> {
        &self.names
    }

    /// Projected attribute names in order.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(String::as_str)
    }

    /// The placeholder already bound to `attribute`, if it is projected.
    pub fn placeholder_for(&self, attribute: &str) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, name)| name.as_str() == attribute)
            .map(|(placeholder, _)| placeholder.as_str())
    }
}
