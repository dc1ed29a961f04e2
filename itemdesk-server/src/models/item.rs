//! Item record and item name validation

use sqlx::FromRow;

use super::ValidationError;

/// A row of the `items` table
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Item {
    pub id: i64,
    pub name: String,
}

/// Validated item name.
///
/// The only rule is that the raw submitted value is non-empty. Whitespace is
/// kept as submitted, so `"  "` is a valid name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemName(String);

impl ItemName {
    /// Create a new item name, rejecting the empty string.
    ///
    /// # Example
    /// ```
    /// use itemdesk_server::models::ItemName;
    ///
    /// assert!(ItemName::new("widget").is_ok());
    /// assert!(ItemName::new("").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }

        Ok(Self(s.to_owned()))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
