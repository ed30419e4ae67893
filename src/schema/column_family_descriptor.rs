use serde::{Deserialize, Serialize};

use crate::util::{Result, Status};

/// Descriptor of one Column Family of a table
///
/// A column family groups qualifiers and is fixed at schema-definition time:
/// cells can only be written under families the table declares.
///
/// # Example
///
/// ```ignore
/// use widecolumn::{ColumnFamilyDescriptor, TableDescriptor};
///
/// let descriptor = TableDescriptor::builder("student")
///     .column_family(ColumnFamilyDescriptor::new("grade"))
///     .column_family(ColumnFamilyDescriptor::new("info"))
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnFamilyDescriptor {
    /// Name of the column family
    pub name: String,
}

impl ColumnFamilyDescriptor {
    /// Create a new column family descriptor
    pub fn new<S: Into<String>>(name: S) -> Self {
        ColumnFamilyDescriptor { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Family names are printable and must not contain the `family:qualifier`
    /// separator.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Status::schema_error("column family name is empty"));
        }
        if self.name.chars().any(|c| c == ':' || c.is_control()) {
            return Err(Status::schema_error(format!(
                "invalid column family name '{}'",
                self.name
            )));
        }
        Ok(())
    }
}

impl From<&str> for ColumnFamilyDescriptor {
    fn from(name: &str) -> Self {
        ColumnFamilyDescriptor::new(name)
    }
}

impl From<String> for ColumnFamilyDescriptor {
    fn from(name: String) -> Self {
        ColumnFamilyDescriptor::new(name)
    }
}
