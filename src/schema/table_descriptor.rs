use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{
    schema::ColumnFamilyDescriptor,
    util::{Result, Status},
};

/// Schema of a table: its name and the exact set of column families it owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    name: String,
    families: Vec<ColumnFamilyDescriptor>,
}

impl TableDescriptor {
    pub fn builder<S: Into<String>>(name: S) -> TableDescriptorBuilder {
        TableDescriptorBuilder {
            name: name.into(),
            families: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column families sorted by name
    pub fn column_families(&self) -> &[ColumnFamilyDescriptor] {
        &self.families
    }

    pub fn family_names(&self) -> Vec<&str> {
        self.families.iter().map(|f| f.name()).collect()
    }

    pub fn has_family(&self, family: &str) -> bool {
        self.families.iter().any(|f| f.name == family)
    }

    pub(crate) fn add_family(&mut self, family: ColumnFamilyDescriptor) -> Result<()> {
        family.validate()?;
        if self.has_family(family.name()) {
            return Err(Status::schema_error(format!(
                "column family '{}' already exists in table '{}'",
                family.name, self.name
            )));
        }
        self.families.push(family);
        self.families.sort();
        Ok(())
    }

    pub(crate) fn remove_family(&mut self, family: &str) -> Result<()> {
        if !self.has_family(family) {
            return Err(Status::schema_error(format!(
                "column family '{}' does not exist in table '{}'",
                family, self.name
            )));
        }
        if self.families.len() == 1 {
            return Err(Status::schema_error(format!(
                "cannot remove '{}', the only column family of table '{}'",
                family, self.name
            )));
        }
        self.families.retain(|f| f.name != family);
        Ok(())
    }
}

/// Builder for [`TableDescriptor`]; `build` validates the whole schema.
pub struct TableDescriptorBuilder {
    name: String,
    families: Vec<ColumnFamilyDescriptor>,
}

impl TableDescriptorBuilder {
    pub fn column_family(mut self, family: impl Into<ColumnFamilyDescriptor>) -> Self {
        self.families.push(family.into());
        self
    }

    pub fn column_families<I, F>(mut self, families: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<ColumnFamilyDescriptor>,
    {
        self.families.extend(families.into_iter().map(Into::into));
        self
    }

    pub fn build(self) -> Result<TableDescriptor> {
        validate_table_name(&self.name)?;

        if self.families.is_empty() {
            return Err(Status::schema_error(format!(
                "table '{}' must have at least one column family",
                self.name
            )));
        }

        let mut seen = BTreeSet::new();
        for family in &self.families {
            family.validate()?;
            if !seen.insert(family.name.as_str()) {
                return Err(Status::schema_error(format!(
                    "column family '{}' is listed twice",
                    family.name
                )));
            }
        }

        let mut families = self.families;
        families.sort();

        Ok(TableDescriptor {
            name: self.name,
            families,
        })
    }
}

pub(crate) fn validate_table_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Status::schema_error("table name is empty"));
    }
    let valid = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if !valid {
        return Err(Status::schema_error(format!("invalid table name '{name}'")));
    }
    Ok(())
}
