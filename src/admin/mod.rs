use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    connection::ConnectionManager,
    schema::{ColumnFamilyDescriptor, TableDescriptor},
    util::Result,
};

/// Table and column family lifecycle
///
/// Each call acquires an admin sub-handle from the manager and releases it
/// before returning, on success and on failure alike.
#[derive(Clone)]
pub struct SchemaAdmin {
    manager: Arc<ConnectionManager>,
}

impl SchemaAdmin {
    pub fn new(manager: Arc<ConnectionManager>) -> Self {
        SchemaAdmin { manager }
    }

    /// Creates `name` with exactly the given column families.
    ///
    /// Fails with a schema error if the table exists or the family list is
    /// empty, duplicated or invalid.
    pub fn create_table<I, F>(&self, name: &str, families: I) -> Result<()>
    where
        I: IntoIterator<Item = F>,
        F: Into<ColumnFamilyDescriptor>,
    {
        let descriptor = TableDescriptor::builder(name)
            .column_families(families)
            .build()?;
        self.create_table_with_descriptor(&descriptor)
    }

    pub fn create_table_with_descriptor(&self, descriptor: &TableDescriptor) -> Result<()> {
        let admin = self.manager.admin_handle()?;
        admin.create_table(descriptor)?;
        admin.statistics().record_schema_op();
        info!(
            table = descriptor.name(),
            families = ?descriptor.family_names(),
            "table created"
        );
        Ok(())
    }

    /// Disables the table if it is serving, then deletes it.
    ///
    /// If disabling fails the table is left in place and the disable error
    /// is returned. A table another caller disabled in the meantime is
    /// deleted as is.
    ///
    /// If deleting fails after this call disabled the table, the table is
    /// enabled again and the delete error is returned. A failed re-enable is
    /// logged and does not replace the delete error.
    pub fn drop_table(&self, name: &str) -> Result<()> {
        let admin = self.manager.admin_handle()?;

        let mut disabled_here = false;
        if admin.is_table_enabled(name)? {
            match admin.disable_table(name) {
                Ok(()) => {
                    admin.statistics().record_schema_op();
                    disabled_here = true;
                }
                // Lost a race with a concurrent disable
                Err(e) if e.is_schema_error() && !admin.is_table_enabled(name)? => {}
                Err(e) => {
                    warn!(table = name, error = %e, "disable failed, table not dropped");
                    return Err(e);
                }
            }
        }

        if let Err(e) = admin.delete_table(name) {
            if disabled_here && !e.is_table_not_found() {
                match admin.enable_table(name) {
                    Ok(()) => warn!(table = name, error = %e, "delete failed, table re-enabled"),
                    Err(enable_err) => warn!(
                        table = name,
                        error = %e,
                        enable_error = %enable_err,
                        "delete failed and table could not be re-enabled"
                    ),
                }
            }
            return Err(e);
        }
        admin.statistics().record_schema_op();

        info!(table = name, "table dropped");
        Ok(())
    }

    /// Removes `family` and all of its cells in every row of `table`
    pub fn drop_column_family(&self, table: &str, family: &str) -> Result<()> {
        let admin = self.manager.admin_handle()?;
        admin.delete_column_family(table, family)?;
        admin.statistics().record_schema_op();
        info!(table, family, "column family dropped");
        Ok(())
    }

    pub fn add_column_family(
        &self,
        table: &str,
        family: impl Into<ColumnFamilyDescriptor>,
    ) -> Result<()> {
        let family = family.into();
        let admin = self.manager.admin_handle()?;
        admin.add_column_family(table, &family)?;
        admin.statistics().record_schema_op();
        info!(table, family = family.name(), "column family added");
        Ok(())
    }

    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let admin = self.manager.admin_handle()?;
        match admin.describe_table(name) {
            Ok(_) => Ok(true),
            Err(e) if e.is_table_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Table names in ascending order
    pub fn list_tables(&self) -> Result<Vec<String>> {
        self.manager.admin_handle()?.list_tables()
    }

    pub fn describe_table(&self, name: &str) -> Result<TableDescriptor> {
        self.manager.admin_handle()?.describe_table(name)
    }

    /// Schema error if the table is already disabled
    pub fn disable_table(&self, name: &str) -> Result<()> {
        let admin = self.manager.admin_handle()?;
        admin.disable_table(name)?;
        admin.statistics().record_schema_op();
        info!(table = name, "table disabled");
        Ok(())
    }

    /// Schema error if the table is already enabled
    pub fn enable_table(&self, name: &str) -> Result<()> {
        let admin = self.manager.admin_handle()?;
        admin.enable_table(name)?;
        admin.statistics().record_schema_op();
        info!(table = name, "table enabled");
        Ok(())
    }

    pub fn is_table_enabled(&self, name: &str) -> Result<bool> {
        self.manager.admin_handle()?.is_table_enabled(name)
    }
}
