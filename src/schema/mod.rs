/// Table schema for the wide-column store
///
/// A table owns a fixed set of column families. Cells live under
/// (row key, family, qualifier); qualifiers are free-form, families are not.
///
/// ```text
/// Table "student"
///  ├─→ ColumnFamily("grade")
///  │    ├─→ row "csh" : math    = "99"
///  │    └─→ row "csh" : English = "100"
///  └─→ ColumnFamily("info")
///       └─→ row "csh" : name    = "x3"
/// ```
pub mod column_family_descriptor;
pub mod table_descriptor;

pub use column_family_descriptor::ColumnFamilyDescriptor;
pub use table_descriptor::{TableDescriptor, TableDescriptorBuilder};
