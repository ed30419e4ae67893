pub mod admin;
pub mod cluster;
pub mod connection;
pub mod filter;
pub mod mutation;
pub mod mutator;
pub mod options;
pub mod reader;
pub mod row;
pub mod schema;
pub mod statistics;
pub mod util;

pub use admin::SchemaAdmin;
pub use cluster::{CompressionType, LocalCluster, StoreCluster};
pub use connection::{
    AdminHandle, Connection, ConnectionManager, Connector, LocalConnector, TableHandle,
};
pub use filter::{CompareOp, Filter, Target};
pub use mutation::{BatchReport, Delete, Mutation, Put};
pub use mutator::Mutator;
pub use options::{ConnectionConfig, ReadOptions, WriteOptions};
pub use reader::{Get, Reader, Scan, Scanner, ScannerState};
pub use row::{Cell, Row};
pub use schema::{ColumnFamilyDescriptor, TableDescriptor};
pub use statistics::ClientStatistics;
pub use util::{CancelToken, Code, Result, Slice, Status};
