use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// Cluster unreachable or client misconfigured
    ConnectionError,
    TableNotFound,
    /// Unknown family, duplicate table, invalid schema operation
    SchemaError,
    /// Transport failure in the middle of an operation
    IOError,
    /// Point get matched nothing
    NotFound,
    TableDisabled,
    InvalidArgument,
    Cancelled,
    Corruption,
}

#[derive(Debug, Clone)]
pub struct Status {
    code: Code,
    message: Option<String>,
}

impl Status {
    pub fn connection_error(msg: impl Into<String>) -> Self {
        Status {
            code: Code::ConnectionError,
            message: Some(msg.into()),
        }
    }

    pub fn table_not_found(table: &str) -> Self {
        Status {
            code: Code::TableNotFound,
            message: Some(format!("table '{table}' does not exist")),
        }
    }

    pub fn schema_error(msg: impl Into<String>) -> Self {
        Status {
            code: Code::SchemaError,
            message: Some(msg.into()),
        }
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Status {
            code: Code::IOError,
            message: Some(msg.into()),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Status {
            code: Code::NotFound,
            message: Some(msg.into()),
        }
    }

    pub fn table_disabled(table: &str) -> Self {
        Status {
            code: Code::TableDisabled,
            message: Some(format!("table '{table}' is disabled")),
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Status {
            code: Code::InvalidArgument,
            message: Some(msg.into()),
        }
    }

    pub fn cancelled() -> Self {
        Status {
            code: Code::Cancelled,
            message: None,
        }
    }

    pub fn corruption(msg: impl Into<String>) -> Self {
        Status {
            code: Code::Corruption,
            message: Some(msg.into()),
        }
    }

    pub fn is_connection_error(&self) -> bool {
        self.code == Code::ConnectionError
    }

    pub fn is_table_not_found(&self) -> bool {
        self.code == Code::TableNotFound
    }

    pub fn is_schema_error(&self) -> bool {
        self.code == Code::SchemaError
    }

    pub fn is_io_error(&self) -> bool {
        self.code == Code::IOError
    }

    pub fn is_not_found(&self) -> bool {
        self.code == Code::NotFound
    }

    pub fn is_table_disabled(&self) -> bool {
        self.code == Code::TableDisabled
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.code == Code::InvalidArgument
    }

    pub fn is_cancelled(&self) -> bool {
        self.code == Code::Cancelled
    }

    pub fn is_corruption(&self) -> bool {
        self.code == Code::Corruption
    }

    /// True for failures caused by infrastructure rather than by the data or
    /// the request: the operation could not be attempted or completed.
    pub fn is_infrastructure_failure(&self) -> bool {
        matches!(self.code, Code::ConnectionError | Code::IOError)
    }

    pub fn code(&self) -> Code {
        self.code
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{:?}: {}", self.code, msg),
            None => write!(f, "{:?}", self.code),
        }
    }
}

impl std::error::Error for Status {}

impl From<std::io::Error> for Status {
    fn from(err: std::io::Error) -> Self {
        Status::io_error(err.to_string())
    }
}

impl From<serde_json::Error> for Status {
    fn from(err: serde_json::Error) -> Self {
        Status::corruption(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Status>;
