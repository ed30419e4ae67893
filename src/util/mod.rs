pub mod cancel;
pub mod slice;
pub mod status;

pub use cancel::CancelToken;
pub use slice::Slice;
pub use status::{Code, Result, Status};
