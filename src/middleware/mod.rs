pub mod auth;
pub mod payload;
pub mod response;

pub use response::{ApiResponse, ApiResult, Deleted};
