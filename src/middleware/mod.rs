pub mod auth;
pub mod rate_limit;
pub mod response;

pub use auth::{authenticate, require_permission};
pub use rate_limit::{client_identity, rate_limit};
pub use response::{ApiResponse, ApiResult};
