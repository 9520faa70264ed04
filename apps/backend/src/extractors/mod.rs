pub mod admin_auth;
pub mod json_body;

pub use admin_auth::AdminAuth;
pub use json_body::JsonBody;
