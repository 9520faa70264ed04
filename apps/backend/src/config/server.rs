use std::env;

use crate::error::AppError;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Bind address from `BACKEND_HOST` / `BACKEND_PORT`.
pub fn bind_addr() -> Result<(String, u16), AppError> {
    let host = env::var("BACKEND_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = match env::var("BACKEND_PORT") {
        Ok(raw) => raw
            .trim()
            .parse::<u16>()
            .map_err(|_| AppError::config(format!("BACKEND_PORT is not a valid port: '{raw}'")))?,
        Err(_) => DEFAULT_PORT,
    };
    Ok((host, port))
}
