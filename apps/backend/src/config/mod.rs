pub mod admin;
pub mod db;
pub mod round;
pub mod server;
