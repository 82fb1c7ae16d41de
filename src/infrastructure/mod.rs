pub mod config;
pub mod db;
pub mod host;
pub mod reporter;
