pub mod config;
pub mod database;
pub mod engine;
pub mod routes;
pub mod session;
pub mod tree;
pub mod web_server;

pub fn create_timestamp() -> String {
    use chrono::{SecondsFormat, Utc};
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
