pub mod auth;
pub mod security;
pub mod snapshot;
pub mod store;

#[cfg(feature = "postgres")]
pub mod db;
