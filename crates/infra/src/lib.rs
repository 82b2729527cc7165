//! Infrastructure layer: Postgres-backed repository implementations,
//! connection pooling, configuration, and cancellation plumbing.

pub mod auth;
pub mod audit;
pub mod cancellation;
pub mod config;
pub mod db;
pub mod entries;
pub mod error;
pub mod rubric;
pub mod teams;
pub mod venue;


