//! HTTP API: server wiring, authentication middleware, and request/response
//! mapping over the domain services.

pub mod app;
pub mod authz;
pub mod context;
pub mod middleware;
