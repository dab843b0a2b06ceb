//! HTTP surface: route table, request dispatch, and router construction.

pub mod mux;
pub mod routes;

pub use mux::Mux;
pub use routes::build_router;
