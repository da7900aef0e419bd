//! Backend contract: REST routes and the JSON response envelope.

pub mod envelope;
pub mod routes;
