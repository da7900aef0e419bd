// transport

mod http_transport;
mod navigator;

pub use http_transport::*;
pub use navigator::*;

// store

mod query_cache;

pub use query_cache::*;
