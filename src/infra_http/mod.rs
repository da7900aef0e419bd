mod fake_backend;
mod reqwest_transport;

pub use fake_backend::*;
pub use reqwest_transport::*;
