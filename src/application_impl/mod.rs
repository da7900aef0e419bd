mod endpoint_toggle;
mod forum_service_impl;
mod optimistic_controller;
mod query_client;
mod refresh_coordinator;
mod resilient_api_client;
mod review_service_impl;
mod session_service_impl;

pub use endpoint_toggle::*;
pub use forum_service_impl::*;
pub use optimistic_controller::*;
pub use query_client::*;
pub use refresh_coordinator::*;
pub use resilient_api_client::*;
pub use review_service_impl::*;
pub use session_service_impl::*;
