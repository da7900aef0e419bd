mod api_client;
mod forum_service;
mod review_service;
mod session_service;
mod toggle_mutations;

pub use api_client::*;
pub use forum_service::*;
pub use review_service::*;
pub use session_service::*;
pub use toggle_mutations::*;
