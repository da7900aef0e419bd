mod entity;
mod forum;
mod interaction;
mod mutation;
mod query_key;
mod request;
mod response;
mod review;
mod user;

pub use entity::*;
pub use forum::*;
pub use interaction::*;
pub use mutation::*;
pub use query_key::*;
pub use request::*;
pub use response::*;
pub use review::*;
pub use user::*;
