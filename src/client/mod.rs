mod client;
mod interactions;
mod reconciler;

pub use client::*;
pub use interactions::*;
pub use reconciler::*;
