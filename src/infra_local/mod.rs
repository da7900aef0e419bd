mod memory_query_cache;
mod navigator;

pub use memory_query_cache::*;
pub use navigator::*;
