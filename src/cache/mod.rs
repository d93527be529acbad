pub mod subgraph_cache;

pub use subgraph_cache::{QueryKey, QueryMode, SubgraphCache};
