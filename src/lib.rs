pub mod config;
pub mod error;
pub mod snapshot;
pub mod graph;
pub mod lookup;
pub mod cache;
pub mod context;
pub mod http;
pub mod watch;

#[cfg(test)]
mod fixtures;

pub use config::Config;
pub use context::{GraphContext, LoadedGraph};
pub use error::{ArbgraphError, Result};
pub use graph::{build_graph, Graph, GraphPayload, NameResolver, Subgraph, SubgraphExtractor};
pub use snapshot::Snapshot;
