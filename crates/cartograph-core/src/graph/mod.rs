mod backend;
mod memory;
mod neo4j;
mod store;
mod view;

pub use backend::{GraphBackend, GraphError, GraphNode, GraphResult, MAX_PATHS, MAX_PATH_DEPTH};
pub use memory::MemoryGraph;
pub use neo4j::Neo4jGraph;
pub use store::{BuildMode, BuildReport, GraphStore};
pub use view::{EdgeView, GraphPath, GraphStats, GraphView, NodeView, PathSegment, ViewStats};
