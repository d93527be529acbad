//! JSON shape shared by the full graph and every subgraph.

use serde::{Deserialize, Serialize};

use super::{Edge, Node};

/// Node `type` expected by the front-end renderer.
pub const PROFILE_NODE_TYPE: &str = "profileNode";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphPayload {
    pub nodes: Vec<ProfileNode>,
    pub edges: Vec<WireEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub data: ProfileData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileData {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEdge {
    pub id: String,
    pub source: String,
    pub target: String,
}

impl From<&Node> for ProfileNode {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.to_string(),
            node_type: PROFILE_NODE_TYPE.to_string(),
            data: ProfileData {
                name: node.name.clone(),
                kind: node.kind.clone(),
            },
        }
    }
}

impl From<&Edge> for WireEdge {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id(),
            source: edge.source.to_string(),
            target: edge.target.to_string(),
        }
    }
}

impl GraphPayload {
    pub fn from_parts(nodes: &[Node], edges: &[Edge]) -> Self {
        Self {
            nodes: nodes.iter().map(ProfileNode::from).collect(),
            edges: edges.iter().map(WireEdge::from).collect(),
        }
    }
}
