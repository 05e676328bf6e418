//! Patch validation and evaluation order.

use crate::patch::{NodeId, NodeKind, Patch};

/// Most connections a single input channel may receive.
pub const MAX_FAN_IN: usize = 16;

/// Structural problems that stop a patch from being rendered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("connection refers to unknown node {0}")]
    UnknownNode(NodeId),
    #[error("output node {0} cannot feed other nodes")]
    NotASource(NodeId),
    #[error("node {node} has no input channel {channel}")]
    InvalidChannel { node: NodeId, channel: u8 },
    #[error("node {node} channel {channel} has too many inputs")]
    FanInExceeded { node: NodeId, channel: u8 },
    #[error("patch contains a feedback cycle")]
    Cycle,
}

/// Check every connection against the nodes it names.
pub fn validate_connections(patch: &Patch) -> Result<(), GraphError> {
    for conn in &patch.connections {
        let from = patch.node(conn.from).ok_or(GraphError::UnknownNode(conn.from))?;
        let to = patch.node(conn.to).ok_or(GraphError::UnknownNode(conn.to))?;

        if matches!(from.kind, NodeKind::Output { .. }) {
            return Err(GraphError::NotASource(conn.from));
        }
        if conn.to_channel as usize >= to.kind.input_channels() {
            return Err(GraphError::InvalidChannel {
                node: conn.to,
                channel: conn.to_channel,
            });
        }

        let fan_in = patch
            .connections
            .iter()
            .filter(|c| c.to == conn.to && c.to_channel == conn.to_channel)
            .count();
        if fan_in > MAX_FAN_IN {
            return Err(GraphError::FanInExceeded {
                node: conn.to,
                channel: conn.to_channel,
            });
        }
    }
    Ok(())
}

/// Topological sort via Kahn's algorithm.
///
/// Returns nodes ordered so that every source appears before its consumers.
/// Expression nodes cannot feed back into themselves, directly or
/// indirectly; a cycle is an error.
pub fn topological_sort(patch: &Patch) -> Result<Vec<NodeId>, GraphError> {
    let n = patch.nodes.len();
    let mut in_degree = vec![0u32; n];
    for conn in &patch.connections {
        if (conn.to as usize) < n {
            in_degree[conn.to as usize] += 1;
        }
    }

    // Reverse so that `pop` yields the lowest ID first.
    let mut queue: Vec<NodeId> = (0..n as NodeId)
        .rev()
        .filter(|&id| in_degree[id as usize] == 0)
        .collect();

    let mut result = Vec::with_capacity(n);

    while let Some(node_id) = queue.pop() {
        result.push(node_id);

        for conn in &patch.connections {
            if conn.from == node_id && (conn.to as usize) < n {
                in_degree[conn.to as usize] -= 1;
                if in_degree[conn.to as usize] == 0 {
                    queue.push(conn.to);
                }
            }
        }
    }

    if result.len() < n {
        return Err(GraphError::Cycle);
    }
    Ok(result)
}
