//! Patch graph: expression nodes wired into outputs.

use bg_expr::INPUT_CHANNELS;

/// Node identifier in the patch, equal to its index.
pub type NodeId = u16;

/// A patch of expression and output nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Patch {
    pub nodes: Vec<Node>,
    pub connections: Vec<Connection>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// One expression feeding a mono output.
    pub fn single_expression(expression: &str) -> Self {
        let mut patch = Self::new();
        let expr = patch.add_expression(expression);
        let out = patch.add_output(false);
        patch.connect(expr, out, 0);
        patch
    }

    /// Add an expression node and return its ID.
    pub fn add_expression(&mut self, expression: &str) -> NodeId {
        self.add_node(NodeKind::Expression {
            expression: String::from(expression),
        })
    }

    /// Add an output node and return its ID.
    pub fn add_output(&mut self, stereo: bool) -> NodeId {
        self.add_node(NodeKind::Output { stereo })
    }

    fn add_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node { id, kind });
        id
    }

    /// Connect the output of `from` to input channel `to_channel` of `to`.
    pub fn connect(&mut self, from: NodeId, to: NodeId, to_channel: u8) {
        self.connections.push(Connection {
            from,
            to,
            to_channel,
        });
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id as usize)
    }

    /// Expression text of node `id`, if it is an expression node.
    pub fn expression(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Expression { expression } => Some(expression),
            NodeKind::Output { .. } => None,
        }
    }

    /// Replace the stored text of an expression node. Returns false for other nodes.
    pub fn set_expression(&mut self, id: NodeId, text: &str) -> bool {
        match self.node_mut(id).map(|n| &mut n.kind) {
            Some(NodeKind::Expression { expression }) => {
                text.clone_into(expression);
                true
            }
            _ => false,
        }
    }

    /// IDs and text of every expression node.
    pub fn expressions(&self) -> impl Iterator<Item = (NodeId, &str)> {
        self.nodes.iter().filter_map(|n| match &n.kind {
            NodeKind::Expression { expression } => Some((n.id, expression.as_str())),
            NodeKind::Output { .. } => None,
        })
    }
}

/// A node in the patch.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
}

/// What a node does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Evaluates an expression over input channels `a..d`.
    Expression { expression: String },
    /// Sends its inputs to the audio output. Stereo outputs take channel 0
    /// as left and 1 as right; mono outputs only channel 0.
    Output { stereo: bool },
}

impl NodeKind {
    /// Number of input channels the node accepts.
    pub fn input_channels(&self) -> usize {
        match self {
            NodeKind::Expression { .. } => INPUT_CHANNELS,
            NodeKind::Output { stereo: true } => 2,
            NodeKind::Output { stereo: false } => 1,
        }
    }
}

/// Connection from a node's output to another node's input channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Connection {
    pub from: NodeId,
    pub to: NodeId,
    pub to_channel: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_expression_patch() {
        let patch = Patch::single_expression("t*2");
        assert_eq!(patch.nodes.len(), 2);
        assert_eq!(patch.expression(0), Some("t*2"));
        assert_eq!(patch.expression(1), None);
        assert_eq!(
            patch.connections,
            vec![Connection {
                from: 0,
                to: 1,
                to_channel: 0
            }]
        );
    }

    #[test]
    fn set_expression_only_touches_expression_nodes() {
        let mut patch = Patch::single_expression("t");
        assert!(patch.set_expression(0, "t>>2"));
        assert_eq!(patch.expression(0), Some("t>>2"));
        assert!(!patch.set_expression(1, "t"));
        assert!(!patch.set_expression(9, "t"));
    }

    #[test]
    fn input_channel_counts() {
        assert_eq!(
            NodeKind::Expression {
                expression: String::new()
            }
            .input_channels(),
            4
        );
        assert_eq!(NodeKind::Output { stereo: true }.input_channels(), 2);
        assert_eq!(NodeKind::Output { stereo: false }.input_channels(), 1);
    }

    #[test]
    fn expressions_lists_only_expression_nodes() {
        let mut patch = Patch::new();
        let a = patch.add_expression("t");
        patch.add_output(true);
        let b = patch.add_expression("a*2");
        let listed: Vec<_> = patch.expressions().collect();
        assert_eq!(listed, vec![(a, "t"), (b, "a*2")]);
    }
}
