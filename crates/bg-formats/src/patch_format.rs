//! TOML patch files.
//!
//! ```toml
//! version = 1
//!
//! [[node]]
//! kind = "expression"
//! expression = "t*(t>>5|t>>8)"
//!
//! [[node]]
//! kind = "output"
//! stereo = false
//!
//! [[connection]]
//! from = 0
//! to = 1
//! channel = 0
//! ```
//!
//! Node IDs are positions in the `node` list.

use bg_engine::{validate_connections, NodeKind, Patch};
use serde::{Deserialize, Serialize};

use crate::FormatError;

/// Current patch file version.
pub const PATCH_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PatchFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default, rename = "node")]
    nodes: Vec<NodeEntry>,
    #[serde(default, rename = "connection")]
    connections: Vec<ConnectionEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum NodeEntry {
    Expression {
        #[serde(default)]
        expression: String,
    },
    Output {
        #[serde(default)]
        stereo: bool,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct ConnectionEntry {
    from: u16,
    to: u16,
    #[serde(default)]
    channel: u8,
}

fn default_version() -> u32 {
    PATCH_VERSION
}

/// Parse a patch file and check its connections.
///
/// Expression text is not compiled here; a patch with invalid expressions
/// still loads.
pub fn load_patch(text: &str) -> Result<Patch, FormatError> {
    let file: PatchFile = toml::from_str(text)?;
    if file.version > PATCH_VERSION {
        return Err(FormatError::UnsupportedVersion(file.version));
    }

    let mut patch = Patch::new();
    for entry in file.nodes {
        match entry {
            NodeEntry::Expression { expression } => patch.add_expression(&expression),
            NodeEntry::Output { stereo } => patch.add_output(stereo),
        };
    }
    for conn in file.connections {
        patch.connect(conn.from, conn.to, conn.channel);
    }
    validate_connections(&patch)?;

    log::debug!(
        "loaded patch: {} nodes, {} connections",
        patch.nodes.len(),
        patch.connections.len()
    );
    Ok(patch)
}

/// Serialize `patch` to TOML.
pub fn save_patch(patch: &Patch) -> Result<String, FormatError> {
    let file = PatchFile {
        version: PATCH_VERSION,
        nodes: patch
            .nodes
            .iter()
            .map(|node| match &node.kind {
                NodeKind::Expression { expression } => NodeEntry::Expression {
                    expression: expression.clone(),
                },
                NodeKind::Output { stereo } => NodeEntry::Output { stereo: *stereo },
            })
            .collect(),
        connections: patch
            .connections
            .iter()
            .map(|c| ConnectionEntry {
                from: c.from,
                to: c.to,
                channel: c.to_channel,
            })
            .collect(),
    };
    Ok(toml::to_string_pretty(&file)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bg_engine::GraphError;

    const STEREO: &str = r#"
[[node]]
kind = "expression"
expression = "t*(t>>5|t>>8)"

[[node]]
kind = "expression"
expression = "t>>2"

[[node]]
kind = "output"
stereo = true

[[connection]]
from = 0
to = 2
channel = 0

[[connection]]
from = 1
to = 2
channel = 1
"#;

    #[test]
    fn loads_stereo_patch() {
        let patch = load_patch(STEREO).unwrap();
        assert_eq!(patch.nodes.len(), 3);
        assert_eq!(patch.expression(0), Some("t*(t>>5|t>>8)"));
        assert_eq!(patch.node(2).unwrap().kind, NodeKind::Output { stereo: true });
        assert_eq!(patch.connections.len(), 2);
        assert_eq!(patch.connections[1].to_channel, 1);
    }

    #[test]
    fn save_then_load_preserves_patch() {
        let patch = load_patch(STEREO).unwrap();
        let text = save_patch(&patch).unwrap();
        assert!(text.contains("version = 1"));
        assert_eq!(load_patch(&text).unwrap(), patch);
    }

    #[test]
    fn invalid_expression_text_still_loads() {
        let text = "[[node]]\nkind = \"expression\"\nexpression = \"1 +\"\n";
        let patch = load_patch(text).unwrap();
        assert_eq!(patch.expression(0), Some("1 +"));
    }

    #[test]
    fn rejects_bad_files() {
        assert!(matches!(load_patch("node = 3"), Err(FormatError::Parse(_))));
        assert!(matches!(
            load_patch("version = 99"),
            Err(FormatError::UnsupportedVersion(99))
        ));
        let dangling = "[[node]]\nkind = \"output\"\n[[connection]]\nfrom = 4\nto = 0\n";
        assert!(matches!(
            load_patch(dangling),
            Err(FormatError::Graph(GraphError::UnknownNode(4)))
        ));
    }

    #[test]
    fn empty_file_is_empty_patch() {
        let patch = load_patch("").unwrap();
        assert!(patch.nodes.is_empty());
    }
}
