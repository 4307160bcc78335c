//! Tree rendering for bone hierarchies

use console::Style;

/// A node in a rendered hierarchy
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub name: String,
    pub node_type: NodeType,
    pub children: Vec<TreeNode>,
    /// Key/value details shown under or beside the node, in insertion order
    pub metadata: Vec<(String, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Root,
    Bone,
    Sprite,
    /// Bones that cannot be reached from any root
    Detached,
}

#[derive(Debug, Clone)]
pub struct TreeOptions {
    pub max_depth: Option<usize>,
    pub no_color: bool,
    pub show_metadata: bool,
    /// Put selected metadata on the node line instead of below it
    pub compact: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_depth: None,
            no_color: false,
            show_metadata: true,
            compact: false,
        }
    }
}

impl TreeNode {
    pub fn new(name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            name: name.into(),
            node_type,
            children: Vec::new(),
            metadata: Vec::new(),
        }
    }

    pub fn add_child(mut self, child: TreeNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_metadata(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.push((key.to_string(), value.into()));
        self
    }
}

impl NodeType {
    pub fn icon(self) -> &'static str {
        match self {
            NodeType::Root => "📁",
            NodeType::Bone => "🦴",
            NodeType::Sprite => "🖼️",
            NodeType::Detached => "⚠️",
        }
    }

    pub fn style(self, no_color: bool) -> Style {
        if no_color {
            Style::new()
        } else {
            match self {
                NodeType::Root => Style::new().bold().cyan(),
                NodeType::Bone => Style::new().green(),
                NodeType::Sprite => Style::new().magenta(),
                NodeType::Detached => Style::new().bold().red(),
            }
        }
    }
}

/// Metadata keys shown inline in compact mode
const COMPACT_KEYS: [&str; 3] = ["layer", "attach", "sprite"];

pub fn render_tree(root: &TreeNode, options: &TreeOptions) -> String {
    let mut output = String::new();
    render_node(root, &mut output, "", true, 0, options);
    output
}

fn render_node(
    node: &TreeNode,
    output: &mut String,
    prefix: &str,
    is_last: bool,
    depth: usize,
    options: &TreeOptions,
) {
    if let Some(max_depth) = options.max_depth
        && depth > max_depth
    {
        return;
    }

    let style = node.node_type.style(options.no_color);
    let connector = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };

    let mut line = format!(
        "{}{}{} {}",
        prefix,
        connector,
        node.node_type.icon(),
        style.apply_to(&node.name)
    );

    if options.show_metadata && options.compact {
        let parts: Vec<String> = node
            .metadata
            .iter()
            .filter(|(key, _)| COMPACT_KEYS.contains(&key.as_str()))
            .map(|(key, value)| format!("{key}:{value}"))
            .collect();
        if !parts.is_empty() {
            line.push_str(&format!(" [{}]", parts.join(", ")));
        }
    }

    output.push_str(&line);
    output.push('\n');

    let child_prefix = if depth == 0 {
        String::new()
    } else {
        format!("{}{}", prefix, if is_last { "    " } else { "│   " })
    };

    if options.show_metadata && !options.compact {
        let meta_style = if options.no_color {
            Style::new()
        } else {
            Style::new().dim()
        };
        for (key, value) in &node.metadata {
            output.push_str(&format!(
                "{}    🏷️  {}: {}\n",
                child_prefix,
                meta_style.apply_to(key),
                value
            ));
        }
    }

    for (i, child) in node.children.iter().enumerate() {
        let is_last_child = i == node.children.len() - 1;
        render_node(child, output, &child_prefix, is_last_child, depth + 1, options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::new("rig", NodeType::Root).add_child(
            TreeNode::new("hip", NodeType::Bone)
                .with_metadata("layer", "middle")
                .with_metadata("length", "0.00")
                .add_child(
                    TreeNode::new("torso", NodeType::Bone)
                        .add_child(TreeNode::new("chest_0", NodeType::Sprite)),
                ),
        )
    }

    #[test]
    fn test_tree_rendering() {
        let options = TreeOptions {
            no_color: true,
            ..TreeOptions::default()
        };
        let output = render_tree(&sample(), &options);

        assert!(output.contains("└── 🦴 hip"));
        assert!(output.contains("    └── 🦴 torso"));
        assert!(output.contains("chest_0"));
        assert!(output.contains("layer: middle"));
    }

    #[test]
    fn test_depth_limit_and_compact() {
        let options = TreeOptions {
            max_depth: Some(1),
            no_color: true,
            show_metadata: true,
            compact: true,
        };
        let output = render_tree(&sample(), &options);

        assert!(output.contains("hip [layer:middle]"));
        assert!(!output.contains("length"));
        assert!(!output.contains("torso"));
    }
}
