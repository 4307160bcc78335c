//! `spriterig tree`: bone hierarchy view

use anyhow::Result;
use clap::Args;
use std::collections::HashSet;

use spriterig_core::Rig;

use super::{ProjectArgs, format_f64, load_rig};
use crate::utils::{NodeType, TreeNode, TreeOptions, render_tree};

#[derive(Args, Debug)]
pub struct TreeArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Maximum depth to display
    #[arg(short, long)]
    pub depth: Option<usize>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Show a short summary on each line instead of full details
    #[arg(short, long)]
    pub compact: bool,

    /// Hide bone and sprite details
    #[arg(long)]
    pub no_metadata: bool,
}

pub fn execute(args: &TreeArgs) -> Result<()> {
    let rig = load_rig(&args.project)?;
    let root = build_tree(&rig, &args.project.attachments.display().to_string());

    let options = TreeOptions {
        max_depth: args.depth,
        no_color: args.no_color,
        show_metadata: !args.no_metadata,
        compact: args.compact,
    };
    print!("{}", render_tree(&root, &options));
    Ok(())
}

/// Roots first, each bone followed by its instances and then its children
///
/// Bones caught in a parent cycle are unreachable from every root and are
/// listed under a separate node.
pub fn build_tree(rig: &Rig, title: &str) -> TreeNode {
    let mut visited = HashSet::new();
    let mut root = TreeNode::new(title, NodeType::Root)
        .with_metadata("bones", rig.skeleton.len().to_string())
        .with_metadata("instances", rig.instances.len().to_string());

    for bone in rig.skeleton.roots() {
        root = root.add_child(bone_node(rig, &bone.name, &mut visited));
    }

    let detached: Vec<&str> = rig
        .skeleton
        .names()
        .filter(|name| !visited.contains(*name))
        .collect();
    if !detached.is_empty() {
        let mut group = TreeNode::new("unreachable (parent cycle)", NodeType::Detached);
        for name in detached {
            group = group.add_child(TreeNode::new(name, NodeType::Detached));
        }
        root = root.add_child(group);
    }

    let loose: Vec<&str> = rig
        .instances
        .values()
        .filter(|instance| {
            instance
                .bone_name
                .as_deref()
                .is_none_or(|bone| !rig.skeleton.contains(bone))
        })
        .map(|instance| instance.id.as_str())
        .collect();
    if !loose.is_empty() {
        let mut group = TreeNode::new("not drawn (no bone)", NodeType::Detached);
        for id in loose {
            group = group.add_child(TreeNode::new(id, NodeType::Sprite));
        }
        root = root.add_child(group);
    }

    root
}

fn bone_node(rig: &Rig, name: &str, visited: &mut HashSet<String>) -> TreeNode {
    let mut node = TreeNode::new(name, NodeType::Bone);
    if !visited.insert(name.to_string()) {
        return node;
    }

    if let Some(bone) = rig.skeleton.bone(name) {
        node = node
            .with_metadata("length", format_f64(bone.length))
            .with_metadata("angle", format_f64(bone.angle))
            .with_metadata("layer", format!("{}/{}", bone.layer, bone.layer_order));
        if bone.parent.is_some() {
            node = node.with_metadata("attach", bone.parent_attachment_point.to_string());
        }
    }

    for instance in rig
        .instances
        .values()
        .filter(|instance| instance.bone_name.as_deref() == Some(name))
    {
        node = node.add_child(
            TreeNode::new(&instance.id, NodeType::Sprite)
                .with_metadata("sprite", &instance.sprite_name)
                .with_metadata("attach", instance.bone_attachment_point.to_string()),
        );
    }

    for child in rig.skeleton.children(name) {
        node = node.add_child(bone_node(rig, child, visited));
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use spriterig_core::{AttachmentPoint, Bone, Skeleton, SpriteInstance, SpriteRect};

    #[test]
    fn test_cycle_bones_are_listed_separately() {
        let skeleton = Skeleton::from_bones([
            Bone::new("hip", 0.0, 0.0, 0.0, 0.0),
            Bone::new("torso", 0.0, 0.0, 50.0, -90.0).with_parent("hip", AttachmentPoint::End),
            Bone::new("a", 0.0, 0.0, 1.0, 0.0).with_parent("b", AttachmentPoint::End),
            Bone::new("b", 0.0, 0.0, 1.0, 0.0).with_parent("a", AttachmentPoint::End),
        ])
        .unwrap();
        let mut rig = Rig::new(skeleton);
        rig.add_sprite(SpriteRect::new("chest", 0, 0, 8, 8)).unwrap();
        rig.add_instance(SpriteInstance::new("chest_0", "chest").attached_to("torso", AttachmentPoint::Start))
            .unwrap();
        rig.add_instance(SpriteInstance::new("loose", "chest")).unwrap();

        let tree = build_tree(&rig, "rig");
        let names: Vec<&str> = tree.children.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["hip", "unreachable (parent cycle)", "not drawn (no bone)"]);

        let torso = &tree.children[0].children[0];
        assert_eq!(torso.name, "torso");
        assert_eq!(torso.children[0].name, "chest_0");
        assert_eq!(tree.children[1].children.len(), 2);
    }
}
