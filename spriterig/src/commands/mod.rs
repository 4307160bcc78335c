//! Command implementations and the project loading they share

pub mod bake;
pub mod info;
pub mod pose;
pub mod tree;
pub mod validate;

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use spriterig_core::Rig;
use spriterig_core::project::ProjectLoader;

/// Documents that make up a project
///
/// Files are applied in order: sprites, bones, attachments, animation. The
/// attachment config alone is enough when it already embeds sprites and bones.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Attachment config with sprite instances (and optionally sprites and bones)
    pub attachments: PathBuf,

    /// Sprite project to load first
    #[arg(long)]
    pub sprites: Option<PathBuf>,

    /// Bone project to load first
    #[arg(long)]
    pub bones: Option<PathBuf>,

    /// Animation document
    #[arg(short, long)]
    pub animation: Option<PathBuf>,
}

/// Read every document named in `args` into a loader
pub fn load_project(args: &ProjectArgs) -> Result<ProjectLoader> {
    let mut loader = ProjectLoader::new();

    if let Some(path) = &args.sprites {
        loader
            .load_sprite_project(path)
            .with_context(|| format!("Failed to load sprite project from {}", path.display()))?;
    }
    if let Some(path) = &args.bones {
        loader
            .load_bone_project(path)
            .with_context(|| format!("Failed to load bone project from {}", path.display()))?;
    }
    loader
        .load_attachment_config(&args.attachments)
        .with_context(|| {
            format!(
                "Failed to load attachment config from {}",
                args.attachments.display()
            )
        })?;
    if let Some(path) = &args.animation {
        loader
            .load_animation(path)
            .with_context(|| format!("Failed to load animation from {}", path.display()))?;
    }

    log::info!(
        "Loaded {} sprites, {} bones, {} instances, {} tracks",
        loader.sprite_count(),
        loader.bone_count(),
        loader.instance_count(),
        loader.track_count()
    );
    Ok(loader)
}

pub fn load_rig(args: &ProjectArgs) -> Result<Rig> {
    load_project(args)?
        .build()
        .context("Failed to assemble rig from project documents")
}

/// Fixed precision for coordinates in human-readable output
pub fn format_f64(value: f64) -> String {
    let rounded = format!("{value:.2}");
    if rounded == "-0.00" { "0.00".to_string() } else { rounded }
}
