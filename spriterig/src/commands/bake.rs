//! `spriterig bake`: resolve every frame of the clip

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

use spriterig_core::Frame;

use super::{ProjectArgs, load_rig};

#[derive(Args, Debug)]
pub struct BakeArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Sample rate, overriding the animation's own fps
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: Option<u32>,

    /// Write JSON here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit compact JSON
    #[arg(long)]
    pub compact: bool,
}

#[derive(Serialize)]
struct BakeOutput {
    duration: f64,
    fps: u32,
    frame_count: usize,
    frames: Vec<Frame>,
}

pub fn execute(args: &BakeArgs) -> Result<()> {
    let animation = args
        .project
        .animation
        .as_ref()
        .context("bake needs an animation document (--animation)")?;

    let mut rig = load_rig(&args.project)?;
    if let Some(fps) = args.fps {
        log::info!("Overriding animation fps {} with {}", rig.clip.fps, fps);
        rig.clip.fps = fps;
    }

    let frames = rig
        .bake()
        .with_context(|| format!("Failed to bake {}", animation.display()))?;
    let output = BakeOutput {
        duration: rig.clip.duration,
        fps: rig.clip.fps,
        frame_count: frames.len(),
        frames,
    };

    let json = if args.compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write frames to {}", path.display()))?;
            println!(
                "Baked {} frames at {} fps to {}",
                output.frame_count,
                output.fps,
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}
