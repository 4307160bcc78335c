//! Root CLI structure for spriterig

use clap::{Parser, Subcommand};

use crate::commands::{bake::BakeArgs, info::InfoArgs, pose::PoseArgs, tree::TreeArgs, validate::ValidateArgs};

#[derive(Parser)]
#[command(name = "spriterig")]
#[command(about = "Inspect skeletal sprite rigs, resolve poses and bake animation frames", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a project: counts, timing and a per-bone table
    Info(InfoArgs),

    /// Display the bone hierarchy with attached sprite instances
    Tree(TreeArgs),

    /// Resolve a single frame and print its draw list
    Pose(PoseArgs),

    /// Resolve every frame of the animation and write them as JSON
    Bake(BakeArgs),

    /// Report missing references, hierarchy cycles and sprite problems
    Validate(ValidateArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
