//! `spriterig validate`: structural checks on a project

use anyhow::{Result, bail};
use clap::Args;

use spriterig_core::RigError;

use super::{ProjectArgs, load_rig};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Sprite sheet width in pixels, enables bounds checks
    #[arg(long, requires = "sheet_height")]
    pub sheet_width: Option<i32>,

    /// Sprite sheet height in pixels
    #[arg(long, requires = "sheet_width")]
    pub sheet_height: Option<i32>,

    /// Fail on warnings too
    #[arg(long)]
    pub strict: bool,
}

pub fn execute(args: &ValidateArgs) -> Result<()> {
    println!("Validating project: {}", args.project.attachments.display());

    let rig = load_rig(&args.project)?;
    let mut warnings = Vec::new();

    for missing in rig.validate_references() {
        warnings.push(missing.to_string());
    }

    for sprite in rig.sprites.values() {
        if !sprite.has_positive_size() {
            warnings.push(format!(
                "sprite '{}' has degenerate size {}x{}",
                sprite.name, sprite.width, sprite.height
            ));
        }
        if !sprite.origin_in_range() {
            warnings.push(format!(
                "sprite '{}' has origin ({}, {}) outside the rect",
                sprite.name, sprite.origin_x, sprite.origin_y
            ));
        }
        if let (Some(width), Some(height)) = (args.sheet_width, args.sheet_height)
            && !sprite.fits_within(width, height)
        {
            warnings.push(format!(
                "sprite '{}' extends past the {}x{} sheet",
                sprite.name, width, height
            ));
        }
    }

    for warning in &warnings {
        println!("⚠️  {warning}");
    }

    match rig.skeleton.topological_order() {
        Ok(order) => println!("✓ Hierarchy resolves ({} bones)", order.len()),
        Err(RigError::StructuralCycle { bone, chain }) => {
            println!("❌ Parent cycle at '{bone}': {}", chain.join(" -> "));
            bail!("bone hierarchy contains a cycle");
        }
        Err(e) => return Err(e.into()),
    }

    if warnings.is_empty() {
        println!("✓ Project validation passed!");
    } else if args.strict {
        bail!("{} warning(s) reported", warnings.len());
    } else {
        println!("{} warning(s) reported", warnings.len());
    }

    Ok(())
}
