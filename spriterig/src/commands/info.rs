//! `spriterig info`: project summary

use anyhow::{Context, Result};
use clap::Args;

use super::{ProjectArgs, format_f64, load_project};
use crate::utils::{add_table_row, create_table};

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Also list sprites and sprite instances
    #[arg(short, long)]
    pub detailed: bool,
}

pub fn execute(args: &InfoArgs) -> Result<()> {
    println!("Loading project: {}", args.project.attachments.display());

    let loader = load_project(&args.project)?;
    let sheet = loader.sprite_sheet_path().map(str::to_string);
    let rig = loader.build().context("Failed to assemble rig")?;

    println!("\n=== Project Information ===");
    println!("Sprite sheet:     {}", sheet.as_deref().unwrap_or("(none)"));
    println!("Sprites:          {}", rig.sprites.len());
    println!("Bones:            {}", rig.skeleton.len());
    println!("Sprite instances: {}", rig.instances.len());

    println!("\n=== Animation ===");
    println!("Duration:         {}s", format_f64(rig.clip.duration));
    println!("FPS:              {}", rig.clip.fps);
    println!("Frames:           {}", rig.clip.frame_count());
    println!("Tracks:           {}", rig.clip.tracks().count());

    println!("\n=== Bones ===");
    let mut table = create_table(&[
        "Name", "Parent", "Attach", "X", "Y", "Length", "Angle", "Layer", "Order", "Keys",
    ]);
    for bone in rig.skeleton.bones() {
        let keys = rig.clip.track(&bone.name).map_or(0, |track| track.len());
        add_table_row(
            &mut table,
            vec![
                bone.name.clone(),
                bone.parent.clone().unwrap_or_else(|| "-".to_string()),
                bone.parent_attachment_point.to_string(),
                format_f64(bone.x),
                format_f64(bone.y),
                format_f64(bone.length),
                format_f64(bone.angle),
                bone.layer.to_string(),
                bone.layer_order.to_string(),
                keys.to_string(),
            ],
        );
    }
    table.printstd();

    if args.detailed {
        println!("\n=== Sprites ===");
        let mut table = create_table(&["Name", "X", "Y", "Width", "Height", "Origin"]);
        for sprite in rig.sprites.values() {
            add_table_row(
                &mut table,
                vec![
                    sprite.name.clone(),
                    sprite.x.to_string(),
                    sprite.y.to_string(),
                    sprite.width.to_string(),
                    sprite.height.to_string(),
                    format!("{}, {}", format_f64(sprite.origin_x), format_f64(sprite.origin_y)),
                ],
            );
        }
        table.printstd();

        println!("\n=== Sprite Instances ===");
        let mut table = create_table(&["Id", "Sprite", "Bone", "Attach", "Offset", "Rotation", "Scale"]);
        for instance in rig.instances.values() {
            add_table_row(
                &mut table,
                vec![
                    instance.id.clone(),
                    instance.sprite_name.clone(),
                    instance.bone_name.clone().unwrap_or_else(|| "-".to_string()),
                    instance.bone_attachment_point.to_string(),
                    format!("{}, {}", format_f64(instance.offset_x), format_f64(instance.offset_y)),
                    format_f64(instance.offset_rotation),
                    format_f64(instance.scale),
                ],
            );
        }
        table.printstd();
    }

    Ok(())
}
