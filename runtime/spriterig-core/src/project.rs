//! JSON project import
//!
//! Reads the authoring tool's documents: sprite projects, bone projects,
//! attachment configurations and animation files. Documents are parsed
//! leniently. Missing or unrecognised enum strings and out-of-range numbers
//! fall back to [`MigrationDefaults`] with a warning, while the core types
//! stay strict.
//!
//! # Example
//!
//! ```rust,no_run
//! use spriterig_core::project::ProjectLoader;
//!
//! let mut loader = ProjectLoader::new();
//! loader.load_attachment_config("sprite_attachment_config.json")?;
//! loader.load_animation("bone_animation.json")?;
//! let rig = loader.build()?;
//! let frame = rig.frame_at(0.5)?;
//! # Ok::<(), spriterig_core::RigError>(())
//! ```

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::animation::{AnimationClip, AnimationTrack, Interpolation, Keyframe, Transform};
use crate::error::Result;
use crate::rig::Rig;
use crate::skeleton::{AttachmentPoint, Bone, BoneLayer, OriginalBonePosition, Skeleton};
use crate::sprite::{SpriteInstance, SpriteRect};

/// Values substituted for missing or unusable fields at import
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationDefaults {
    pub layer: BoneLayer,
    pub parent_attachment: AttachmentPoint,
    pub instance_attachment: AttachmentPoint,
    pub interpolation: Interpolation,
    /// Clip length in seconds
    pub duration: f64,
    pub fps: u32,
    /// Used for missing and non-positive instance scales
    pub instance_scale: f64,
    pub origin_x: f64,
    pub origin_y: f64,
}

impl Default for MigrationDefaults {
    fn default() -> Self {
        Self {
            layer: BoneLayer::Middle,
            parent_attachment: AttachmentPoint::End,
            instance_attachment: AttachmentPoint::Start,
            interpolation: Interpolation::Linear,
            duration: crate::animation::DEFAULT_DURATION,
            fps: crate::animation::DEFAULT_FPS,
            instance_scale: 1.0,
            origin_x: 0.5,
            origin_y: 0.5,
        }
    }
}

fn migrate<T>(raw: Option<&str>, default: T, field: &str, owner: &str) -> T
where
    T: FromStr + fmt::Display + Copy,
{
    let Some(value) = raw else {
        return default;
    };
    value.parse().unwrap_or_else(|_| {
        log::warn!("{owner}: unknown {field} '{value}', using '{default}'");
        default
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpriteDocument {
    #[serde(default)]
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub origin_x: Option<f64>,
    #[serde(default)]
    pub origin_y: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoneDocument {
    #[serde(default)]
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub length: f64,
    pub angle: f64,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub parent_attachment_point: Option<String>,
    #[serde(default)]
    pub layer: Option<String>,
    #[serde(default)]
    pub layer_order: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpriteInstanceDocument {
    #[serde(default)]
    pub id: Option<String>,
    pub sprite_name: String,
    #[serde(default)]
    pub bone_name: Option<String>,
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
    #[serde(default)]
    pub offset_rotation: f64,
    #[serde(default)]
    pub scale: Option<f64>,
    #[serde(default)]
    pub bone_attachment_point: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransformDocument {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale: f64,
}

impl Default for TransformDocument {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyframeDocument {
    pub time: f64,
    #[serde(default)]
    pub transform: TransformDocument,
    #[serde(default)]
    pub interpolation: Option<String>,
    #[serde(default)]
    pub sprite_instance_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackDocument {
    #[serde(default)]
    pub keyframes: Vec<KeyframeDocument>,
}

/// Sprite sheet definitions
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SpriteProjectDocument {
    pub sprite_sheet_path: Option<String>,
    pub sprites: IndexMap<String, SpriteDocument>,
}

/// Bone hierarchy
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BoneProjectDocument {
    pub bones: IndexMap<String, BoneDocument>,
}

/// Sprites, bones and the instances attaching one to the other
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttachmentConfigDocument {
    pub sprite_sheet_path: Option<String>,
    pub sprites: IndexMap<String, SpriteDocument>,
    pub bones: IndexMap<String, BoneDocument>,
    pub sprite_instances: IndexMap<String, SpriteInstanceDocument>,
}

/// Keyframe tracks plus the rest pose they were authored against
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AnimationDocument {
    pub duration: Option<f64>,
    pub fps: Option<f64>,
    pub original_bone_positions: IndexMap<String, OriginalBonePosition>,
    pub sprite_instances: IndexMap<String, SpriteInstanceDocument>,
    pub bone_tracks: IndexMap<String, TrackDocument>,
}

impl MigrationDefaults {
    pub fn sprite(&self, key: &str, doc: &SpriteDocument) -> SpriteRect {
        warn_on_renamed("sprite", key, doc.name.as_deref());
        SpriteRect {
            name: key.to_string(),
            x: doc.x as i32,
            y: doc.y as i32,
            width: doc.width as i32,
            height: doc.height as i32,
            origin_x: doc.origin_x.unwrap_or(self.origin_x),
            origin_y: doc.origin_y.unwrap_or(self.origin_y),
        }
    }

    pub fn bone(&self, key: &str, doc: &BoneDocument) -> Bone {
        warn_on_renamed("bone", key, doc.name.as_deref());
        let owner = format!("bone '{key}'");
        let mut bone = Bone::new(key, doc.x, doc.y, doc.length, doc.angle);
        bone.parent.clone_from(&doc.parent);
        bone.parent_attachment_point = migrate(
            doc.parent_attachment_point.as_deref(),
            self.parent_attachment,
            "attachment point",
            &owner,
        );
        bone.layer = migrate(doc.layer.as_deref(), self.layer, "layer", &owner);
        bone.layer_order = doc.layer_order.unwrap_or(0);
        bone
    }

    pub fn sprite_instance(&self, key: &str, doc: &SpriteInstanceDocument) -> SpriteInstance {
        warn_on_renamed("sprite instance", key, doc.id.as_deref());
        let owner = format!("sprite instance '{key}'");
        let scale = match doc.scale {
            None => self.instance_scale,
            Some(scale) if scale > 0.0 && scale.is_finite() => scale,
            Some(scale) => {
                log::warn!("{owner}: scale {scale} is not positive, using {}", self.instance_scale);
                self.instance_scale
            }
        };

        SpriteInstance {
            id: key.to_string(),
            sprite_name: doc.sprite_name.clone(),
            bone_name: doc.bone_name.clone(),
            offset_x: doc.offset_x,
            offset_y: doc.offset_y,
            offset_rotation: doc.offset_rotation,
            scale,
            bone_attachment_point: migrate(
                doc.bone_attachment_point.as_deref(),
                self.instance_attachment,
                "attachment point",
                &owner,
            ),
        }
    }

    pub fn track(&self, bone: &str, doc: &TrackDocument) -> Result<AnimationTrack> {
        let owner = format!("track '{bone}'");
        let keyframes = doc
            .keyframes
            .iter()
            .map(|kf| Keyframe {
                time: kf.time,
                transform: Transform::new(
                    kf.transform.x,
                    kf.transform.y,
                    kf.transform.rotation,
                    kf.transform.scale,
                ),
                interpolation: migrate(
                    kf.interpolation.as_deref(),
                    self.interpolation,
                    "interpolation",
                    &owner,
                ),
                sprite_instance_id: kf.sprite_instance_id.clone(),
            })
            .collect();
        AnimationTrack::from_keyframes(bone, keyframes)
    }

    pub fn duration(&self, raw: Option<f64>) -> f64 {
        match raw {
            None => self.duration,
            Some(duration) if duration.is_finite() && duration >= 0.0 => duration,
            Some(duration) => {
                log::warn!("animation: invalid duration {duration}, using {}", self.duration);
                self.duration
            }
        }
    }

    pub fn fps(&self, raw: Option<f64>) -> u32 {
        match raw {
            None => self.fps,
            Some(fps) if (1.0..=f64::from(u32::MAX)).contains(&fps) => fps as u32,
            Some(fps) => {
                log::warn!("animation: invalid fps {fps}, using {}", self.fps);
                self.fps
            }
        }
    }
}

fn warn_on_renamed(kind: &str, key: &str, name: Option<&str>) {
    if let Some(name) = name
        && name != key
    {
        log::warn!("{kind} stored under '{key}' calls itself '{name}', using '{key}'");
    }
}

/// Accumulates project documents into a rig
///
/// Loading follows the authoring tool's conventions: an attachment config
/// only supplies sprites and bones when none are loaded yet but always
/// replaces the instances, and an animation file adds instances that are not
/// loaded yet while replacing the tracks and original positions.
#[derive(Debug, Clone, Default)]
pub struct ProjectLoader {
    defaults: MigrationDefaults,
    sprite_sheet_path: Option<String>,
    sprites: IndexMap<String, SpriteRect>,
    bones: IndexMap<String, Bone>,
    instances: IndexMap<String, SpriteInstance>,
    tracks: IndexMap<String, AnimationTrack>,
    original_positions: IndexMap<String, OriginalBonePosition>,
    duration: Option<f64>,
    fps: Option<u32>,
}

fn read_document(path: &Path) -> Result<String> {
    log::info!("Loading {}", path.display());
    Ok(fs::read_to_string(path)?)
}

impl ProjectLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: MigrationDefaults) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    pub fn defaults(&self) -> &MigrationDefaults {
        &self.defaults
    }

    /// Sheet image path named by the last document that supplied sprites
    pub fn sprite_sheet_path(&self) -> Option<&str> {
        self.sprite_sheet_path.as_deref()
    }

    pub fn sprite_count(&self) -> usize {
        self.sprites.len()
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    fn set_sprites(&mut self, sheet: Option<String>, sprites: &IndexMap<String, SpriteDocument>) {
        self.sprite_sheet_path = sheet.filter(|path| !path.is_empty());
        self.sprites = sprites
            .iter()
            .map(|(key, doc)| (key.clone(), self.defaults.sprite(key, doc)))
            .collect();
        for sprite in self.sprites.values() {
            if !sprite.has_positive_size() {
                log::warn!(
                    "Sprite '{}' has non-positive size {}x{}",
                    sprite.name,
                    sprite.width,
                    sprite.height
                );
            }
        }
        log::info!("Loaded {} sprite definitions", self.sprites.len());
    }

    fn set_bones(&mut self, bones: &IndexMap<String, BoneDocument>) {
        self.bones = bones
            .iter()
            .map(|(key, doc)| (key.clone(), self.defaults.bone(key, doc)))
            .collect();
        log::info!("Loaded {} bones", self.bones.len());
    }

    /// Replace the sprite definitions from a sprite project file
    pub fn load_sprite_project(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = read_document(path.as_ref())?;
        self.load_sprite_project_str(&text)
    }

    pub fn load_sprite_project_str(&mut self, json: &str) -> Result<()> {
        let doc: SpriteProjectDocument = serde_json::from_str(json)?;
        self.set_sprites(doc.sprite_sheet_path, &doc.sprites);
        Ok(())
    }

    /// Replace the bone hierarchy from a bone project file
    pub fn load_bone_project(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = read_document(path.as_ref())?;
        self.load_bone_project_str(&text)
    }

    pub fn load_bone_project_str(&mut self, json: &str) -> Result<()> {
        let doc: BoneProjectDocument = serde_json::from_str(json)?;
        self.set_bones(&doc.bones);
        Ok(())
    }

    /// Load an attachment configuration file
    pub fn load_attachment_config(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = read_document(path.as_ref())?;
        self.load_attachment_config_str(&text)
    }

    pub fn load_attachment_config_str(&mut self, json: &str) -> Result<()> {
        let doc: AttachmentConfigDocument = serde_json::from_str(json)?;

        if self.sprites.is_empty() {
            self.set_sprites(doc.sprite_sheet_path, &doc.sprites);
        }
        if self.bones.is_empty() {
            self.set_bones(&doc.bones);
        }

        self.instances = doc
            .sprite_instances
            .iter()
            .map(|(key, instance)| (key.clone(), self.defaults.sprite_instance(key, instance)))
            .collect();
        log::info!("Loaded {} sprite instances", self.instances.len());
        Ok(())
    }

    /// Load an animation file
    pub fn load_animation(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let text = read_document(path.as_ref())?;
        self.load_animation_str(&text)
    }

    pub fn load_animation_str(&mut self, json: &str) -> Result<()> {
        let doc: AnimationDocument = serde_json::from_str(json)?;

        let mut tracks = IndexMap::with_capacity(doc.bone_tracks.len());
        for (bone, track) in &doc.bone_tracks {
            tracks.insert(bone.clone(), self.defaults.track(bone, track)?);
        }

        self.duration = Some(self.defaults.duration(doc.duration));
        self.fps = Some(self.defaults.fps(doc.fps));
        self.original_positions = doc.original_bone_positions;

        for (key, instance) in &doc.sprite_instances {
            if !self.instances.contains_key(key) {
                let instance = self.defaults.sprite_instance(key, instance);
                self.instances.insert(key.clone(), instance);
            }
        }

        let keyframes: usize = tracks.values().map(AnimationTrack::len).sum();
        self.tracks = tracks;
        log::info!(
            "Loaded animation: {} tracks, {keyframes} keyframes",
            self.tracks.len()
        );
        Ok(())
    }

    /// Assemble the loaded documents into a rig
    ///
    /// Fails only on duplicate or invalid bones. Dangling references are kept
    /// and can be listed with [`Rig::validate_references`].
    pub fn build(self) -> Result<Rig> {
        let skeleton = Skeleton::from_bones(self.bones.into_values())?;

        let mut clip = AnimationClip::new(
            self.duration.unwrap_or(self.defaults.duration),
            self.fps.unwrap_or(self.defaults.fps),
        );
        for track in self.tracks.into_values() {
            clip.insert_track(track);
        }
        clip.set_original_positions(self.original_positions);

        Ok(Rig {
            skeleton,
            sprites: self.sprites,
            instances: self.instances,
            clip,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const ATTACHMENTS: &str = r#"{
        "sprite_sheet_path": "hero.png",
        "sprites": {
            "torso": {"name": "torso", "x": 0, "y": 0, "width": 16, "height": 32, "origin_x": 0.5, "origin_y": 0.0},
            "head": {"name": "head", "x": 16, "y": 0, "width": 16, "height": 16}
        },
        "bones": {
            "hip": {"name": "hip", "x": 100, "y": 100, "length": 0, "angle": 0, "parent": null, "children": ["torso"]},
            "torso": {"name": "torso", "x": 0, "y": 0, "length": 50, "angle": -90, "parent": "hip",
                      "parent_attachment_point": "end", "layer": "front", "layer_order": 2}
        },
        "sprite_instances": {
            "torso_0": {"id": "torso_0", "sprite_name": "torso", "bone_name": "torso"},
            "head_0": {"id": "head_0", "sprite_name": "head", "bone_name": "torso",
                       "bone_attachment_point": "end", "scale": 0}
        }
    }"#;

    #[test]
    fn test_attachment_config_defaults() {
        let mut loader = ProjectLoader::new();
        loader.load_attachment_config_str(ATTACHMENTS).unwrap();
        assert_eq!(loader.sprite_sheet_path(), Some("hero.png"));

        let rig = loader.build().unwrap();
        assert_eq!(rig.sprites["head"].origin_x, 0.5);
        assert_eq!(rig.sprites["torso"].origin_y, 0.0);

        let hip = rig.skeleton.bone("hip").unwrap();
        assert_eq!(hip.layer, BoneLayer::Middle);
        assert_eq!(hip.parent_attachment_point, AttachmentPoint::End);
        assert_eq!(rig.skeleton.children("hip"), ["torso".to_string()]);

        let torso = rig.skeleton.bone("torso").unwrap();
        assert_eq!((torso.layer, torso.layer_order), (BoneLayer::Front, 2));

        let head = &rig.instances["head_0"];
        assert_eq!(head.scale, 1.0);
        assert_eq!(head.bone_attachment_point, AttachmentPoint::End);
        assert_eq!(
            rig.instances["torso_0"].bone_attachment_point,
            AttachmentPoint::Start
        );
        assert_eq!(rig.clip.duration, 5.0);
        assert_eq!(rig.clip.fps, 30);
    }

    #[test]
    fn test_unknown_enum_strings_migrate() {
        let json = r#"{"bones": {"a": {"x": 0, "y": 0, "length": 1, "angle": 0,
            "layer": "sideways", "parent_attachment_point": "middle"}}}"#;
        let mut loader = ProjectLoader::new();
        loader.load_bone_project_str(json).unwrap();
        let rig = loader.build().unwrap();
        let bone = rig.skeleton.bone("a").unwrap();
        assert_eq!(bone.layer, BoneLayer::Middle);
        assert_eq!(bone.parent_attachment_point, AttachmentPoint::End);
    }

    #[test]
    fn test_custom_defaults() {
        let defaults = MigrationDefaults {
            layer: BoneLayer::Behind,
            ..MigrationDefaults::default()
        };
        let json = r#"{"bones": {"a": {"x": 0, "y": 0, "length": 1, "angle": 0}}}"#;
        let mut loader = ProjectLoader::with_defaults(defaults);
        loader.load_bone_project_str(json).unwrap();
        assert_eq!(
            loader.build().unwrap().skeleton.bone("a").unwrap().layer,
            BoneLayer::Behind
        );
    }

    #[test]
    fn test_attachment_config_keeps_loaded_bones() {
        let mut loader = ProjectLoader::new();
        loader
            .load_bone_project_str(r#"{"bones": {"solo": {"x": 0, "y": 0, "length": 1, "angle": 0}}}"#)
            .unwrap();
        loader.load_attachment_config_str(ATTACHMENTS).unwrap();

        assert_eq!(loader.bone_count(), 1);
        assert_eq!(loader.sprite_count(), 2);
        assert_eq!(loader.instance_count(), 2);
    }

    #[test]
    fn test_animation_accumulates() {
        let animation = r#"{
            "duration": 2.0,
            "fps": 24,
            "original_bone_positions": {"hip": [100, 100, 0]},
            "sprite_instances": {
                "torso_0": {"id": "torso_0", "sprite_name": "other", "bone_name": "hip"},
                "extra": {"id": "extra", "sprite_name": "head"}
            },
            "bone_tracks": {
                "hip": {"keyframes": [
                    {"time": 1.0, "transform": {"rotation": 0}, "interpolation": "ease_in"},
                    {"time": 0.0, "transform": {"x": 0, "y": 0, "rotation": 90, "scale": 1}, "interpolation": "wobble"}
                ]}
            }
        }"#;

        let mut loader = ProjectLoader::new();
        loader.load_attachment_config_str(ATTACHMENTS).unwrap();
        loader.load_animation_str(animation).unwrap();
        let rig = loader.build().unwrap();

        assert_eq!(rig.clip.duration, 2.0);
        assert_eq!(rig.clip.fps, 24);
        assert_eq!(rig.instances.len(), 3);
        // Already loaded instances are not replaced
        assert_eq!(rig.instances["torso_0"].sprite_name, "torso");

        let track = rig.clip.track("hip").unwrap();
        assert_eq!(track.start_time(), Some(0.0));
        assert_eq!(track.keyframes()[0].interpolation, Interpolation::Linear);
        assert_eq!(track.keyframes()[1].interpolation, Interpolation::EaseIn);
        assert_eq!(track.keyframes()[1].transform.scale, 1.0);
        assert_eq!(
            rig.clip.original_position("hip"),
            Some(OriginalBonePosition::new(100.0, 100.0, 0.0))
        );
    }

    #[test]
    fn test_invalid_fps_and_duration_fall_back() {
        let mut loader = ProjectLoader::new();
        loader
            .load_animation_str(r#"{"duration": -1, "fps": 0}"#)
            .unwrap();
        let rig = loader.build().unwrap();
        assert_eq!(rig.clip.duration, 5.0);
        assert_eq!(rig.clip.fps, 30);
    }

    #[test]
    fn test_malformed_json_is_error() {
        let mut loader = ProjectLoader::new();
        let err = loader.load_animation_str("{ not json").unwrap_err();
        assert!(matches!(err, crate::RigError::Json(_)));
    }

    #[test]
    fn test_negative_keyframe_time_is_error() {
        let mut loader = ProjectLoader::new();
        let err = loader
            .load_animation_str(r#"{"bone_tracks": {"a": {"keyframes": [{"time": -1, "transform": {}}]}}}"#)
            .unwrap_err();
        assert!(matches!(err, crate::RigError::ValidationError(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let mut loader = ProjectLoader::new();
        let err = loader
            .load_animation("/definitely/not/here.json")
            .unwrap_err();
        assert!(matches!(err, crate::RigError::Io(_)));
    }
}
