//! # Job Description
//!
//! The JSON document that drives a compile: where the store images go and which generators feed
//! tiles into them. Every generator section is optional.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CompileError, Result};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSpec {
    /// Prefix of every store image path, e.g. `out/202-` gives `out/202-s1.s1`
    pub rom_path_root: String,
    #[serde(default)]
    pub pad_coarse_store_to: Option<usize>,
    #[serde(default)]
    pub layout_file: Option<String>,
    #[serde(default)]
    pub reserve_coarse_blank_tile: bool,
    #[serde(default)]
    pub fine_images: Option<ImagesSpec>,
    #[serde(default)]
    pub coarse_images: Option<ImagesSpec>,
    #[serde(default)]
    pub tilesets: Option<ImagesSpec>,
    #[serde(default)]
    pub coarse_animations: Option<AnimationsSpec>,
    #[serde(default)]
    pub splash: Option<SplashSpec>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImagesSpec {
    pub inputs: Vec<ImageInput>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    pub name: String,
    pub image_file: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AnimationsSpec {
    pub inputs: Vec<AnimationGroupInput>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnimationGroupInput {
    pub name: String,
    pub animations: Vec<AnimationInput>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationInput {
    pub name: String,
    pub image_file: String,
    /// Width of one frame in tiles
    #[serde(default)]
    pub tile_width: Option<u32>,
    /// 4 or 8: the frames become one hardware-driven animation group
    #[serde(default)]
    pub auto_animation: Option<usize>,
    /// Anything else on the animation is passed through to the layout untouched
    #[serde(flatten)]
    pub custom: Map<String, Value>,
}

impl AnimationInput {
    pub fn frame_width(&self) -> u32 {
        self.tile_width.unwrap_or(1)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplashSpec {
    pub main_logo_image_file: String,
    #[serde(default)]
    pub mega_banner_image_file: Option<String>,
    #[serde(default)]
    pub spec_banner_image_file: Option<String>,
    #[serde(default)]
    pub company_logo_image_file: Option<String>,
    #[serde(default)]
    pub copyright_image_file: Option<String>,
}

impl JobSpec {
    pub fn from_json(json: &str) -> Result<Self> {
        let job: JobSpec = serde_json::from_str(json)?;
        job.validate()?;
        Ok(job)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rom_path_root.is_empty() {
            return Err(CompileError::InvalidJob("romPathRoot must not be empty".to_string()));
        }

        for group in self.coarse_animations.iter().flat_map(|a| &a.inputs) {
            for animation in &group.animations {
                if animation.tile_width == Some(0) {
                    return Err(CompileError::InvalidJob(format!(
                        "{}/{}: tileWidth must be at least 1",
                        group.name, animation.name
                    )));
                }
                if let Some(frames) = animation.auto_animation {
                    if frames != 4 && frames != 8 {
                        return Err(CompileError::InvalidJob(format!(
                            "{}/{}: autoAnimation must be 4 or 8, got {}",
                            group.name, animation.name, frames
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}
