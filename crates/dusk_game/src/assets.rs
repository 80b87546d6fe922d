//! Sprite-sheet loading.
//!
//! The runner has no renderer, but it still resolves every sprite reference
//! up front: a loadable frame overrides the character's configured size, and
//! anything missing or out of bounds degrades to a placeholder so the world
//! keeps running.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use image::{GenericImageView, RgbaImage};

use dusk_sim::config::{FrameRect, SpriteConfig, WorldConfig};

#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    Sprite {
        path: PathBuf,
        width: u32,
        height: u32,
    },
    /// Drawn as a flat box of the character's collision size.
    Placeholder { reason: String },
}

impl Visual {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder { .. })
    }
}

/// Visuals keyed by character name ("player" or the enemy id).
#[derive(Debug, Default)]
pub struct VisualRegistry {
    visuals: BTreeMap<String, Visual>,
}

impl VisualRegistry {
    /// Load every sprite in `config`, resolving paths against `asset_root`.
    /// Successful loads write the frame size back into the config.
    pub fn load_world_visuals(config: &mut WorldConfig, asset_root: &Path) -> Self {
        let mut registry = Self::default();

        let player_visual = resolve(config.player.sprite.as_ref(), asset_root, "player");
        if let Visual::Sprite { width, height, .. } = &player_visual {
            config.player.width = *width as f32;
            config.player.height = *height as f32;
        }
        registry.visuals.insert("player".to_string(), player_visual);

        for enemy in &mut config.enemies {
            let visual = resolve(enemy.sprite.as_ref(), asset_root, &enemy.id);
            if let Visual::Sprite { width, height, .. } = &visual {
                enemy.width = *width as f32;
                enemy.height = *height as f32;
            }
            registry.visuals.insert(enemy.id.clone(), visual);
        }

        let placeholders = registry.placeholder_count();
        log::info!(
            "Resolved {} visual(s), {} placeholder(s)",
            registry.visuals.len(),
            placeholders
        );
        registry
    }

    pub fn get(&self, name: &str) -> Option<&Visual> {
        self.visuals.get(name)
    }

    pub fn len(&self) -> usize {
        self.visuals.len()
    }

    pub fn placeholder_count(&self) -> usize {
        self.visuals.values().filter(|v| v.is_placeholder()).count()
    }
}

fn resolve(sprite: Option<&SpriteConfig>, asset_root: &Path, owner: &str) -> Visual {
    let Some(sprite) = sprite else {
        return Visual::Placeholder {
            reason: "no sprite configured".to_string(),
        };
    };
    let path = asset_root.join(&sprite.path);
    match load_frame(&path, sprite.frame) {
        Ok(frame) => Visual::Sprite {
            path,
            width: frame.width(),
            height: frame.height(),
        },
        Err(reason) => {
            log::warn!("Sprite for '{owner}' unavailable, using placeholder: {reason}");
            Visual::Placeholder { reason }
        }
    }
}

/// Open `path` and cut out `frame`.
pub fn load_frame(path: &Path, frame: FrameRect) -> Result<RgbaImage, String> {
    let image =
        image::open(path).map_err(|e| format!("Failed to open '{}': {e}", path.display()))?;
    let (w, h) = image.dimensions();
    if frame.width == 0 || frame.height == 0 {
        return Err(format!(
            "Frame in '{}' has zero size ({}x{})",
            path.display(),
            frame.width,
            frame.height
        ));
    }
    let fits_x = frame.x.checked_add(frame.width).is_some_and(|r| r <= w);
    let fits_y = frame.y.checked_add(frame.height).is_some_and(|b| b <= h);
    if !fits_x || !fits_y {
        return Err(format!(
            "Frame {}x{}+{}+{} falls outside '{}' ({}x{})",
            frame.width,
            frame.height,
            frame.x,
            frame.y,
            path.display(),
            w,
            h
        ));
    }
    Ok(image
        .crop_imm(frame.x, frame.y, frame.width, frame.height)
        .to_rgba8())
}
