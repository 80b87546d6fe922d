//! Session configuration: platforms, player constants, enemy spawns.
//!
//! Loaded from JSON. Structural problems (unreadable file, bad JSON, wrong
//! version, duplicate enemy ids) are load errors. Out-of-range numbers are
//! clamped to safe values with a warning instead, so a sloppy world file still
//! produces a playable session.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::combat::AttackShape;
use crate::geometry::Rect;

pub const WORLD_CONFIG_VERSION: &str = "0.1";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    #[serde(default = "default_version")]
    pub version: String,
    pub platforms: Vec<PlatformConfig>,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub enemies: Vec<EnemyConfig>,
    #[serde(default)]
    pub round: RoundConfig,
    /// A live character whose top edge falls below this line dies.
    #[serde(default = "default_kill_plane_y")]
    pub kill_plane_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub x: f32,
    pub y: f32,
    #[serde(default = "default_platform_width")]
    pub width: f32,
    #[serde(default = "default_platform_height")]
    pub height: f32,
}

impl PlatformConfig {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Sprite-sheet reference for the presentation side. The simulation only
/// uses the frame size, and only if the asset could be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteConfig {
    pub path: String,
    pub frame: FrameRect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_flash_duration")]
    pub flash_duration: f32,
    #[serde(default = "default_knockback_speed")]
    pub knockback_speed: f32,
    #[serde(default = "default_knockback_duration")]
    pub knockback_duration: f32,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            flash_duration: default_flash_duration(),
            knockback_speed: default_knockback_speed(),
            knockback_duration: default_knockback_duration(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player_spawn_x")]
    pub spawn_x: f32,
    #[serde(default = "default_player_spawn_y")]
    pub spawn_y: f32,
    /// Unscaled frame size; replaced by the sprite frame size when it loads.
    #[serde(default = "default_player_width")]
    pub width: f32,
    #[serde(default = "default_player_height")]
    pub height: f32,
    #[serde(default = "default_player_scale")]
    pub scale: f32,
    #[serde(default)]
    pub sprite: Option<SpriteConfig>,
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    #[serde(default = "default_jump_force")]
    pub jump_force: f32,
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    #[serde(default = "default_player_max_health")]
    pub max_health: i32,
    #[serde(default = "default_max_soul")]
    pub max_soul: i32,
    #[serde(default = "default_soul_per_hit")]
    pub soul_per_hit: i32,
    #[serde(default = "default_heal_cost")]
    pub heal_cost: i32,
    #[serde(default = "default_heal_amount")]
    pub heal_amount: i32,
    #[serde(default = "default_player_attack_damage")]
    pub attack_damage: i32,
    #[serde(default = "default_player_attack_duration")]
    pub attack_duration: f32,
    #[serde(default = "default_player_attack_cooldown")]
    pub attack_cooldown: f32,
    #[serde(default = "default_player_attack_shape")]
    pub attack_shape: AttackShape,
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

impl PlayerConfig {
    pub fn scaled_size(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width * self.scale, self.height * self.scale)
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn_x: default_player_spawn_x(),
            spawn_y: default_player_spawn_y(),
            width: default_player_width(),
            height: default_player_height(),
            scale: default_player_scale(),
            sprite: None,
            move_speed: default_move_speed(),
            jump_force: default_jump_force(),
            gravity: default_gravity(),
            max_health: default_player_max_health(),
            max_soul: default_max_soul(),
            soul_per_hit: default_soul_per_hit(),
            heal_cost: default_heal_cost(),
            heal_amount: default_heal_amount(),
            attack_damage: default_player_attack_damage(),
            attack_duration: default_player_attack_duration(),
            attack_cooldown: default_player_attack_cooldown(),
            attack_shape: default_player_attack_shape(),
            feedback: FeedbackConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyConfig {
    pub id: String,
    pub start_x: f32,
    pub start_y: f32,
    pub patrol_left: f32,
    pub patrol_right: f32,
    #[serde(default = "default_sprite_kind")]
    pub sprite_kind: String,
    #[serde(default)]
    pub sprite: Option<SpriteConfig>,
    #[serde(default = "default_enemy_scale")]
    pub scale: f32,
    #[serde(default = "default_enemy_width")]
    pub width: f32,
    #[serde(default = "default_enemy_height")]
    pub height: f32,
    #[serde(default = "default_enemy_max_health")]
    pub max_health: i32,
    #[serde(default = "default_enemy_damage")]
    pub damage: i32,
    #[serde(default = "default_attack_range")]
    pub attack_range: f32,
    #[serde(default = "default_detection_range")]
    pub detection_range: f32,
    #[serde(default = "default_patrol_speed")]
    pub patrol_speed: f32,
    #[serde(default = "default_chase_speed")]
    pub chase_speed: f32,
    #[serde(default = "default_gravity")]
    pub gravity: f32,
    #[serde(default = "default_enemy_attack_duration")]
    pub attack_duration: f32,
    #[serde(default = "default_enemy_attack_cooldown")]
    pub attack_cooldown: f32,
    #[serde(default = "default_enemy_attack_shape")]
    pub attack_shape: AttackShape,
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

impl EnemyConfig {
    /// An enemy with every tunable at its default.
    pub fn new(id: &str, start_x: f32, start_y: f32, patrol_left: f32, patrol_right: f32) -> Self {
        Self {
            id: id.to_string(),
            start_x,
            start_y,
            patrol_left,
            patrol_right,
            sprite_kind: default_sprite_kind(),
            sprite: None,
            scale: default_enemy_scale(),
            width: default_enemy_width(),
            height: default_enemy_height(),
            max_health: default_enemy_max_health(),
            damage: default_enemy_damage(),
            attack_range: default_attack_range(),
            detection_range: default_detection_range(),
            patrol_speed: default_patrol_speed(),
            chase_speed: default_chase_speed(),
            gravity: default_gravity(),
            attack_duration: default_enemy_attack_duration(),
            attack_cooldown: default_enemy_attack_cooldown(),
            attack_shape: default_enemy_attack_shape(),
            feedback: FeedbackConfig::default(),
        }
    }

    pub fn scaled_size(&self) -> glam::Vec2 {
        glam::Vec2::new(self.width * self.scale, self.height * self.scale)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoundConfig {
    /// Deaths the player can take; the one that exhausts this ends the round.
    #[serde(default = "default_player_lives")]
    pub player_lives: u32,
    /// Seconds a dead enemy stays in place before it is moved off-world.
    #[serde(default = "default_despawn_delay")]
    pub despawn_delay: f32,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            player_lives: default_player_lives(),
            despawn_delay: default_despawn_delay(),
        }
    }
}

impl WorldConfig {
    /// The stair-step level: four floor slabs, three rising ledges, three enemies.
    pub fn builtin() -> Self {
        let platform = |x: f32, y: f32| PlatformConfig {
            x,
            y,
            width: default_platform_width(),
            height: default_platform_height(),
        };
        let mut sentry = EnemyConfig::new("sentry", 1600.0, 250.0, 1540.0, 1760.0);
        sentry.sprite_kind = "sentry".to_string();
        sentry.max_health = 75;
        sentry.damage = 20;
        sentry.scale = 1.25;
        Self {
            version: default_version(),
            platforms: vec![
                platform(-20.0, 600.0),
                platform(255.0, 600.0),
                platform(530.0, 600.0),
                platform(705.0, 600.0),
                platform(980.0, 525.0),
                platform(1255.0, 450.0),
                platform(1530.0, 375.0),
            ],
            player: PlayerConfig::default(),
            enemies: vec![
                EnemyConfig::new("crawler_a", 450.0, 480.0, 380.0, 720.0),
                EnemyConfig::new("crawler_b", 1040.0, 400.0, 1000.0, 1200.0),
                sentry,
            ],
            round: RoundConfig::default(),
            kill_plane_y: default_kill_plane_y(),
        }
    }

    /// Clamp every numeric field into its valid range, logging each change.
    pub fn sanitized(mut self) -> Self {
        for (index, platform) in self.platforms.iter_mut().enumerate() {
            let label = format!("platforms[{index}]");
            platform.width = at_least(&label, "width", platform.width, 0.0);
            platform.height = at_least(&label, "height", platform.height, 0.0);
        }
        sanitize_player(&mut self.player);
        for enemy in &mut self.enemies {
            sanitize_enemy(enemy);
        }
        self.round.despawn_delay = at_least("round", "despawn_delay", self.round.despawn_delay, 0.0);
        if self.round.player_lives == 0 {
            log::warn!("round.player_lives is 0, using 1");
            self.round.player_lives = 1;
        }
        if !self.kill_plane_y.is_finite() {
            log::warn!("kill_plane_y is not finite, using {}", default_kill_plane_y());
            self.kill_plane_y = default_kill_plane_y();
        }
        self
    }
}

fn sanitize_player(player: &mut PlayerConfig) {
    const LABEL: &str = "player";
    player.scale = positive_or(LABEL, "scale", player.scale, default_player_scale());
    player.width = positive_or(LABEL, "width", player.width, default_player_width());
    player.height = positive_or(LABEL, "height", player.height, default_player_height());
    player.move_speed = at_least(LABEL, "move_speed", player.move_speed, 0.0);
    player.gravity = at_least(LABEL, "gravity", player.gravity, 0.0);
    if player.jump_force > 0.0 {
        log::warn!(
            "player.jump_force {} points downward, negating",
            player.jump_force
        );
        player.jump_force = -player.jump_force;
    }
    player.max_health = at_least_int(LABEL, "max_health", player.max_health, 1);
    player.max_soul = at_least_int(LABEL, "max_soul", player.max_soul, 0);
    player.soul_per_hit = at_least_int(LABEL, "soul_per_hit", player.soul_per_hit, 0);
    player.heal_cost = at_least_int(LABEL, "heal_cost", player.heal_cost, 0);
    player.heal_amount = at_least_int(LABEL, "heal_amount", player.heal_amount, 0);
    player.attack_damage = at_least_int(LABEL, "attack_damage", player.attack_damage, 0);
    sanitize_attack(
        LABEL,
        &mut player.attack_duration,
        &mut player.attack_cooldown,
        &mut player.attack_shape,
    );
    sanitize_feedback(LABEL, &mut player.feedback);
}

fn sanitize_enemy(enemy: &mut EnemyConfig) {
    let label = format!("enemy '{}'", enemy.id);
    let label = label.as_str();
    enemy.scale = positive_or(label, "scale", enemy.scale, default_enemy_scale());
    enemy.width = positive_or(label, "width", enemy.width, default_enemy_width());
    enemy.height = positive_or(label, "height", enemy.height, default_enemy_height());
    if enemy.patrol_left > enemy.patrol_right {
        log::warn!(
            "{label}: patrol bounds inverted ({} > {}), swapping",
            enemy.patrol_left,
            enemy.patrol_right
        );
        std::mem::swap(&mut enemy.patrol_left, &mut enemy.patrol_right);
    }
    enemy.max_health = at_least_int(label, "max_health", enemy.max_health, 1);
    enemy.damage = at_least_int(label, "damage", enemy.damage, 0);
    enemy.attack_range = at_least(label, "attack_range", enemy.attack_range, 0.0);
    if enemy.detection_range < enemy.attack_range {
        log::warn!(
            "{label}: detection_range {} is below attack_range {}, raising",
            enemy.detection_range,
            enemy.attack_range
        );
        enemy.detection_range = enemy.attack_range;
    }
    enemy.patrol_speed = at_least(label, "patrol_speed", enemy.patrol_speed, 0.0);
    enemy.chase_speed = at_least(label, "chase_speed", enemy.chase_speed, 0.0);
    enemy.gravity = at_least(label, "gravity", enemy.gravity, 0.0);
    sanitize_attack(
        label,
        &mut enemy.attack_duration,
        &mut enemy.attack_cooldown,
        &mut enemy.attack_shape,
    );
    sanitize_feedback(label, &mut enemy.feedback);
}

fn sanitize_attack(label: &str, duration: &mut f32, cooldown: &mut f32, shape: &mut AttackShape) {
    *duration = at_least(label, "attack_duration", *duration, 0.0);
    // A cooldown shorter than the swing would let a second swing restart the first.
    if *cooldown < *duration {
        log::warn!(
            "{label}: attack_cooldown {} is shorter than attack_duration {}, raising",
            cooldown,
            duration
        );
        *cooldown = *duration;
    }
    shape.reach = at_least(label, "attack_shape.reach", shape.reach, 0.0);
    shape.height = at_least(label, "attack_shape.height", shape.height, 0.0);
}

fn sanitize_feedback(label: &str, feedback: &mut FeedbackConfig) {
    feedback.flash_duration = at_least(label, "flash_duration", feedback.flash_duration, 0.0);
    feedback.knockback_speed = at_least(label, "knockback_speed", feedback.knockback_speed, 0.0);
    feedback.knockback_duration =
        at_least(label, "knockback_duration", feedback.knockback_duration, 0.0);
}

fn at_least(label: &str, field: &str, value: f32, min: f32) -> f32 {
    if value.is_finite() && value >= min {
        return value;
    }
    log::warn!("{label}: {field} = {value} is invalid, clamping to {min}");
    min
}

fn positive_or(label: &str, field: &str, value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        return value;
    }
    log::warn!("{label}: {field} = {value} must be positive, using {fallback}");
    fallback
}

fn at_least_int(label: &str, field: &str, value: i32, min: i32) -> i32 {
    if value >= min {
        return value;
    }
    log::warn!("{label}: {field} = {value} is invalid, clamping to {min}");
    min
}

pub fn load_world_config_from_path(path: &Path) -> Result<WorldConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: WorldConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse world JSON {}: {e}", path.display()))?;
    validate_world_config(&config)?;
    Ok(config.sanitized())
}

fn validate_world_config(config: &WorldConfig) -> Result<(), String> {
    if config.version != WORLD_CONFIG_VERSION {
        return Err(format!(
            "World validation failed: unsupported version '{}' (expected '{}')",
            config.version, WORLD_CONFIG_VERSION
        ));
    }
    if config.platforms.is_empty() {
        log::warn!("World has no platforms. Every character will fall out of the world.");
    }
    let mut ids = HashSet::new();
    for enemy in &config.enemies {
        if enemy.id.is_empty() {
            return Err("World validation failed: enemy id must not be empty".to_string());
        }
        if !ids.insert(enemy.id.as_str()) {
            return Err(format!(
                "World validation failed: duplicate enemy id '{}'",
                enemy.id
            ));
        }
    }
    Ok(())
}

fn default_version() -> String {
    WORLD_CONFIG_VERSION.to_string()
}

fn default_sprite_kind() -> String {
    "crawler".to_string()
}

const fn default_kill_plane_y() -> f32 {
    2000.0
}

const fn default_platform_width() -> f32 {
    310.0
}

const fn default_platform_height() -> f32 {
    160.0
}

const fn default_flash_duration() -> f32 {
    0.15
}

const fn default_knockback_speed() -> f32 {
    250.0
}

const fn default_knockback_duration() -> f32 {
    0.1
}

const fn default_player_spawn_x() -> f32 {
    100.0
}

const fn default_player_spawn_y() -> f32 {
    400.0
}

const fn default_player_width() -> f32 {
    71.0
}

const fn default_player_height() -> f32 {
    130.0
}

const fn default_player_scale() -> f32 {
    0.75
}

const fn default_move_speed() -> f32 {
    300.0
}

const fn default_jump_force() -> f32 {
    -550.0
}

const fn default_gravity() -> f32 {
    800.0
}

const fn default_player_max_health() -> i32 {
    100
}

const fn default_max_soul() -> i32 {
    99
}

const fn default_soul_per_hit() -> i32 {
    11
}

const fn default_heal_cost() -> i32 {
    33
}

const fn default_heal_amount() -> i32 {
    25
}

const fn default_player_attack_damage() -> i32 {
    25
}

const fn default_player_attack_duration() -> f32 {
    0.2
}

const fn default_player_attack_cooldown() -> f32 {
    0.75
}

const fn default_player_attack_shape() -> AttackShape {
    AttackShape {
        reach: 70.0,
        height: 60.0,
        offset_x: 0.0,
        offset_y: 20.0,
    }
}

const fn default_enemy_scale() -> f32 {
    1.0
}

const fn default_enemy_width() -> f32 {
    80.0
}

const fn default_enemy_height() -> f32 {
    60.0
}

const fn default_enemy_max_health() -> i32 {
    50
}

const fn default_enemy_damage() -> i32 {
    15
}

const fn default_attack_range() -> f32 {
    90.0
}

const fn default_detection_range() -> f32 {
    300.0
}

const fn default_patrol_speed() -> f32 {
    80.0
}

const fn default_chase_speed() -> f32 {
    140.0
}

const fn default_enemy_attack_duration() -> f32 {
    0.3
}

const fn default_enemy_attack_cooldown() -> f32 {
    1.0
}

const fn default_enemy_attack_shape() -> AttackShape {
    AttackShape {
        reach: 40.0,
        height: 40.0,
        offset_x: 0.0,
        offset_y: 10.0,
    }
}

const fn default_player_lives() -> u32 {
    3
}

const fn default_despawn_delay() -> f32 {
    1.0
}
