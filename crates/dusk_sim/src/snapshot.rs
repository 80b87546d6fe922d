//! Read-only copies of world state for presentation and tooling.
//!
//! Nothing here borrows the world past `capture`, so a consumer can keep a
//! snapshot around (or serialize it) while the simulation moves on.

use glam::Vec2;
use serde::Serialize;

use crate::character::{Character, CharacterId, Lifecycle};
use crate::enemy::{Enemy, EnemyState};
use crate::geometry::Rect;
use crate::player::Player;
use crate::world::{RoundState, World};

/// Lifecycle as a renderer would pick an animation from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentedState {
    Alive,
    Attacking,
    Dead,
    Respawning,
    Despawned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Meter {
    pub current: i32,
    pub max: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CharacterSnapshot {
    pub id: CharacterId,
    pub name: String,
    pub kind: String,
    pub position: Vec2,
    pub size: Vec2,
    pub facing_right: bool,
    pub on_ground: bool,
    pub hitbox: Option<Rect>,
    pub health: Meter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Meter>,
    pub state: PresentedState,
    pub flashing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub behavior: Option<EnemyState>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub round: RoundState,
    pub lives_remaining: u32,
    pub player: CharacterSnapshot,
    pub enemies: Vec<CharacterSnapshot>,
}

impl WorldSnapshot {
    pub fn capture(world: &World) -> Self {
        Self {
            tick: world.tick_count(),
            round: world.round(),
            lives_remaining: world.player().lives_remaining(),
            player: player_snapshot(world.player()),
            enemies: world.enemies().iter().map(enemy_snapshot).collect(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize world snapshot: {e}"))
    }
}

fn player_snapshot(player: &Player) -> CharacterSnapshot {
    let mut snapshot = character_snapshot(&player.character, "player", "player");
    if player.respawn_queued() {
        snapshot.state = PresentedState::Respawning;
    }
    snapshot.resource = Some(Meter {
        current: player.soul.current(),
        max: player.soul.max(),
    });
    snapshot
}

fn enemy_snapshot(enemy: &Enemy) -> CharacterSnapshot {
    let mut snapshot = character_snapshot(&enemy.character, &enemy.name, &enemy.sprite_kind);
    snapshot.behavior = Some(enemy.brain.state());
    snapshot
}

fn character_snapshot(character: &Character, name: &str, kind: &str) -> CharacterSnapshot {
    let hitbox = character.attack.active_hitbox();
    let state = match character.lifecycle {
        Lifecycle::Alive if hitbox.is_some() => PresentedState::Attacking,
        Lifecycle::Alive => PresentedState::Alive,
        Lifecycle::Dead => PresentedState::Dead,
        Lifecycle::Despawned => PresentedState::Despawned,
    };
    CharacterSnapshot {
        id: character.id,
        name: name.to_string(),
        kind: kind.to_string(),
        position: character.body.position,
        size: character.body.size,
        facing_right: character.body.facing_right,
        on_ground: character.body.on_ground,
        hitbox,
        health: Meter {
            current: character.health.current(),
            max: character.health.max(),
        },
        resource: None,
        state,
        flashing: character.feedback.is_flashing(),
        behavior: None,
    }
}
