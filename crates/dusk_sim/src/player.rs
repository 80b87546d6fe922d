//! The input-driven character.
//!
//! Movement is direct: the horizontal axis sets velocity outright and facing
//! follows the last non-zero direction. A death never destroys the player; it
//! either queues a respawn (serviced by the world at the start of the next
//! tick) or, with no lives left, leaves the player dead for the rest of the
//! round.

use glam::Vec2;

use dusk_core::input::InputSnapshot;

use crate::body::{BodyIntent, CharacterBody};
use crate::character::{Character, CharacterId, Lifecycle};
use crate::combat::AttackInstance;
use crate::config::PlayerConfig;
use crate::enemy::TargetView;
use crate::events::WorldEvent;
use crate::geometry::StaticGeometry;
use crate::stats::{HealthPool, ResourcePool};

#[derive(Debug, Clone)]
pub struct Player {
    pub character: Character,
    pub soul: ResourcePool,
    config: PlayerConfig,
    spawn: Vec2,
    lives_remaining: u32,
    respawn_queued: bool,
}

impl Player {
    pub fn spawn(config: &PlayerConfig, lives: u32) -> Self {
        let spawn = Vec2::new(config.spawn_x, config.spawn_y);
        let body = CharacterBody::new(
            spawn,
            config.scaled_size(),
            config.gravity,
            config.jump_force,
        );
        let attack = AttackInstance::new(
            config.attack_shape,
            config.attack_duration,
            config.attack_cooldown,
            config.attack_damage,
        );
        Self {
            character: Character::new(
                CharacterId::Player,
                body,
                HealthPool::new(config.max_health),
                attack,
            ),
            soul: ResourcePool::new(config.max_soul),
            config: config.clone(),
            spawn,
            lives_remaining: lives,
            respawn_queued: false,
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn lives_remaining(&self) -> u32 {
        self.lives_remaining
    }

    pub fn respawn_queued(&self) -> bool {
        self.respawn_queued
    }

    pub fn is_live(&self) -> bool {
        self.character.is_live()
    }

    pub fn target_view(&self) -> TargetView {
        TargetView {
            center: self.character.body.center(),
            live: self.is_live(),
        }
    }

    pub fn update(
        &mut self,
        input: &InputSnapshot,
        dt: f32,
        geometry: &StaticGeometry,
        events: &mut Vec<WorldEvent>,
    ) {
        if !self.is_live() {
            self.character.feedback.tick(dt);
            return;
        }

        let axis = input.move_axis();
        if axis > 0.0 {
            self.character.body.facing_right = true;
        } else if axis < 0.0 {
            self.character.body.facing_right = false;
        }

        if input.heal {
            if let Some(event) = self.try_heal() {
                events.push(event);
            }
        }

        let intent = BodyIntent {
            velocity_x: axis * self.config.move_speed,
            jump: input.jump,
        };
        self.character.advance(intent, dt, geometry);

        if self
            .character
            .update_attack(dt, input.attack, self.config.attack_damage)
        {
            events.push(WorldEvent::AttackStarted {
                attacker: CharacterId::Player,
            });
        }
    }

    fn try_heal(&mut self) -> Option<WorldEvent> {
        if self.character.health.is_full() || !self.soul.spend(self.config.heal_cost) {
            return None;
        }
        let amount = self.character.health.heal(self.config.heal_amount);
        log::debug!("player healed {amount} for {} soul", self.config.heal_cost);
        Some(WorldEvent::Healed {
            amount,
            soul_spent: self.config.heal_cost,
        })
    }

    /// Soul reward for landing a hit on an enemy.
    pub fn grant_soul(&mut self) -> Option<WorldEvent> {
        let amount = self.soul.gain(self.config.soul_per_hit);
        (amount > 0).then(|| WorldEvent::SoulGained {
            amount,
            total: self.soul.current(),
        })
    }

    /// Spend a life. Returns true if a respawn was queued.
    pub fn on_killed(&mut self) -> bool {
        self.lives_remaining = self.lives_remaining.saturating_sub(1);
        self.respawn_queued = self.lives_remaining > 0;
        self.respawn_queued
    }

    /// Back to the spawn point with full health, at rest, facing right.
    pub fn respawn(&mut self) {
        self.respawn_queued = false;
        self.character.body.reset_to(self.spawn);
        self.character.health.refill();
        self.character.attack.reset();
        self.character.feedback.clear();
        self.character.lifecycle = Lifecycle::Alive;
    }
}
