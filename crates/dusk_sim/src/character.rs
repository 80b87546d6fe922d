//! Shared character data.
//!
//! A character is plain data: one body, one health pool, one attack and its
//! feedback timers. Variant behavior lives next to it in `player` and `enemy`
//! as policies that turn input or AI state into a `BodyIntent`.

use serde::Serialize;

use crate::body::{BodyIntent, CharacterBody};
use crate::combat::AttackInstance;
use crate::config::FeedbackConfig;
use crate::geometry::StaticGeometry;
use crate::stats::{DamageOutcome, HealthPool};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterId {
    Player,
    Enemy(usize),
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Player => f.write_str("player"),
            Self::Enemy(index) => write!(f, "enemy#{index}"),
        }
    }
}

/// Coarse status gating participation in physics and combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Alive,
    Dead,
    Despawned,
}

/// Hit reaction timers. They decay on the simulation clock so a flash ends on
/// time regardless of how often anything is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeedbackTimers {
    flash_remaining: f32,
    knockback_remaining: f32,
    knockback_velocity: f32,
}

impl FeedbackTimers {
    pub fn trigger(&mut self, config: &FeedbackConfig, push_right: bool) {
        self.flash_remaining = config.flash_duration;
        self.knockback_remaining = config.knockback_duration;
        self.knockback_velocity = if push_right {
            config.knockback_speed
        } else {
            -config.knockback_speed
        };
    }

    pub fn tick(&mut self, dt: f32) {
        self.flash_remaining = (self.flash_remaining - dt).max(0.0);
        self.knockback_remaining = (self.knockback_remaining - dt).max(0.0);
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_remaining > 0.0
    }

    pub fn knockback_velocity(&self) -> f32 {
        if self.knockback_remaining > 0.0 {
            self.knockback_velocity
        } else {
            0.0
        }
    }

    /// Horizontal override while knockback is running.
    pub fn knockback(&self) -> Option<f32> {
        (self.knockback_remaining > 0.0).then_some(self.knockback_velocity)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone)]
pub struct Character {
    pub id: CharacterId,
    pub body: CharacterBody,
    pub health: HealthPool,
    pub attack: AttackInstance,
    pub feedback: FeedbackTimers,
    pub lifecycle: Lifecycle,
}

impl Character {
    pub fn new(
        id: CharacterId,
        body: CharacterBody,
        health: HealthPool,
        attack: AttackInstance,
    ) -> Self {
        Self {
            id,
            body,
            health,
            attack,
            feedback: FeedbackTimers::default(),
            lifecycle: Lifecycle::Alive,
        }
    }

    pub fn is_live(&self) -> bool {
        self.lifecycle == Lifecycle::Alive
    }

    /// Integrate the body for one tick, letting an active knockback override
    /// the policy's horizontal velocity, then age the hit feedback.
    pub fn advance(&mut self, mut intent: BodyIntent, dt: f32, geometry: &StaticGeometry) {
        if let Some(velocity_x) = self.feedback.knockback() {
            intent.velocity_x = velocity_x;
        }
        self.body.integrate(intent, dt, geometry);
        self.feedback.tick(dt);
    }

    /// Age the attack, start a new swing if requested, and re-anchor the hitbox.
    /// Returns true when a swing started this tick.
    pub fn update_attack(&mut self, dt: f32, wants_attack: bool, damage: i32) -> bool {
        self.attack.tick(dt);
        let started = wants_attack && self.attack.try_activate(&self.body, damage);
        self.attack.track(&self.body);
        started
    }

    /// Subtract health and start hit feedback. An emptied pool moves the
    /// character to `Dead` and cancels its swing.
    pub fn take_damage(
        &mut self,
        amount: i32,
        push_right: bool,
        feedback: &FeedbackConfig,
    ) -> DamageOutcome {
        if !self.is_live() {
            return DamageOutcome::Ignored;
        }
        let outcome = self.health.apply_damage(amount);
        match outcome {
            DamageOutcome::Ignored => {}
            DamageOutcome::Damaged { .. } => self.feedback.trigger(feedback, push_right),
            DamageOutcome::Killed { .. } => {
                self.feedback.trigger(feedback, push_right);
                self.lifecycle = Lifecycle::Dead;
                self.attack.reset();
                self.body.velocity = glam::Vec2::ZERO;
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::AttackShape;
    use crate::geometry::Rect;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn sample(health: i32) -> Character {
        let body = CharacterBody::new(
            Vec2::new(100.0, 600.0),
            Vec2::new(50.0, 100.0),
            800.0,
            -550.0,
        );
        let shape = AttackShape {
            reach: 40.0,
            height: 40.0,
            offset_x: 0.0,
            offset_y: 0.0,
        };
        Character::new(
            CharacterId::Enemy(0),
            body,
            HealthPool::new(health),
            AttackInstance::new(shape, 0.2, 1.0, 10),
        )
    }

    #[test]
    fn death_is_reported_once() {
        let feedback = FeedbackConfig::default();
        let mut character = sample(30);
        assert!(matches!(
            character.take_damage(30, true, &feedback),
            DamageOutcome::Killed { dealt: 30 }
        ));
        assert_eq!(character.lifecycle, Lifecycle::Dead);
        assert_eq!(
            character.take_damage(30, true, &feedback),
            DamageOutcome::Ignored
        );
        assert_eq!(character.health.current(), 0);
    }

    #[test]
    fn flash_decays_on_simulation_clock() {
        let feedback = FeedbackConfig::default();
        let geometry = StaticGeometry::new(vec![Rect::new(0.0, 700.0, 1000.0, 100.0)]);
        let mut character = sample(100);
        character.take_damage(10, true, &feedback);
        assert!(character.feedback.is_flashing());

        let ticks = (feedback.flash_duration / DT).ceil() as usize + 1;
        for _ in 0..ticks {
            character.advance(BodyIntent::default(), DT, &geometry);
        }
        assert!(!character.feedback.is_flashing());
    }

    #[test]
    fn knockback_overrides_intent_then_expires() {
        let feedback = FeedbackConfig::default();
        let geometry = StaticGeometry::new(vec![Rect::new(0.0, 700.0, 1000.0, 100.0)]);
        let mut character = sample(100);
        character.take_damage(10, false, &feedback);

        character.advance(BodyIntent::default(), DT, &geometry);
        assert_eq!(character.body.velocity.x, -feedback.knockback_speed);

        let ticks = (feedback.knockback_duration / DT).ceil() as usize + 1;
        for _ in 0..ticks {
            character.advance(BodyIntent::default(), DT, &geometry);
        }
        assert_eq!(character.body.velocity.x, 0.0);
    }

    #[test]
    fn update_attack_reports_new_swings_only() {
        let mut character = sample(100);
        assert!(character.update_attack(DT, true, 10));
        assert!(character.attack.active);
        assert!(!character.update_attack(DT, true, 10));
    }

    #[test]
    fn display_names_are_stable() {
        assert_eq!(CharacterId::Player.to_string(), "player");
        assert_eq!(CharacterId::Enemy(2).to_string(), "enemy#2");
    }
}
