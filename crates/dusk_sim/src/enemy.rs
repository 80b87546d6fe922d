//! Enemy behavior: a small patrol/chase/attack state machine.
//!
//! The brain reads the player only through a `TargetView` copied at the start
//! of the enemy phase, never through a reference into the player itself.
//! Distances are Euclidean between body centers. The attack range check runs
//! before the patrol-bounds check, so an enemy that has been pushed outside its
//! territory still fights when the player is close.

use glam::Vec2;
use serde::Serialize;

use crate::body::{BodyIntent, CharacterBody};
use crate::character::{Character, CharacterId, Lifecycle};
use crate::combat::AttackInstance;
use crate::config::EnemyConfig;
use crate::events::WorldEvent;
use crate::geometry::StaticGeometry;
use crate::stats::HealthPool;

/// Where despawned enemies are parked, far outside any level.
pub const OFF_WORLD: Vec2 = Vec2::new(-100_000.0, -100_000.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyState {
    Patrolling,
    Chasing,
    Attacking,
    Dead,
    Despawned,
}

impl EnemyState {
    pub fn is_engaged(self) -> bool {
        matches!(self, Self::Chasing | Self::Attacking)
    }
}

/// Read-only view of the player an enemy is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetView {
    pub center: Vec2,
    pub live: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub intent: BodyIntent,
    pub facing_right: bool,
    pub attack: bool,
}

#[derive(Debug, Clone)]
pub struct EnemyBrain {
    state: EnemyState,
    /// Patrol heading, kept while engaged so patrol resumes the same way.
    patrol_right: bool,
    patrol_left_bound: f32,
    patrol_right_bound: f32,
    detection_range: f32,
    attack_range: f32,
    patrol_speed: f32,
    chase_speed: f32,
    despawn_remaining: f32,
}

impl EnemyBrain {
    pub fn new(config: &EnemyConfig) -> Self {
        Self {
            state: EnemyState::Patrolling,
            patrol_right: true,
            patrol_left_bound: config.patrol_left,
            patrol_right_bound: config.patrol_right,
            detection_range: config.detection_range,
            attack_range: config.attack_range,
            patrol_speed: config.patrol_speed,
            chase_speed: config.chase_speed,
            despawn_remaining: 0.0,
        }
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn attack_range(&self) -> f32 {
        self.attack_range
    }

    pub fn think(&mut self, body: &CharacterBody, target: TargetView) -> Decision {
        let center = body.center();
        if target.live {
            let distance = center.distance(target.center);
            let toward_right = target.center.x >= center.x;

            if distance <= self.attack_range {
                self.state = EnemyState::Attacking;
                return Decision {
                    intent: BodyIntent::default(),
                    facing_right: toward_right,
                    attack: true,
                };
            }

            if distance <= self.detection_range {
                self.state = EnemyState::Chasing;
                let x = body.position.x;
                // Chasing stops at the edge of the patrol territory.
                let at_edge = (toward_right && x >= self.patrol_right_bound)
                    || (!toward_right && x <= self.patrol_left_bound);
                let velocity_x = if at_edge {
                    0.0
                } else if toward_right {
                    self.chase_speed
                } else {
                    -self.chase_speed
                };
                return Decision {
                    intent: BodyIntent {
                        velocity_x,
                        jump: false,
                    },
                    facing_right: toward_right,
                    attack: false,
                };
            }
        }

        self.patrol(body)
    }

    fn patrol(&mut self, body: &CharacterBody) -> Decision {
        self.state = EnemyState::Patrolling;
        let x = body.position.x;
        if self.patrol_right && (x >= self.patrol_right_bound || body.contacts.right) {
            self.patrol_right = false;
        } else if !self.patrol_right && (x <= self.patrol_left_bound || body.contacts.left) {
            self.patrol_right = true;
        }
        let velocity_x = if self.patrol_right {
            self.patrol_speed
        } else {
            -self.patrol_speed
        };
        Decision {
            intent: BodyIntent {
                velocity_x,
                jump: false,
            },
            facing_right: self.patrol_right,
            attack: false,
        }
    }

    fn on_killed(&mut self, despawn_delay: f32) {
        self.state = EnemyState::Dead;
        self.despawn_remaining = despawn_delay;
    }

    /// Count down a dead enemy. Returns true on the tick it despawns.
    fn tick_dead(&mut self, dt: f32) -> bool {
        if self.state != EnemyState::Dead {
            return false;
        }
        self.despawn_remaining -= dt;
        if self.despawn_remaining <= 0.0 {
            self.state = EnemyState::Despawned;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone)]
pub struct Enemy {
    pub name: String,
    pub sprite_kind: String,
    pub character: Character,
    pub brain: EnemyBrain,
}

impl Enemy {
    pub fn spawn(index: usize, config: &EnemyConfig) -> Self {
        let body = CharacterBody::new(
            Vec2::new(config.start_x, config.start_y),
            config.scaled_size(),
            config.gravity,
            0.0,
        );
        let attack = AttackInstance::new(
            config.attack_shape,
            config.attack_duration,
            config.attack_cooldown,
            config.damage,
        );
        Self {
            name: config.id.clone(),
            sprite_kind: config.sprite_kind.clone(),
            character: Character::new(
                CharacterId::Enemy(index),
                body,
                HealthPool::new(config.max_health),
                attack,
            ),
            brain: EnemyBrain::new(config),
        }
    }

    pub fn id(&self) -> CharacterId {
        self.character.id
    }

    /// Dead or despawned enemies are excluded from every query.
    pub fn is_live(&self) -> bool {
        self.character.is_live()
    }

    pub fn update(
        &mut self,
        target: TargetView,
        dt: f32,
        geometry: &StaticGeometry,
        events: &mut Vec<WorldEvent>,
    ) {
        match self.character.lifecycle {
            Lifecycle::Despawned => self.character.feedback.tick(dt),
            Lifecycle::Dead => {
                self.character.feedback.tick(dt);
                if self.brain.tick_dead(dt) {
                    self.character.lifecycle = Lifecycle::Despawned;
                    self.character.body.reset_to(OFF_WORLD);
                    log::debug!("{} ({}) despawned", self.name, self.id());
                    events.push(WorldEvent::Despawned { id: self.id() });
                }
            }
            Lifecycle::Alive => {
                let decision = self.brain.think(&self.character.body, target);
                self.character.body.facing_right = decision.facing_right;
                self.character.advance(decision.intent, dt, geometry);
                let damage = self.character.attack.damage;
                if self.character.update_attack(dt, decision.attack, damage) {
                    events.push(WorldEvent::AttackStarted { attacker: self.id() });
                }
            }
        }
    }

    /// Enter the dead sub-state and start the despawn countdown.
    pub fn on_killed(&mut self, despawn_delay: f32) {
        self.brain.on_killed(despawn_delay);
    }
}
