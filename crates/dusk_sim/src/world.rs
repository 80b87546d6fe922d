//! One fixed-timestep tick over the whole session.
//!
//! Phase order within `step` is part of the contract:
//!
//!   0. service a respawn queued by last tick's player death
//!   1. player: input, body, attack timers
//!   2. enemies, in spawn order: AI, body, attack timers
//!   3. player swing against every live enemy
//!   4. enemy swings against the player
//!   5. round outcome
//!
//! Deaths are applied inside phases 3 and 4 the moment health empties. A
//! player respawn is only queued there and runs at phase 0 of the next tick,
//! never mid-resolution.

use serde::Serialize;

use dusk_core::input::InputSnapshot;

use crate::character::{Character, CharacterId};
use crate::combat::resolve_hit;
use crate::config::{FeedbackConfig, WorldConfig};
use crate::enemy::Enemy;
use crate::events::WorldEvent;
use crate::geometry::StaticGeometry;
use crate::player::Player;
use crate::snapshot::WorldSnapshot;
use crate::stats::DamageOutcome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    InProgress,
    Victory,
    Defeat,
}

impl RoundState {
    pub fn is_over(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

pub struct World {
    config: WorldConfig,
    geometry: StaticGeometry,
    player: Player,
    enemies: Vec<Enemy>,
    round: RoundState,
    tick: u64,
}

impl World {
    /// Build a session. The config is sanitized first, so any values reach the
    /// simulation already clamped.
    pub fn new(config: WorldConfig) -> Self {
        let config = config.sanitized();
        let geometry =
            StaticGeometry::new(config.platforms.iter().map(|p| p.rect()).collect());
        let player = Player::spawn(&config.player, config.round.player_lives);
        let enemies = config
            .enemies
            .iter()
            .enumerate()
            .map(|(index, enemy)| Enemy::spawn(index, enemy))
            .collect();
        log::info!(
            "World ready: {} platform(s), {} enemy(ies), {} li(ves)",
            geometry.len(),
            config.enemies.len(),
            config.round.player_lives
        );
        Self {
            config,
            geometry,
            player,
            enemies,
            round: RoundState::InProgress,
            tick: 0,
        }
    }

    /// Throw away all session state and start over from the initial config.
    pub fn restart(&mut self) {
        log::info!("Restarting round after {} tick(s)", self.tick);
        *self = Self::new(self.config.clone());
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn geometry(&self) -> &StaticGeometry {
        &self.geometry
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn round(&self) -> RoundState {
        self.round
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(self)
    }

    pub fn step(&mut self, input: &InputSnapshot, dt: f32) -> Vec<WorldEvent> {
        self.tick += 1;
        let mut events = Vec::new();

        if self.player.respawn_queued() {
            self.player.respawn();
            log::info!(
                "Player respawned ({} li(ves) left)",
                self.player.lives_remaining()
            );
            events.push(WorldEvent::Respawned {
                lives_remaining: self.player.lives_remaining(),
            });
        }

        let geometry = &self.geometry;
        let kill_plane_y = self.config.kill_plane_y;

        self.player.update(input, dt, geometry, &mut events);
        if falls_out(&self.player.character, kill_plane_y) {
            events.push(WorldEvent::FellOutOfWorld {
                id: CharacterId::Player,
            });
            let outcome = kill(&mut self.player.character, &self.config.player.feedback);
            record_player_damage(&mut self.player, outcome, &mut events);
        }

        let target = self.player.target_view();
        let despawn_delay = self.config.round.despawn_delay;
        for (index, enemy) in self.enemies.iter_mut().enumerate() {
            enemy.update(target, dt, geometry, &mut events);
            if falls_out(&enemy.character, kill_plane_y) {
                events.push(WorldEvent::FellOutOfWorld { id: enemy.id() });
                kill(&mut enemy.character, &self.config.enemies[index].feedback);
                enemy.on_killed(despawn_delay);
                log::debug!("{} fell out of the world", enemy.name);
                events.push(WorldEvent::Died { id: enemy.id() });
            }
        }

        self.resolve_player_attack(&mut events);
        self.resolve_enemy_attacks(&mut events);
        self.evaluate_round(&mut events);

        log::trace!("tick {} produced {} event(s)", self.tick, events.len());
        events
    }

    fn resolve_player_attack(&mut self, events: &mut Vec<WorldEvent>) {
        if !self.player.character.attack.active {
            return;
        }
        let despawn_delay = self.config.round.despawn_delay;
        for (index, enemy) in self.enemies.iter_mut().enumerate() {
            if !enemy.is_live() {
                continue;
            }
            let feedback = self.config.enemies[index].feedback;
            let Some(outcome) =
                resolve_hit(&mut self.player.character, &mut enemy.character, &feedback)
            else {
                continue;
            };
            log::debug!(
                "player hit {} for {} ({} left)",
                enemy.name,
                outcome.damage.dealt(),
                enemy.character.health.current()
            );
            events.push(WorldEvent::Hit {
                attacker: CharacterId::Player,
                defender: enemy.id(),
                damage: outcome.damage.dealt(),
                remaining: enemy.character.health.current(),
            });
            if let Some(event) = self.player.grant_soul() {
                events.push(event);
            }
            if outcome.killed() {
                enemy.on_killed(despawn_delay);
                log::debug!("{} died", enemy.name);
                events.push(WorldEvent::Died { id: enemy.id() });
            }
        }
    }

    fn resolve_enemy_attacks(&mut self, events: &mut Vec<WorldEvent>) {
        for index in 0..self.enemies.len() {
            if !self.player.is_live() {
                return;
            }
            let enemy = &mut self.enemies[index];
            if !enemy.is_live() || !enemy.character.attack.active {
                continue;
            }
            // A swing only lands while the player is still within reach.
            let distance = enemy
                .character
                .body
                .center()
                .distance(self.player.character.body.center());
            if distance > enemy.brain.attack_range() {
                continue;
            }
            let feedback = self.config.player.feedback;
            let Some(outcome) =
                resolve_hit(&mut enemy.character, &mut self.player.character, &feedback)
            else {
                continue;
            };
            log::debug!(
                "{} hit player for {} ({} left)",
                enemy.name,
                outcome.damage.dealt(),
                self.player.character.health.current()
            );
            events.push(WorldEvent::Hit {
                attacker: enemy.id(),
                defender: CharacterId::Player,
                damage: outcome.damage.dealt(),
                remaining: self.player.character.health.current(),
            });
            record_player_damage(&mut self.player, outcome.damage, events);
        }
    }

    fn evaluate_round(&mut self, events: &mut Vec<WorldEvent>) {
        if self.round.is_over() {
            return;
        }
        let outcome = if !self.player.is_live() && !self.player.respawn_queued() {
            RoundState::Defeat
        } else if self.enemies.iter().all(|enemy| !enemy.is_live()) {
            RoundState::Victory
        } else {
            return;
        };
        self.round = outcome;
        log::info!("Round over at tick {}: {:?}", self.tick, outcome);
        events.push(WorldEvent::RoundEnded { outcome });
    }
}

fn record_player_damage(player: &mut Player, outcome: DamageOutcome, events: &mut Vec<WorldEvent>) {
    if !matches!(outcome, DamageOutcome::Killed { .. }) {
        return;
    }
    let queued = player.on_killed();
    log::info!(
        "Player died ({})",
        if queued {
            "respawn queued"
        } else {
            "no lives left"
        }
    );
    events.push(WorldEvent::Died {
        id: CharacterId::Player,
    });
}

fn falls_out(character: &Character, kill_plane_y: f32) -> bool {
    character.is_live() && character.body.bounds().top > kill_plane_y
}

fn kill(character: &mut Character, feedback: &FeedbackConfig) -> DamageOutcome {
    let lethal = character.health.current();
    character.take_damage(lethal, true, feedback)
}
