//! Timed melee attacks.
//!
//! An `AttackInstance` is a reusable swing: `try_activate` starts it (gated by
//! its own cooldown), `tick` ages it, and while active its hitbox tracks the
//! owner's bounds and facing. Each activation keeps a list of targets already
//! struck so one swing damages any given target at most once, however many
//! ticks the overlap lasts.

use serde::{Deserialize, Serialize};

use crate::body::CharacterBody;
use crate::character::{Character, CharacterId};
use crate::config::FeedbackConfig;
use crate::geometry::Rect;
use crate::stats::DamageOutcome;

/// Hitbox placement relative to the owner's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttackShape {
    /// Horizontal extent in front of the owner.
    pub reach: f32,
    pub height: f32,
    /// Gap between the owner's leading edge and the hitbox.
    #[serde(default)]
    pub offset_x: f32,
    /// Distance from the owner's top edge down to the hitbox top.
    #[serde(default)]
    pub offset_y: f32,
}

impl AttackShape {
    pub fn hitbox(&self, owner: Rect, facing_right: bool) -> Rect {
        let top = owner.top + self.offset_y;
        if facing_right {
            Rect::new(owner.right() + self.offset_x, top, self.reach, self.height)
        } else {
            Rect::new(
                owner.left - self.offset_x - self.reach,
                top,
                self.reach,
                self.height,
            )
        }
    }
}

#[derive(Debug, Clone)]
pub struct AttackInstance {
    pub active: bool,
    pub elapsed: f32,
    pub duration: f32,
    pub damage: i32,
    pub hitbox: Rect,
    pub cooldown: f32,
    cooldown_remaining: f32,
    shape: AttackShape,
    struck: Vec<CharacterId>,
}

impl AttackInstance {
    pub fn new(shape: AttackShape, duration: f32, cooldown: f32, damage: i32) -> Self {
        Self {
            active: false,
            elapsed: 0.0,
            duration,
            damage,
            hitbox: Rect::default(),
            cooldown,
            cooldown_remaining: 0.0,
            shape,
            struck: Vec::new(),
        }
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_remaining
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining <= 0.0
    }

    /// Start a swing. No-op returning false while the cooldown is running.
    pub fn try_activate(&mut self, owner: &CharacterBody, damage: i32) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.active = true;
        self.elapsed = 0.0;
        self.damage = damage;
        self.cooldown_remaining = self.cooldown;
        self.struck.clear();
        self.track(owner);
        true
    }

    pub fn tick(&mut self, dt: f32) {
        if self.cooldown_remaining > 0.0 {
            self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
        }
        if self.active {
            self.elapsed += dt;
            if self.elapsed >= self.duration {
                self.active = false;
            }
        }
    }

    /// Re-anchor the hitbox to the owner's current bounds and facing.
    pub fn track(&mut self, owner: &CharacterBody) {
        if self.active {
            self.hitbox = self.shape.hitbox(owner.bounds(), owner.facing_right);
        }
    }

    /// The live hitbox, if a swing is in progress.
    pub fn active_hitbox(&self) -> Option<Rect> {
        self.active.then_some(self.hitbox)
    }

    pub fn has_hit(&self, target: CharacterId) -> bool {
        self.struck.contains(&target)
    }

    /// Mark `target` as resolved for the current activation.
    pub fn register_hit(&mut self, target: CharacterId) {
        if !self.has_hit(target) {
            self.struck.push(target);
        }
    }

    /// Cancel any swing and clear the cooldown.
    pub fn reset(&mut self) {
        self.active = false;
        self.elapsed = 0.0;
        self.cooldown_remaining = 0.0;
        self.struck.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOutcome {
    pub damage: DamageOutcome,
}

impl HitOutcome {
    pub fn killed(&self) -> bool {
        matches!(self.damage, DamageOutcome::Killed { .. })
    }
}

/// Apply `attacker`'s active swing to `defender`.
///
/// Returns `None` when the swing is inactive, has already struck this
/// defender, the defender is not live, or the hitbox misses. Otherwise the
/// defender is registered as struck and takes damage, flash and knockback.
pub fn resolve_hit(
    attacker: &mut Character,
    defender: &mut Character,
    feedback: &FeedbackConfig,
) -> Option<HitOutcome> {
    let hitbox = attacker.attack.active_hitbox()?;
    if !defender.is_live() || attacker.attack.has_hit(defender.id) {
        return None;
    }
    if !hitbox.intersects(&defender.body.bounds()) {
        return None;
    }

    attacker.attack.register_hit(defender.id);
    let push_right = defender.body.center().x >= attacker.body.center().x;
    let damage = defender.take_damage(attacker.attack.damage, push_right, feedback);
    Some(HitOutcome { damage })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Character;
    use crate::stats::HealthPool;
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn sword() -> AttackShape {
        AttackShape {
            reach: 60.0,
            height: 50.0,
            offset_x: 0.0,
            offset_y: 20.0,
        }
    }

    fn fighter(id: CharacterId, x: f32, health: i32) -> Character {
        let body = CharacterBody::new(Vec2::new(x, 500.0), Vec2::new(50.0, 100.0), 800.0, -550.0);
        Character::new(
            id,
            body,
            HealthPool::new(health),
            AttackInstance::new(sword(), 0.2, 0.75, 25),
        )
    }

    #[test]
    fn hitbox_flips_with_facing() {
        let owner = Rect::new(100.0, 200.0, 50.0, 100.0);
        let shape = AttackShape {
            reach: 60.0,
            height: 40.0,
            offset_x: 5.0,
            offset_y: 10.0,
        };
        assert_eq!(
            shape.hitbox(owner, true),
            Rect::new(155.0, 210.0, 60.0, 40.0)
        );
        assert_eq!(shape.hitbox(owner, false), Rect::new(35.0, 210.0, 60.0, 40.0));
    }

    #[test]
    fn activation_is_gated_by_cooldown() {
        let body = CharacterBody::new(Vec2::ZERO, Vec2::new(50.0, 100.0), 800.0, -550.0);
        let mut attack = AttackInstance::new(sword(), 0.2, 0.75, 25);
        assert!(attack.try_activate(&body, 25));
        assert!(!attack.try_activate(&body, 25));

        // Swing ends before the cooldown does.
        for _ in 0..13 {
            attack.tick(DT);
        }
        assert!(!attack.active);
        assert!(!attack.try_activate(&body, 25));

        for _ in 0..40 {
            attack.tick(DT);
        }
        assert!(attack.is_ready());
        assert!(attack.try_activate(&body, 25));
    }

    #[test]
    fn swing_deactivates_once_duration_elapses() {
        let body = CharacterBody::new(Vec2::ZERO, Vec2::new(50.0, 100.0), 800.0, -550.0);
        let mut attack = AttackInstance::new(sword(), 0.1, 0.5, 10);
        attack.try_activate(&body, 10);
        assert!(attack.active_hitbox().is_some());
        attack.tick(0.05);
        assert!(attack.active);
        attack.tick(0.05);
        assert!(!attack.active);
        assert!(attack.active_hitbox().is_none());
    }

    #[test]
    fn hitbox_follows_owner_while_active() {
        let mut body = CharacterBody::new(Vec2::ZERO, Vec2::new(50.0, 100.0), 800.0, -550.0);
        let mut attack = AttackInstance::new(sword(), 0.2, 0.75, 25);
        attack.try_activate(&body, 25);
        let first = attack.hitbox;
        body.position.x += 10.0;
        attack.track(&body);
        assert_eq!(attack.hitbox.left, first.left + 10.0);
    }

    #[test]
    fn one_swing_hits_a_target_once() {
        let feedback = FeedbackConfig::default();
        let mut player = fighter(CharacterId::Player, 100.0, 100);
        let mut enemy = fighter(CharacterId::Enemy(0), 160.0, 50);
        assert!(player.attack.try_activate(&player.body, 25));

        let mut hits = 0;
        for _ in 0..12 {
            if resolve_hit(&mut player, &mut enemy, &feedback).is_some() {
                hits += 1;
            }
            player.attack.tick(DT);
            player.attack.track(&player.body);
        }
        assert_eq!(hits, 1);
        assert_eq!(enemy.health.current(), 25);
    }

    #[test]
    fn miss_does_not_register_target() {
        let feedback = FeedbackConfig::default();
        let mut player = fighter(CharacterId::Player, 100.0, 100);
        let mut enemy = fighter(CharacterId::Enemy(0), 400.0, 50);
        player.attack.try_activate(&player.body, 25);
        assert!(resolve_hit(&mut player, &mut enemy, &feedback).is_none());
        assert!(!player.attack.has_hit(CharacterId::Enemy(0)));
    }

    #[test]
    fn dead_defender_is_not_struck() {
        let feedback = FeedbackConfig::default();
        let mut player = fighter(CharacterId::Player, 100.0, 100);
        let mut enemy = fighter(CharacterId::Enemy(0), 160.0, 25);
        player.attack.try_activate(&player.body, 25);
        let outcome = resolve_hit(&mut player, &mut enemy, &feedback).expect("first hit lands");
        assert!(outcome.killed());
        assert!(!enemy.is_live());

        player.attack.reset();
        player.attack.try_activate(&player.body, 25);
        assert!(resolve_hit(&mut player, &mut enemy, &feedback).is_none());
        assert_eq!(enemy.health.current(), 0);
    }

    #[test]
    fn hit_starts_flash_and_pushes_defender_away() {
        let feedback = FeedbackConfig::default();
        let mut player = fighter(CharacterId::Player, 100.0, 100);
        let mut enemy = fighter(CharacterId::Enemy(0), 160.0, 50);
        player.attack.try_activate(&player.body, 25);
        resolve_hit(&mut player, &mut enemy, &feedback).expect("hit lands");
        assert!(enemy.feedback.is_flashing());
        assert!(enemy.feedback.knockback_velocity() > 0.0);
    }
}
