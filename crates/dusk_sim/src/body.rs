//! Kinematic body: per-character integrator and platform collision resolver.
//!
//! Movement is **axis-separated**. Each tick the body first moves on X and is
//! reverted in full if the new bounds overlap any platform (no sliding), then
//! moves on Y using the already-resolved X and snaps against the first
//! overlapping platform. Grounded state is recomputed from that vertical pass
//! every tick.
//!
//! Screen space: y grows downward, so gravity is positive and a jump force is
//! negative.

use glam::Vec2;

use crate::geometry::{Rect, StaticGeometry};

/// Resting contact tolerance. Bounds are shrunk by this much on the axis not
/// being resolved so that a body sitting exactly on a floor (or against a wall)
/// does not register as overlapping it on the other axis.
const SKIN: f32 = 0.001;

/// What the owning policy wants the body to do this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyIntent {
    /// Instantaneous horizontal velocity. There is no acceleration or inertia.
    pub velocity_x: f32,
    pub jump: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactState {
    pub left: bool,
    pub right: bool,
    pub down: bool,
    pub up: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct CharacterBody {
    /// Top-left corner of the collision bounds.
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    pub facing_right: bool,
    pub gravity: f32,
    pub jump_force: f32,
    pub on_ground: bool,
    pub contacts: ContactState,
}

impl CharacterBody {
    pub fn new(position: Vec2, size: Vec2, gravity: f32, jump_force: f32) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            size,
            facing_right: true,
            gravity,
            jump_force,
            on_ground: false,
            contacts: ContactState::default(),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_position_size(self.position, self.size)
    }

    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Place the body at `position` at rest, facing right.
    pub fn reset_to(&mut self, position: Vec2) {
        self.position = position;
        self.velocity = Vec2::ZERO;
        self.facing_right = true;
        self.on_ground = false;
        self.contacts = ContactState::default();
    }

    pub fn integrate(&mut self, intent: BodyIntent, dt: f32, geometry: &StaticGeometry) {
        self.velocity.x = intent.velocity_x;

        if intent.jump && self.on_ground {
            self.velocity.y = self.jump_force;
            self.on_ground = false;
        }

        self.velocity.y += self.gravity * dt;

        self.contacts = ContactState::default();
        self.resolve_horizontal(dt, geometry);
        self.resolve_vertical(dt, geometry);
    }

    fn resolve_horizontal(&mut self, dt: f32, geometry: &StaticGeometry) {
        let dx = self.velocity.x * dt;
        if dx == 0.0 {
            return;
        }
        let previous_x = self.position.x;
        self.position.x += dx;
        if geometry.any_overlap(&self.bounds().inset(0.0, SKIN)) {
            self.position.x = previous_x;
            self.contacts.left = dx < 0.0;
            self.contacts.right = dx > 0.0;
            self.velocity.x = 0.0;
        }
    }

    fn resolve_vertical(&mut self, dt: f32, geometry: &StaticGeometry) {
        self.on_ground = false;
        self.position.y += self.velocity.y * dt;

        let bounds = self.bounds();
        // Only the first overlapping platform is resolved per tick.
        let Some(platform) = geometry.first_overlap(&bounds.inset(SKIN, 0.0)) else {
            return;
        };

        if self.velocity.y > 0.0 && bounds.bottom() > platform.top {
            self.position.y = platform.top - self.size.y;
            self.velocity.y = 0.0;
            self.on_ground = true;
            self.contacts.down = true;
        } else if self.velocity.y < 0.0 && bounds.top < platform.bottom() {
            self.position.y = platform.bottom();
            self.velocity.y = 0.0;
            self.contacts.up = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;
    const PLAYER_SIZE: Vec2 = Vec2::new(53.25, 97.5);

    fn floor_geometry() -> StaticGeometry {
        StaticGeometry::new(vec![Rect::new(0.0, 700.0, 1000.0, 160.0)])
    }

    fn idle() -> BodyIntent {
        BodyIntent::default()
    }

    #[test]
    fn falling_body_lands_on_platform_top() {
        let geometry = floor_geometry();
        let mut body = CharacterBody::new(Vec2::new(100.0, 200.0), PLAYER_SIZE, 800.0, -550.0);
        for _ in 0..240 {
            body.integrate(idle(), DT, &geometry);
        }
        assert!(body.on_ground);
        assert!((body.position.y - (700.0 - PLAYER_SIZE.y)).abs() < 1e-3);
        assert!((body.bounds().bottom() - 700.0).abs() < 1e-3);
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.contacts.down);
    }

    #[test]
    fn single_tick_fall_snaps_without_tunneling() {
        let geometry = floor_geometry();
        // Bottom 1 unit above the floor, falling at 300 units/s (5 units per tick,
        // well under the 160-unit platform thickness per tick).
        let mut body = CharacterBody::new(
            Vec2::new(100.0, 700.0 - PLAYER_SIZE.y - 1.0),
            PLAYER_SIZE,
            800.0,
            -550.0,
        );
        body.velocity.y = 300.0;
        body.integrate(idle(), DT, &geometry);
        assert!(body.on_ground);
        assert!((body.bounds().bottom() - 700.0).abs() < 1e-3);
    }

    #[test]
    fn jump_only_from_ground_and_clears_grounded_immediately() {
        let geometry = floor_geometry();
        let mut body = CharacterBody::new(Vec2::new(100.0, 200.0), PLAYER_SIZE, 800.0, -550.0);
        for _ in 0..240 {
            body.integrate(idle(), DT, &geometry);
        }
        assert!(body.on_ground);

        body.integrate(
            BodyIntent {
                velocity_x: 0.0,
                jump: true,
            },
            DT,
            &geometry,
        );
        assert!(!body.on_ground);
        // Jump force is applied before gravity within the same tick.
        assert!((body.velocity.y - (-550.0 + 800.0 * DT)).abs() < 1e-3);
        assert!(body.position.y < 700.0 - PLAYER_SIZE.y);
    }

    #[test]
    fn airborne_jump_request_is_ignored() {
        let geometry = floor_geometry();
        let mut body = CharacterBody::new(Vec2::new(100.0, 200.0), PLAYER_SIZE, 800.0, -550.0);
        body.integrate(
            BodyIntent {
                velocity_x: 0.0,
                jump: true,
            },
            DT,
            &geometry,
        );
        assert!(body.velocity.y > 0.0);
    }

    #[test]
    fn horizontal_block_zeroes_velocity_and_keeps_x() {
        let geometry = StaticGeometry::new(vec![
            Rect::new(0.0, 700.0, 1000.0, 160.0),
            Rect::new(300.0, 400.0, 50.0, 300.0),
        ]);
        let start_x = 300.0 - PLAYER_SIZE.x;
        let mut body = CharacterBody::new(
            Vec2::new(start_x, 700.0 - PLAYER_SIZE.y),
            PLAYER_SIZE,
            800.0,
            -550.0,
        );
        body.on_ground = true;
        body.integrate(
            BodyIntent {
                velocity_x: 200.0,
                jump: false,
            },
            DT,
            &geometry,
        );
        assert_eq!(body.velocity.x, 0.0);
        assert_eq!(body.position.x, start_x);
        assert!(body.contacts.right);
        assert!(!body.contacts.left);
        assert!(body.on_ground, "wall contact must not disturb grounding");
    }

    #[test]
    fn walking_on_floor_is_not_blocked() {
        let geometry = floor_geometry();
        let mut body = CharacterBody::new(Vec2::new(100.0, 200.0), PLAYER_SIZE, 800.0, -550.0);
        for _ in 0..240 {
            body.integrate(idle(), DT, &geometry);
        }
        let x_before = body.position.x;
        for _ in 0..30 {
            body.integrate(
                BodyIntent {
                    velocity_x: 200.0,
                    jump: false,
                },
                DT,
                &geometry,
            );
        }
        assert!((body.position.x - (x_before + 100.0)).abs() < 1e-2);
        assert!(body.on_ground);
        assert_eq!(body.velocity.x, 200.0);
    }

    #[test]
    fn rising_body_bonks_ceiling() {
        let geometry = StaticGeometry::new(vec![Rect::new(0.0, 0.0, 1000.0, 100.0)]);
        let mut body = CharacterBody::new(Vec2::new(100.0, 102.0), PLAYER_SIZE, 800.0, -550.0);
        body.velocity.y = -400.0;
        body.integrate(idle(), DT, &geometry);
        assert_eq!(body.position.y, 100.0);
        assert_eq!(body.velocity.y, 0.0);
        assert!(body.contacts.up);
        assert!(!body.on_ground);
    }

    #[test]
    fn grounded_is_recomputed_every_tick() {
        let geometry = StaticGeometry::new(vec![Rect::new(0.0, 700.0, 200.0, 160.0)]);
        let mut body = CharacterBody::new(
            Vec2::new(150.0, 700.0 - PLAYER_SIZE.y),
            PLAYER_SIZE,
            800.0,
            -550.0,
        );
        body.on_ground = true;
        // Walk off the right edge.
        for _ in 0..30 {
            body.integrate(
                BodyIntent {
                    velocity_x: 300.0,
                    jump: false,
                },
                DT,
                &geometry,
            );
        }
        assert!(body.position.x > 200.0);
        assert!(!body.on_ground);
    }

    #[test]
    fn empty_geometry_free_falls() {
        let geometry = StaticGeometry::default();
        let mut body = CharacterBody::new(Vec2::ZERO, PLAYER_SIZE, 800.0, -550.0);
        body.integrate(idle(), DT, &geometry);
        assert!(!body.on_ground);
        assert!((body.velocity.y - 800.0 * DT).abs() < 1e-4);
    }

    #[test]
    fn integration_is_deterministic() {
        let geometry = StaticGeometry::new(vec![
            Rect::new(-20.0, 600.0, 310.0, 160.0),
            Rect::new(255.0, 600.0, 310.0, 160.0),
            Rect::new(530.0, 525.0, 310.0, 160.0),
        ]);
        let run = || {
            let mut body =
                CharacterBody::new(Vec2::new(100.0, 400.0), PLAYER_SIZE, 800.0, -550.0);
            for tick in 0..300 {
                let intent = BodyIntent {
                    velocity_x: if tick < 200 { 200.0 } else { -200.0 },
                    jump: tick % 50 == 0,
                };
                body.integrate(intent, DT, &geometry);
            }
            body
        };
        let a = run();
        let b = run();
        assert_eq!(a.position, b.position);
        assert_eq!(a.velocity, b.velocity);
        assert_eq!(a.on_ground, b.on_ground);
    }
}
