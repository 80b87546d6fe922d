//! Headless frame loop around the world.
//!
//! Each frame:
//!
//!   1. apply the frame's held keys (press/release edges derived here)
//!   2. feed the frame delta into the fixed-step accumulator
//!   3. frame-boundary work: Lua hot reload, R to reload / restart (the R
//!      press is consumed here, whether or not a step follows)
//!   4. `while should_step()` -- controller intent, then one `World::step`
//!
//! Edge-triggered keys are cleared right after a step consumes them, so a
//! press lands exactly once even when a frame runs several steps, and is kept
//! for the next frame when this one ran none.

use dusk_core::input::{InputSnapshot, InputState, Key};
use dusk_core::time::TimeState;
use dusk_sim::{World, WorldConfig, WorldEvent};

use crate::lua_bridge::{ActorSnapshot, KeySnapshot, LuaBridge};

pub struct Session {
    world: World,
    time: TimeState,
    input: InputState,
    lua: Option<LuaBridge>,
}

impl Session {
    pub fn new(config: WorldConfig, lua: Option<LuaBridge>) -> Self {
        Self {
            world: World::new(config),
            time: TimeState::new(),
            input: InputState::new(),
            lua,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn time(&self) -> &TimeState {
        &self.time
    }

    pub fn lua(&self) -> Option<&LuaBridge> {
        self.lua.as_ref()
    }

    pub fn run_frame(&mut self, frame_dt: f64, held: &[Key]) -> Vec<WorldEvent> {
        self.input.set_held(held);
        self.time.accumulate(frame_dt);

        if let Some(lua) = self.lua.as_mut() {
            lua.check_reload();
        }
        if self.input.consume_press(Key::R) {
            if let Some(lua) = self.lua.as_mut() {
                lua.force_reload();
            }
            if self.world.round().is_over() {
                self.world.restart();
            }
        }

        let mut events = Vec::new();
        let dt = self.time.fixed_dt as f32;
        while self.time.should_step() {
            let intent = self.controller_intent(dt);
            events.extend(self.world.step(&intent, dt));
            self.input.end_frame();
        }
        self.time.end_frame();
        events
    }

    /// Lua first; the built-in keymap when the script is missing or failed.
    fn controller_intent(&self, dt: f32) -> InputSnapshot {
        let Some(lua) = self.lua.as_ref() else {
            return self.input.snapshot();
        };
        let keys = KeySnapshot {
            held_keys: self.input.held_names().into_iter().map(String::from).collect(),
            just_pressed_keys: self
                .input
                .just_pressed_names()
                .into_iter()
                .map(String::from)
                .collect(),
        };
        lua.call_update(dt, &keys, &actor_snapshot(&self.world))
            .unwrap_or_else(|| self.input.snapshot())
    }
}

fn actor_snapshot(world: &World) -> ActorSnapshot {
    let player = world.player();
    let character = &player.character;
    ActorSnapshot {
        grounded: character.body.on_ground,
        velocity_x: character.body.velocity.x,
        velocity_y: character.body.velocity.y,
        facing_right: character.body.facing_right,
        attacking: character.attack.active,
        attack_ready: character.attack.is_ready(),
        health: character.health.current(),
        max_health: character.health.max(),
        soul: player.soul.current(),
        heal_cost: player.config().heal_cost,
    }
}
