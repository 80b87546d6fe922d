//! Rust <-> Lua bridge for the player controller.
//!
//! Scripts turn keys into **intents** (move direction, jump, attack, heal)
//! and never touch simulation state. Rust owns the world: Lua reads a copy of
//! the player's state from `engine.actor` and writes into `engine._intent`,
//! which Rust reads back after `on_update(dt)` returns.
//!
//! Keys arrive as lookup tables (`_held` / `_just_pressed`) keyed by the
//! lowercase key names, so the whole key state is set in one pass.
//!
//! Reload: on mtime change or a manual trigger a **fresh Lua state** is
//! created and the script re-executed from scratch. Lua globals do not
//! survive a reload; everything persistent lives in the Rust world.

use std::path::PathBuf;
use std::time::SystemTime;

use mlua::prelude::*;

use dusk_core::input::InputSnapshot;

/// Status of the Lua runtime, reported in the run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LuaStatus {
    /// Script loaded and running normally.
    Loaded,
    /// Script had an error; the Rust keymap drives the player.
    Error,
    /// No script file found; the Rust keymap drives the player.
    Fallback,
}

impl LuaStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Loaded => "Lua: loaded",
            Self::Error => "Lua: ERROR",
            Self::Fallback => "Lua: fallback",
        }
    }
}

impl std::fmt::Display for LuaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Player state exposed to the script each tick.
#[derive(Debug, Clone, Default)]
pub struct ActorSnapshot {
    pub grounded: bool,
    pub velocity_x: f32,
    pub velocity_y: f32,
    pub facing_right: bool,
    pub attacking: bool,
    pub attack_ready: bool,
    pub health: i32,
    pub max_health: i32,
    pub soul: i32,
    pub heal_cost: i32,
}

/// Key names exposed to the script each tick.
#[derive(Debug, Clone, Default)]
pub struct KeySnapshot {
    pub held_keys: Vec<String>,
    pub just_pressed_keys: Vec<String>,
}

pub struct LuaBridge {
    lua: Lua,
    script_path: PathBuf,
    last_modified: Option<SystemTime>,
    status: LuaStatus,
    last_error: Option<String>,
    reloads: u32,
}

impl LuaBridge {
    /// Starts in Fallback mode if the script file doesn't exist.
    pub fn new(script_path: PathBuf) -> Self {
        let mut bridge = Self {
            lua: Lua::new(),
            script_path,
            last_modified: None,
            status: LuaStatus::Fallback,
            last_error: None,
            reloads: 0,
        };
        bridge.try_load_script();
        bridge
    }

    pub fn status(&self) -> LuaStatus {
        self.status
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Reloads since construction, hot or forced.
    pub fn reload_count(&self) -> u32 {
        self.reloads
    }

    /// Reload if the script's mtime changed. Call between frames, never
    /// mid-step.
    pub fn check_reload(&mut self) {
        let current_mtime = match std::fs::metadata(&self.script_path) {
            Ok(meta) => meta.modified().ok(),
            Err(_) => return,
        };

        if current_mtime != self.last_modified {
            log::info!(
                "Lua script changed, reloading: {}",
                self.script_path.display()
            );
            self.reloads += 1;
            self.try_load_script();
        }
    }

    pub fn force_reload(&mut self) {
        log::info!("Lua script force reload: {}", self.script_path.display());
        self.reloads += 1;
        self.try_load_script();
    }

    /// Run `on_update(dt)` and read back the intent. `None` when Lua is not
    /// loaded or the call failed, so the caller can fall back.
    pub fn call_update(
        &self,
        dt: f32,
        keys: &KeySnapshot,
        actor: &ActorSnapshot,
    ) -> Option<InputSnapshot> {
        if self.status != LuaStatus::Loaded {
            return None;
        }

        match self.call_update_inner(dt, keys, actor) {
            Ok(intent) => Some(intent),
            Err(err) => {
                log::error!("Lua on_update error: {}", err);
                None
            }
        }
    }

    fn call_update_inner(
        &self,
        dt: f32,
        keys: &KeySnapshot,
        actor: &ActorSnapshot,
    ) -> LuaResult<InputSnapshot> {
        let engine: LuaTable = self.lua.globals().get("engine")?;
        let input_table: LuaTable = engine.get("input")?;
        let actor_table: LuaTable = engine.get("actor")?;

        let held_set = self.lua.create_table()?;
        for key in &keys.held_keys {
            held_set.set(key.as_str(), true)?;
        }
        input_table.set("_held", held_set)?;

        let pressed_set = self.lua.create_table()?;
        for key in &keys.just_pressed_keys {
            pressed_set.set(key.as_str(), true)?;
        }
        input_table.set("_just_pressed", pressed_set)?;

        actor_table.set("grounded", actor.grounded)?;
        actor_table.set("velocity_x", actor.velocity_x)?;
        actor_table.set("velocity_y", actor.velocity_y)?;
        actor_table.set("facing_right", actor.facing_right)?;
        actor_table.set("attacking", actor.attacking)?;
        actor_table.set("attack_ready", actor.attack_ready)?;
        actor_table.set("health", actor.health)?;
        actor_table.set("max_health", actor.max_health)?;
        actor_table.set("soul", actor.soul)?;
        actor_table.set("heal_cost", actor.heal_cost)?;

        let intent_table: LuaTable = engine.get("_intent")?;
        reset_intent(&intent_table)?;

        let on_update: LuaFunction = self.lua.globals().get("on_update")?;
        on_update.call::<()>(dt)?;

        let move_x: f32 = intent_table.get("move_x")?;
        Ok(InputSnapshot {
            move_left: move_x < 0.0,
            move_right: move_x > 0.0,
            jump: intent_table.get("jump")?,
            heal: intent_table.get("heal").unwrap_or(false),
            attack: intent_table.get("attack").unwrap_or(false),
        })
    }

    fn try_load_script(&mut self) {
        if !self.script_path.exists() {
            log::warn!(
                "Lua script not found: {}. Using Rust fallback.",
                self.script_path.display()
            );
            self.status = LuaStatus::Fallback;
            self.last_error = None;
            self.last_modified = None;
            return;
        }

        self.last_modified = std::fs::metadata(&self.script_path)
            .ok()
            .and_then(|m| m.modified().ok());

        self.lua = Lua::new();

        if let Err(err) = self.setup_engine_api() {
            self.fail(format!("Failed to setup Lua engine API: {}", err));
            return;
        }

        let source = match std::fs::read_to_string(&self.script_path) {
            Ok(source) => source,
            Err(err) => {
                self.fail(format!("Failed to read Lua script: {}", err));
                return;
            }
        };

        if let Err(err) = self
            .lua
            .load(&source)
            .set_name(self.script_path.to_string_lossy())
            .exec()
        {
            self.fail(format!("Lua script load error: {}", err));
            return;
        }

        self.status = LuaStatus::Loaded;
        self.last_error = None;
        log::info!("Lua script loaded: {}", self.script_path.display());

        if let Ok(on_init) = self.lua.globals().get::<LuaFunction>("on_init") {
            if let Err(err) = on_init.call::<()>(()) {
                // A broken on_init does not unload the script.
                log::error!("Lua on_init error: {}", err);
            }
        }
    }

    fn fail(&mut self, msg: String) {
        log::error!("{}", msg);
        self.status = LuaStatus::Error;
        self.last_error = Some(msg);
    }

    /// Build the `engine` global table.
    ///
    /// Layout:
    ///   engine.input._held / _just_pressed   -- key name -> true
    ///   engine.input.is_held(key), is_just_pressed(key)
    ///   engine.actor.*                       -- read-only player state
    ///   engine.actor.set_intent(move_x, jump)
    ///   engine.actor.attack(), engine.actor.heal()
    ///   engine._intent                       -- read by Rust after on_update
    fn setup_engine_api(&self) -> LuaResult<()> {
        let lua = &self.lua;
        let engine = lua.create_table()?;

        let input_table = lua.create_table()?;
        input_table.set("_held", lua.create_table()?)?;
        input_table.set("_just_pressed", lua.create_table()?)?;
        input_table.set("is_held", key_lookup(lua, "_held")?)?;
        input_table.set("is_just_pressed", key_lookup(lua, "_just_pressed")?)?;
        engine.set("input", input_table)?;

        let actor_table = lua.create_table()?;
        actor_table.set("grounded", false)?;
        actor_table.set("velocity_x", 0.0f32)?;
        actor_table.set("velocity_y", 0.0f32)?;
        actor_table.set("facing_right", true)?;
        actor_table.set("attacking", false)?;
        actor_table.set("attack_ready", true)?;
        actor_table.set("health", 0)?;
        actor_table.set("max_health", 0)?;
        actor_table.set("soul", 0)?;
        actor_table.set("heal_cost", 0)?;

        let set_intent = lua.create_function(|lua_ctx, (move_x, jump): (f32, bool)| {
            let intent = intent_table(lua_ctx)?;
            intent.set("move_x", move_x.clamp(-1.0, 1.0))?;
            intent.set("jump", jump)?;
            Ok(())
        })?;
        actor_table.set("set_intent", set_intent)?;
        actor_table.set("attack", intent_flag(lua, "attack")?)?;
        actor_table.set("heal", intent_flag(lua, "heal")?)?;
        engine.set("actor", actor_table)?;

        let intent = lua.create_table()?;
        reset_intent(&intent)?;
        engine.set("_intent", intent)?;

        lua.globals().set("engine", engine)?;
        Ok(())
    }
}

fn intent_table(lua: &Lua) -> LuaResult<LuaTable> {
    let engine: LuaTable = lua.globals().get("engine")?;
    engine.get("_intent")
}

fn reset_intent(intent: &LuaTable) -> LuaResult<()> {
    intent.set("move_x", 0.0f32)?;
    intent.set("jump", false)?;
    intent.set("attack", false)?;
    intent.set("heal", false)?;
    Ok(())
}

/// `engine.input.<fn>(key) -> bool` over one of the key tables.
fn key_lookup(lua: &Lua, table: &'static str) -> LuaResult<LuaFunction> {
    lua.create_function(move |lua_ctx, key: String| {
        let engine: LuaTable = lua_ctx.globals().get("engine")?;
        let input: LuaTable = engine.get("input")?;
        let keys: LuaTable = input.get(table)?;
        Ok(keys.get::<bool>(key.as_str()).unwrap_or(false))
    })
}

/// `engine.actor.<flag>()` raising one boolean intent for this tick.
fn intent_flag(lua: &Lua, flag: &'static str) -> LuaResult<LuaFunction> {
    lua.create_function(move |lua_ctx, ()| {
        intent_table(lua_ctx)?.set(flag, true)?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID_LUA_SCRIPT: &str = r#"
function on_update(dt)
    engine.actor.set_intent(1.0, true)
end
"#;

    const INVALID_LUA_SCRIPT: &str = "this is not valid lua !@#$";

    fn temp_lua_path(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!(
            "dusk_test_lua_bridge_{}_{}.lua",
            name,
            std::process::id()
        ));
        path
    }

    fn write_temp_script(path: &PathBuf, content: &str) {
        let mut f = std::fs::File::create(path).expect("failed to create temp script");
        f.write_all(content.as_bytes())
            .expect("failed to write temp script");
        f.flush().expect("failed to flush temp script");
    }

    fn keys(held: &[&str], pressed: &[&str]) -> KeySnapshot {
        KeySnapshot {
            held_keys: held.iter().map(|k| k.to_string()).collect(),
            just_pressed_keys: pressed.iter().map(|k| k.to_string()).collect(),
        }
    }

    #[test]
    fn lua_status_display_matches_label() {
        for variant in [LuaStatus::Loaded, LuaStatus::Error, LuaStatus::Fallback] {
            assert!(!variant.label().is_empty());
            assert_eq!(format!("{}", variant), variant.label());
        }
    }

    #[test]
    fn bridge_fallback_when_no_script() {
        let bridge = LuaBridge::new(PathBuf::from("__nonexistent_dusk_script__.lua"));
        assert_eq!(bridge.status(), LuaStatus::Fallback);
        assert!(bridge
            .call_update(1.0 / 60.0, &KeySnapshot::default(), &ActorSnapshot::default())
            .is_none());
    }

    #[test]
    fn bridge_error_on_invalid_script() {
        let path = temp_lua_path("invalid");
        write_temp_script(&path, INVALID_LUA_SCRIPT);

        let bridge = LuaBridge::new(path.clone());
        assert_eq!(bridge.status(), LuaStatus::Error);
        assert!(bridge.last_error().is_some());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn bridge_call_update_returns_intent() {
        let path = temp_lua_path("intent");
        write_temp_script(&path, VALID_LUA_SCRIPT);

        let bridge = LuaBridge::new(path.clone());
        assert_eq!(
            bridge.status(),
            LuaStatus::Loaded,
            "Error: {:?}",
            bridge.last_error()
        );

        let intent = bridge
            .call_update(1.0 / 60.0, &KeySnapshot::default(), &ActorSnapshot::default())
            .expect("call_update should return Some(intent)");
        assert!(intent.move_right);
        assert!(!intent.move_left);
        assert!(intent.jump);
        assert!(!intent.attack);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn runtime_error_yields_none() {
        let path = temp_lua_path("runtime_error");
        write_temp_script(
            &path,
            r#"
function on_update(dt)
    error("boom")
end
"#,
        );

        let bridge = LuaBridge::new(path.clone());
        assert_eq!(bridge.status(), LuaStatus::Loaded);
        assert!(bridge
            .call_update(1.0 / 60.0, &KeySnapshot::default(), &ActorSnapshot::default())
            .is_none());

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn attack_and_heal_flags_reset_each_call() {
        let path = temp_lua_path("flags");
        write_temp_script(
            &path,
            r#"
function on_update(dt)
    if engine.input.is_just_pressed("j") then
        engine.actor.attack()
    end
    if engine.input.is_just_pressed("k") and engine.actor.soul >= engine.actor.heal_cost then
        engine.actor.heal()
    end
end
"#,
        );

        let bridge = LuaBridge::new(path.clone());
        assert_eq!(bridge.status(), LuaStatus::Loaded);

        let mut actor = ActorSnapshot {
            soul: 40,
            heal_cost: 33,
            ..Default::default()
        };
        let intent = bridge
            .call_update(1.0 / 60.0, &keys(&["j", "k"], &["j", "k"]), &actor)
            .expect("intent");
        assert!(intent.attack);
        assert!(intent.heal);

        actor.soul = 10;
        let intent = bridge
            .call_update(1.0 / 60.0, &keys(&["j", "k"], &["k"]), &actor)
            .expect("intent");
        assert!(!intent.attack, "attack is not sticky across calls");
        assert!(!intent.heal, "heal gated on soul by the script");

        actor.soul = 40;
        actor.heal_cost = 50;
        let intent = bridge
            .call_update(1.0 / 60.0, &keys(&["k"], &["k"]), &actor)
            .expect("intent");
        assert!(!intent.heal, "cost comes from the actor");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn bridge_force_reload() {
        let path = temp_lua_path("reload");
        let _ = std::fs::remove_file(&path);
        let mut bridge = LuaBridge::new(path.clone());
        assert_eq!(bridge.status(), LuaStatus::Fallback);

        write_temp_script(&path, VALID_LUA_SCRIPT);
        bridge.force_reload();
        assert_eq!(
            bridge.status(),
            LuaStatus::Loaded,
            "Error: {:?}",
            bridge.last_error()
        );
        assert_eq!(bridge.reload_count(), 1);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn lua_determinism_same_inputs_same_outputs() {
        let path = temp_lua_path("determinism");
        write_temp_script(
            &path,
            r#"
function on_update(dt)
    local move_x = 0
    if engine.input.is_held("right") then
        move_x = 1
    elseif engine.input.is_held("left") then
        move_x = -1
    end
    engine.actor.set_intent(move_x, engine.input.is_just_pressed("space"))
end
"#,
        );

        let sequence = vec![
            keys(&[], &[]),
            keys(&["right"], &["right"]),
            keys(&["right"], &[]),
            keys(&["right", "space"], &["space"]),
            keys(&[], &[]),
            keys(&["left"], &["left"]),
        ];
        let actor = ActorSnapshot::default();

        let run = || {
            let bridge = LuaBridge::new(path.clone());
            assert_eq!(bridge.status(), LuaStatus::Loaded);
            sequence
                .iter()
                .map(|k| bridge.call_update(1.0 / 60.0, k, &actor).unwrap())
                .collect::<Vec<_>>()
        };
        let a = run();
        let b = run();
        assert_eq!(a, b);

        assert_eq!(a[0], InputSnapshot::default(), "idle");
        assert!(a[2].move_right && !a[2].jump);
        assert!(a[3].move_right && a[3].jump);
        assert!(a[5].move_left);

        let _ = std::fs::remove_file(&path);
    }
}
