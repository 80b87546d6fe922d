use serde::Serialize;

use crate::character::CharacterId;
use crate::world::RoundState;

/// Something observable that happened during one tick, in the order it
/// happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorldEvent {
    AttackStarted {
        attacker: CharacterId,
    },
    Hit {
        attacker: CharacterId,
        defender: CharacterId,
        damage: i32,
        remaining: i32,
    },
    SoulGained {
        amount: i32,
        total: i32,
    },
    Healed {
        amount: i32,
        soul_spent: i32,
    },
    FellOutOfWorld {
        id: CharacterId,
    },
    Died {
        id: CharacterId,
    },
    Respawned {
        lives_remaining: u32,
    },
    Despawned {
        id: CharacterId,
    },
    RoundEnded {
        outcome: RoundState,
    },
}
