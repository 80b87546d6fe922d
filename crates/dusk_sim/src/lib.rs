pub mod body;
pub mod character;
pub mod combat;
pub mod config;
pub mod enemy;
pub mod events;
pub mod geometry;
pub mod player;
pub mod snapshot;
pub mod stats;
pub mod world;

pub use config::{load_world_config_from_path, WorldConfig};
pub use events::WorldEvent;
pub use snapshot::WorldSnapshot;
pub use world::{RoundState, World};
