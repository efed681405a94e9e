pub mod backend;
pub mod debounce;
mod exclusive_load;
mod exclusive_new_game;
mod exclusive_save;
pub mod leaderboard;
pub mod merge;
mod restore_resources;
pub mod save_error;
mod save_plugin;
pub mod save_types;
mod snapshot;

#[cfg(target_arch = "wasm32")]
pub mod wasm_storage;

pub use backend::{MemoryBackend, SaveStores, StorageBackend, SAVE_KEY};
pub use save_plugin::{LoadGameEvent, NewGameEvent, PortalEvent, SaveGameEvent, SavePlugin};

#[cfg(not(target_arch = "wasm32"))]
pub use backend::FileBackend;
