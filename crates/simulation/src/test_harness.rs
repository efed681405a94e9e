//! Headless integration test harness.
//!
//! Wraps `bevy::app::App` + `SimulationPlugin` so integration tests can
//! drive the real schedule without a window or renderer. The wall clock is
//! the real one; tests that need elapsed time backdate timestamps instead of
//! sleeping.

use bevy::app::App;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use crate::SimulationPlugin;

pub struct TestGame {
    pub app: App,
}

impl TestGame {
    /// A fresh game at defaults, with one update already run so `Startup`
    /// systems and state initialization have settled.
    pub fn new() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(StatesPlugin);
        app.add_plugins(SimulationPlugin);
        app.update();
        Self { app }
    }

    /// Advances the schedule by `n` updates.
    pub fn tick(&mut self, n: usize) {
        for _ in 0..n {
            self.app.update();
        }
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn resource_mut<T: Resource>(&mut self) -> Mut<'_, T> {
        self.app.world_mut().resource_mut::<T>()
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
