use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

use simulation::offline::PendingOfflineReport;

/// Headless shell: runs the engine on a fixed cadence with a file-backed
/// local store. A real frontend replaces this binary and injects its own
/// `SaveStores` (cloud KV, browser localStorage) before `SavePlugin`.
fn main() {
    let mut app = App::new();

    app.add_plugins(
        MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_millis(100))),
    )
    .add_plugins(LogPlugin::default())
    .add_plugins(StatesPlugin);

    let save_dir =
        std::env::var("FORGELAND_SAVE_DIR").unwrap_or_else(|_| "saves".to_string());
    app.insert_resource(save::SaveStores::new(
        Box::new(save::FileBackend::new(save_dir)),
        None,
    ));

    app.add_plugins((simulation::SimulationPlugin, save::SavePlugin));

    app.add_systems(Update, announce_offline_report);

    app.run();
}

/// Logs the welcome-back summary once after a load pays out an absence.
/// Claiming the doubled bonus is a frontend affordance; the report stays
/// pending until one consumes it.
fn announce_offline_report(report: Res<PendingOfflineReport>) {
    if !report.is_changed() || report.is_added() {
        return;
    }
    if let Some(report) = &report.0 {
        info!(
            "while you were away ({}s): {} resource kinds earned",
            report.seconds,
            report.earnings.len()
        );
    }
}
