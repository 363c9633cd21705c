use aco_trails::colors::ColorConfig;
use aco_trails::snapshot::SnapshotWriter;
use aco_trails::{AppConfig, Simulation};
use bevy::prelude::*;

mod components;
mod systems;

use components::*;
use systems::*;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => AppConfig::from_json_file(path)?,
        None => AppConfig::default(),
    };
    let AppConfig { simulation, display } = config;
    let color_config = ColorConfig::default();

    let mut app = App::new();
    app.add_plugins(DefaultPlugins.set(bevy::window::WindowPlugin {
        primary_window: Some(bevy::window::Window {
            title: "Ant Colony Trails".into(),
            resolution: (display.window_width, display.window_height).into(),
            present_mode: bevy::window::PresentMode::AutoVsync,
            ..default()
        }),
        exit_condition: bevy::window::ExitCondition::DontExit,
        ..default()
    }));

    // Created after the plugins so its startup log goes through LogPlugin.
    let simulation = Simulation::new(simulation)?;
    let layout = GridLayout::new(simulation.field().size(), &display);
    let snapshots = Snapshots(display.snapshot_dir.as_ref().map(|dir| {
        SnapshotWriter::new(dir, display.snapshot_every, display.snapshot_cell_px)
    }));

    app.insert_resource(ClearColor(color_config.background))
        .insert_resource(Time::<Fixed>::from_hz(display.tick_rate_hz))
        .insert_resource(simulation)
        .insert_resource(layout)
        .insert_resource(snapshots)
        .insert_resource(display)
        .insert_resource(color_config)
        .insert_resource(TrailCanvas::default())
        .insert_resource(SimControl::default())
        .add_event::<GenerationFinished>()
        .add_systems(Startup, (setup, setup_pheromone_visualization))
        .add_systems(FixedUpdate, simulation_step_system)
        .add_systems(
            Update,
            (
                pause_system,
                restart_system,
                parameter_control_system,
                sync_layout_system,
                update_pheromone_visualization,
                snapshot_system,
                draw_trails_system,
                draw_rewards_system,
                update_hud,
                exit_system,
                exit_event_listener,
                window_close_system,
            )
                .chain(),
        )
        .run();

    Ok(())
}
