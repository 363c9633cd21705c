use aco_trails::colors::{ant_color, ColorConfig};
use aco_trails::config::{DisplayConfig, SimConfig};
use aco_trails::{GridSize, Simulation};
use bevy::prelude::*;
use bevy::window::WindowCloseRequested;

use crate::components::*;

const HUD_FONT_SIZE: f32 = 16.0;

pub fn setup(mut commands: Commands, color_config: Res<ColorConfig>) {
    commands.spawn(Camera2dBundle::default());

    commands.spawn((
        TextBundle::from_section(
            "",
            TextStyle {
                font_size: HUD_FONT_SIZE,
                color: color_config.text,
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        }),
        HudText,
    ));
}

pub fn setup_pheromone_visualization(mut commands: Commands, layout: Res<GridLayout>) {
    spawn_pheromone_cells(&mut commands, &layout);
}

fn spawn_pheromone_cells(commands: &mut Commands, layout: &GridLayout) {
    for y in 0..layout.size.height {
        for x in 0..layout.size.width {
            let cell = aco_trails::GridPos::new(x, y);
            let world = layout.to_world(cell);
            commands.spawn((
                SpriteBundle {
                    sprite: Sprite {
                        color: Color::NONE,
                        custom_size: Some(layout.cell),
                        ..default()
                    },
                    transform: Transform::from_xyz(world.x, world.y, -10.0),
                    ..default()
                },
                PheromoneVisualization { cell },
            ));
        }
    }
}

/// Drives the simulation from the fixed timestep, collecting segments for the
/// trail canvas and announcing finished generations.
pub fn simulation_step_system(
    mut simulation: ResMut<Simulation>,
    mut canvas: ResMut<TrailCanvas>,
    mut finished: EventWriter<GenerationFinished>,
    control: Res<SimControl>,
    display: Res<DisplayConfig>,
) {
    if control.paused {
        return;
    }
    for _ in 0..display.ticks_per_frame.max(1) {
        let report = simulation.tick();
        if let Some(summary) = report.boundary {
            canvas.segments.clear();
            finished.send(GenerationFinished(summary));
        }
        canvas.segments.extend(report.segments);
    }
}

/// Rebuilds the layout and the heat-map sprites when a queued config resized
/// the grid.
pub fn sync_layout_system(
    mut commands: Commands,
    simulation: Res<Simulation>,
    display: Res<DisplayConfig>,
    mut layout: ResMut<GridLayout>,
    cells: Query<Entity, With<PheromoneVisualization>>,
) {
    let size: GridSize = simulation.field().size();
    if layout.size == size {
        return;
    }
    for entity in cells.iter() {
        commands.entity(entity).despawn();
    }
    *layout = GridLayout::new(size, &display);
    spawn_pheromone_cells(&mut commands, &layout);
    info!("Grid resized to {}x{}", size.width, size.height);
}

pub fn update_pheromone_visualization(
    mut finished: EventReader<GenerationFinished>,
    mut cells: Query<(&mut Sprite, &PheromoneVisualization)>,
    color_config: Res<ColorConfig>,
) {
    let Some(GenerationFinished(summary)) = finished.read().last() else {
        return;
    };
    for (mut sprite, cell) in cells.iter_mut() {
        sprite.color = color_config.pheromone_with_heat(summary.heat_map.get(cell.cell));
    }
}

pub fn clear_pheromone_visualization(cells: &mut Query<(&mut Sprite, &PheromoneVisualization)>) {
    for (mut sprite, _) in cells.iter_mut() {
        sprite.color = Color::NONE;
    }
}

pub fn draw_trails_system(mut gizmos: Gizmos, canvas: Res<TrailCanvas>, layout: Res<GridLayout>) {
    for segment in &canvas.segments {
        gizmos.line_2d(
            layout.to_world(segment.from),
            layout.to_world(segment.to),
            ant_color(segment.color),
        );
    }
}

pub fn draw_rewards_system(
    mut gizmos: Gizmos,
    simulation: Res<Simulation>,
    layout: Res<GridLayout>,
    color_config: Res<ColorConfig>,
) {
    let radius = layout.cell.min_element() * 0.5;
    for &reward in simulation.heuristic().rewards() {
        let center = layout.to_world(reward);
        gizmos.circle_2d(center, radius, color_config.reward);
        gizmos.circle_2d(center, radius + 1.0, color_config.reward_outline);
    }
    gizmos.circle_2d(
        layout.to_world(simulation.heuristic().origin()),
        radius,
        color_config.nest,
    );
}

pub fn update_hud(
    simulation: Res<Simulation>,
    control: Res<SimControl>,
    mut hud: Query<&mut Text, With<HudText>>,
) {
    let Ok(mut text) = hud.get_single_mut() else {
        return;
    };
    let config = simulation.config();
    let queued = if simulation.pending_config().is_some() {
        " (changes queued)"
    } else {
        ""
    };
    text.sections[0].value = format!(
        "Generation {}  Tick {}  Active ants {}/{}{}\nEvaporation {:.2}  Deposit {:.1}  Pheromone weight {:.3}  Heuristic weight {:.3}{}\n1-4: adjust (Shift lowers)  Space: pause  R: restart  Esc: exit",
        simulation.generation(),
        simulation.tick_count(),
        simulation.colony().active_count(),
        simulation.colony().ants().len(),
        if control.paused { "  [paused]" } else { "" },
        config.evaporation,
        config.pheromone_deposit,
        config.pheromone_weight,
        config.heuristic_weight,
        queued,
    );
}

pub fn snapshot_system(
    mut finished: EventReader<GenerationFinished>,
    snapshots: Res<Snapshots>,
    simulation: Res<Simulation>,
    color_config: Res<ColorConfig>,
) {
    let Some(writer) = snapshots.0.as_ref() else {
        finished.clear();
        return;
    };
    for GenerationFinished(summary) in finished.read() {
        if !writer.wants(summary.generation) {
            continue;
        }
        if let Err(e) = writer.write(
            summary.generation,
            &summary.heat_map,
            simulation.heuristic().rewards(),
            &color_config,
        ) {
            error!("Failed to save heat map for generation {}: {}", summary.generation, e);
        }
    }
}

pub fn pause_system(input: Res<ButtonInput<KeyCode>>, mut control: ResMut<SimControl>) {
    if input.just_pressed(KeyCode::Space) {
        control.paused = !control.paused;
        info!("Simulation {}", if control.paused { "paused" } else { "resumed" });
    }
}

pub fn restart_system(
    input: Res<ButtonInput<KeyCode>>,
    mut simulation: ResMut<Simulation>,
    mut canvas: ResMut<TrailCanvas>,
    mut cells: Query<(&mut Sprite, &PheromoneVisualization)>,
) {
    if input.just_pressed(KeyCode::KeyR) {
        simulation.restart();
        canvas.segments.clear();
        clear_pheromone_visualization(&mut cells);
    }
}

/// Parameter bound to a number key in the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tunable {
    Evaporation,
    Deposit,
    PheromoneWeight,
    HeuristicWeight,
}

impl Tunable {
    const KEYS: [(KeyCode, Tunable); 4] = [
        (KeyCode::Digit1, Tunable::Evaporation),
        (KeyCode::Digit2, Tunable::Deposit),
        (KeyCode::Digit3, Tunable::PheromoneWeight),
        (KeyCode::Digit4, Tunable::HeuristicWeight),
    ];

    pub fn just_pressed(input: &ButtonInput<KeyCode>) -> Option<Self> {
        Self::KEYS
            .into_iter()
            .find(|&(key, _)| input.just_pressed(key))
            .map(|(_, tunable)| tunable)
    }

    /// Raises the parameter one step, or lowers it when `lower` is set.
    pub fn nudge(self, config: &mut SimConfig, lower: bool) {
        let sign = if lower { -1.0 } else { 1.0 };
        match self {
            Tunable::Evaporation => {
                config.evaporation = (config.evaporation + sign * 0.05).clamp(0.0, 1.0)
            }
            Tunable::Deposit => config.pheromone_deposit = (config.pheromone_deposit + sign).max(0.0),
            Tunable::PheromoneWeight => config.pheromone_weight += sign * 0.25,
            Tunable::HeuristicWeight => config.heuristic_weight += sign * 0.25,
        }
    }
}

/// Number keys nudge the tunables. Changes are queued and take effect with the
/// next generation.
pub fn parameter_control_system(input: Res<ButtonInput<KeyCode>>, mut simulation: ResMut<Simulation>) {
    let Some(tunable) = Tunable::just_pressed(&input) else {
        return;
    };
    let lower = input.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]);

    let mut next: SimConfig = simulation
        .pending_config()
        .unwrap_or(simulation.config())
        .clone();
    tunable.nudge(&mut next, lower);

    if let Err(e) = simulation.queue_config(next) {
        warn!("Rejected parameter change: {}", e);
    }
}

pub fn exit_system(input: Res<ButtonInput<KeyCode>>, mut exit: EventWriter<AppExit>) {
    if input.just_pressed(KeyCode::Escape) {
        exit.send(AppExit::Success);
    }
}

pub fn exit_event_listener(mut exit_events: EventReader<AppExit>, simulation: Res<Simulation>) {
    for exit_event in exit_events.read() {
        match exit_event {
            AppExit::Success => info!(
                "Exiting after {} generations ({} ticks)",
                simulation.generation(),
                simulation.tick_count()
            ),
            AppExit::Error(code) => warn!("Exiting with error code: {}", code),
        }
    }
}

pub fn window_close_system(
    mut close_events: EventReader<WindowCloseRequested>,
    mut exit: EventWriter<AppExit>,
) {
    for _event in close_events.read() {
        exit.send(AppExit::Success);
    }
}
