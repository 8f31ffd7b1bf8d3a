mod celestial;
mod config;
mod physics;
mod player;
mod ui;
mod voxel;

use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use celestial::CelestialPlugin;
use config::{Cli, WorldConfig};
use physics::PhysicsDiagnostics;
use player::PlayerPlugin;
use ui::UiPlugin;
use voxel::{TerrainGenerator, VoxelPlugin, VoxelTerrain};

/// World parameters, kept for the startup banner
#[derive(Resource)]
struct ActiveWorld(WorldConfig);

fn main() {
    let cli = Cli::parse();
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(err) => Cli::command().error(ErrorKind::ValueValidation, err).exit(),
    };

    let field = match TerrainGenerator::new(&config.world).generate() {
        Ok(field) => field,
        Err(err) => Cli::command().error(ErrorKind::InvalidValue, err).exit(),
    };

    App::new()
        .insert_resource(config.player)
        .insert_resource(PhysicsDiagnostics::with_budget(config.diagnostic_budget))
        .insert_resource(ActiveWorld(config.world))
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Voxwalk".to_string(),
                        ..default()
                    }),
                    ..default()
                })
                .set(LogPlugin {
                    filter: cli.log_filter.clone(),
                    ..default()
                }),
        )
        .add_plugins((
            VoxelPlugin::new(VoxelTerrain::new(field)),
            PlayerPlugin,
            CelestialPlugin,
            UiPlugin,
            FrameTimeDiagnosticsPlugin::default(),
        ))
        .add_systems(Startup, print_controls)
        .run();
}

fn print_controls(world: Res<ActiveWorld>) {
    let world = &world.0;
    info!(
        "World seed {} ({}x{}, scale {}, {} octaves)",
        world.seed, world.width, world.depth, world.scale, world.octaves
    );
    info!("Controls: WASD move, Space jump, mouse look, wheel zoom, Esc pause menu");
}
