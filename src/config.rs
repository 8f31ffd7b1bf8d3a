use bevy::prelude::*;
use clap::Parser;
use thiserror::Error;

use crate::physics::{MAX_JUMP_FORCE, MAX_MOVE_SPEED, MovementTuning};
use crate::voxel::constants::{
    DEFAULT_BASE_HEIGHT, DEFAULT_HEIGHT_MULTIPLIER, DEFAULT_NOISE_SCALE, DEFAULT_WORLD_DEPTH,
    DEFAULT_WORLD_WIDTH,
};
use crate::voxel::WorldSeed;

const MAX_WORLD_SIZE: i32 = 1024;
const MAX_OCTAVES: usize = 16;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("world size must be within 1..={max}, got {width}x{depth}")]
    WorldSize { width: i32, depth: i32, max: i32 },
    #[error("octaves must be within 1..={max}, got {0}", max = MAX_OCTAVES)]
    Octaves(usize),
    #[error("{name} must be a finite positive number, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("{name} must not exceed {max}, got {value}")]
    TooLarge { name: &'static str, value: f32, max: f32 },
    #[error("{name} must be finite, got {value}")]
    NotFinite { name: &'static str, value: f64 },
    #[error("gravity must point down (negative), got {0}")]
    Gravity(f32),
}

/// Command line for the walkthrough. Every world and movement knob has a default
/// matching the stock 64x64 world.
#[derive(Parser, Debug, Clone)]
#[command(name = "voxwalk", version, about = "Walk a procedurally generated voxel heightmap")]
pub struct Cli {
    /// World seed: a number, or any string (hashed)
    #[arg(short, long, env = "VOXWALK_SEED")]
    pub seed: Option<String>,

    #[arg(long, default_value_t = DEFAULT_WORLD_WIDTH)]
    pub width: i32,

    #[arg(long, default_value_t = DEFAULT_WORLD_DEPTH)]
    pub depth: i32,

    /// Noise sampling scale (grid units per noise unit)
    #[arg(long, default_value_t = DEFAULT_NOISE_SCALE)]
    pub scale: f64,

    #[arg(long, default_value_t = 6)]
    pub octaves: usize,

    #[arg(long, default_value_t = 0.5)]
    pub persistence: f64,

    #[arg(long, default_value_t = 2.0)]
    pub lacunarity: f64,

    #[arg(long, default_value_t = DEFAULT_BASE_HEIGHT)]
    pub base_height: f32,

    #[arg(long, default_value_t = DEFAULT_HEIGHT_MULTIPLIER)]
    pub height_multiplier: f32,

    #[arg(long, default_value_t = 5.0)]
    pub move_speed: f32,

    #[arg(long, default_value_t = 8.0)]
    pub jump_force: f32,

    #[arg(long, default_value_t = -20.0, allow_negative_numbers = true)]
    pub gravity: f32,

    #[arg(long, default_value_t = 0.0025)]
    pub look_sensitivity: f32,

    /// How many physics warnings are written to the log before further ones are only counted
    #[arg(long, default_value_t = 32)]
    pub diagnostic_budget: usize,

    #[arg(long, default_value = "info,wgpu=error,naga=warn")]
    pub log_filter: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorldConfig {
    pub seed: u32,
    pub width: i32,
    pub depth: i32,
    pub scale: f64,
    pub octaves: usize,
    pub persistence: f64,
    pub lacunarity: f64,
    pub base_height: f32,
    pub height_multiplier: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            width: DEFAULT_WORLD_WIDTH,
            depth: DEFAULT_WORLD_DEPTH,
            scale: DEFAULT_NOISE_SCALE,
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
            base_height: DEFAULT_BASE_HEIGHT,
            height_multiplier: DEFAULT_HEIGHT_MULTIPLIER,
        }
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct PlayerSettings {
    pub move_speed: f32,
    pub jump_force: f32,
    pub gravity: f32,
    pub look_sensitivity: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_force: 8.0,
            gravity: -20.0,
            look_sensitivity: 0.0025,
        }
    }
}

impl PlayerSettings {
    pub fn tuning(&self) -> MovementTuning {
        MovementTuning {
            move_speed: self.move_speed,
            jump_force: self.jump_force,
            gravity: self.gravity,
            ..MovementTuning::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub player: PlayerSettings,
    pub diagnostic_budget: usize,
}

impl Cli {
    pub fn resolve(&self) -> Result<AppConfig, ConfigError> {
        let world = WorldConfig {
            seed: self.seed.as_deref().map(WorldSeed::parse).unwrap_or_else(time_seed),
            width: self.width,
            depth: self.depth,
            scale: self.scale,
            octaves: self.octaves,
            persistence: self.persistence,
            lacunarity: self.lacunarity,
            base_height: self.base_height,
            height_multiplier: self.height_multiplier,
        };
        world.validate()?;

        let player = PlayerSettings {
            move_speed: self.move_speed,
            jump_force: self.jump_force,
            gravity: self.gravity,
            look_sensitivity: self.look_sensitivity,
        };
        player.validate()?;

        Ok(AppConfig {
            world,
            player,
            diagnostic_budget: self.diagnostic_budget,
        })
    }
}

impl WorldConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let size_ok = |v: i32| (1..=MAX_WORLD_SIZE).contains(&v);
        if !size_ok(self.width) || !size_ok(self.depth) {
            return Err(ConfigError::WorldSize {
                width: self.width,
                depth: self.depth,
                max: MAX_WORLD_SIZE,
            });
        }
        if !(1..=MAX_OCTAVES).contains(&self.octaves) {
            return Err(ConfigError::Octaves(self.octaves));
        }
        positive("scale", self.scale)?;
        positive("lacunarity", self.lacunarity)?;
        finite("persistence", self.persistence)?;
        finite("base height", self.base_height as f64)?;
        finite("height multiplier", self.height_multiplier as f64)?;
        Ok(())
    }
}

impl PlayerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("move speed", self.move_speed as f64)?;
        at_most("move speed", self.move_speed, MAX_MOVE_SPEED)?;
        positive("jump force", self.jump_force as f64)?;
        at_most("jump force", self.jump_force, MAX_JUMP_FORCE)?;
        positive("look sensitivity", self.look_sensitivity as f64)?;
        if !self.gravity.is_finite() || self.gravity >= 0.0 {
            return Err(ConfigError::Gravity(self.gravity));
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

fn at_most(name: &'static str, value: f32, max: f32) -> Result<(), ConfigError> {
    if value <= max {
        Ok(())
    } else {
        Err(ConfigError::TooLarge { name, value, max })
    }
}

fn finite(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { name, value })
    }
}

fn time_seed() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u32)
        .unwrap_or(12345)
}
