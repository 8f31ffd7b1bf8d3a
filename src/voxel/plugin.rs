//! 体素系统插件

use bevy::prelude::*;

use crate::voxel::field::VoxelTerrain;
use crate::voxel::loading::MeshingProgress;
use crate::voxel::materials::setup_materials;
use crate::voxel::systems::{handle_completed_mesh_tasks, spawn_mesh_tasks};

/// 体素系统插件 - 注册地形资源，并在后台线程构建地形网格
pub struct VoxelPlugin {
    pub terrain: VoxelTerrain,
}

impl VoxelPlugin {
    pub fn new(terrain: VoxelTerrain) -> Self {
        Self { terrain }
    }
}

impl Plugin for VoxelPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(self.terrain.clone())
            .init_resource::<MeshingProgress>()
            .add_systems(Startup, (setup_materials, spawn_mesh_tasks))
            .add_systems(Update, handle_completed_mesh_tasks);
    }
}
