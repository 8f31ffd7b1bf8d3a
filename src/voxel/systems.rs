//! 地形渲染的系统函数

use bevy::prelude::*;
use bevy::tasks::AsyncComputeTaskPool;
use futures_lite::future;

use crate::voxel::field::VoxelTerrain;
use crate::voxel::loading::{ComputeMeshTask, MeshingProgress, RegionMarker, RegionPos};
use crate::voxel::materials::TerrainMaterial;
use crate::voxel::mesh_gen::build_region_mesh;

/// 为每个区域派发异步网格构建任务
/// 高度图在会话内不变，启动时一次性派发即可
pub fn spawn_mesh_tasks(
    mut commands: Commands,
    terrain: Res<VoxelTerrain>,
    mut progress: ResMut<MeshingProgress>,
) {
    let task_pool = AsyncComputeTaskPool::get();

    for region in RegionPos::covering(&terrain.field) {
        let field = terrain.field.clone();
        let task = task_pool.spawn(async move { build_region_mesh(&field, region) });
        commands.spawn(ComputeMeshTask { task, region });
        progress.total += 1;
    }

    info!("Dispatched {} terrain mesh tasks", progress.total);
}

/// 收集完成的网格任务并生成区域实体
pub fn handle_completed_mesh_tasks(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    material: Res<TerrainMaterial>,
    mut progress: ResMut<MeshingProgress>,
    mut pending_query: Query<(Entity, &mut ComputeMeshTask)>,
) {
    for (entity, mut task) in pending_query.iter_mut() {
        // 非阻塞地检查任务是否完成
        let Some(mesh) = future::block_on(future::poll_once(&mut task.task)) else {
            continue;
        };
        let region = task.region;
        commands.entity(entity).despawn();

        commands.spawn((
            Mesh3d(meshes.add(mesh)),
            MeshMaterial3d(material.handle.clone()),
            Transform::IDENTITY,
            RegionMarker { pos: region },
        ));

        progress.completed += 1;
        if progress.is_done() {
            info!("Terrain meshing finished ({} regions)", progress.total);
        }
    }
}
