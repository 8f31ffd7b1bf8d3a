//! 材质系统

use bevy::prelude::*;

/// 地形材质资源 - 所有区域共用一个顶点着色的不透明材质
#[derive(Resource)]
pub struct TerrainMaterial {
    pub handle: Handle<StandardMaterial>,
}

/// 创建地形材质
/// 基础色为白色，方块颜色完全来自顶点颜色
pub fn setup_materials(mut commands: Commands, mut materials: ResMut<Assets<StandardMaterial>>) {
    let handle = materials.add(StandardMaterial {
        base_color: Color::WHITE,
        perceptual_roughness: 0.9,
        ..default()
    });

    commands.insert_resource(TerrainMaterial { handle });
}
