//! 区域网格生成（在工作线程中执行）

use bevy::prelude::*;

use crate::voxel::field::{Face, HeightField};
use crate::voxel::loading::RegionPos;
use crate::voxel::mesh::{MESH_BUFFERS, RegionMeshBuilder};
use crate::voxel::terrain::terrain_color;

/// 构建一个区域的网格
/// 顶点使用世界坐标（网格坐标减去半个世界尺寸），实体本身放在原点
pub fn build_region_mesh(field: &HeightField, region: RegionPos) -> Mesh {
    MESH_BUFFERS.with(|buffers| {
        let mut buffers = buffers.borrow_mut();
        let mut builder = RegionMeshBuilder::with_buffers(&mut buffers);
        let (min, max) = region.grid_bounds(field);

        for gz in min.y..max.y {
            for gx in min.x..max.x {
                let Some(height) = field.column(gx, gz) else {
                    continue;
                };
                let world = field.grid_to_world(gx, gz);

                for y in 0..height {
                    let color = terrain_color(y).to_srgba();
                    let color = [color.red, color.green, color.blue, color.alpha];
                    let origin = IVec3::new(world.x, y, world.y);

                    for face in Face::ALL {
                        if field.face_visible(gx, y, gz, face) {
                            builder.add_face(origin, face, color);
                        }
                    }
                }
            }
        }

        builder.build()
    })
}
