//! 网格构建 - 顶点去重和区域网格构建器

use bevy::mesh::{Indices, Mesh, PrimitiveTopology, VertexAttributeValues};
use bevy::prelude::*;
use std::cell::RefCell;
use std::collections::HashMap;

use crate::voxel::field::Face;

// ============================================================================
// 顶点去重
// ============================================================================

/// 顶点唯一标识键
/// 方块角点都在整数坐标上，直接用整数角点作为位置键，不需要定点数换算
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct VertexKey {
    corner: IVec3,
    face: Face,
    /// 颜色 - 压缩为 RGBA8888
    color_packed: u32,
}

impl VertexKey {
    fn new(corner: IVec3, face: Face, color: [f32; 4]) -> Self {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        let color_packed = channel(color[0]) << 24
            | channel(color[1]) << 16
            | channel(color[2]) << 8
            | channel(color[3]);
        Self {
            corner,
            face,
            color_packed,
        }
    }
}

// ============================================================================
// 线程本地缓冲区
// ============================================================================

/// 网格构建缓冲区 - 在同一工作线程的多次构建之间复用容量
pub struct MeshBuffers {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    colors: Vec<[f32; 4]>,
    indices: Vec<u32>,
    vertex_map: HashMap<VertexKey, u32>,
}

impl MeshBuffers {
    fn new() -> Self {
        Self {
            positions: Vec::with_capacity(8192),
            normals: Vec::with_capacity(8192),
            colors: Vec::with_capacity(8192),
            indices: Vec::with_capacity(12288),
            vertex_map: HashMap::with_capacity(8192),
        }
    }

    fn clear(&mut self) {
        self.positions.clear();
        self.normals.clear();
        self.colors.clear();
        self.indices.clear();
        self.vertex_map.clear();
    }
}

thread_local! {
    /// 每个线程独立的网格构建缓冲区
    pub static MESH_BUFFERS: RefCell<MeshBuffers> = RefCell::new(MeshBuffers::new());
}

// ============================================================================
// 区域网格构建器
// ============================================================================

/// 区域网格构建器 - 借用线程本地缓冲区，按面添加并去重顶点
pub struct RegionMeshBuilder<'a> {
    buffers: &'a mut MeshBuffers,
}

impl<'a> RegionMeshBuilder<'a> {
    pub fn with_buffers(buffers: &'a mut MeshBuffers) -> Self {
        buffers.clear();
        Self { buffers }
    }

    /// 添加位于 `origin` 的方块的一个面
    pub fn add_face(&mut self, origin: IVec3, face: Face, color: [f32; 4]) {
        let normal = face.normal();
        let mut face_indices = [0u32; 4];

        for (slot, corner) in face_indices.iter_mut().zip(face_corners(origin, face)) {
            let key = VertexKey::new(corner, face, color);
            *slot = match self.buffers.vertex_map.get(&key) {
                Some(&existing) => existing,
                None => {
                    let index = self.buffers.positions.len() as u32;
                    self.buffers.positions.push(corner.as_vec3().to_array());
                    self.buffers.normals.push(normal);
                    self.buffers.colors.push(color);
                    self.buffers.vertex_map.insert(key, index);
                    index
                }
            };
        }

        self.buffers.indices.extend_from_slice(&[
            face_indices[0],
            face_indices[2],
            face_indices[1],
            face_indices[0],
            face_indices[3],
            face_indices[2],
        ]);
    }

    pub fn vertex_count(&self) -> usize {
        self.buffers.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.buffers.indices.len() / 6
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.indices.is_empty()
    }

    /// 构建最终网格（从缓冲区复制数据，缓冲区留给下一次构建）
    pub fn build(&self) -> Mesh {
        let mut mesh = Mesh::new(PrimitiveTopology::TriangleList, default());
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, self.buffers.positions.clone());
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, self.buffers.normals.clone());
        mesh.insert_attribute(
            Mesh::ATTRIBUTE_COLOR,
            VertexAttributeValues::Float32x4(self.buffers.colors.clone()),
        );
        mesh.insert_indices(Indices::U32(self.buffers.indices.clone()));
        mesh
    }
}

// ============================================================================
// 面片顶点
// ============================================================================

/// 单位方块某个面的 4 个角点
/// 顶点顺序与 `add_face` 的三角形索引配合，保证正面朝外
pub fn face_corners(origin: IVec3, face: Face) -> [IVec3; 4] {
    let IVec3 { x, y, z } = origin;
    match face {
        Face::PosX => [
            IVec3::new(x + 1, y, z),
            IVec3::new(x + 1, y, z + 1),
            IVec3::new(x + 1, y + 1, z + 1),
            IVec3::new(x + 1, y + 1, z),
        ],
        Face::NegX => [
            IVec3::new(x, y, z + 1),
            IVec3::new(x, y, z),
            IVec3::new(x, y + 1, z),
            IVec3::new(x, y + 1, z + 1),
        ],
        Face::PosY => [
            IVec3::new(x, y + 1, z),
            IVec3::new(x + 1, y + 1, z),
            IVec3::new(x + 1, y + 1, z + 1),
            IVec3::new(x, y + 1, z + 1),
        ],
        Face::NegY => [
            IVec3::new(x, y, z + 1),
            IVec3::new(x + 1, y, z + 1),
            IVec3::new(x + 1, y, z),
            IVec3::new(x, y, z),
        ],
        Face::PosZ => [
            IVec3::new(x + 1, y, z + 1),
            IVec3::new(x, y, z + 1),
            IVec3::new(x, y + 1, z + 1),
            IVec3::new(x + 1, y + 1, z + 1),
        ],
        Face::NegZ => [
            IVec3::new(x, y, z),
            IVec3::new(x + 1, y, z),
            IVec3::new(x + 1, y + 1, z),
            IVec3::new(x, y + 1, z),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

    #[test]
    fn test_face_corners_lie_on_face_plane() {
        let origin = IVec3::new(2, 3, -4);
        for face in Face::ALL {
            let dir = face.dir();
            let corners = face_corners(origin, face);
            // 角点在法线方向上的分量都相同
            let plane = corners[0].dot(dir);
            assert!(corners.iter().all(|c| c.dot(dir) == plane), "{face:?}");
            let expected = if dir.element_sum() > 0 {
                origin.dot(dir) + 1
            } else {
                origin.dot(dir)
            };
            assert_eq!(plane, expected, "{face:?}");
        }
    }

    #[test]
    fn test_winding_matches_normal() {
        let origin = IVec3::ZERO;
        for face in Face::ALL {
            let [a, b, c, _] = face_corners(origin, face).map(|c| c.as_vec3());
            // 三角形 (0, 2, 1) 的法线应与面朝向一致
            let normal = (c - a).cross(b - a);
            assert!(normal.dot(face.dir().as_vec3()) > 0.0, "{face:?}");
        }
    }

    #[test]
    fn test_shared_corners_are_deduplicated() {
        let mut buffers = MeshBuffers::new();
        let mut builder = RegionMeshBuilder::with_buffers(&mut buffers);
        builder.add_face(IVec3::new(0, 0, 0), Face::PosY, WHITE);
        builder.add_face(IVec3::new(1, 0, 0), Face::PosY, WHITE);
        assert_eq!(builder.face_count(), 2);
        assert_eq!(builder.vertex_count(), 6);

        // 颜色不同的顶点不合并
        builder.add_face(IVec3::new(2, 0, 0), Face::PosY, [0.5, 0.5, 0.5, 1.0]);
        assert_eq!(builder.vertex_count(), 10);
    }

    #[test]
    fn test_builder_reuses_cleared_buffers() {
        let mut buffers = MeshBuffers::new();
        {
            let mut builder = RegionMeshBuilder::with_buffers(&mut buffers);
            builder.add_face(IVec3::ZERO, Face::NegZ, WHITE);
        }
        let builder = RegionMeshBuilder::with_buffers(&mut buffers);
        assert!(builder.is_empty());
        assert_eq!(builder.vertex_count(), 0);
    }
}
