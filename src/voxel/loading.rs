//! 异步网格构建的数据类型

use bevy::prelude::*;
use bevy::tasks::Task;

use crate::voxel::constants::REGION_SIZE;
use crate::voxel::field::HeightField;

/// 渲染区域坐标 - 以 REGION_SIZE 列为单位的网格分块
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionPos {
    pub x: i32,
    pub z: i32,
}

impl RegionPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// 区域覆盖的网格列范围（左闭右开），已截断到高度图范围内
    pub fn grid_bounds(&self, field: &HeightField) -> (IVec2, IVec2) {
        let min = IVec2::new(self.x * REGION_SIZE, self.z * REGION_SIZE);
        let max = (min + IVec2::splat(REGION_SIZE)).min(IVec2::new(field.width(), field.depth()));
        (min, max)
    }

    /// 覆盖整张高度图所需的全部区域
    pub fn covering(field: &HeightField) -> impl Iterator<Item = RegionPos> + use<> {
        let nx = (field.width() + REGION_SIZE - 1) / REGION_SIZE;
        let nz = (field.depth() + REGION_SIZE - 1) / REGION_SIZE;
        (0..nz).flat_map(move |z| (0..nx).map(move |x| RegionPos::new(x, z)))
    }
}

/// 区域网格任务组件 - 跟踪正在后台构建的区域网格
#[derive(Component)]
pub struct ComputeMeshTask {
    pub task: Task<Mesh>,
    pub region: RegionPos,
}

/// 已生成的地形区域标记
#[derive(Component)]
pub struct RegionMarker {
    pub pos: RegionPos,
}

/// 网格构建进度
#[derive(Resource, Debug, Default)]
pub struct MeshingProgress {
    pub total: usize,
    pub completed: usize,
}

impl MeshingProgress {
    pub fn is_done(&self) -> bool {
        self.completed >= self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regions_cover_field() {
        let field = HeightField::flat(40, 20, 0.0).unwrap();
        let regions: Vec<_> = RegionPos::covering(&field).collect();
        assert_eq!(regions.len(), 3 * 2);

        let mut columns = 0;
        for region in &regions {
            let (min, max) = region.grid_bounds(&field);
            columns += ((max.x - min.x) * (max.y - min.y)) as usize;
        }
        assert_eq!(columns, 40 * 20);

        let (min, max) = RegionPos::new(2, 1).grid_bounds(&field);
        assert_eq!(min, IVec2::new(32, 16));
        assert_eq!(max, IVec2::new(40, 20));
    }
}
