//! 胶囊体与体素的相交检测
//!
//! 胶囊体在这里被简化为竖直圆柱：脚底中心为 `center`，
//! 覆盖 `[center.y, center.y + height]`。检测方法是在若干高度层上
//! 采样一个圆盘内的格点，把每个点向下取整到体素坐标后查询占据场。

use bevy::prelude::*;

use crate::voxel::VoxelField;

/// 竖直方向的采样层间距
pub const LEVEL_STEP: f32 = 0.1;

/// 水平圆盘的采样格点间距
pub const DISC_STEP: f32 = 0.1;

/// 浮点累积误差容忍度，保证半径正好落在格点上时该格点被采到
const LATTICE_EPSILON: f32 = 1e-4;

/// 胶囊体尺寸（不含位置）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapsuleShape {
    pub radius: f32,
    pub height: f32,
}

impl CapsuleShape {
    pub fn new(radius: f32, height: f32) -> Self {
        Self { radius, height }
    }

    /// 放到指定脚底位置
    pub fn at(self, center: Vec3) -> Capsule {
        Capsule {
            center,
            radius: self.radius,
            height: self.height,
        }
    }
}

/// 胶囊体 - 角色的碰撞体积，`center` 位于脚底
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub center: Vec3,
    pub radius: f32,
    pub height: f32,
}

/// 圆盘格点偏移：以 `step` 为间距、包含原点的对称格点，只保留 x²+z² ≤ r² 的点
///
/// 用整数索引生成格点，避免浮点累加造成左右不对称
pub fn disc_offsets(radius: f32, step: f32) -> impl Iterator<Item = Vec2> {
    let n = (radius.max(0.0) / step + LATTICE_EPSILON).floor() as i32;
    let limit = radius * radius + LATTICE_EPSILON;
    (-n..=n).flat_map(move |i| {
        (-n..=n).filter_map(move |j| {
            let offset = Vec2::new(i as f32 * step, j as f32 * step);
            (offset.length_squared() <= limit).then_some(offset)
        })
    })
}

/// 碰撞探针接口
///
/// 把逐点采样的实现隔离在这个接口后面，以后可以换成按列比较高度之类的
/// 宽相位结构，而不影响扫掠和积分逻辑
pub trait CollisionProbe {
    /// 胶囊体是否与任何实心体素相交
    fn intersects<F: VoxelField + ?Sized>(&self, field: &F, capsule: &Capsule) -> bool;
}

/// 采样式探针 - 多层圆盘格点逐一查询
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledProbe {
    pub level_step: f32,
    pub disc_step: f32,
}

impl Default for SampledProbe {
    fn default() -> Self {
        Self {
            level_step: LEVEL_STEP,
            disc_step: DISC_STEP,
        }
    }
}

impl SampledProbe {
    /// 采样层数：从脚底到头顶（含两端）
    fn level_count(&self, height: f32) -> i32 {
        (height.max(0.0) / self.level_step + LATTICE_EPSILON).floor() as i32 + 1
    }
}

impl CollisionProbe for SampledProbe {
    fn intersects<F: VoxelField + ?Sized>(&self, field: &F, capsule: &Capsule) -> bool {
        let base = capsule.center;
        for level in 0..self.level_count(capsule.height) {
            let y = (base.y + level as f32 * self.level_step).floor() as i32;
            for offset in disc_offsets(capsule.radius, self.disc_step) {
                let x = (base.x + offset.x).floor() as i32;
                let z = (base.z + offset.y).floor() as i32;
                if field.is_solid(x, y, z) {
                    return true;
                }
            }
        }
        false
    }
}
