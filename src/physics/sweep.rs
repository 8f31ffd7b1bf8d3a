//! 扫掠碰撞与位移解析
//!
//! 检测起点到终点整条线段上是否有实心体素，而不只是检测终点，以防穿透。
//! 被阻挡时从终点沿路径参数 t 线性后退，找到最后一个安全位置。
//! 这不是连续碰撞求解（没有基于法线的滑动），斜向贴墙移动时会损失部分
//! 横向速度。

use bevy::prelude::*;
use bitflags::bitflags;

use crate::physics::probe::{CapsuleShape, CollisionProbe};
use crate::voxel::VoxelField;

/// 线段长度小于该值时只检测起点
pub const SWEEP_EPSILON: f32 = 1e-3;

/// 扫掠采样段数（采样点数为段数 + 1）
pub const SWEEP_SEGMENTS: u32 = 10;

/// 后退搜索的步长（路径参数 t）
pub const BACKOFF_STEP: f32 = 0.05;

/// 后退搜索的最大次数
pub const BACKOFF_ATTEMPTS: u32 = 20;

/// 位移方向分量超过该值的轴在阻挡时清零速度
pub const BLOCKING_AXIS_THRESHOLD: f32 = 0.1;

bitflags! {
    /// 被阻挡的运动轴 - 解析结果携带的速度调整描述
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BlockedAxes: u8 {
        const X = 1 << 0;
        const Y = 1 << 1;
        const Z = 1 << 2;
    }
}

impl BlockedAxes {
    /// 根据预期位移计算主导轴
    pub fn from_movement(movement: Vec3) -> Self {
        let mut axes = Self::empty();
        if movement.length() <= SWEEP_EPSILON {
            return axes;
        }
        let dir = movement.normalize();
        if dir.x.abs() > BLOCKING_AXIS_THRESHOLD {
            axes |= Self::X;
        }
        if dir.y.abs() > BLOCKING_AXIS_THRESHOLD {
            axes |= Self::Y;
        }
        if dir.z.abs() > BLOCKING_AXIS_THRESHOLD {
            axes |= Self::Z;
        }
        axes
    }

    /// 将被阻挡轴上的速度分量清零
    pub fn apply(self, velocity: &mut Vec3) {
        if self.contains(Self::X) {
            velocity.x = 0.0;
        }
        if self.contains(Self::Y) {
            velocity.y = 0.0;
        }
        if self.contains(Self::Z) {
            velocity.z = 0.0;
        }
    }
}

/// 一次位移解析的结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// 解析后的位置
    pub position: Vec3,
    /// 路径是否被阻挡
    pub blocked: bool,
    /// 需要清零速度的轴
    pub blocked_axes: BlockedAxes,
}

impl Resolution {
    fn clear(position: Vec3) -> Self {
        Self {
            position,
            blocked: false,
            blocked_axes: BlockedAxes::empty(),
        }
    }
}

/// 扫掠解析器 - 借用占据场和探针，本身不持有状态
pub struct SweepResolver<'a, F: ?Sized, P> {
    field: &'a F,
    probe: &'a P,
}

impl<'a, F, P> SweepResolver<'a, F, P>
where
    F: VoxelField + ?Sized,
    P: CollisionProbe,
{
    pub fn new(field: &'a F, probe: &'a P) -> Self {
        Self { field, probe }
    }

    /// 单点检测：胶囊体放在 `position` 时是否与实心体素相交
    pub fn intersects(&self, position: Vec3, shape: CapsuleShape) -> bool {
        self.probe.intersects(self.field, &shape.at(position))
    }

    /// 起点到终点的线段上是否有任何采样点相交
    pub fn swept_intersects(&self, start: Vec3, end: Vec3, shape: CapsuleShape) -> bool {
        if start.distance(end) < SWEEP_EPSILON {
            return self.intersects(start, shape);
        }
        (0..=SWEEP_SEGMENTS).any(|i| {
            let t = i as f32 / SWEEP_SEGMENTS as f32;
            self.intersects(start.lerp(end, t), shape)
        })
    }

    /// 解析从 `old` 到 `new` 的位移
    ///
    /// 路径畅通时完整接受；被阻挡时从终点以 `BACKOFF_STEP` 后退搜索
    /// 第一个不相交的位置，全部失败时停在 `old`。
    pub fn resolve(&self, old: Vec3, new: Vec3, shape: CapsuleShape) -> Resolution {
        if !self.swept_intersects(old, new, shape) {
            return Resolution::clear(new);
        }

        let movement = new - old;
        let mut position = old;
        for attempt in 1..=BACKOFF_ATTEMPTS {
            let t = (1.0 - attempt as f32 * BACKOFF_STEP).max(0.0);
            let candidate = old + movement * t;
            if !self.intersects(candidate, shape) {
                trace!("Blocked move {old} -> {new}, settled at t={t:.2}");
                position = candidate;
                break;
            }
        }

        Resolution {
            position,
            blocked: true,
            blocked_axes: BlockedAxes::from_movement(movement),
        }
    }
}
