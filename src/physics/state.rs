//! 角色运动状态

use bevy::prelude::*;
use bitflags::bitflags;

use crate::physics::probe::CapsuleShape;

bitflags! {
    /// 水平移动按键状态
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MoveKeys: u8 {
        const FORWARD = 1 << 0;
        const BACK = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
    }
}

/// 水平移动速度上限（单位/秒）
pub const MAX_MOVE_SPEED: f32 = 50.0;

/// 起跳初速度上限
pub const MAX_JUMP_FORCE: f32 = 50.0;

/// 角色可调参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementTuning {
    /// 水平移动速度（单位/秒）
    pub move_speed: f32,
    /// 起跳初速度
    pub jump_force: f32,
    /// 重力加速度（负数，向下）
    pub gravity: f32,
    /// 地面参考高度
    pub ground_level: f32,
    /// 碰撞体半径
    pub radius: f32,
    /// 碰撞体高度
    pub height: f32,
    /// 摄像机相对脚底的高度
    pub eye_offset: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            jump_force: 8.0,
            gravity: -20.0,
            ground_level: 0.0,
            radius: 0.3,
            height: 1.8,
            eye_offset: 0.5,
        }
    }
}

impl MovementTuning {
    pub fn shape(&self) -> CapsuleShape {
        CapsuleShape::new(self.radius, self.height)
    }
}

/// 角色状态 - 由角色控制器独占，每帧由积分器和地面传感器修改
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterState {
    /// 脚底位置（世界坐标）
    pub position: Vec3,
    /// 速度（世界坐标，单位/秒）
    pub velocity: Vec3,
    pub grounded: bool,
    pub jumping: bool,
    pub moving: bool,
    pub keys: MoveKeys,
    pub tuning: MovementTuning,
}

impl CharacterState {
    pub fn new(position: Vec3, tuning: MovementTuning) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            grounded: false,
            jumping: false,
            moving: false,
            keys: MoveKeys::empty(),
            tuning,
        }
    }

    pub fn shape(&self) -> CapsuleShape {
        self.tuning.shape()
    }

    /// 水平速度大小
    pub fn horizontal_speed(&self) -> f32 {
        self.velocity.xz().length()
    }
}
