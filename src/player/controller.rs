//! 角色控制器
//!
//! 每帧的执行顺序：
//! 1. `apply_input`：把按键映射为水平速度，处理跳跃边沿
//! 2. `update`：积分器推进一帧，地面传感器更新着地状态，眼睛位置写回摄像机
//!
//! 控制器独占 `CharacterState`，外部只能通过查询方法读取。

use bevy::prelude::*;

use crate::physics::{
    CharacterState, GroundSensor, MAX_JUMP_FORCE, MAX_MOVE_SPEED, MotionIntegrator, MoveKeys,
    MovementTuning, PhysicsDiagnostics, PhysicsFault, SampledProbe, StepReport, SweepResolver,
};
use crate::player::camera::{CameraRig, flatten};
use crate::player::input::MoveInput;
use crate::voxel::VoxelField;

/// 松开方向键后每帧保留的水平速度比例
pub const FRICTION: f32 = 0.8;

/// 出生点向上搜索的次数（每次 1 个单位）
pub const SPAWN_SEARCH_STEPS: i32 = 10;

/// 出生点高于地表的距离
pub const SPAWN_CLEARANCE: f32 = 1.0;

#[derive(Component, Debug, Clone)]
pub struct CharacterController {
    state: CharacterState,
    integrator: MotionIntegrator,
    sensor: GroundSensor,
    probe: SampledProbe,
    /// 上一帧跳跃键是否按下
    jump_held: bool,
}

impl CharacterController {
    pub fn new(position: Vec3, tuning: MovementTuning) -> Self {
        Self {
            state: CharacterState::new(position, tuning),
            integrator: MotionIntegrator::default(),
            sensor: GroundSensor::default(),
            probe: SampledProbe::default(),
            jump_held: false,
        }
    }

    /// 在 (x, z) 处的地表上方出生，并把摄像机移到眼睛位置
    pub fn spawn_on<F: VoxelField + ?Sized>(
        field: &F,
        x: f32,
        z: f32,
        tuning: MovementTuning,
        camera: &mut impl CameraRig,
        diagnostics: &mut PhysicsDiagnostics,
    ) -> Self {
        let position = Vec3::new(x, field.surface_height(x, z) + SPAWN_CLEARANCE, z);
        let mut controller = Self::new(position, tuning);
        controller.set_position(field, position, camera, diagnostics);
        info!("Character spawned at {}", controller.position());
        controller
    }

    /// 处理一帧的输入
    pub fn apply_input(&mut self, input: &MoveInput, camera: &impl CameraRig) {
        let state = &mut self.state;

        if input.jump && !self.jump_held && state.grounded {
            state.velocity.y = state.tuning.jump_force;
            state.grounded = false;
            state.jumping = true;
        }
        self.jump_held = input.jump;

        state.keys = input.keys;
        state.moving = !input.keys.is_empty();

        let forward = flatten(camera.forward_dir());
        let right = flatten(camera.right_dir());
        let mut direction = Vec3::ZERO;
        if input.keys.contains(MoveKeys::FORWARD) {
            direction += forward;
        }
        if input.keys.contains(MoveKeys::BACK) {
            direction -= forward;
        }
        if input.keys.contains(MoveKeys::RIGHT) {
            direction += right;
        }
        if input.keys.contains(MoveKeys::LEFT) {
            direction -= right;
        }

        let direction = direction.normalize_or_zero();
        if direction != Vec3::ZERO {
            state.velocity.x = direction.x * state.tuning.move_speed;
            state.velocity.z = direction.z * state.tuning.move_speed;
        } else {
            state.velocity.x *= FRICTION;
            state.velocity.z *= FRICTION;
        }
    }

    /// 推进一帧：积分、着地检测、同步摄像机
    pub fn update<F: VoxelField + ?Sized>(
        &mut self,
        field: &F,
        camera: &mut impl CameraRig,
        delta_time: f32,
        diagnostics: &mut PhysicsDiagnostics,
    ) -> StepReport {
        let resolver = SweepResolver::new(field, &self.probe);
        let report = self
            .integrator
            .step(&mut self.state, &resolver, delta_time, diagnostics);
        self.sensor.sense(field, &mut self.state);
        camera.set_eye_position(self.eye_position());
        report
    }

    /// 放置角色；目标位置被占据时向上逐格搜索空位
    ///
    /// 找到空位（或目标本身就是空的）时返回 true。全部失败时仍然使用
    /// 原始目标位置，并上报 `UnsafeSpawn`。两种情况下摄像机都会移到新的眼睛位置。
    pub fn set_position<F: VoxelField + ?Sized>(
        &mut self,
        field: &F,
        position: Vec3,
        camera: &mut impl CameraRig,
        diagnostics: &mut PhysicsDiagnostics,
    ) -> bool {
        let resolver = SweepResolver::new(field, &self.probe);
        let shape = self.state.shape();

        let safe = (0..=SPAWN_SEARCH_STEPS)
            .map(|i| position + Vec3::Y * i as f32)
            .find(|candidate| !resolver.intersects(*candidate, shape));

        let placed = match safe {
            Some(candidate) => {
                self.state.position = candidate;
                true
            }
            None => {
                diagnostics.report(PhysicsFault::UnsafeSpawn {
                    requested: position,
                });
                self.state.position = position;
                false
            }
        };
        camera.set_eye_position(self.eye_position());
        placed
    }

    pub fn state(&self) -> &CharacterState {
        &self.state
    }

    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.state.velocity
    }

    /// 摄像机位置：脚底加上眼睛高度
    pub fn eye_position(&self) -> Vec3 {
        self.state.position + Vec3::Y * self.state.tuning.eye_offset
    }

    pub fn is_moving(&self) -> bool {
        self.state.moving
    }

    pub fn is_jumping(&self) -> bool {
        self.state.jumping
    }

    pub fn is_grounded(&self) -> bool {
        self.state.grounded
    }

    /// 配置的移动速度
    pub fn move_speed(&self) -> f32 {
        self.state.tuning.move_speed
    }

    /// 当前水平速度
    pub fn current_speed(&self) -> f32 {
        self.state.horizontal_speed()
    }

    /// 设置移动速度，限制在 `[0, MAX_MOVE_SPEED]`
    pub fn set_move_speed(&mut self, speed: f32) {
        if speed.is_finite() {
            self.state.tuning.move_speed = speed.clamp(0.0, MAX_MOVE_SPEED);
        }
    }

    pub fn gravity(&self) -> f32 {
        self.state.tuning.gravity
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.state.tuning.gravity = gravity;
    }

    pub fn jump_force(&self) -> f32 {
        self.state.tuning.jump_force
    }

    pub fn set_jump_force(&mut self, force: f32) {
        if force.is_finite() {
            self.state.tuning.jump_force = force.clamp(0.0, MAX_JUMP_FORCE);
        }
    }

    pub fn ground_level(&self) -> f32 {
        self.state.tuning.ground_level
    }

    pub fn set_ground_level(&mut self, level: f32) {
        self.state.tuning.ground_level = level;
    }
}
