//! 地面检测
//!
//! 在脚底下方 `probe_depth` 处采样一个与碰撞体同半径的圆盘，
//! 任何采样点落在实心体素内即视为着地。从空中变为着地的那一帧
//! 清零竖直速度并结束跳跃状态。

use bevy::prelude::*;

use crate::physics::probe::disc_offsets;
use crate::physics::state::CharacterState;
use crate::voxel::VoxelField;

/// 脚底下方的检测深度
pub const PROBE_DEPTH: f32 = 0.1;

/// 圆盘采样间距
pub const SENSOR_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundSensor {
    pub probe_depth: f32,
    pub step: f32,
}

impl Default for GroundSensor {
    fn default() -> Self {
        Self {
            probe_depth: PROBE_DEPTH,
            step: SENSOR_STEP,
        }
    }
}

impl GroundSensor {
    /// 脚底位于 `position`、半径为 `radius` 的角色下方是否有支撑
    pub fn is_supported<F: VoxelField + ?Sized>(&self, field: &F, position: Vec3, radius: f32) -> bool {
        let y = (position.y - self.probe_depth).floor() as i32;
        disc_offsets(radius, self.step).any(|offset| {
            let x = (position.x + offset.x).floor() as i32;
            let z = (position.z + offset.y).floor() as i32;
            field.is_solid(x, y, z)
        })
    }

    /// 更新着地状态，返回是否着地
    pub fn sense<F: VoxelField + ?Sized>(&self, field: &F, state: &mut CharacterState) -> bool {
        let was_grounded = state.grounded;
        state.grounded = self.is_supported(field, state.position, state.tuning.radius);

        if state.grounded && !was_grounded {
            debug!("Landed at {}", state.position);
            state.velocity.y = 0.0;
            state.jumping = false;
        }
        state.grounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::state::MovementTuning;
    use crate::voxel::HeightField;

    fn step_field() -> HeightField {
        let mut field = HeightField::flat(16, 16, 2.0).unwrap();
        field.set_world_column(0, 0, 3);
        field
    }

    #[test]
    fn test_supported_on_top_of_column() {
        let field = step_field();
        let sensor = GroundSensor::default();
        assert!(sensor.is_supported(&field, Vec3::new(0.5, 3.0, 0.5), 0.3));
        assert!(sensor.is_supported(&field, Vec3::new(0.5, 3.05, 0.5), 0.3));
        assert!(!sensor.is_supported(&field, Vec3::new(0.5, 3.2, 0.5), 0.3));
    }

    #[test]
    fn test_disc_reaches_column_edge() {
        let field = step_field();
        let sensor = GroundSensor::default();
        // 中心悬空，但圆盘边缘压在柱子上
        assert!(sensor.is_supported(&field, Vec3::new(-0.2, 3.0, 0.5), 0.3));
        assert!(!sensor.is_supported(&field, Vec3::new(-0.4, 3.0, 0.5), 0.3));
    }

    #[test]
    fn test_landing_edge_resets_velocity_and_jump() {
        let field = step_field();
        let sensor = GroundSensor::default();
        let mut state = CharacterState::new(Vec3::new(0.5, 3.0, 0.5), MovementTuning::default());
        state.velocity = Vec3::new(1.0, -4.0, 0.0);
        state.jumping = true;

        assert!(sensor.sense(&field, &mut state));
        assert_eq!(state.velocity, Vec3::new(1.0, 0.0, 0.0));
        assert!(!state.jumping);
    }

    #[test]
    fn test_already_grounded_keeps_velocity() {
        let field = step_field();
        let sensor = GroundSensor::default();
        let mut state = CharacterState::new(Vec3::new(0.5, 3.0, 0.5), MovementTuning::default());
        state.grounded = true;
        state.velocity.y = 8.0;
        state.jumping = true;

        assert!(sensor.sense(&field, &mut state));
        assert_eq!(state.velocity.y, 8.0);
        assert!(state.jumping);
    }

    #[test]
    fn test_leaving_ground() {
        let field = step_field();
        let sensor = GroundSensor::default();
        let mut state = CharacterState::new(Vec3::new(0.5, 4.0, 0.5), MovementTuning::default());
        state.grounded = true;
        assert!(!sensor.sense(&field, &mut state));
        assert!(!state.grounded);
    }
}
