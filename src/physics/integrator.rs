//! 运动积分器
//!
//! 每帧推进一次角色状态：
//! 1. 空中时施加重力，并把下落速度限制在终端速度以内
//! 2. 把本帧时间切成不超过 `max_substep` 的子步，且单个子步位移不超过
//!    `max_substep_distance`，每个子步的位移都经过扫掠解析
//! 3. 子步结束后如果仍然嵌在方块里，逐步向上推出

use bevy::prelude::*;

use crate::physics::diagnostics::{PhysicsDiagnostics, PhysicsFault};
use crate::physics::probe::CollisionProbe;
use crate::physics::state::CharacterState;
use crate::physics::sweep::SweepResolver;
use crate::voxel::VoxelField;

/// 终端下落速度（单位/秒）
pub const TERMINAL_VELOCITY: f32 = 20.0;

/// 子步的最长时间（秒）
pub const MAX_SUBSTEP: f32 = 0.1;

/// 单个子步的最大位移，必须小于一格方块
pub const MAX_SUBSTEP_DISTANCE: f32 = 0.9;

/// 单帧子步数上限
pub const MAX_SUBSTEPS: u32 = 256;

/// 紧急上推的单次距离
pub const PUSH_STEP: f32 = 0.1;

/// 紧急上推的最大次数
pub const MAX_PUSHES: u32 = 10;

/// 紧急修正的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Correction {
    /// 没有嵌入
    #[default]
    None,
    /// 上推若干次后脱离
    Pushed(u32),
    /// 上推次数用尽仍然嵌入
    Exhausted,
}

/// 单帧推进的摘要
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StepReport {
    pub substeps: u32,
    /// 是否有任何子步被阻挡
    pub blocked: bool,
    pub correction: Correction,
}

/// 运动积分器参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionIntegrator {
    pub terminal_velocity: f32,
    pub max_substep: f32,
    pub max_substep_distance: f32,
    pub max_substeps: u32,
    pub push_step: f32,
    pub max_pushes: u32,
}

impl Default for MotionIntegrator {
    fn default() -> Self {
        Self {
            terminal_velocity: TERMINAL_VELOCITY,
            max_substep: MAX_SUBSTEP,
            max_substep_distance: MAX_SUBSTEP_DISTANCE,
            max_substeps: MAX_SUBSTEPS,
            push_step: PUSH_STEP,
            max_pushes: MAX_PUSHES,
        }
    }
}

impl MotionIntegrator {
    /// 推进一帧
    pub fn step<F, P>(
        &self,
        state: &mut CharacterState,
        resolver: &SweepResolver<'_, F, P>,
        delta_time: f32,
        diagnostics: &mut PhysicsDiagnostics,
    ) -> StepReport
    where
        F: VoxelField + ?Sized,
        P: CollisionProbe,
    {
        let mut report = StepReport::default();
        if !delta_time.is_finite() || delta_time <= 0.0 {
            return report;
        }

        if !state.grounded {
            state.velocity.y += state.tuning.gravity * delta_time;
        }
        state.velocity.y = state.velocity.y.max(-self.terminal_velocity);

        let shape = state.shape();
        let mut remaining = delta_time;
        while remaining > 0.0 {
            if report.substeps >= self.max_substeps {
                trace!("substep limit reached, dropping {remaining:.4}s");
                break;
            }
            let dt = self.substep_duration(remaining, state.velocity.length());
            let target = state.position + state.velocity * dt;
            let resolution = resolver.resolve(state.position, target, shape);
            if resolution.blocked {
                resolution.blocked_axes.apply(&mut state.velocity);
                report.blocked = true;
            }
            state.position = resolution.position;
            remaining -= dt;
            report.substeps += 1;
        }

        report.correction = self.correct_penetration(state, resolver, diagnostics);
        report
    }

    /// 子步时长：同时受时间上限和位移上限约束
    fn substep_duration(&self, remaining: f32, speed: f32) -> f32 {
        let dt = remaining.min(self.max_substep);
        if speed * dt > self.max_substep_distance {
            self.max_substep_distance / speed
        } else {
            dt
        }
    }

    /// 嵌入方块时逐步向上推出，最多 `max_pushes` 次
    pub fn correct_penetration<F, P>(
        &self,
        state: &mut CharacterState,
        resolver: &SweepResolver<'_, F, P>,
        diagnostics: &mut PhysicsDiagnostics,
    ) -> Correction
    where
        F: VoxelField + ?Sized,
        P: CollisionProbe,
    {
        let shape = state.shape();
        let mut pushes = 0;
        let mut embedded = resolver.intersects(state.position, shape);
        while embedded && pushes < self.max_pushes {
            state.position.y += self.push_step;
            pushes += 1;
            embedded = resolver.intersects(state.position, shape);
        }

        match (pushes, embedded) {
            (0, _) => Correction::None,
            (_, false) => {
                diagnostics.report(PhysicsFault::EmergencyPush {
                    pushes,
                    position: state.position,
                });
                Correction::Pushed(pushes)
            }
            (_, true) => {
                diagnostics.report(PhysicsFault::CorrectionExhausted {
                    attempts: pushes,
                    position: state.position,
                });
                Correction::Exhausted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::probe::SampledProbe;
    use crate::physics::state::{MAX_MOVE_SPEED, MovementTuning};
    use crate::voxel::HeightField;

    const DT: f32 = 1.0 / 60.0;

    fn floor_field(height: i32) -> HeightField {
        let mut field = HeightField::flat(16, 16, 2.0).unwrap();
        for z in -8..8 {
            for x in -8..8 {
                field.set_world_column(x, z, height);
            }
        }
        field
    }

    fn state_at(position: Vec3) -> CharacterState {
        CharacterState::new(position, MovementTuning::default())
    }

    #[test]
    fn test_gravity_only_when_airborne() {
        let field = floor_field(0);
        let probe = SampledProbe::default();
        let resolver = SweepResolver::new(&field, &probe);
        let mut diagnostics = PhysicsDiagnostics::default();
        let integrator = MotionIntegrator::default();

        let mut airborne = state_at(Vec3::new(0.0, 10.0, 0.0));
        integrator.step(&mut airborne, &resolver, DT, &mut diagnostics);
        assert!((airborne.velocity.y - (-20.0 * DT)).abs() < 1e-5);
        assert!(airborne.position.y < 10.0);

        let mut grounded = state_at(Vec3::new(0.0, 10.0, 0.0));
        grounded.grounded = true;
        integrator.step(&mut grounded, &resolver, DT, &mut diagnostics);
        assert_eq!(grounded.velocity.y, 0.0);
        assert_eq!(grounded.position, Vec3::new(0.0, 10.0, 0.0));
    }

    #[test]
    fn test_terminal_velocity_clamp() {
        let field = floor_field(0);
        let probe = SampledProbe::default();
        let resolver = SweepResolver::new(&field, &probe);
        let mut diagnostics = PhysicsDiagnostics::default();
        let integrator = MotionIntegrator::default();

        let mut state = state_at(Vec3::new(0.0, 500.0, 0.0));
        state.velocity.y = -19.9;
        integrator.step(&mut state, &resolver, 0.5, &mut diagnostics);
        assert_eq!(state.velocity.y, -TERMINAL_VELOCITY);
    }

    #[test]
    fn test_substeps_cap_at_max_substep() {
        let field = floor_field(0);
        let probe = SampledProbe::default();
        let resolver = SweepResolver::new(&field, &probe);
        let mut diagnostics = PhysicsDiagnostics::default();
        let integrator = MotionIntegrator::default();

        let mut state = state_at(Vec3::new(0.0, 100.0, 0.0));
        let report = integrator.step(&mut state, &resolver, 0.35, &mut diagnostics);
        assert_eq!(report.substeps, 4);

        let report = integrator.step(&mut state, &resolver, DT, &mut diagnostics);
        assert_eq!(report.substeps, 1);
    }

    #[test]
    fn test_fast_substeps_are_split_by_distance() {
        let field = floor_field(0);
        let probe = SampledProbe::default();
        let resolver = SweepResolver::new(&field, &probe);
        let mut diagnostics = PhysicsDiagnostics::default();
        let integrator = MotionIntegrator::default();

        let mut state = state_at(Vec3::new(0.0, 100.0, 0.0));
        state.grounded = true;
        state.velocity.x = 45.0;
        // 4.5 个单位的位移，每个子步最多 0.9
        let report = integrator.step(&mut state, &resolver, 0.1, &mut diagnostics);
        assert!(report.substeps >= 5 && report.substeps <= 6);
        assert!((state.position.x - 4.5).abs() < 1e-3);
    }

    #[test]
    fn test_top_speed_does_not_pass_thin_wall() {
        // 地板高 1，x = 3 处一堵厚度为 1 的高墙
        let mut field = floor_field(1);
        for z in -8..8 {
            field.set_world_column(3, z, 10);
        }
        let probe = SampledProbe::default();
        let resolver = SweepResolver::new(&field, &probe);
        let mut diagnostics = PhysicsDiagnostics::default();
        let integrator = MotionIntegrator::default();

        let mut state = state_at(Vec3::new(0.5, 1.0, 0.5));
        state.grounded = true;
        for _ in 0..30 {
            state.velocity.x = MAX_MOVE_SPEED;
            integrator.step(&mut state, &resolver, 0.1, &mut diagnostics);
            assert!(state.position.x < 3.0, "passed the wall: {}", state.position);
        }
        assert!(state.position.x > 2.0);
        assert!(!resolver.intersects(state.position, state.shape()));
    }

    #[test]
    fn test_ignores_non_positive_delta() {
        let field = floor_field(0);
        let probe = SampledProbe::default();
        let resolver = SweepResolver::new(&field, &probe);
        let mut diagnostics = PhysicsDiagnostics::default();
        let integrator = MotionIntegrator::default();

        let mut state = state_at(Vec3::new(0.0, 10.0, 0.0));
        let before = state.clone();
        assert_eq!(
            integrator.step(&mut state, &resolver, 0.0, &mut diagnostics),
            StepReport::default()
        );
        integrator.step(&mut state, &resolver, f32::NAN, &mut diagnostics);
        assert_eq!(state, before);
    }

    #[test]
    fn test_long_frame_does_not_tunnel_through_floor() {
        let field = floor_field(4);
        let probe = SampledProbe::default();
        let resolver = SweepResolver::new(&field, &probe);
        let mut diagnostics = PhysicsDiagnostics::default();
        let integrator = MotionIntegrator::default();

        let mut state = state_at(Vec3::new(0.5, 6.0, 0.5));
        state.velocity.y = -TERMINAL_VELOCITY;
        // 一帧 0.5 秒，总位移 10 个单位，远超地板以上的 2 个单位
        let report = integrator.step(&mut state, &resolver, 0.5, &mut diagnostics);

        assert!(report.blocked);
        assert!(state.position.y >= 4.0);
        assert!(!resolver.intersects(state.position, state.shape()));
        assert_eq!(report.correction, Correction::None);
    }

    #[test]
    fn test_shallow_embedding_is_pushed_out() {
        let field = floor_field(2);
        let probe = SampledProbe::default();
        let resolver = SweepResolver::new(&field, &probe);
        let mut diagnostics = PhysicsDiagnostics::default();
        let integrator = MotionIntegrator::default();

        let mut state = state_at(Vec3::new(0.5, 1.5, 0.5));
        let report = integrator.step(&mut state, &resolver, DT, &mut diagnostics);

        let Correction::Pushed(pushes) = report.correction else {
            panic!("expected a push, got {:?}", report.correction);
        };
        assert!(pushes <= 6);
        assert!(!resolver.intersects(state.position, state.shape()));
        assert!(state.position.y >= 2.0 && state.position.y < 2.15);
        assert!(matches!(
            diagnostics.last(),
            Some(PhysicsFault::EmergencyPush { .. })
        ));
    }

    #[test]
    fn test_deep_embedding_exhausts_attempts() {
        let field = floor_field(20);
        let probe = SampledProbe::default();
        let resolver = SweepResolver::new(&field, &probe);
        let mut diagnostics = PhysicsDiagnostics::default();
        let integrator = MotionIntegrator::default();

        let mut state = state_at(Vec3::new(0.5, 2.0, 0.5));
        state.grounded = true;
        let report = integrator.step(&mut state, &resolver, DT, &mut diagnostics);

        assert_eq!(report.correction, Correction::Exhausted);
        assert!((state.position.y - 3.0).abs() < 1e-3);
        assert!(resolver.intersects(state.position, state.shape()));
        assert_eq!(
            diagnostics.last(),
            Some(&PhysicsFault::CorrectionExhausted {
                attempts: MAX_PUSHES,
                position: state.position,
            })
        );
    }
}
