//! 角色物理模块
//!
//! 本模块负责：
//! - 胶囊体与体素的相交检测 (`probe`)
//! - 扫掠碰撞与被阻挡位移的回退解析 (`sweep`)
//! - 重力、终端速度、子步推进与紧急修正 (`integrator`)
//! - 着地检测 (`ground`)
//! - 可注入的故障诊断通道 (`diagnostics`)
//!
//! 物理代码只依赖 `VoxelField` 接口，不依赖 Bevy 的 ECS，
//! 由 `player` 模块的系统每帧驱动。

pub mod diagnostics;
pub mod ground;
pub mod integrator;
pub mod probe;
pub mod state;
pub mod sweep;

pub use diagnostics::{PhysicsDiagnostics, PhysicsFault};
pub use ground::GroundSensor;
pub use integrator::{MotionIntegrator, StepReport};
pub use probe::SampledProbe;
pub use state::{CharacterState, MAX_JUMP_FORCE, MAX_MOVE_SPEED, MoveKeys, MovementTuning};
pub use sweep::SweepResolver;
