use bevy::prelude::*;

use crate::physics::MoveKeys;

/// 一帧的原始输入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoveInput {
    pub keys: MoveKeys,
    /// 跳跃键当前是否按下（边沿由控制器判断）
    pub jump: bool,
}

impl MoveInput {
    pub fn new(keys: MoveKeys, jump: bool) -> Self {
        Self { keys, jump }
    }

    /// W/A/S/D 映射为移动方向，空格为跳跃
    pub fn from_keyboard(keys: &ButtonInput<KeyCode>) -> Self {
        let mut flags = MoveKeys::empty();
        flags.set(MoveKeys::FORWARD, keys.pressed(KeyCode::KeyW));
        flags.set(MoveKeys::BACK, keys.pressed(KeyCode::KeyS));
        flags.set(MoveKeys::LEFT, keys.pressed(KeyCode::KeyA));
        flags.set(MoveKeys::RIGHT, keys.pressed(KeyCode::KeyD));
        Self {
            keys: flags,
            jump: keys.pressed(KeyCode::Space),
        }
    }
}
