//! 玩家模块
//!
//! - **controller**: 角色控制器（输入映射、跳跃边沿、出生点搜索）
//! - **camera**: 控制器读取朝向、写入位置所用的摄像机接口
//! - **input**: 键盘到移动标志的映射
//! - **plugin 系统**: 鼠标视角、滚轮缩放、每帧驱动控制器

pub mod camera;
pub mod controller;
pub mod input;

pub use camera::CameraRig;
pub use controller::CharacterController;
pub use input::MoveInput;

use bevy::anti_alias::fxaa::Fxaa;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll, MouseScrollUnit};
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions};

use crate::config::PlayerSettings;
use crate::physics::PhysicsDiagnostics;
use crate::ui::MenuState;
use crate::voxel::VoxelTerrain;

/// 俯仰角限制（弧度）
const PITCH_LIMIT: f32 = 1.54;

/// 视野范围（角度），滚轮在其中缩放
const MAX_FOV_DEGREES: f32 = 45.0;
const MIN_FOV_DEGREES: f32 = 1.0;

/// 像素滚动换算为行滚动
const PIXELS_PER_LINE: f32 = 16.0;

#[derive(Component)]
pub struct PlayerCamera;

#[derive(Component, Debug, Default)]
pub struct LookAngles {
    pub yaw: f32,
    pub pitch: f32,
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_player)
            .add_systems(Update, (player_look, player_zoom, player_move).chain());
    }
}

fn setup_player(
    mut commands: Commands,
    terrain: Res<VoxelTerrain>,
    settings: Res<PlayerSettings>,
    mut diagnostics: ResMut<PhysicsDiagnostics>,
    mut cursor_options: Single<&mut CursorOptions>,
) {
    let yaw = 0.0;
    let pitch = -0.15;
    let rotation = Quat::from_axis_angle(Vec3::Y, yaw) * Quat::from_axis_angle(Vec3::X, pitch);
    let mut transform = Transform::from_rotation(rotation);

    let controller = CharacterController::spawn_on(
        &*terrain.field,
        0.0,
        0.0,
        settings.tuning(),
        &mut transform,
        &mut diagnostics,
    );

    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: MAX_FOV_DEGREES.to_radians(),
            ..default()
        }),
        transform,
        PlayerCamera,
        LookAngles { yaw, pitch },
        controller,
        Tonemapping::AcesFitted,
        Msaa::Off,
        Fxaa::default(),
    ));

    cursor_options.grab_mode = CursorGrabMode::Locked;
    cursor_options.visible = false;
}

fn player_look(
    mouse_motion: Res<AccumulatedMouseMotion>,
    mut query: Query<(&mut Transform, &mut LookAngles), With<PlayerCamera>>,
    settings: Res<PlayerSettings>,
    menu_state: Res<MenuState>,
) {
    if menu_state.open {
        return;
    }
    let delta = mouse_motion.delta;
    if delta == Vec2::ZERO {
        return;
    }
    let Ok((mut transform, mut angles)) = query.single_mut() else {
        return;
    };
    angles.yaw -= delta.x * settings.look_sensitivity;
    angles.pitch =
        (angles.pitch - delta.y * settings.look_sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    let yaw = Quat::from_axis_angle(Vec3::Y, angles.yaw);
    let pitch = Quat::from_axis_angle(Vec3::X, angles.pitch);
    transform.rotation = yaw * pitch;
}

/// 滚轮向上缩小视野（放大画面）
fn zoom_fov(fov_degrees: f32, scroll_lines: f32) -> f32 {
    (fov_degrees - scroll_lines).clamp(MIN_FOV_DEGREES, MAX_FOV_DEGREES)
}

fn player_zoom(
    mouse_scroll: Res<AccumulatedMouseScroll>,
    mut query: Query<&mut Projection, With<PlayerCamera>>,
    menu_state: Res<MenuState>,
) {
    if menu_state.open || mouse_scroll.delta.y == 0.0 {
        return;
    }
    let Ok(mut projection) = query.single_mut() else {
        return;
    };
    let Projection::Perspective(perspective) = &mut *projection else {
        return;
    };
    let lines = match mouse_scroll.unit {
        MouseScrollUnit::Line => mouse_scroll.delta.y,
        MouseScrollUnit::Pixel => mouse_scroll.delta.y / PIXELS_PER_LINE,
    };
    perspective.fov = zoom_fov(perspective.fov.to_degrees(), lines).to_radians();
}

fn player_move(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    terrain: Res<VoxelTerrain>,
    mut diagnostics: ResMut<PhysicsDiagnostics>,
    mut query: Query<(&mut Transform, &mut CharacterController), With<PlayerCamera>>,
    menu_state: Res<MenuState>,
) {
    if menu_state.open {
        return;
    }
    let Ok((mut transform, mut controller)) = query.single_mut() else {
        return;
    };
    let input = MoveInput::from_keyboard(&keys);
    controller.apply_input(&input, &*transform);
    controller.update(
        &*terrain.field,
        &mut *transform,
        time.delta_secs(),
        &mut diagnostics,
    );
}
