//! 体素世界常量定义

/// 网格区域边长（单位：列）- 每个渲染区域覆盖 REGION_SIZE×REGION_SIZE 个高度列
pub const REGION_SIZE: i32 = 16;

/// 默认世界宽度（X方向的列数）
pub const DEFAULT_WORLD_WIDTH: i32 = 64;

/// 默认世界深度（Z方向的列数）
pub const DEFAULT_WORLD_DEPTH: i32 = 64;

/// 默认噪声采样缩放 - 网格坐标除以该值后送入噪声函数
pub const DEFAULT_NOISE_SCALE: f64 = 20.0;

/// 越界列的地表高度（只用于出生点估计，不参与碰撞）
pub const DEFAULT_BASE_HEIGHT: f32 = 2.0;

/// 噪声值到高度的放大倍数
pub const DEFAULT_HEIGHT_MULTIPLIER: f32 = 8.0;
