//! 地形生成器

use bevy::prelude::*;
use noise::NoiseFn;

use crate::config::WorldConfig;
use crate::voxel::field::{FieldError, HeightField};
use crate::voxel::seed::WorldSeed;

/// 地形生成器 - 使用分形柏林噪声生成二维高度图
pub struct TerrainGenerator<'a> {
    config: &'a WorldConfig,
    seed: WorldSeed,
}

impl<'a> TerrainGenerator<'a> {
    /// 创建新的地形生成器
    pub fn new(config: &'a WorldConfig) -> Self {
        let seed = WorldSeed::with_octaves(
            config.seed,
            config.octaves,
            config.persistence,
            config.lacunarity,
        );
        Self { config, seed }
    }

    /// 计算网格列 (gx, gz) 的高度
    /// 噪声值（约 -1..1）经放大后叠加在基础高度上，四舍五入到整数，最低为 0
    pub fn get_height(&self, gx: i32, gz: i32) -> i32 {
        let sx = gx as f64 / self.config.scale;
        let sz = gz as f64 / self.config.scale;
        let noise = self.seed.height_noise.get([sx, sz]) as f32;
        let height = self.config.base_height + noise * self.config.height_multiplier;
        (height.round() as i32).max(0)
    }

    /// 生成整张高度图
    pub fn generate(&self) -> Result<HeightField, FieldError> {
        let width = self.config.width;
        let depth = self.config.depth;
        let mut heights = Vec::with_capacity((width.max(0) * depth.max(0)) as usize);
        for gz in 0..depth {
            for gx in 0..width {
                heights.push(self.get_height(gx, gz));
            }
        }

        let field = HeightField::from_heights(width, depth, self.config.base_height, heights)?;
        info!(
            "Generated {}x{} terrain (seed {}), max column height {}",
            width,
            depth,
            self.seed.seed,
            field.max_height()
        );
        Ok(field)
    }
}

/// 根据高度返回方块颜色
/// - 沙土 (< 1)
/// - 草地 (< 2)
/// - 深色草地 (< 4)
/// - 石头 (< 6)
/// - 雪 (其余)
pub fn terrain_color(y: i32) -> Color {
    match y {
        i32::MIN..=0 => Color::srgb(0.6, 0.4, 0.2),
        1 => Color::srgb(0.2, 0.8, 0.2),
        2..=3 => Color::srgb(0.4, 0.6, 0.2),
        4..=5 => Color::srgb(0.5, 0.5, 0.5),
        _ => Color::srgb(1.0, 1.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voxel::field::VoxelField;

    fn config(seed: u32) -> WorldConfig {
        WorldConfig {
            seed,
            width: 32,
            depth: 32,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn test_generation_is_deterministic() {
        let cfg = config(7);
        let a = TerrainGenerator::new(&cfg).generate().unwrap();
        let b = TerrainGenerator::new(&cfg).generate().unwrap();
        for z in -16..16 {
            for x in -16..16 {
                assert_eq!(a.surface_height(x as f32, z as f32), b.surface_height(x as f32, z as f32));
            }
        }
    }

    #[test]
    fn test_heights_are_non_negative_and_bounded() {
        let cfg = config(99);
        let generator = TerrainGenerator::new(&cfg);
        let limit = (cfg.base_height + cfg.height_multiplier * 2.5).ceil() as i32;
        for gz in 0..cfg.depth {
            for gx in 0..cfg.width {
                let h = generator.get_height(gx, gz);
                assert!(h >= 0);
                assert!(h <= limit, "height {h} above {limit}");
            }
        }
    }

    #[test]
    fn test_terrain_color_bands() {
        assert_eq!(terrain_color(0), Color::srgb(0.6, 0.4, 0.2));
        assert_eq!(terrain_color(3), Color::srgb(0.4, 0.6, 0.2));
        assert_eq!(terrain_color(12), Color::srgb(1.0, 1.0, 1.0));
    }
}
