//! 世界种子与噪声生成器

use noise::{Fbm, MultiFractal, Perlin};

/// 世界种子 - 存储世界生成的随机种子和高度噪声生成器
/// 使用相同的种子和参数可以生成相同的世界
#[derive(Clone)]
pub struct WorldSeed {
    /// 主种子值
    pub seed: u32,
    /// 地形高度噪声生成器（分形布朗运动叠加的柏林噪声）
    pub height_noise: Fbm<Perlin>,
}

impl WorldSeed {
    /// 从数字种子创建世界种子，使用默认的分形参数
    pub fn new(seed: u32) -> Self {
        Self::with_octaves(seed, 6, 0.5, 2.0)
    }

    /// 从数字种子创建世界种子，并指定分形参数
    /// - octaves: 叠加层数
    /// - persistence: 每层振幅衰减
    /// - lacunarity: 每层频率倍增
    pub fn with_octaves(seed: u32, octaves: usize, persistence: f64, lacunarity: f64) -> Self {
        let height_noise = Fbm::<Perlin>::new(seed)
            .set_octaves(octaves)
            .set_persistence(persistence)
            .set_lacunarity(lacunarity);
        Self { seed, height_noise }
    }

    /// 从字符串计算种子
    /// 通过简单的哈希算法将字符串转换为数字种子
    pub fn hash_str(s: &str) -> u32 {
        s.bytes()
            .fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32))
    }

    /// 解析种子文本：数字直接使用，其它字符串取哈希
    pub fn parse(s: &str) -> u32 {
        s.parse::<u32>().unwrap_or_else(|_| Self::hash_str(s))
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self::new(42)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numeric_and_string() {
        assert_eq!(WorldSeed::parse("1234"), 1234);
        assert_eq!(WorldSeed::parse("abc"), WorldSeed::hash_str("abc"));
        assert_ne!(WorldSeed::hash_str("abc"), WorldSeed::hash_str("abd"));
    }
}
