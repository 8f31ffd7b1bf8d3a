//! 体素占据场
//!
//! 由二维高度图派生的有界三维网格：列 (x,z) 从 y=0 到其高度（不含）为实心。
//! 世界坐标与网格坐标之间有固定偏移：`grid = world + size/2`，
//! 因此世界列 x 覆盖区间 [x, x+1)。

use bevy::prelude::*;
use thiserror::Error;

/// 碰撞系统对地形的全部需求
pub trait VoxelField {
    /// 整数体素坐标处是否有实心方块
    /// 越界的列或负 y 一律视为空（不碰撞）
    fn is_solid(&self, x: i32, y: i32, z: i32) -> bool;

    /// 连续坐标 (x,z) 处的地表高度，只用于出生点估计
    /// 越界时返回配置的基础高度
    fn surface_height(&self, x: f32, z: f32) -> f32;
}

/// 高度图构造错误
#[derive(Debug, Error, PartialEq)]
pub enum FieldError {
    #[error("heightfield dimensions must be positive, got {width}x{depth}")]
    EmptyDimensions { width: i32, depth: i32 },
    #[error("heightfield {width}x{depth} has too many columns")]
    TooLarge { width: i32, depth: i32 },
    #[error("heightfield expects {expected} columns, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// 六个面的方向 - 用于面剔除
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    PosX,
    NegX,
    PosY,
    NegY,
    PosZ,
    NegZ,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosX,
        Face::NegX,
        Face::PosY,
        Face::NegY,
        Face::PosZ,
        Face::NegZ,
    ];

    /// 面的朝向（整数向量）
    pub fn dir(self) -> IVec3 {
        match self {
            Face::PosX => IVec3::X,
            Face::NegX => IVec3::NEG_X,
            Face::PosY => IVec3::Y,
            Face::NegY => IVec3::NEG_Y,
            Face::PosZ => IVec3::Z,
            Face::NegZ => IVec3::NEG_Z,
        }
    }

    /// 面的法线
    pub fn normal(self) -> [f32; 3] {
        self.dir().as_vec3().to_array()
    }
}

/// 高度图 - 每列一个整数高度，生成后在会话内不可变
#[derive(Debug, Clone)]
pub struct HeightField {
    width: i32,
    depth: i32,
    base_height: f32,
    /// 按 Z-X 顺序线性存储：index = gz * width + gx
    heights: Vec<i32>,
}

impl HeightField {
    /// 创建一块全部高度为 0 的平地
    pub fn flat(width: i32, depth: i32, base_height: f32) -> Result<Self, FieldError> {
        if width <= 0 || depth <= 0 {
            return Err(FieldError::EmptyDimensions { width, depth });
        }
        let Some(len) = width.checked_mul(depth) else {
            return Err(FieldError::TooLarge { width, depth });
        };
        Ok(Self {
            width,
            depth,
            base_height,
            heights: vec![0; len as usize],
        })
    }

    /// 从现成的高度数组创建，负高度按 0 处理
    pub fn from_heights(
        width: i32,
        depth: i32,
        base_height: f32,
        heights: Vec<i32>,
    ) -> Result<Self, FieldError> {
        let mut field = Self::flat(width, depth, base_height)?;
        if heights.len() != field.heights.len() {
            return Err(FieldError::SizeMismatch {
                expected: field.heights.len(),
                actual: heights.len(),
            });
        }
        field.heights = heights.into_iter().map(|h| h.max(0)).collect();
        Ok(field)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn base_height(&self) -> f32 {
        self.base_height
    }

    /// 最高列的高度
    pub fn max_height(&self) -> i32 {
        self.heights.iter().copied().max().unwrap_or(0)
    }

    /// 网格坐标是否在范围内
    #[inline]
    pub fn in_bounds(&self, gx: i32, gz: i32) -> bool {
        gx >= 0 && gx < self.width && gz >= 0 && gz < self.depth
    }

    /// 世界列坐标转换为网格坐标，结果超出 i32 范围时返回 None
    #[inline]
    pub fn world_to_grid(&self, x: i32, z: i32) -> Option<IVec2> {
        Some(IVec2::new(
            x.checked_add(self.width / 2)?,
            z.checked_add(self.depth / 2)?,
        ))
    }

    /// 按世界列坐标读取列高度，越界返回 None
    pub fn world_column(&self, x: i32, z: i32) -> Option<i32> {
        let grid = self.world_to_grid(x, z)?;
        self.column(grid.x, grid.y)
    }

    /// 网格坐标转换为世界列坐标
    #[inline]
    pub fn grid_to_world(&self, gx: i32, gz: i32) -> IVec2 {
        IVec2::new(gx - self.width / 2, gz - self.depth / 2)
    }

    /// 按网格坐标读取列高度，越界返回 None
    pub fn column(&self, gx: i32, gz: i32) -> Option<i32> {
        if !self.in_bounds(gx, gz) {
            return None;
        }
        Some(self.heights[(gz * self.width + gx) as usize])
    }

    /// 按网格坐标设置列高度，越界时不执行操作
    pub fn set_column(&mut self, gx: i32, gz: i32, height: i32) {
        if !self.in_bounds(gx, gz) {
            return;
        }
        self.heights[(gz * self.width + gx) as usize] = height.max(0);
    }

    /// 按世界列坐标设置高度
    pub fn set_world_column(&mut self, x: i32, z: i32, height: i32) {
        if let Some(grid) = self.world_to_grid(x, z) {
            self.set_column(grid.x, grid.y, height);
        }
    }

    /// 判断网格坐标处方块的某个面是否需要渲染
    ///
    /// - 该位置没有方块时不渲染
    /// - 相邻列越界时渲染（世界边缘）
    /// - 最底层的下表面、每列最顶层的上表面总是渲染
    /// - 相邻位置为空时渲染
    pub fn face_visible(&self, gx: i32, y: i32, gz: i32, face: Face) -> bool {
        let Some(height) = self.column(gx, gz) else {
            return false;
        };
        if y < 0 || y >= height {
            return false;
        }

        match face {
            Face::NegY => return y == 0,
            Face::PosY => return y == height - 1,
            _ => {}
        }

        let dir = face.dir();
        match self.column(gx + dir.x, gz + dir.z) {
            Some(neighbor) => y >= neighbor,
            None => true,
        }
    }
}

impl VoxelField for HeightField {
    fn is_solid(&self, x: i32, y: i32, z: i32) -> bool {
        if y < 0 {
            return false;
        }
        self.world_column(x, z).is_some_and(|height| y < height)
    }

    fn surface_height(&self, x: f32, z: f32) -> f32 {
        self.world_column(x.floor() as i32, z.floor() as i32)
            .map(|height| height as f32)
            .unwrap_or(self.base_height)
    }
}

/// 体素地形资源 - 整个会话共享同一份只读高度图
#[derive(Resource, Clone)]
pub struct VoxelTerrain {
    pub field: std::sync::Arc<HeightField>,
}

impl VoxelTerrain {
    pub fn new(field: HeightField) -> Self {
        Self {
            field: std::sync::Arc::new(field),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pillar_field() -> HeightField {
        let mut field = HeightField::flat(8, 8, 2.0).unwrap();
        field.set_world_column(0, 0, 3);
        field
    }

    #[test]
    fn test_solid_inside_column() {
        let field = pillar_field();
        assert!(field.is_solid(0, 0, 0));
        assert!(field.is_solid(0, 2, 0));
        assert!(!field.is_solid(0, 3, 0));
        assert!(!field.is_solid(1, 0, 0));
        assert!(!field.is_solid(0, -1, 0));
    }

    #[test]
    fn test_out_of_bounds_is_empty() {
        let mut field = HeightField::flat(4, 4, 2.0).unwrap();
        for gz in 0..4 {
            for gx in 0..4 {
                field.set_column(gx, gz, 5);
            }
        }
        // 网格范围为世界坐标 [-2, 2)
        assert!(field.is_solid(-2, 0, -2));
        assert!(field.is_solid(1, 4, 1));
        assert!(!field.is_solid(2, 0, 0));
        assert!(!field.is_solid(-3, 0, 0));
        assert!(!field.is_solid(0, 0, 100));
    }

    #[test]
    fn test_surface_height_and_default() {
        let field = pillar_field();
        assert_eq!(field.surface_height(0.5, 0.5), 3.0);
        assert_eq!(field.surface_height(-0.5, 0.5), 0.0);
        assert_eq!(field.surface_height(100.0, 0.0), 2.0);
        assert_eq!(field.surface_height(0.0, -4.5), 2.0);
    }

    #[test]
    fn test_extreme_coordinates_are_out_of_bounds() {
        let mut field = pillar_field();
        for (x, z) in [(i32::MAX, 0), (i32::MIN, 0), (0, i32::MAX), (i32::MIN, i32::MIN)] {
            assert!(!field.is_solid(x, 0, z));
            assert_eq!(field.world_column(x, z), None);
        }
        assert_eq!(field.world_to_grid(i32::MAX, 0), None);
        assert_eq!(field.surface_height(1e20, 0.0), 2.0);
        assert_eq!(field.surface_height(-1e20, 1e20), 2.0);

        // 越界写入被忽略
        field.set_world_column(i32::MAX, i32::MAX, 9);
        assert_eq!(field.max_height(), 3);
    }

    #[test]
    fn test_constructor_errors() {
        assert_eq!(
            HeightField::flat(i32::MAX, 2, 0.0).unwrap_err(),
            FieldError::TooLarge {
                width: i32::MAX,
                depth: 2
            }
        );
        assert_eq!(
            HeightField::flat(0, 4, 0.0).unwrap_err(),
            FieldError::EmptyDimensions { width: 0, depth: 4 }
        );
        assert_eq!(
            HeightField::from_heights(2, 2, 0.0, vec![1, 2, 3]).unwrap_err(),
            FieldError::SizeMismatch {
                expected: 4,
                actual: 3
            }
        );
        let field = HeightField::from_heights(2, 1, 0.0, vec![-4, 2]).unwrap();
        assert_eq!(field.column(0, 0), Some(0));
        assert_eq!(field.max_height(), 2);
    }

    #[test]
    fn test_face_culling() {
        let mut field = HeightField::flat(3, 3, 0.0).unwrap();
        for gz in 0..3 {
            for gx in 0..3 {
                field.set_column(gx, gz, 2);
            }
        }
        field.set_column(1, 1, 4);

        // 中心列高出邻居的部分侧面可见
        assert!(!field.face_visible(1, 0, 1, Face::PosX));
        assert!(!field.face_visible(1, 1, 1, Face::PosX));
        assert!(field.face_visible(1, 2, 1, Face::PosX));
        // 顶面只在列顶可见
        assert!(field.face_visible(1, 3, 1, Face::PosY));
        assert!(!field.face_visible(1, 2, 1, Face::PosY));
        // 底面只在 y=0 可见
        assert!(field.face_visible(1, 0, 1, Face::NegY));
        assert!(!field.face_visible(1, 1, 1, Face::NegY));
        // 世界边缘总是可见
        assert!(field.face_visible(0, 0, 0, Face::NegX));
        // 空位置不渲染
        assert!(!field.face_visible(0, 2, 0, Face::PosY));
    }
}
