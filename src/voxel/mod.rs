//! 体素世界模块
//!
//! 这个模块包含了地形的数据与渲染，包括：
//!
//! - **constants**: 常量定义（世界尺寸、区域大小、地形参数默认值）
//! - **field**: 体素占据场（高度图、碰撞查询接口、面剔除）
//! - **seed**: 世界种子与噪声生成器
//! - **terrain**: 地形生成器（分形噪声高度图、按高度着色）
//! - **mesh**: 网格构建（顶点去重、面片角点）
//! - **mesh_gen**: 区域网格生成
//! - **loading**: 异步构建类型（区域坐标、任务组件、进度）
//! - **systems**: ECS系统函数（派发任务、收集结果）
//! - **materials**: 地形材质
//! - **plugin**: Bevy插件

pub mod constants;
pub mod field;
pub mod loading;
pub mod materials;
pub mod mesh;
pub mod mesh_gen;
pub mod plugin;
pub mod seed;
pub mod systems;
pub mod terrain;

// 重新导出常用类型，方便外部使用
pub use field::{HeightField, VoxelField, VoxelTerrain};
pub use loading::MeshingProgress;
pub use plugin::VoxelPlugin;
pub use seed::WorldSeed;
pub use terrain::TerrainGenerator;
