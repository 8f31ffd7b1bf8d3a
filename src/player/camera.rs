use bevy::prelude::*;

/// 角色控制器对摄像机的全部需求：读取朝向、写入眼睛位置
pub trait CameraRig {
    /// 前方单位向量
    fn forward_dir(&self) -> Vec3;
    /// 右方单位向量
    fn right_dir(&self) -> Vec3;
    fn set_eye_position(&mut self, position: Vec3);
}

impl CameraRig for Transform {
    fn forward_dir(&self) -> Vec3 {
        self.forward().as_vec3()
    }

    fn right_dir(&self) -> Vec3 {
        self.right().as_vec3()
    }

    fn set_eye_position(&mut self, position: Vec3) {
        self.translation = position;
    }
}

/// 把摄像机方向压平到水平面
pub fn flatten(dir: Vec3) -> Vec3 {
    Vec3::new(dir.x, 0.0, dir.z).normalize_or_zero()
}
