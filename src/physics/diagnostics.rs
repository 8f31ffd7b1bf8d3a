//! 物理诊断通道
//!
//! 可恢复但需要上报的情况（紧急上推、上推失败、找不到安全出生点）
//! 都作为 `PhysicsFault` 交给 `PhysicsDiagnostics`。诊断器带有日志配额：
//! 配额内的故障写 `warn!` 日志，超出配额的只计数，避免每帧刷屏。
//! 最近的故障保留在有界历史中，供 HUD 和测试读取。

use bevy::prelude::*;
use std::collections::VecDeque;
use thiserror::Error;

/// 故障历史的最大保留条数
pub const FAULT_HISTORY: usize = 64;

/// 默认日志配额
pub const DEFAULT_LOG_BUDGET: usize = 32;

/// 物理子系统上报的故障
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PhysicsFault {
    /// 角色嵌入方块，经若干次上推后脱离
    #[error("character was inside a block, pushed up {pushes} time(s) to {position}")]
    EmergencyPush { pushes: u32, position: Vec3 },
    /// 上推次数用尽仍然嵌入
    #[error("could not push character out of blocks after {attempts} tries, left at {position}")]
    CorrectionExhausted { attempts: u32, position: Vec3 },
    /// 出生点及其上方的候选位置都被占据
    #[error("could not find a safe spawn position above {requested}, using it anyway")]
    UnsafeSpawn { requested: Vec3 },
}

/// 诊断接收器 - 以引用方式传入每个可能上报的物理操作
#[derive(Resource, Debug)]
pub struct PhysicsDiagnostics {
    budget: usize,
    logged: usize,
    suppressed: usize,
    total: usize,
    history: VecDeque<PhysicsFault>,
}

impl Default for PhysicsDiagnostics {
    fn default() -> Self {
        Self::with_budget(DEFAULT_LOG_BUDGET)
    }
}

impl PhysicsDiagnostics {
    /// 创建指定日志配额的诊断器
    pub fn with_budget(budget: usize) -> Self {
        Self {
            budget,
            logged: 0,
            suppressed: 0,
            total: 0,
            history: VecDeque::with_capacity(FAULT_HISTORY),
        }
    }

    /// 上报一个故障
    pub fn report(&mut self, fault: PhysicsFault) {
        self.total += 1;
        if self.logged < self.budget {
            warn!("{fault}");
            self.logged += 1;
            if self.logged == self.budget {
                warn!("Physics diagnostic log budget of {} reached, further faults are only counted", self.budget);
            }
        } else {
            self.suppressed += 1;
        }

        if self.history.len() == FAULT_HISTORY {
            self.history.pop_front();
        }
        self.history.push_back(fault);
    }

    /// 最近的故障（从旧到新）
    pub fn faults(&self) -> impl Iterator<Item = &PhysicsFault> {
        self.history.iter()
    }

    /// 最近一次故障
    pub fn last(&self) -> Option<&PhysicsFault> {
        self.history.back()
    }

    /// 取出并清空故障历史（计数不清零）
    pub fn drain(&mut self) -> Vec<PhysicsFault> {
        self.history.drain(..).collect()
    }

    pub fn logged(&self) -> usize {
        self.logged
    }

    pub fn suppressed(&self) -> usize {
        self.suppressed
    }

    /// 会话内上报的故障总数
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
