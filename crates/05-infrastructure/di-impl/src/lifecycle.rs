//! 预装配生命周期
//!
//! 首次装配前，所有已注册的候选先被装配一次。并发的首次调用者
//! 会阻塞到预装配结束；失败会被记住，之后的调用返回同一个错误。

use parking_lot::Mutex;
use tracing::{debug, error};
use wiring_common::{AssemblyError, AssemblyResult};

/// 预装配状态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// 尚未预装配，或有新的候选等待预装配
    #[default]
    Unassembled,
    /// 预装配进行中
    Assembling,
    /// 预装配完成
    Assembled,
    /// 预装配失败
    Failed(AssemblyError),
}

/// 预装配生命周期
#[derive(Debug, Default)]
pub struct AssemblyLifecycle {
    state: Mutex<LifecycleState>,
}

impl AssemblyLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前状态
    pub fn state(&self) -> LifecycleState {
        self.state.lock().clone()
    }

    /// 需要时执行预装配
    ///
    /// 执行期间持有锁。状态停留在 `Assembling` 说明上一次执行中途 panic，
    /// 此时重新执行。
    pub fn run_once<F>(&self, assemble: F) -> AssemblyResult<()>
    where
        F: FnOnce() -> AssemblyResult<()>,
    {
        let mut state = self.state.lock();
        match &*state {
            LifecycleState::Assembled => return Ok(()),
            LifecycleState::Failed(error) => return Err(error.clone()),
            LifecycleState::Unassembled | LifecycleState::Assembling => {}
        }

        *state = LifecycleState::Assembling;
        let result = assemble();
        *state = match &result {
            Ok(()) => {
                debug!("预装配完成");
                LifecycleState::Assembled
            }
            Err(cause) => {
                error!("预装配失败: {}", cause);
                LifecycleState::Failed(cause.clone())
            }
        };
        result
    }

    /// 有新的候选注册，已完成的预装配需要再执行一次
    pub fn invalidate(&mut self) {
        let state = self.state.get_mut();
        if *state == LifecycleState::Assembled {
            *state = LifecycleState::Unassembled;
        }
    }
}
