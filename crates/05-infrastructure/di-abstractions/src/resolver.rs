//! 装配上下文
//!
//! 记录当前遍历路径，出错时把路径附加到错误上。

use wiring_common::AssemblyError;

/// 装配上下文
#[derive(Debug, Clone, Default)]
pub struct ResolveContext {
    /// 当前遍历链，形如 `Holder`、`repo: Inject<dyn Repo>`
    chain: Vec<String>,
    /// 是否对选中的候选先行递归装配
    recursive: bool,
}

impl ResolveContext {
    /// 创建新的装配上下文
    pub const fn new(recursive: bool) -> Self {
        Self {
            chain: Vec::new(),
            recursive,
        }
    }

    pub const fn is_recursive(&self) -> bool {
        self.recursive
    }

    /// 进入一层
    pub fn enter(&mut self, segment: impl Into<String>) {
        self.chain.push(segment.into());
    }

    /// 离开一层
    pub fn leave(&mut self) {
        self.chain.pop();
    }

    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    /// 以 ` -> ` 连接的遍历路径
    pub fn path(&self) -> String {
        self.chain.join(" -> ")
    }

    /// 把当前路径附加到错误上
    pub fn trace(&self, error: AssemblyError) -> AssemblyError {
        error.traced(self.path())
    }
}
