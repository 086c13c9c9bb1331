//! 未注册实例的分配
//!
//! 指针字段或结构体值字段没有匹配的候选时，装配器会自行分配实例。
//! 指针链 `Inject<Inject<T>>` 逐级分配，最后对末端结构体执行完整装配。

use crate::cells::Inject;
use crate::injectable::Injectable;
use std::sync::Arc;

/// 可被自动分配的指针目标
///
/// 派生宏为每个可装配结构体实现此 trait（使用 `Default` 创建实例），
/// [`Inject`] 本身也实现此 trait 以支持多级指针。
pub trait Pointee: Sized + Send + Sync + 'static {
    /// 分配新实例
    fn allocate() -> Self;

    /// 链末端的结构体
    fn terminal(&self) -> Option<&dyn Injectable>;
}

impl<P: Pointee> Pointee for Inject<P> {
    fn allocate() -> Self {
        Self::filled(Arc::new(P::allocate()))
    }

    fn terminal(&self) -> Option<&dyn Injectable> {
        self.get().and_then(|pointer| P::terminal(pointer))
    }
}
