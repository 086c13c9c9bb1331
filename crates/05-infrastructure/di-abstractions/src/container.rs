//! 装配器抽象接口

use crate::injectable::Injectable;
use crate::registry::{Literal, RegisterOutcome};
use std::any::Any;
use std::sync::Arc;
use wiring_common::AssemblyResult;

/// 装配器 trait
///
/// 先注册候选和字面值，再调用 `initialize` 装配目标结构体。
/// 注册需要 `&mut self`，装配只需要 `&self`。
pub trait Assembler: Send + Sync {
    /// 注册可装配类型，使其可以通过擦除接口注册或装配
    fn register_type<T: Injectable>(&mut self)
    where
        Self: Sized;

    /// 注册共享候选
    fn register_shared<T: Injectable>(&mut self, value: Arc<T>) -> AssemblyResult<()>
    where
        Self: Sized;

    /// 注册候选
    fn register<T: Injectable>(&mut self, value: T) -> AssemblyResult<()>
    where
        Self: Sized,
    {
        self.register_shared(Arc::new(value))
    }

    /// 注册擦除后的候选，`None` 或未注册类型的值返回无法注册错误
    fn register_any(&mut self, value: Option<Arc<dyn Any + Send + Sync>>) -> AssemblyResult<()>;

    /// 依次注册多个擦除后的候选，遇到第一个无效值即停止
    fn register_all<I>(&mut self, values: I) -> AssemblyResult<()>
    where
        Self: Sized,
        I: IntoIterator<Item = Option<Arc<dyn Any + Send + Sync>>>,
    {
        values
            .into_iter()
            .try_for_each(|value| self.register_any(value))
    }

    /// 注册字面值
    fn register_value(&mut self, key: &str, literal: Literal) -> AssemblyResult<RegisterOutcome>;

    /// 批量注册字面值，任一无效时整体失败且不写入
    fn register_values<I, K>(&mut self, values: I) -> AssemblyResult<RegisterOutcome>
    where
        Self: Sized,
        I: IntoIterator<Item = (K, Literal)>,
        K: Into<String>;

    /// 装配目标结构体
    fn initialize<H: Injectable>(&self, holder: &H) -> AssemblyResult<()>
    where
        Self: Sized,
    {
        self.initialize_dyn(holder)
    }

    /// 装配可装配对象
    fn initialize_dyn(&self, holder: &dyn Injectable) -> AssemblyResult<()>;

    /// 装配擦除后的目标，`None` 或未注册类型返回无法作为装配目标错误
    fn initialize_any(&self, holder: Option<&(dyn Any + Send + Sync)>) -> AssemblyResult<()>;
}
