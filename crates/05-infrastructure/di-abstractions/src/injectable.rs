//! 可装配类型接口

use crate::descriptor::TypeDescriptor;
use crate::visitor::FieldVisitor;
use std::any::Any;
use wiring_common::AssemblyResult;

/// 可装配的结构体
///
/// 通常由 `#[derive(Injectable)]` 生成。实现者必须能在共享（`Arc`）之后
/// 通过 `&self` 填充字段，因此所有可装配字段都是写一次的单元
/// （[`Inject`](crate::Inject)、[`Value`](crate::Value)、[`Channel`](crate::Channel)）
/// 或嵌套的可装配结构体。
pub trait Injectable: Send + Sync + 'static {
    /// 类型描述符
    fn type_descriptor() -> &'static TypeDescriptor
    where
        Self: Sized;

    /// 实例的类型描述符
    fn descriptor(&self) -> &'static TypeDescriptor;

    /// 按声明顺序访问每个字段
    ///
    /// 访问器返回错误时立即停止。
    fn visit_fields(&self, visitor: &mut dyn FieldVisitor) -> AssemblyResult<()>;
}

/// 限定符能力
///
/// 声明了 `#[injectable(qualifier)]` 的类型可以通过 `qual[...]` 指令被选中。
pub trait Qualifier {
    /// 返回限定符
    fn qualify(&self) -> String;
}

/// 对擦除后的实例求限定符
pub fn qualify<T>(value: &(dyn Any + Send + Sync)) -> Option<String>
where
    T: Qualifier + Injectable,
{
    value.downcast_ref::<T>().map(Qualifier::qualify)
}
