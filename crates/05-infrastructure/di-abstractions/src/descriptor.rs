//! 类型描述符
//!
//! 描述符由派生宏为每个可装配结构体生成一次，记录类型身份、
//! 字段形态、声明的接口转换以及可选的限定符能力。

use crate::injectable::Injectable;
use crate::registry::Candidate;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use wiring_common::TypeInfo;

/// 把擦除后的引用还原为可装配对象
pub type EraseFn = fn(&(dyn Any + Send + Sync)) -> Option<&dyn Injectable>;

/// 把擦除后的共享实例还原为候选
pub type ShareFn = fn(Arc<dyn Any + Send + Sync>) -> Option<Candidate>;

/// 对擦除后的实例求限定符
pub type QualifyFn = fn(&(dyn Any + Send + Sync)) -> Option<String>;

/// 把候选实例转换为装箱的 `Arc<dyn Trait>`
pub type CastFn = fn(Arc<dyn Any + Send + Sync>) -> Option<Box<dyn Any + Send + Sync>>;

/// 字段形态
///
/// 由派生宏根据字段类型静态确定。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// `Inject<dyn Trait>`
    Interface,
    /// `Inject<T>`，可多级嵌套
    Pointer,
    /// `Value<T>`，T 为可装配结构体
    Struct,
    /// 直接内嵌的可装配结构体
    Nested,
    /// `Value<String>`
    Text,
    /// `Value<HashMap<..>>` 等映射或集合
    Map,
    /// `Channel<T>`
    Channel,
    /// `Value<Vec<T>>`
    Slice,
    /// `Value<i32>` 等标量
    Scalar,
    /// 已初始化的普通 `String`、`Vec`、映射
    Fixed(FixedKind),
    /// 不可装配的类型
    Unsupported,
}

/// 已初始化字段的具体类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FixedKind {
    Text,
    Slice,
    Map,
}

impl FieldKind {
    /// 是否可以经过解析器匹配候选
    pub const fn is_resolvable(self) -> bool {
        matches!(self, Self::Interface | Self::Pointer | Self::Struct)
    }
}

/// 字段描述
#[derive(Clone, Copy)]
pub struct FieldDescriptor {
    /// 字段名，元组结构体为序号
    pub name: &'static str,
    /// 字段类型的源码文本
    pub type_name: &'static str,
    /// 字段注解
    pub annotation: Option<&'static str>,
    /// 字段形态
    pub kind: FieldKind,
    /// 接口字段对应的 `TypeId::of::<dyn Trait>()`
    pub interface: Option<TypeId>,
    /// 指针、结构体值和内嵌字段最终指向的结构体
    pub target: Option<fn() -> &'static TypeDescriptor>,
}

impl FieldDescriptor {
    /// 创建字段描述
    pub const fn new(name: &'static str, type_name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            type_name,
            annotation: None,
            kind,
            interface: None,
            target: None,
        }
    }

    /// 设置注解
    #[must_use]
    pub const fn annotated(mut self, annotation: &'static str) -> Self {
        self.annotation = Some(annotation);
        self
    }

    /// 设置接口
    #[must_use]
    pub fn interface<I: ?Sized + 'static>(mut self) -> Self {
        self.interface = Some(TypeId::of::<I>());
        self
    }

    /// 设置目标结构体
    #[must_use]
    pub const fn target(mut self, target: fn() -> &'static TypeDescriptor) -> Self {
        self.target = Some(target);
        self
    }

    /// 目标结构体的描述符
    pub fn target_descriptor(&self) -> Option<&'static TypeDescriptor> {
        self.target.map(|target| target())
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("annotation", &self.annotation)
            .field("kind", &self.kind)
            .field("interface", &self.interface)
            .finish_non_exhaustive()
    }
}

/// 声明的接口转换
#[derive(Clone, Copy)]
pub struct InterfaceCast {
    /// `TypeId::of::<dyn Trait>()`
    pub interface: TypeId,
    /// 接口名
    pub interface_name: &'static str,
    cast: CastFn,
}

impl InterfaceCast {
    /// 为接口 `I` 创建转换
    pub fn new<I: ?Sized + 'static>(interface_name: &'static str, cast: CastFn) -> Self {
        Self {
            interface: TypeId::of::<I>(),
            interface_name,
            cast,
        }
    }

    /// 把实例转换为装箱的 `Arc<I>`
    pub fn cast(&self, instance: Arc<dyn Any + Send + Sync>) -> Option<Box<dyn Any + Send + Sync>> {
        (self.cast)(instance)
    }
}

impl fmt::Debug for InterfaceCast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterfaceCast")
            .field("interface_name", &self.interface_name)
            .finish_non_exhaustive()
    }
}

/// 类型描述符
pub struct TypeDescriptor {
    info: TypeInfo,
    fields: Vec<FieldDescriptor>,
    interfaces: Vec<InterfaceCast>,
    qualifier: Option<QualifyFn>,
    erase: EraseFn,
    share: ShareFn,
}

impl TypeDescriptor {
    /// 为类型 `T` 创建描述符
    pub fn new<T: Injectable>(qualified_name: &'static str) -> Self {
        Self {
            info: TypeInfo::of::<T>(qualified_name),
            fields: Vec::new(),
            interfaces: Vec::new(),
            qualifier: None,
            erase: erase::<T>,
            share: share::<T>,
        }
    }

    /// 添加字段
    #[must_use]
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// 声明实现的接口
    #[must_use]
    pub fn implements(mut self, cast: InterfaceCast) -> Self {
        self.interfaces.push(cast);
        self
    }

    /// 声明限定符能力
    #[must_use]
    pub fn qualified_by(mut self, qualifier: QualifyFn) -> Self {
        self.qualifier = Some(qualifier);
        self
    }

    pub fn info(&self) -> &TypeInfo {
        &self.info
    }

    pub fn type_id(&self) -> TypeId {
        self.info.id
    }

    /// `impl[...]` 指令使用的限定名
    pub fn qualified_name(&self) -> &'static str {
        self.info.qualified_name
    }

    pub fn short_name(&self) -> &'static str {
        self.info.short_name()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn interfaces(&self) -> &[InterfaceCast] {
        &self.interfaces
    }

    /// 查找指定接口的转换
    pub fn cast_for(&self, interface: TypeId) -> Option<&InterfaceCast> {
        self.interfaces.iter().find(|cast| cast.interface == interface)
    }

    pub fn has_qualifier(&self) -> bool {
        self.qualifier.is_some()
    }

    /// 求实例的限定符，没有限定符能力时返回 `None`
    pub fn qualify(&self, instance: &(dyn Any + Send + Sync)) -> Option<String> {
        self.qualifier.and_then(|qualify| qualify(instance))
    }

    /// 把擦除后的引用还原为可装配对象
    pub fn erase<'a>(&self, value: &'a (dyn Any + Send + Sync)) -> Option<&'a dyn Injectable> {
        (self.erase)(value)
    }

    /// 把擦除后的共享实例还原为候选
    pub fn share(&self, instance: Arc<dyn Any + Send + Sync>) -> Option<Candidate> {
        (self.share)(instance)
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("info", &self.info)
            .field("fields", &self.fields)
            .field("interfaces", &self.interfaces)
            .field("qualifier", &self.qualifier.is_some())
            .finish_non_exhaustive()
    }
}

/// 擦除引用的还原函数
pub fn erase<T: Injectable>(value: &(dyn Any + Send + Sync)) -> Option<&dyn Injectable> {
    value.downcast_ref::<T>().map(|value| value as &dyn Injectable)
}

/// 共享实例的还原函数
pub fn share<T: Injectable>(instance: Arc<dyn Any + Send + Sync>) -> Option<Candidate> {
    instance.downcast::<T>().ok().map(Candidate::new)
}
