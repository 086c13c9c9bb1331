//! 字段访问器
//!
//! 派生宏为每个字段生成一个 [`FieldSlot`]，装配引擎按形态分派处理。

use crate::cells::Value;
use crate::descriptor::{FieldKind, FixedKind};
use crate::injectable::Injectable;
use crate::registry::{Candidate, Literal};
use std::any::{Any, TypeId};
use std::sync::Arc;
use wiring_common::AssemblyResult;

/// 字段访问器
pub trait FieldVisitor {
    /// 访问第 `index` 个字段
    fn visit(&mut self, index: usize, slot: FieldSlot<'_>) -> AssemblyResult<()>;
}

/// 可写入的字段单元
pub trait Slot: Send + Sync {
    /// 是否已有值
    fn is_set(&self) -> bool;

    /// 写入已注册的字面值，类型不匹配或已有值时返回 `false`
    fn assign_literal(&self, literal: &Literal) -> bool;
}

/// 接口字段
pub trait InterfaceSlot: Slot {
    /// `TypeId::of::<dyn Trait>()`
    fn interface(&self) -> TypeId;

    /// 写入 [`InterfaceCast`](crate::InterfaceCast) 产生的 `Box<Arc<dyn Trait>>`
    fn assign_cast(&self, cast: Box<dyn Any + Send + Sync>) -> bool;
}

/// 指针字段和结构体值字段
pub trait CandidateSlot: Slot {
    /// 精确匹配的目标类型
    fn target(&self) -> TypeId;

    /// 写入同类型的候选
    fn assign_candidate(&self, candidate: &Candidate) -> bool;

    /// 没有候选时分配新实例（指针链逐级分配），返回末端结构体
    fn allocate(&self) -> Option<&dyn Injectable>;

    /// 写入一个正在装配中的同类型实例，按值持有的单元不接受
    fn adopt(&self, _instance: &Arc<dyn Any + Send + Sync>) -> bool {
        false
    }

    /// 单元中可被其他字段共享的实例
    fn shared(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        None
    }
}

/// 映射字段
pub trait MapSlot: Slot {
    /// 写入空实例
    fn initialize(&self) -> bool;
}

/// 通道字段
pub trait ChannelSlot: Slot {
    /// 创建指定容量的通道
    fn open(&self, capacity: usize) -> bool;
}

/// 切片字段
pub trait SliceSlot: Slot {
    /// 创建指定长度和容量的切片，元素为默认值
    fn allocate(&self, len: usize, capacity: usize) -> bool;
}

/// 按形态分类的字段
#[derive(Clone, Copy)]
pub enum FieldSlot<'a> {
    Interface(&'a dyn InterfaceSlot),
    Pointer(&'a dyn CandidateSlot),
    Struct(&'a dyn CandidateSlot),
    Nested(&'a dyn Injectable),
    Text(&'a Value<String>),
    Map(&'a dyn MapSlot),
    Channel(&'a dyn ChannelSlot),
    Slice(&'a dyn SliceSlot),
    Scalar(&'a dyn Slot),
    Fixed(FixedKind),
    Unsupported,
}

impl FieldSlot<'_> {
    /// 字段形态
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Interface(_) => FieldKind::Interface,
            Self::Pointer(_) => FieldKind::Pointer,
            Self::Struct(_) => FieldKind::Struct,
            Self::Nested(_) => FieldKind::Nested,
            Self::Text(_) => FieldKind::Text,
            Self::Map(_) => FieldKind::Map,
            Self::Channel(_) => FieldKind::Channel,
            Self::Slice(_) => FieldKind::Slice,
            Self::Scalar(_) => FieldKind::Scalar,
            Self::Fixed(kind) => FieldKind::Fixed(*kind),
            Self::Unsupported => FieldKind::Unsupported,
        }
    }

    /// 单元是否已有值，内嵌结构体和不可写入的字段返回 `None`
    pub fn is_set(&self) -> Option<bool> {
        match self {
            Self::Interface(slot) => Some(slot.is_set()),
            Self::Pointer(slot) | Self::Struct(slot) => Some(slot.is_set()),
            Self::Text(slot) => Some(slot.is_set()),
            Self::Map(slot) => Some(slot.is_set()),
            Self::Channel(slot) => Some(slot.is_set()),
            Self::Slice(slot) => Some(slot.is_set()),
            Self::Scalar(slot) => Some(slot.is_set()),
            Self::Nested(_) | Self::Fixed(_) | Self::Unsupported => None,
        }
    }

    /// 写入字面值，字段不可写入时返回 `None`
    pub fn assign_literal(&self, literal: &Literal) -> Option<bool> {
        match self {
            Self::Interface(slot) => Some(slot.assign_literal(literal)),
            Self::Pointer(slot) | Self::Struct(slot) => Some(slot.assign_literal(literal)),
            Self::Text(slot) => Some(Slot::assign_literal(*slot, literal)),
            Self::Map(slot) => Some(slot.assign_literal(literal)),
            Self::Channel(slot) => Some(slot.assign_literal(literal)),
            Self::Slice(slot) => Some(slot.assign_literal(literal)),
            Self::Scalar(slot) => Some(slot.assign_literal(literal)),
            Self::Nested(_) | Self::Fixed(_) | Self::Unsupported => None,
        }
    }
}
