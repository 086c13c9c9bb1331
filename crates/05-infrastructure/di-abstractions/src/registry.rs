//! 候选与字面值注册表抽象接口

use crate::descriptor::TypeDescriptor;
use crate::injectable::Injectable;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use wiring_common::{AssemblyError, AssemblyResult};

/// 已注册的候选
///
/// 同一个实例同时以擦除形式（用于精确匹配和接口转换）和
/// 可装配形式（用于递归装配）保存。
#[derive(Clone)]
pub struct Candidate {
    pub descriptor: &'static TypeDescriptor,
    pub instance: Arc<dyn Any + Send + Sync>,
    pub assembly: Arc<dyn Injectable>,
}

impl Candidate {
    /// 从共享实例创建候选
    pub fn new<T: Injectable>(value: Arc<T>) -> Self {
        Self {
            descriptor: T::type_descriptor(),
            assembly: Arc::clone(&value) as Arc<dyn Injectable>,
            instance: value,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.descriptor.type_id()
    }

    pub fn qualified_name(&self) -> &'static str {
        self.descriptor.qualified_name()
    }

    /// 候选的限定符
    pub fn qualify(&self) -> Option<String> {
        self.descriptor.qualify(self.instance.as_ref())
    }

    /// 转换为接口，返回装箱的 `Arc<dyn Trait>`
    pub fn cast(&self, interface: TypeId) -> Option<Box<dyn Any + Send + Sync>> {
        self.descriptor
            .cast_for(interface)
            .and_then(|cast| cast.cast(Arc::clone(&self.instance)))
    }
}

impl fmt::Debug for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Candidate")
            .field("type", &self.qualified_name())
            .finish_non_exhaustive()
    }
}

/// 已注册的字面值
#[derive(Clone)]
pub struct Literal {
    value: Option<Arc<dyn Any + Send + Sync>>,
    type_name: &'static str,
}

impl Literal {
    /// 创建字面值
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Some(Arc::new(value)),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// 空字面值，注册时会被拒绝
    pub const fn null() -> Self {
        Self {
            value: None,
            type_name: "null",
        }
    }

    /// `None` 映射为空字面值
    pub fn from_option<T: Any + Send + Sync>(value: Option<T>) -> Self {
        value.map_or_else(Self::null, Self::new)
    }

    pub const fn is_null(&self) -> bool {
        self.value.is_none()
    }

    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.as_deref().and_then(|value| value.downcast_ref::<T>())
    }
}

impl fmt::Debug for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Literal")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// 注册结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// 新增
    Inserted,
    /// 覆盖了同名键
    Overridden { keys: Vec<String> },
}

impl RegisterOutcome {
    pub const fn is_overridden(&self) -> bool {
        matches!(self, Self::Overridden { .. })
    }

    /// 覆盖时转换为 [`AssemblyError::RegisteredValueOverridden`]
    pub fn as_warning(&self) -> Option<AssemblyError> {
        match self {
            Self::Inserted => None,
            Self::Overridden { keys } => Some(AssemblyError::overridden(keys.join(", "))),
        }
    }

    /// 覆盖视为错误
    pub fn into_result(self) -> AssemblyResult<()> {
        self.as_warning().map_or(Ok(()), Err)
    }

    /// 合并多次注册的结果
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Inserted, other) => other,
            (this, Self::Inserted) => this,
            (Self::Overridden { mut keys }, Self::Overridden { keys: more }) => {
                keys.extend(more);
                Self::Overridden { keys }
            }
        }
    }
}

/// 候选注册表 trait
///
/// 候选按类型唯一，保留首次注册的顺序；字面值按键唯一。
pub trait CandidateRegistry: Send + Sync {
    /// 插入候选，同类型已存在时原位替换并返回 `true`
    fn insert_candidate(&mut self, candidate: Candidate) -> bool;

    /// 插入字面值，空字面值返回无法注册错误
    fn insert_literal(&mut self, key: String, literal: Literal) -> AssemblyResult<RegisterOutcome>;

    /// 按类型查找候选
    fn candidate(&self, type_id: TypeId) -> Option<&Candidate>;

    /// 按注册顺序列出全部候选
    fn candidates(&self) -> &[Candidate];

    /// 按键查找字面值
    fn literal(&self, key: &str) -> Option<&Literal>;

    /// 候选数量
    fn len(&self) -> usize {
        self.candidates().len()
    }

    fn is_empty(&self) -> bool {
        self.candidates().is_empty()
    }
}
