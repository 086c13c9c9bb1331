//! 字段单元
//!
//! 候选在注册时就被共享为 `Arc`，之后才被装配，所以字段必须能通过
//! `&self` 写入。每个单元只写一次：已经有值的单元在装配时保持不变。

use crate::factory::Pointee;
use crate::injectable::Injectable;
use crate::registry::{Candidate, Literal};
use crate::visitor::{CandidateSlot, ChannelSlot, InterfaceSlot, MapSlot, SliceSlot, Slot};
use crossbeam_channel::{Receiver, Sender};
use once_cell::sync::OnceCell;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

/// 共享引用单元
///
/// `Inject<dyn Trait>` 是接口字段，`Inject<T>` 是指向结构体的指针字段，
/// `Inject<Inject<T>>` 是多级指针。
pub struct Inject<T: ?Sized> {
    cell: OnceCell<Arc<T>>,
}

impl<T: ?Sized> Inject<T> {
    /// 创建空单元
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// 创建已填充的单元
    pub fn filled(value: Arc<T>) -> Self {
        Self {
            cell: OnceCell::with_value(value),
        }
    }

    pub fn get(&self) -> Option<&Arc<T>> {
        self.cell.get()
    }

    pub fn cloned(&self) -> Option<Arc<T>> {
        self.cell.get().cloned()
    }

    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }

    /// 写入值，已有值时原样返回
    pub fn set(&self, value: Arc<T>) -> Result<(), Arc<T>> {
        self.cell.set(value)
    }
}

impl<T: ?Sized> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Clone for Inject<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T: ?Sized> From<Arc<T>> for Inject<T> {
    fn from(value: Arc<T>) -> Self {
        Self::filled(value)
    }
}

impl<T: ?Sized> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(_) => write!(f, "Inject({})", std::any::type_name::<T>()),
            None => f.write_str("Inject(<unset>)"),
        }
    }
}

impl<T> Slot for Inject<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn is_set(&self) -> bool {
        Inject::is_set(self)
    }

    fn assign_literal(&self, literal: &Literal) -> bool {
        literal
            .downcast_ref::<Arc<T>>()
            .is_some_and(|value| self.cell.set(Arc::clone(value)).is_ok())
    }
}

impl<T> InterfaceSlot for Inject<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    fn interface(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn assign_cast(&self, cast: Box<dyn Any + Send + Sync>) -> bool {
        cast.downcast::<Arc<T>>()
            .is_ok_and(|value| self.cell.set(*value).is_ok())
    }
}

impl<P: Pointee> CandidateSlot for Inject<P> {
    fn target(&self) -> TypeId {
        TypeId::of::<P>()
    }

    fn assign_candidate(&self, candidate: &Candidate) -> bool {
        self.adopt(&candidate.instance)
    }

    fn allocate(&self) -> Option<&dyn Injectable> {
        self.cell.get_or_init(|| Arc::new(P::allocate())).terminal()
    }

    fn adopt(&self, instance: &Arc<dyn Any + Send + Sync>) -> bool {
        Arc::clone(instance)
            .downcast::<P>()
            .is_ok_and(|value| self.cell.set(value).is_ok())
    }

    fn shared(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.cell
            .get()
            .map(|value| Arc::clone(value) as Arc<dyn Any + Send + Sync>)
    }
}

/// 值单元
///
/// 用于文本、映射、切片、标量以及按值持有的结构体。
#[derive(Clone, PartialEq, Eq)]
pub struct Value<T> {
    cell: OnceCell<T>,
}

impl<T> Value<T> {
    /// 创建空单元
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// 创建已填充的单元
    pub fn filled(value: T) -> Self {
        Self {
            cell: OnceCell::with_value(value),
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.cell.get_mut()
    }

    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }

    /// 写入值，已有值时原样返回
    pub fn set(&self, value: T) -> Result<(), T> {
        self.cell.set(value)
    }

    pub fn into_inner(self) -> Option<T> {
        self.cell.into_inner()
    }
}

impl<T> Default for Value<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<T> for Value<T> {
    fn from(value: T) -> Self {
        Self::filled(value)
    }
}

impl<T: fmt::Debug> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("Value").field(value).finish(),
            None => f.write_str("Value(<unset>)"),
        }
    }
}

impl<T> Slot for Value<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn is_set(&self) -> bool {
        Value::is_set(self)
    }

    fn assign_literal(&self, literal: &Literal) -> bool {
        literal
            .downcast_ref::<T>()
            .is_some_and(|value| self.cell.set(value.clone()).is_ok())
    }
}

impl<T> CandidateSlot for Value<T>
where
    T: Pointee + Clone,
{
    fn target(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn assign_candidate(&self, candidate: &Candidate) -> bool {
        candidate
            .instance
            .downcast_ref::<T>()
            .is_some_and(|value| self.cell.set(value.clone()).is_ok())
    }

    fn allocate(&self) -> Option<&dyn Injectable> {
        self.cell.get_or_init(T::allocate).terminal()
    }
}

impl<M> MapSlot for Value<M>
where
    M: Default + Clone + Send + Sync + 'static,
{
    fn initialize(&self) -> bool {
        self.cell.set(M::default()).is_ok()
    }
}

impl<T> SliceSlot for Value<Vec<T>>
where
    T: Default + Clone + Send + Sync + 'static,
{
    fn allocate(&self, len: usize, capacity: usize) -> bool {
        let mut items = Vec::with_capacity(capacity);
        items.resize_with(len, T::default);
        self.cell.set(items).is_ok()
    }
}

/// 有界通道单元
pub struct Channel<T> {
    cell: OnceCell<(Sender<T>, Receiver<T>)>,
}

impl<T> Channel<T> {
    /// 创建空单元
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// 创建指定容量的通道
    pub fn bounded(capacity: usize) -> Self {
        Self {
            cell: OnceCell::with_value(crossbeam_channel::bounded(capacity)),
        }
    }

    pub fn sender(&self) -> Option<&Sender<T>> {
        self.cell.get().map(|(sender, _)| sender)
    }

    pub fn receiver(&self) -> Option<&Receiver<T>> {
        self.cell.get().map(|(_, receiver)| receiver)
    }

    /// 通道容量，未创建时返回 `None`
    pub fn capacity(&self) -> Option<usize> {
        self.sender().and_then(Sender::capacity)
    }

    pub fn is_open(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T> Default for Channel<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Channel<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T> fmt::Debug for Channel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("capacity", &self.capacity())
            .finish()
    }
}

impl<T: Send + 'static> Slot for Channel<T> {
    fn is_set(&self) -> bool {
        self.is_open()
    }

    fn assign_literal(&self, literal: &Literal) -> bool {
        literal
            .downcast_ref::<(Sender<T>, Receiver<T>)>()
            .is_some_and(|pair| self.cell.set(pair.clone()).is_ok())
    }
}

impl<T: Send + 'static> ChannelSlot for Channel<T> {
    fn open(&self, capacity: usize) -> bool {
        self.cell.set(crossbeam_channel::bounded(capacity)).is_ok()
    }
}
