//! 装配引擎
//!
//! 对目标结构体逐字段执行装配步骤，遇到内嵌结构体、新分配的指针目标
//! 和尚未装配的候选时递归。

use crate::steps::{FieldContext, Flow, PIPELINE};
use crate::Wiring;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};
use wiring_abstractions::{
    Candidate, FieldDescriptor, FieldSlot, FieldVisitor, Injectable, ResolveContext,
    TypeDescriptor,
};
use wiring_common::{AssemblyError, AssemblyResult, Directives};

/// 一次装配过程
pub struct Assembly<'w> {
    wiring: &'w Wiring,
    context: ResolveContext,
    /// 已分配但尚未装配完成的未注册实例，按类型索引
    in_flight: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl<'w> Assembly<'w> {
    /// `recursive` 为真时，字段匹配到的候选会先被装配
    pub fn new(wiring: &'w Wiring, recursive: bool) -> Self {
        Self {
            wiring,
            context: ResolveContext::new(recursive),
            in_flight: HashMap::new(),
        }
    }

    pub fn wiring(&self) -> &'w Wiring {
        self.wiring
    }

    pub fn context(&self) -> &ResolveContext {
        &self.context
    }

    /// 装配一个结构体
    pub fn assemble(&mut self, target: &dyn Injectable) -> AssemblyResult<()> {
        let descriptor = target.descriptor();
        debug!("装配 {}", descriptor.qualified_name());

        self.context.enter(descriptor.short_name());
        let result = target.visit_fields(&mut FieldPass {
            assembly: self,
            descriptor,
        });
        self.context.leave();
        result
    }

    /// 正在装配中的同类型实例
    pub fn in_flight(&self, target: TypeId) -> Option<Arc<dyn Any + Send + Sync>> {
        self.in_flight.get(&target).cloned()
    }

    /// 装配新分配的实例
    ///
    /// 装配期间 `shared` 登记为该类型的在途实例，未注册类型之间的循环
    /// 引用会复用它而不是继续分配。
    pub fn assemble_allocated(
        &mut self,
        target: TypeId,
        shared: Option<Arc<dyn Any + Send + Sync>>,
        terminal: &dyn Injectable,
    ) -> AssemblyResult<()> {
        let registered = match shared {
            Some(shared) => self.in_flight.insert(target, shared).is_none(),
            None => false,
        };
        let result = self.assemble(terminal);
        if registered {
            self.in_flight.remove(&target);
        }
        result
    }

    /// 先装配尚未装配的候选
    ///
    /// 候选在装配前就被记入已装配集合，循环引用因此不会无限递归。
    pub fn preassemble(&mut self, candidates: &[&'w Candidate]) -> AssemblyResult<()> {
        if !self.context.is_recursive() {
            return Ok(());
        }

        for candidate in candidates {
            if self.wiring.mark_assembled(Candidate::type_id(candidate)) {
                debug!("递归装配候选 {}", candidate.qualified_name());
                self.assemble(candidate.assembly.as_ref())?;
            }
        }
        Ok(())
    }

    fn assemble_field(
        &mut self,
        field: &'static FieldDescriptor,
        slot: FieldSlot<'_>,
    ) -> AssemblyResult<()> {
        let context = FieldContext {
            field,
            directives: Directives::new(field.annotation),
            slot,
        };

        for step in PIPELINE {
            if step.apply(self, &context)? == Flow::Break {
                trace!("字段 {} 在 {} 步骤结束", field.name, step.name());
                break;
            }
        }
        Ok(())
    }
}

/// 把字段访问转发给装配过程
struct FieldPass<'a, 'w> {
    assembly: &'a mut Assembly<'w>,
    descriptor: &'static TypeDescriptor,
}

impl FieldVisitor for FieldPass<'_, '_> {
    fn visit(&mut self, index: usize, slot: FieldSlot<'_>) -> AssemblyResult<()> {
        let field = self.descriptor.fields().get(index).ok_or_else(|| {
            AssemblyError::cannot_be_holder(format!(
                "{} 缺少第 {index} 个字段的描述",
                self.descriptor.qualified_name()
            ))
        })?;

        self.assembly
            .context
            .enter(format!("{}: {}", field.name, field.type_name));
        let result = self.assembly.assemble_field(field, slot).map_err(|error| {
            // 只在最内层附加路径
            if error.path().is_some() {
                error
            } else {
                self.assembly.context.trace(error)
            }
        });
        self.assembly.context.leave();
        result
    }
}
