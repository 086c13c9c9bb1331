//! # 装配器具体实现
//!
//! 提供候选注册表、解析器和装配引擎。
//!
//! ```rust,ignore
//! use wiring_abstractions::{Assembler, Inject, Injectable, Value};
//! use wiring_impl::Wiring;
//!
//! let mut wiring = Wiring::new(false);
//! wiring.register(PgUserRepo::default())?;
//!
//! let service = UserService::default();
//! wiring.initialize(&service)?;
//! ```

pub mod containers;
pub mod engine;
pub mod lifecycle;
pub mod registry;
pub mod resolver;
pub mod steps;

pub use lifecycle::{AssemblyLifecycle, LifecycleState};
pub use registry::{CandidateRegistryImpl, TypeRegistry};

use crate::engine::Assembly;
use dashmap::DashSet;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::{debug, info, warn};
use wiring_abstractions::{
    Assembler, Candidate, CandidateRegistry, Injectable, Literal, RegisterOutcome,
};
use wiring_common::{AssemblyError, AssemblyResult, ConfigResult, WiringSettings};

/// 装配器
///
/// 注册阶段需要 `&mut self`；装配阶段只需要 `&self`，可以在多个线程间共享。
#[derive(Debug, Default)]
pub struct Wiring {
    settings: WiringSettings,
    types: TypeRegistry,
    registry: CandidateRegistryImpl,
    /// 已装配（或正在装配）的候选，只增不减
    assembled: DashSet<TypeId>,
    lifecycle: AssemblyLifecycle,
}

impl Wiring {
    /// 创建装配器，`inject_only_annotated` 为真时只装配带注解的字段
    pub fn new(inject_only_annotated: bool) -> Self {
        Self::with_settings(WiringSettings::new(inject_only_annotated))
    }

    /// 使用指定设置创建装配器
    pub fn with_settings(settings: WiringSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// 从配置文件和环境变量加载设置
    pub fn from_env() -> ConfigResult<Self> {
        Ok(Self::with_settings(WiringSettings::load()?))
    }

    pub fn builder() -> WiringBuilder {
        WiringBuilder::new()
    }

    pub fn settings(&self) -> &WiringSettings {
        &self.settings
    }

    pub fn registry(&self) -> &CandidateRegistryImpl {
        &self.registry
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn lifecycle_state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// 候选是否已经装配（或正在装配）
    pub fn is_assembled(&self, type_id: TypeId) -> bool {
        self.assembled.contains(&type_id)
    }

    /// 记入已装配集合，返回是否为首次
    pub(crate) fn mark_assembled(&self, type_id: TypeId) -> bool {
        self.assembled.insert(type_id)
    }

    /// 按注册顺序装配所有尚未装配的候选
    ///
    /// 每个装配器只执行一次；新注册的候选会让下一次调用再执行一次。
    pub fn assemble_registered(&self) -> AssemblyResult<()> {
        self.lifecycle.run_once(|| {
            let mut assembly = Assembly::new(self, true);
            let mut count = 0_usize;

            for candidate in self.registry.candidates() {
                if self.mark_assembled(candidate.type_id()) {
                    debug!("预装配候选 {}", candidate.qualified_name());
                    assembly.assemble(candidate.assembly.as_ref())?;
                    count += 1;
                }
            }

            info!("预装配了 {} 个候选", count);
            Ok(())
        })
    }

    fn insert_candidate(&mut self, candidate: Candidate) {
        let name = candidate.qualified_name();
        self.types.insert(candidate.descriptor);

        if self.registry.insert_candidate(candidate) {
            warn!("替换已注册的候选: {}", name);
        } else {
            info!("注册候选: {}", name);
        }
        self.lifecycle.invalidate();
    }
}

impl Assembler for Wiring {
    fn register_type<T: Injectable>(&mut self) {
        if self.types.insert(T::type_descriptor()) {
            debug!("登记可装配类型: {}", T::type_descriptor().qualified_name());
        }
    }

    fn register_shared<T: Injectable>(&mut self, value: Arc<T>) -> AssemblyResult<()> {
        self.insert_candidate(Candidate::new(value));
        Ok(())
    }

    fn register_any(&mut self, value: Option<Arc<dyn Any + Send + Sync>>) -> AssemblyResult<()> {
        let value = value.ok_or_else(|| AssemblyError::cannot_register("候选不能为空"))?;
        let type_id = Any::type_id(value.as_ref());

        let descriptor = self.types.get(type_id).ok_or_else(|| {
            AssemblyError::cannot_register("候选类型未登记为可装配结构体")
        })?;
        let candidate = descriptor.share(value).ok_or_else(|| {
            AssemblyError::cannot_register(format!(
                "候选无法还原为 {}",
                descriptor.qualified_name()
            ))
        })?;

        self.insert_candidate(candidate);
        Ok(())
    }

    fn register_value(&mut self, key: &str, literal: Literal) -> AssemblyResult<RegisterOutcome> {
        let outcome = self.registry.insert_literal(key.to_owned(), literal)?;
        if outcome.is_overridden() {
            warn!("已注册的值被覆盖: {}", key);
        } else {
            info!("注册值: {}", key);
        }
        Ok(outcome)
    }

    fn register_values<I, K>(&mut self, values: I) -> AssemblyResult<RegisterOutcome>
    where
        I: IntoIterator<Item = (K, Literal)>,
        K: Into<String>,
    {
        let values: Vec<(String, Literal)> = values
            .into_iter()
            .map(|(key, literal)| (key.into(), literal))
            .collect();

        if let Some((key, _)) = values.iter().find(|(_, literal)| literal.is_null()) {
            return Err(AssemblyError::cannot_register(format!(
                "字面值不能为空: {key}"
            )));
        }

        values
            .into_iter()
            .try_fold(
                RegisterOutcome::Inserted,
                |outcome, (key, literal)| -> AssemblyResult<RegisterOutcome> {
                    Ok(outcome.merge(self.register_value(&key, literal)?))
                },
            )
    }

    fn initialize_dyn(&self, holder: &dyn Injectable) -> AssemblyResult<()> {
        self.assemble_registered()?;

        debug!("装配目标 {}", holder.descriptor().qualified_name());
        Assembly::new(self, false).assemble(holder)
    }

    fn initialize_any(&self, holder: Option<&(dyn Any + Send + Sync)>) -> AssemblyResult<()> {
        let holder = holder.ok_or_else(|| AssemblyError::cannot_be_holder("装配目标不能为空"))?;

        let descriptor = self
            .types
            .get(Any::type_id(holder))
            .ok_or_else(|| AssemblyError::cannot_be_holder("装配目标不是已登记的可装配结构体"))?;
        let holder = descriptor.erase(holder).ok_or_else(|| {
            AssemblyError::cannot_be_holder(format!(
                "装配目标无法还原为 {}",
                descriptor.qualified_name()
            ))
        })?;

        self.initialize_dyn(holder)
    }
}

/// 装配器构建器
#[derive(Debug, Default)]
pub struct WiringBuilder {
    settings: WiringSettings,
}

impl WiringBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 只装配带注解的字段
    #[must_use]
    pub fn inject_only_annotated(mut self, enabled: bool) -> Self {
        self.settings.inject_only_annotated = enabled;
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: WiringSettings) -> Self {
        self.settings = settings;
        self
    }

    /// 构建装配器
    pub fn build(self) -> Wiring {
        info!("创建装配器: {:?}", self.settings);
        Wiring::with_settings(self.settings)
    }
}
