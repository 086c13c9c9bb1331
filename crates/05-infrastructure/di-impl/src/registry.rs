//! 候选注册表与类型注册表

use std::any::TypeId;
use std::collections::HashMap;
use wiring_abstractions::{Candidate, CandidateRegistry, Literal, RegisterOutcome, TypeDescriptor};
use wiring_common::{AssemblyError, AssemblyResult};

/// 已知的可装配类型
///
/// 擦除接口（`register_any`、`initialize_any`）只能处理这里登记过的类型。
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<TypeId, &'static TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记类型，返回是否为新类型
    pub fn insert(&mut self, descriptor: &'static TypeDescriptor) -> bool {
        self.types.insert(descriptor.type_id(), descriptor).is_none()
    }

    pub fn get(&self, type_id: TypeId) -> Option<&'static TypeDescriptor> {
        self.types.get(&type_id).copied()
    }

    pub fn contains(&self, type_id: TypeId) -> bool {
        self.types.contains_key(&type_id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// 候选注册表实现
///
/// 候选按首次注册顺序保存，同类型再次注册时原位替换。
#[derive(Debug, Default)]
pub struct CandidateRegistryImpl {
    candidates: Vec<Candidate>,
    index: HashMap<TypeId, usize>,
    literals: HashMap<String, Literal>,
}

impl CandidateRegistryImpl {
    pub fn new() -> Self {
        Self::default()
    }

    /// 字面值数量
    pub fn literal_count(&self) -> usize {
        self.literals.len()
    }
}

impl CandidateRegistry for CandidateRegistryImpl {
    fn insert_candidate(&mut self, candidate: Candidate) -> bool {
        match self.index.get(&candidate.type_id()) {
            Some(&position) => {
                self.candidates[position] = candidate;
                true
            }
            None => {
                self.index.insert(candidate.type_id(), self.candidates.len());
                self.candidates.push(candidate);
                false
            }
        }
    }

    fn insert_literal(&mut self, key: String, literal: Literal) -> AssemblyResult<RegisterOutcome> {
        if literal.is_null() {
            return Err(AssemblyError::cannot_register(format!(
                "字面值不能为空: {key}"
            )));
        }

        Ok(match self.literals.insert(key.clone(), literal) {
            Some(_) => RegisterOutcome::Overridden { keys: vec![key] },
            None => RegisterOutcome::Inserted,
        })
    }

    fn candidate(&self, type_id: TypeId) -> Option<&Candidate> {
        self.index
            .get(&type_id)
            .map(|&position| &self.candidates[position])
    }

    fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    fn literal(&self, key: &str) -> Option<&Literal> {
        self.literals.get(key)
    }
}
