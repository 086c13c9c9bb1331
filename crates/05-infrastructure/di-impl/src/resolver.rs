//! 候选解析
//!
//! 接口字段匹配声明了该接口且不循环包含该接口的候选；指针和结构体值字段
//! 按类型精确匹配。多个候选时依次按 `impl`、`qual` 指令选择。

use crate::engine::Assembly;
use std::any::TypeId;
use std::collections::HashSet;
use tracing::debug;
use wiring_abstractions::{
    Candidate, CandidateRegistry, CandidateSlot, FieldDescriptor, InterfaceSlot, TypeDescriptor,
};
use wiring_common::{AssemblyError, AssemblyResult, Directives};

/// 候选的字段（经由指针、结构体值和内嵌字段递归）是否包含该接口
///
/// 这样的候选不能注入到该接口字段，否则装饰器会注入自身。
pub fn includes_interface(descriptor: &'static TypeDescriptor, interface: TypeId) -> bool {
    let mut visited = HashSet::new();
    scan(descriptor, interface, &mut visited)
}

fn scan(
    descriptor: &'static TypeDescriptor,
    interface: TypeId,
    visited: &mut HashSet<TypeId>,
) -> bool {
    if !visited.insert(descriptor.type_id()) {
        return false;
    }

    descriptor.fields().iter().any(|field| {
        field.interface == Some(interface)
            || field
                .target_descriptor()
                .is_some_and(|target| scan(target, interface, visited))
    })
}

/// 在多个候选中按指令选择
///
/// 没有候选时返回 `Ok(None)`，只有一个候选时直接选中，不读取指令。
pub fn select<'c>(
    candidates: &[&'c Candidate],
    field: &FieldDescriptor,
    directives: &Directives<'_>,
) -> AssemblyResult<Option<&'c Candidate>> {
    match candidates {
        [] => Ok(None),
        [single] => Ok(Some(*single)),
        many => {
            if let Some(name) = directives.implementation()? {
                return many
                    .iter()
                    .find(|candidate| candidate.qualified_name() == name)
                    .map(|candidate| Some(*candidate))
                    .ok_or_else(|| {
                        AssemblyError::cannot_decide(format!(
                            "impl 指令指定的实现不存在: {name}"
                        ))
                    });
            }

            if let Some(qualifier) = directives.qualifier()? {
                return many
                    .iter()
                    .find(|candidate| candidate.qualify().as_deref() == Some(qualifier.as_str()))
                    .map(|candidate| Some(*candidate))
                    .ok_or_else(|| {
                        AssemblyError::cannot_decide(format!(
                            "qual 指令指定的限定符不存在: {qualifier}"
                        ))
                    });
            }

            let names: Vec<_> = many
                .iter()
                .map(|candidate| candidate.qualified_name())
                .collect();
            Err(AssemblyError::cannot_decide(format!(
                "无法为 {} 选择实现, 候选: {}",
                field.type_name,
                names.join(", ")
            )))
        }
    }
}

/// 解析接口字段
pub fn resolve_interface(
    assembly: &mut Assembly<'_>,
    slot: &dyn InterfaceSlot,
    field: &FieldDescriptor,
    directives: &Directives<'_>,
) -> AssemblyResult<()> {
    let interface = slot.interface();
    let candidates: Vec<&Candidate> = assembly
        .wiring()
        .registry()
        .candidates()
        .iter()
        .filter(|candidate| {
            candidate.descriptor.cast_for(interface).is_some()
                && !includes_interface(candidate.descriptor, interface)
        })
        .collect();

    assembly.preassemble(&candidates)?;

    let Some(chosen) = select(&candidates, field, directives)? else {
        return Err(AssemblyError::cannot_decide(format!(
            "没有找到 {} 的实现",
            field.type_name
        )));
    };

    debug!("字段 {} 注入 {}", field.name, chosen.qualified_name());
    let cast = chosen.cast(interface).ok_or_else(|| {
        AssemblyError::cannot_decide(format!(
            "{} 无法转换为 {}",
            chosen.qualified_name(),
            field.type_name
        ))
    })?;
    slot.assign_cast(cast);
    Ok(())
}

/// 解析指针字段和结构体值字段
///
/// 没有候选时分配新实例（指针链逐级分配）并原地装配；同类型实例正在
/// 装配时直接共享它。
pub fn resolve_exact(
    assembly: &mut Assembly<'_>,
    slot: &dyn CandidateSlot,
    field: &FieldDescriptor,
    directives: &Directives<'_>,
) -> AssemblyResult<()> {
    let target = slot.target();
    let candidates: Vec<&Candidate> = assembly
        .wiring()
        .registry()
        .candidate(target)
        .into_iter()
        .collect();

    assembly.preassemble(&candidates)?;

    match select(&candidates, field, directives)? {
        Some(chosen) => {
            debug!("字段 {} 注入 {}", field.name, chosen.qualified_name());
            if !slot.assign_candidate(chosen) {
                return Err(AssemblyError::cannot_decide(format!(
                    "{} 无法赋值给 {}",
                    chosen.qualified_name(),
                    field.type_name
                )));
            }
            Ok(())
        }
        None => {
            if let Some(existing) = assembly.in_flight(target) {
                if slot.adopt(&existing) {
                    debug!("字段 {} 共享装配中的 {}", field.name, field.type_name);
                    return Ok(());
                }
            }

            debug!("字段 {} 没有候选, 分配新实例", field.name);
            let terminal = slot.allocate().ok_or_else(|| {
                AssemblyError::cannot_decide(format!("无法分配 {}", field.type_name))
            })?;
            assembly.assemble_allocated(target, slot.shared(), terminal)
        }
    }
}
