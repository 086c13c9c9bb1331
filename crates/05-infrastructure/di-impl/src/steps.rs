//! 字段装配步骤
//!
//! 每个字段依次经过：注解必需检查、跳过检查、已注册字面值、按类型赋值。
//! 任一步骤都可以结束该字段的处理。

use crate::containers;
use crate::engine::Assembly;
use crate::resolver;
use wiring_abstractions::{CandidateRegistry, FieldDescriptor, FieldSlot};
use wiring_common::{AssemblyError, AssemblyResult, Directives};

/// 步骤执行后的走向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Break,
}

/// 正在装配的字段
pub struct FieldContext<'f> {
    pub field: &'static FieldDescriptor,
    pub directives: Directives<'static>,
    pub slot: FieldSlot<'f>,
}

/// 装配步骤
pub trait AssemblyStep: Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, assembly: &mut Assembly<'_>, context: &FieldContext<'_>)
        -> AssemblyResult<Flow>;
}

/// 固定的步骤顺序
pub const PIPELINE: &[&dyn AssemblyStep] = &[
    &TagRequiredCheck,
    &SkipCheck,
    &RegisteredValueSetup,
    &ValueSetup,
];

/// 只装配带注解字段时，跳过没有注解的字段
pub struct TagRequiredCheck;

impl AssemblyStep for TagRequiredCheck {
    fn name(&self) -> &'static str {
        "tag-required"
    }

    fn apply(&self, assembly: &mut Assembly<'_>, context: &FieldContext<'_>) -> AssemblyResult<Flow> {
        if assembly.wiring().settings().inject_only_annotated && !context.directives.is_present() {
            return Ok(Flow::Break);
        }
        Ok(Flow::Continue)
    }
}

/// `skip[true]`
pub struct SkipCheck;

impl AssemblyStep for SkipCheck {
    fn name(&self) -> &'static str {
        "skip"
    }

    fn apply(&self, _assembly: &mut Assembly<'_>, context: &FieldContext<'_>) -> AssemblyResult<Flow> {
        if context.directives.skip()? {
            Ok(Flow::Break)
        } else {
            Ok(Flow::Continue)
        }
    }
}

/// `reg[key]`
pub struct RegisteredValueSetup;

impl AssemblyStep for RegisteredValueSetup {
    fn name(&self) -> &'static str {
        "registered-value"
    }

    fn apply(&self, assembly: &mut Assembly<'_>, context: &FieldContext<'_>) -> AssemblyResult<Flow> {
        let Some(key) = context.directives.registered()? else {
            return Ok(Flow::Continue);
        };

        let literal = assembly.wiring().registry().literal(&key).ok_or_else(|| {
            AssemblyError::cannot_decide(format!("没有注册键为 {key} 的值"))
        })?;

        if context.slot.is_set() == Some(true) {
            return Ok(Flow::Break);
        }

        match context.slot.assign_literal(literal) {
            Some(true) => Ok(Flow::Break),
            Some(false) => Err(AssemblyError::cannot_decide(format!(
                "键 {key} 的值类型 {} 与字段类型 {} 不匹配",
                literal.type_name(),
                context.field.type_name
            ))),
            None => Err(AssemblyError::cannot_be_holder(format!(
                "字段 {} 不接受字面值",
                context.field.name
            ))),
        }
    }
}

/// 按字段形态赋值
pub struct ValueSetup;

impl AssemblyStep for ValueSetup {
    fn name(&self) -> &'static str {
        "value"
    }

    fn apply(&self, assembly: &mut Assembly<'_>, context: &FieldContext<'_>) -> AssemblyResult<Flow> {
        if context.slot.is_set() == Some(true) {
            return Ok(Flow::Break);
        }

        let FieldContext {
            field, directives, ..
        } = context;

        match context.slot {
            FieldSlot::Interface(slot) => {
                resolver::resolve_interface(assembly, slot, field, directives)?;
            }
            FieldSlot::Pointer(slot) | FieldSlot::Struct(slot) => {
                resolver::resolve_exact(assembly, slot, field, directives)?;
            }
            FieldSlot::Nested(nested) => assembly.assemble(nested)?,
            FieldSlot::Text(slot) => containers::assign_text(slot, directives)?,
            FieldSlot::Map(slot) => containers::initialize_map(slot),
            FieldSlot::Channel(slot) => containers::open_channel(slot, directives)?,
            FieldSlot::Slice(slot) => containers::allocate_slice(slot, directives)?,
            FieldSlot::Fixed(kind) => containers::check_fixed(kind, field, directives)?,
            FieldSlot::Scalar(_) | FieldSlot::Unsupported => {
                return Err(AssemblyError::cannot_be_holder(format!(
                    "不支持的字段类型: {}",
                    field.type_name
                )));
            }
        }
        Ok(Flow::Break)
    }
}
