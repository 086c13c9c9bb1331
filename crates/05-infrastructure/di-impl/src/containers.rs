//! 容器与文本字段的默认值

use tracing::trace;
use wiring_abstractions::{ChannelSlot, FieldDescriptor, FixedKind, MapSlot, SliceSlot, Value};
use wiring_common::{AssemblyError, AssemblyResult, DirectiveKey, Directives};

/// 通道未指定 `size` 时的容量
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1;

/// 通道容量
pub fn channel_capacity(directives: &Directives<'_>) -> AssemblyResult<usize> {
    Ok(directives.size()?.unwrap_or(DEFAULT_CHANNEL_CAPACITY))
}

/// 切片的长度和容量，容量默认等于长度
pub fn slice_bounds(directives: &Directives<'_>) -> AssemblyResult<(usize, usize)> {
    let len = directives.size()?.unwrap_or(0);
    let capacity = directives.capacity()?.unwrap_or(len);

    if len > capacity {
        return Err(AssemblyError::incorrect_directive(format!(
            "切片长度 {len} 不能大于容量 {capacity}"
        )));
    }
    Ok((len, capacity))
}

/// `env[NAME]` 读取环境变量，变量不存在时写入空字符串
pub fn assign_text(slot: &Value<String>, directives: &Directives<'_>) -> AssemblyResult<()> {
    if let Some(name) = directives.env()? {
        let value = std::env::var_os(&name)
            .map(|value| value.to_string_lossy().into_owned())
            .unwrap_or_default();
        trace!("读取环境变量 {}", name);
        // 已有值时保持不变
        let _ = slot.set(value);
    }
    Ok(())
}

pub fn initialize_map(slot: &dyn MapSlot) {
    slot.initialize();
}

pub fn open_channel(slot: &dyn ChannelSlot, directives: &Directives<'_>) -> AssemblyResult<()> {
    let capacity = channel_capacity(directives)?;
    slot.open(capacity);
    Ok(())
}

pub fn allocate_slice(slot: &dyn SliceSlot, directives: &Directives<'_>) -> AssemblyResult<()> {
    let (len, capacity) = slice_bounds(directives)?;
    slot.allocate(len, capacity);
    Ok(())
}

/// 普通 `String`、`Vec`、映射字段已经初始化，不能再按指令写入
pub fn check_fixed(
    kind: FixedKind,
    field: &FieldDescriptor,
    directives: &Directives<'_>,
) -> AssemblyResult<()> {
    let rejected = match kind {
        FixedKind::Text => directives.get(DirectiveKey::Env)?.map(|_| DirectiveKey::Env),
        FixedKind::Slice | FixedKind::Map => match directives.get(DirectiveKey::Size)? {
            Some(_) => Some(DirectiveKey::Size),
            None => directives.get(DirectiveKey::Cap)?.map(|_| DirectiveKey::Cap),
        },
    };

    match rejected {
        Some(key) => Err(AssemblyError::cannot_be_holder(format!(
            "字段 {} 的类型 {} 不可写入, {key} 指令需要 Value 单元",
            field.name, field.type_name
        ))),
        None => Ok(()),
    }
}
