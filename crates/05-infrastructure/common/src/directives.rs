//! 字段注解解析
//!
//! 注解是形如 `impl[a::B] qual[x] env[NAME] skip[true] reg[key] size[3] cap[9]`
//! 的字符串。每个指令由键名和方括号中的值组成，值内的 `\]` 表示字面的 `]`。
//! 键名前必须是字符串开头、空白或上一个指令的 `]`，否则不算匹配。

use crate::errors::{AssemblyError, AssemblyResult};
use std::fmt;

/// 支持的指令键
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKey {
    /// 按限定类型名选择实现
    Impl,
    /// 按限定符选择实现
    Qual,
    /// 从环境变量读取文本
    Env,
    /// 跳过字段
    Skip,
    /// 使用已注册的字面值
    Reg,
    /// 容器长度或通道容量
    Size,
    /// 切片容量
    Cap,
}

impl DirectiveKey {
    /// 注解中使用的键名
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Impl => "impl",
            Self::Qual => "qual",
            Self::Env => "env",
            Self::Skip => "skip",
            Self::Reg => "reg",
            Self::Size => "size",
            Self::Cap => "cap",
        }
    }
}

impl fmt::Display for DirectiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 在注解中查找指令的值
///
/// 没有该指令时返回 `Ok(None)`；缺少右括号或值为空时返回注解配置错误。
pub fn find_directive(annotation: &str, key: DirectiveKey) -> AssemblyResult<Option<String>> {
    let pattern = format!("{}[", key.as_str());
    let mut from = 0;

    while let Some(offset) = annotation[from..].find(&pattern) {
        let start = from + offset;
        let standalone = annotation[..start]
            .chars()
            .next_back()
            .map_or(true, |c| c.is_whitespace() || c == ']');

        if standalone {
            return read_value(annotation, start + pattern.len(), key).map(Some);
        }
        from = start + pattern.len();
    }

    Ok(None)
}

fn read_value(annotation: &str, value_start: usize, key: DirectiveKey) -> AssemblyResult<String> {
    let mut value = String::new();
    let mut chars = annotation[value_start..].chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&']') => {
                chars.next();
                value.push(']');
            }
            ']' if value.is_empty() => {
                return Err(AssemblyError::incorrect_directive(format!(
                    "指令 {key} 的值为空: {annotation}"
                )));
            }
            ']' => return Ok(value),
            other => value.push(other),
        }
    }

    Err(AssemblyError::incorrect_directive(format!(
        "指令 {key} 缺少右括号: {annotation}"
    )))
}

/// 单个字段的注解
///
/// 指令在用到时才查找，未被读取的指令即使格式错误也不影响装配。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Directives<'a> {
    annotation: Option<&'a str>,
}

impl<'a> Directives<'a> {
    /// `None` 表示字段没有注解
    pub const fn new(annotation: Option<&'a str>) -> Self {
        Self { annotation }
    }

    /// 字段是否带有注解（即使注解为空）
    pub const fn is_present(&self) -> bool {
        self.annotation.is_some()
    }

    pub const fn annotation(&self) -> Option<&'a str> {
        self.annotation
    }

    /// 按键查找原始值
    pub fn get(&self, key: DirectiveKey) -> AssemblyResult<Option<String>> {
        match self.annotation {
            Some(annotation) => find_directive(annotation, key),
            None => Ok(None),
        }
    }

    pub fn implementation(&self) -> AssemblyResult<Option<String>> {
        self.get(DirectiveKey::Impl)
    }

    pub fn qualifier(&self) -> AssemblyResult<Option<String>> {
        self.get(DirectiveKey::Qual)
    }

    pub fn env(&self) -> AssemblyResult<Option<String>> {
        self.get(DirectiveKey::Env)
    }

    pub fn registered(&self) -> AssemblyResult<Option<String>> {
        self.get(DirectiveKey::Reg)
    }

    /// `skip[true]` 返回 `true`，`skip[false]` 或未设置返回 `false`
    pub fn skip(&self) -> AssemblyResult<bool> {
        match self.get(DirectiveKey::Skip)?.as_deref() {
            None | Some("false") => Ok(false),
            Some("true") => Ok(true),
            Some(other) => Err(AssemblyError::incorrect_directive(format!(
                "skip 只接受 true 或 false, 实际为: {other}"
            ))),
        }
    }

    /// `size[N]`
    pub fn size(&self) -> AssemblyResult<Option<usize>> {
        parse_count(DirectiveKey::Size, self.get(DirectiveKey::Size)?)
    }

    /// `cap[N]`
    pub fn capacity(&self) -> AssemblyResult<Option<usize>> {
        parse_count(DirectiveKey::Cap, self.get(DirectiveKey::Cap)?)
    }
}

fn parse_count(key: DirectiveKey, raw: Option<String>) -> AssemblyResult<Option<usize>> {
    raw.map(|value| {
        value.parse::<usize>().map_err(|_| {
            AssemblyError::incorrect_directive(format!("{key} 需要非负整数, 实际为: {value}"))
        })
    })
    .transpose()
}
