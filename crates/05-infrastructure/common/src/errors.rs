//! 错误类型定义

use thiserror::Error;

/// 装配错误的种类
///
/// 携带遍历路径的错误与其内部错误属于同一种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 值无法注册（空值或不是可装配的结构体）
    CannotRegister,
    /// 值无法作为装配目标，或字段类型不可装配
    CannotBeHolder,
    /// 无法为字段确定唯一的实现
    CannotDecideImplementation,
    /// 已注册的字面值被同名键覆盖
    RegisteredValueOverridden,
    /// 字段注解格式错误
    IncorrectDirectiveConfiguration,
}

/// 装配错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("无法注册: {cause}")]
    CannotRegister { cause: String },

    #[error("无法作为装配目标: {cause}")]
    CannotBeHolder { cause: String },

    #[error("无法确定实现: {cause}")]
    CannotDecideImplementation { cause: String },

    #[error("已注册的值被覆盖: {key}")]
    RegisteredValueOverridden { key: String },

    #[error("注解配置不正确: {cause}")]
    IncorrectDirectiveConfiguration { cause: String },

    #[error("{path}: {source}")]
    Traced {
        path: String,
        source: Box<AssemblyError>,
    },
}

impl AssemblyError {
    /// 创建无法注册错误
    pub fn cannot_register(cause: impl Into<String>) -> Self {
        Self::CannotRegister {
            cause: cause.into(),
        }
    }

    /// 创建无法作为装配目标错误
    pub fn cannot_be_holder(cause: impl Into<String>) -> Self {
        Self::CannotBeHolder {
            cause: cause.into(),
        }
    }

    /// 创建无法确定实现错误
    pub fn cannot_decide(cause: impl Into<String>) -> Self {
        Self::CannotDecideImplementation {
            cause: cause.into(),
        }
    }

    /// 创建字面值覆盖错误
    pub fn overridden(key: impl Into<String>) -> Self {
        Self::RegisteredValueOverridden { key: key.into() }
    }

    /// 创建注解配置错误
    pub fn incorrect_directive(cause: impl Into<String>) -> Self {
        Self::IncorrectDirectiveConfiguration {
            cause: cause.into(),
        }
    }

    /// 错误种类，穿透遍历路径
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CannotRegister { .. } => ErrorKind::CannotRegister,
            Self::CannotBeHolder { .. } => ErrorKind::CannotBeHolder,
            Self::CannotDecideImplementation { .. } => ErrorKind::CannotDecideImplementation,
            Self::RegisteredValueOverridden { .. } => ErrorKind::RegisteredValueOverridden,
            Self::IncorrectDirectiveConfiguration { .. } => {
                ErrorKind::IncorrectDirectiveConfiguration
            }
            Self::Traced { source, .. } => source.kind(),
        }
    }

    /// 原始错误原因
    pub fn cause(&self) -> &str {
        match self {
            Self::CannotRegister { cause }
            | Self::CannotBeHolder { cause }
            | Self::CannotDecideImplementation { cause }
            | Self::IncorrectDirectiveConfiguration { cause } => cause,
            Self::RegisteredValueOverridden { key } => key,
            Self::Traced { source, .. } => source.cause(),
        }
    }

    /// 出错时的遍历路径
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Traced { path, .. } => Some(path),
            _ => None,
        }
    }

    /// 附加遍历路径；空路径不做包装，已有路径时替换
    #[must_use]
    pub fn traced(self, path: impl Into<String>) -> Self {
        let path = path.into();
        if path.is_empty() {
            return self;
        }
        match self {
            Self::Traced { source, .. } => Self::Traced { path, source },
            other => Self::Traced {
                path,
                source: Box::new(other),
            },
        }
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置加载失败: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },
}

/// 装配结果类型别名
pub type AssemblyResult<T> = Result<T, AssemblyError>;

/// 配置结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
