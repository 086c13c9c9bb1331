//! 装配器配置
//!
//! 配置来源依次为可选的配置文件和 `WIRING_` 前缀的环境变量，后者覆盖前者。

use crate::errors::ConfigResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 装配器设置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WiringSettings {
    /// 只装配带有注解的字段
    pub inject_only_annotated: bool,
}

impl WiringSettings {
    /// 默认配置文件（不含扩展名）
    pub const DEFAULT_FILE: &'static str = "config/wiring";
    /// 环境变量前缀
    pub const ENV_PREFIX: &'static str = "WIRING";

    /// 创建设置
    pub const fn new(inject_only_annotated: bool) -> Self {
        Self {
            inject_only_annotated,
        }
    }

    /// 从默认配置文件（可不存在）和环境变量加载
    pub fn load() -> ConfigResult<Self> {
        Self::build(config::File::with_name(Self::DEFAULT_FILE).required(false))
    }

    /// 从指定配置文件和环境变量加载，文件必须存在
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        Self::build(config::File::from(path.as_ref()))
    }

    fn build<S>(file: S) -> ConfigResult<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(Self::ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Self = settings.try_deserialize()?;
        tracing::debug!("加载装配器配置: {:?}", settings);
        Ok(settings)
    }
}
