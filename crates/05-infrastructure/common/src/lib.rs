//! # Wiring Common
//!
//! 这个 crate 提供了装配器各层共用的基础类型。
//!
//! ## 核心组件
//!
//! - [`Directives`] - 字段注解解析
//! - [`AssemblyError`] - 装配错误模型
//! - [`WiringSettings`] - 装配器配置
//! - [`TypeInfo`] - 类型身份信息

pub mod configuration;
pub mod directives;
pub mod errors;
pub mod metadata;

pub use configuration::*;
pub use directives::*;
pub use errors::*;
pub use metadata::*;
