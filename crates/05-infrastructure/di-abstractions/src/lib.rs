//! # Wiring Abstractions
//!
//! 装配器抽象层，定义类型描述、字段单元和装配接口。
//!
//! ## 核心接口
//!
//! - [`Injectable`] - 可装配结构体，由 `#[derive(Injectable)]` 实现
//! - [`TypeDescriptor`] - 类型描述符（字段形态、声明的接口、限定符）
//! - [`Inject`] / [`Value`] / [`Channel`] - 可在共享后填充的字段单元
//! - [`FieldVisitor`] - 按字段形态分派的访问器
//! - [`CandidateRegistry`] - 候选与字面值注册表接口
//! - [`Assembler`] - 装配器接口

extern crate self as wiring_abstractions;

pub mod cells;
pub mod container;
pub mod descriptor;
pub mod factory;
pub mod injectable;
pub mod registry;
pub mod resolver;
pub mod visitor;

pub use cells::*;
pub use container::*;
pub use descriptor::*;
pub use factory::*;
pub use injectable::*;
pub use registry::*;
pub use resolver::*;
pub use visitor::*;

pub use wiring_common::*;
pub use wiring_macros::Injectable;

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}
