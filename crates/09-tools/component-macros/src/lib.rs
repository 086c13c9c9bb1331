//! # Wiring Macros
//!
//! 这个 crate 提供了为可装配结构体生成类型描述符的派生宏。
//! 宏只生成描述符和字段访问代码，装配仍然在运行时进行。
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use wiring_abstractions::{Inject, Injectable, Value};
//!
//! pub trait UserRepo: Send + Sync {}
//!
//! #[derive(Default, Injectable)]
//! #[injectable(implements(dyn UserRepo))]
//! pub struct PgUserRepo;
//!
//! impl UserRepo for PgUserRepo {}
//!
//! #[derive(Default, Injectable)]
//! pub struct UserService {
//!     repo: Inject<dyn UserRepo>,
//!     #[inject("env[DATABASE_URL]")]
//!     url: Value<String>,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod injectable;
mod utils;

// Re-exports are not allowed in proc-macro crates

/// 可装配结构体派生宏
///
/// 为结构体实现 `Injectable` 与 `Pointee`，结构体必须实现 `Default`。
///
/// # 结构体参数
///
/// - `implements(dyn A, dyn B)` - 声明实现的接口，接口 trait 需要 `Send + Sync`
/// - `qualifier` - 结构体实现了 `Qualifier`，可被 `qual[...]` 选中
///
/// # 字段注解
///
/// - `#[inject]` - 空注解
/// - `#[inject("impl[a::B] qual[x] env[NAME] skip[true] reg[key] size[3] cap[9]")]`
///
/// # 字段形态
///
/// | 字段类型 | 形态 |
/// |---|---|
/// | `Inject<dyn Trait>` | 接口 |
/// | `Inject<T>` / `Inject<Inject<T>>` | 指针 |
/// | `Value<T>` | 结构体值（T 需要 `Clone`） |
/// | `Value<String>` / `Value<Vec<T>>` / `Value<HashMap<K, V>>` | 文本 / 切片 / 映射 |
/// | `Value<i32>` 等 | 标量，只接受字面值 |
/// | `Channel<T>` | 有界通道 |
/// | 其他结构体 | 内嵌，原地递归装配 |
#[proc_macro_derive(Injectable, attributes(inject, injectable))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    injectable::expand(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
