//! 宏工具函数
//!
//! 按字段类型的语法形态静态分类。

use quote::ToTokens;
use syn::{GenericArgument, PathArguments, PathSegment, Type};

/// 映射和集合类型
const MAP_TYPES: &[&str] = &[
    "HashMap", "BTreeMap", "HashSet", "BTreeSet", "DashMap", "DashSet", "IndexMap", "IndexSet",
];

/// 标量类型
const SCALAR_TYPES: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize", "f32",
    "f64", "bool", "char",
];

/// 不能作为装配目标的包装类型
const OPAQUE_TYPES: &[&str] = &[
    "Option", "Box", "Arc", "Rc", "Weak", "Cell", "RefCell", "Mutex", "RwLock", "PhantomData",
];

/// 已初始化字段的类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixedShape {
    Text,
    Slice,
    Map,
}

/// 字段形态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// `Inject<dyn Trait>`
    Interface { interface: Type },
    /// `Inject<T>`，`terminal` 为指针链末端的结构体
    Pointer { terminal: Type },
    /// `Value<T>`
    Struct { target: Type },
    /// 内嵌结构体
    Nested,
    Text,
    Map,
    Channel,
    Slice,
    Scalar,
    Fixed(FixedShape),
    Unsupported,
}

/// 对字段类型分类
pub fn classify(ty: &Type) -> Shape {
    let ty = peel(ty);
    let Some(segment) = last_segment(ty) else {
        return Shape::Unsupported;
    };
    let name = segment.ident.to_string();

    match name.as_str() {
        "Inject" => match first_generic(segment) {
            Some(interface @ Type::TraitObject(_)) => Shape::Interface {
                interface: interface.clone(),
            },
            Some(inner) => Shape::Pointer {
                terminal: pointer_terminal(inner).clone(),
            },
            None => Shape::Unsupported,
        },
        "Value" => first_generic(segment).map_or(Shape::Unsupported, classify_value),
        "Channel" => Shape::Channel,
        "String" => Shape::Fixed(FixedShape::Text),
        "Vec" => Shape::Fixed(FixedShape::Slice),
        other if MAP_TYPES.contains(&other) => Shape::Fixed(FixedShape::Map),
        other if SCALAR_TYPES.contains(&other) || OPAQUE_TYPES.contains(&other) => {
            Shape::Unsupported
        }
        _ => Shape::Nested,
    }
}

fn classify_value(inner: &Type) -> Shape {
    let inner = peel(inner);
    let Some(segment) = last_segment(inner) else {
        return Shape::Scalar;
    };
    let name = segment.ident.to_string();

    match name.as_str() {
        "String" => Shape::Text,
        "Vec" => Shape::Slice,
        other if MAP_TYPES.contains(&other) => Shape::Map,
        other if SCALAR_TYPES.contains(&other) || OPAQUE_TYPES.contains(&other) => Shape::Scalar,
        _ => Shape::Struct {
            target: inner.clone(),
        },
    }
}

/// `Inject<Inject<T>>` 的末端 `T`
fn pointer_terminal(ty: &Type) -> &Type {
    let ty = peel(ty);
    match last_segment(ty) {
        Some(segment) if segment.ident == "Inject" => {
            first_generic(segment).map_or(ty, pointer_terminal)
        }
        _ => ty,
    }
}

fn peel(ty: &Type) -> &Type {
    match ty {
        Type::Paren(paren) => peel(&paren.elem),
        Type::Group(group) => peel(&group.elem),
        other => other,
    }
}

fn last_segment(ty: &Type) -> Option<&PathSegment> {
    match ty {
        Type::Path(path) if path.qself.is_none() => path.path.segments.last(),
        _ => None,
    }
}

fn first_generic(segment: &PathSegment) -> Option<&Type> {
    match &segment.arguments {
        PathArguments::AngleBracketed(args) => args.args.iter().find_map(|arg| match arg {
            GenericArgument::Type(ty) => Some(ty),
            _ => None,
        }),
        _ => None,
    }
}

/// 类型的紧凑源码文本
pub fn type_text(ty: &Type) -> String {
    ty.to_token_stream()
        .to_string()
        .replace(" :: ", "::")
        .replace(":: ", "::")
        .replace(" < ", "<")
        .replace("< ", "<")
        .replace(" <", "<")
        .replace(" >", ">")
        .replace(" ,", ",")
}

/// 注解中是否静态声明了 `skip[true]`
pub fn is_statically_skipped(annotation: Option<&str>) -> bool {
    wiring_common::Directives::new(annotation)
        .skip()
        .unwrap_or(false)
}
