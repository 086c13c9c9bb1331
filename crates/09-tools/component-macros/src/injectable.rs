//! Injectable 派生宏实现

use crate::utils::{classify, is_statically_skipped, type_text, FixedShape, Shape};
use proc_macro2::TokenStream;
use quote::{quote, ToTokens};
use syn::{
    parenthesized, punctuated::Punctuated, Attribute, Data, DeriveInput, Expr, Field, Fields,
    Lit, LitStr, Meta, Result, Token, Type,
};

/// 结构体级参数 `#[injectable(implements(dyn A, dyn B), qualifier)]`
#[derive(Debug, Default)]
pub struct InjectableArgs {
    /// 声明实现的接口
    pub interfaces: Vec<Type>,
    /// 是否实现了 `Qualifier`
    pub qualifier: bool,
}

impl InjectableArgs {
    fn from_attributes(attrs: &[Attribute]) -> Result<Self> {
        let mut args = Self::default();

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("injectable")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("implements") {
                    let content;
                    parenthesized!(content in meta.input);
                    let types = Punctuated::<Type, Token![,]>::parse_terminated(&content)?;
                    for ty in types {
                        if !matches!(ty, Type::TraitObject(_)) {
                            return Err(syn::Error::new_spanned(
                                ty,
                                "implements 只接受 `dyn Trait` 形式的接口",
                            ));
                        }
                        args.interfaces.push(ty);
                    }
                    Ok(())
                } else if meta.path.is_ident("qualifier") {
                    args.qualifier = true;
                    Ok(())
                } else {
                    Err(meta.error("不支持的 injectable 参数"))
                }
            })?;
        }

        Ok(args)
    }
}

/// 读取字段注解
///
/// `#[inject]` 视为空注解，`#[inject("...")]` 与 `#[inject = "..."]` 等价。
fn field_annotation(field: &Field) -> Result<Option<String>> {
    let mut annotation = None;

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("inject")) {
        if annotation.is_some() {
            return Err(syn::Error::new_spanned(attr, "每个字段只能有一个 #[inject] 注解"));
        }
        let value = match &attr.meta {
            Meta::Path(_) => String::new(),
            Meta::List(_) => attr.parse_args::<LitStr>()?.value(),
            Meta::NameValue(name_value) => match &name_value.value {
                Expr::Lit(expr_lit) => match &expr_lit.lit {
                    Lit::Str(lit_str) => lit_str.value(),
                    other => return Err(syn::Error::new_spanned(other, "注解必须是字符串")),
                },
                other => return Err(syn::Error::new_spanned(other, "注解必须是字符串")),
            },
        };
        annotation = Some(value);
    }

    Ok(annotation)
}

/// 单个字段的生成结果
struct FieldTokens {
    descriptor: TokenStream,
    slot: TokenStream,
}

fn expand_field(index: usize, field: &Field) -> Result<FieldTokens> {
    let annotation = field_annotation(field)?;
    let member = match &field.ident {
        Some(ident) => ident.to_token_stream(),
        None => syn::Index::from(index).to_token_stream(),
    };
    let name = field
        .ident
        .as_ref()
        .map_or_else(|| index.to_string(), ToString::to_string);
    let type_name = type_text(&field.ty);

    let shape = if is_statically_skipped(annotation.as_deref()) {
        Shape::Unsupported
    } else {
        classify(&field.ty)
    };

    let krate = quote!(::wiring_abstractions);
    let (kind, slot, extra) = match &shape {
        Shape::Interface { interface } => (
            quote!(Interface),
            quote!(#krate::FieldSlot::Interface(&self.#member)),
            quote!(.interface::<#interface>()),
        ),
        Shape::Pointer { terminal } => (
            quote!(Pointer),
            quote!(#krate::FieldSlot::Pointer(&self.#member)),
            quote!(.target(<#terminal as #krate::Injectable>::type_descriptor)),
        ),
        Shape::Struct { target } => (
            quote!(Struct),
            quote!(#krate::FieldSlot::Struct(&self.#member)),
            quote!(.target(<#target as #krate::Injectable>::type_descriptor)),
        ),
        Shape::Nested => {
            let ty = &field.ty;
            (
                quote!(Nested),
                quote!(#krate::FieldSlot::Nested(&self.#member)),
                quote!(.target(<#ty as #krate::Injectable>::type_descriptor)),
            )
        }
        Shape::Text => (
            quote!(Text),
            quote!(#krate::FieldSlot::Text(&self.#member)),
            quote!(),
        ),
        Shape::Map => (
            quote!(Map),
            quote!(#krate::FieldSlot::Map(&self.#member)),
            quote!(),
        ),
        Shape::Channel => (
            quote!(Channel),
            quote!(#krate::FieldSlot::Channel(&self.#member)),
            quote!(),
        ),
        Shape::Slice => (
            quote!(Slice),
            quote!(#krate::FieldSlot::Slice(&self.#member)),
            quote!(),
        ),
        Shape::Scalar => (
            quote!(Scalar),
            quote!(#krate::FieldSlot::Scalar(&self.#member)),
            quote!(),
        ),
        Shape::Fixed(fixed) => {
            let fixed = match fixed {
                FixedShape::Text => quote!(Text),
                FixedShape::Slice => quote!(Slice),
                FixedShape::Map => quote!(Map),
            };
            (
                quote!(Fixed(#krate::FixedKind::#fixed)),
                quote!(#krate::FieldSlot::Fixed(#krate::FixedKind::#fixed)),
                quote!(),
            )
        }
        Shape::Unsupported => (
            quote!(Unsupported),
            quote!(#krate::FieldSlot::Unsupported),
            quote!(),
        ),
    };

    let annotated = annotation.map(|annotation| quote!(.annotated(#annotation)));

    Ok(FieldTokens {
        descriptor: quote! {
            #krate::FieldDescriptor::new(#name, #type_name, #krate::FieldKind::#kind)
                #annotated
                #extra
        },
        slot,
    })
}

/// 实现 #[derive(Injectable)]
pub fn expand(input: &DeriveInput) -> Result<TokenStream> {
    let ident = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Injectable 不支持泛型结构体",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => named.named.iter().collect::<Vec<_>>(),
            Fields::Unnamed(unnamed) => unnamed.unnamed.iter().collect(),
            Fields::Unit => Vec::new(),
        },
        Data::Enum(_) | Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                ident,
                "Injectable 只能用于结构体",
            ))
        }
    };

    let args = InjectableArgs::from_attributes(&input.attrs)?;
    let expanded = fields
        .iter()
        .enumerate()
        .map(|(index, field)| expand_field(index, field))
        .collect::<Result<Vec<_>>>()?;

    let krate = quote!(::wiring_abstractions);
    let name = ident.to_string();
    let field_descriptors = expanded.iter().map(|field| &field.descriptor);
    let visits = expanded.iter().enumerate().map(|(index, field)| {
        let slot = &field.slot;
        quote!(visitor.visit(#index, #slot)?;)
    });

    let casts = args.interfaces.iter().map(|interface| {
        let interface_name = type_text(interface);
        quote! {
            .implements(#krate::InterfaceCast::new::<#interface>(
                #interface_name,
                |instance: ::std::sync::Arc<dyn ::core::any::Any + ::core::marker::Send + ::core::marker::Sync>| {
                    instance.downcast::<#ident>().ok().map(|value| {
                        ::std::boxed::Box::new(value as ::std::sync::Arc<#interface>)
                            as ::std::boxed::Box<dyn ::core::any::Any + ::core::marker::Send + ::core::marker::Sync>
                    })
                },
            ))
        }
    });

    let qualifier = args
        .qualifier
        .then(|| quote!(.qualified_by(#krate::qualify::<#ident>)));

    Ok(quote! {
        impl #krate::Injectable for #ident {
            fn type_descriptor() -> &'static #krate::TypeDescriptor {
                static DESCRIPTOR: #krate::__private::Lazy<#krate::TypeDescriptor> =
                    #krate::__private::Lazy::new(|| {
                        #krate::TypeDescriptor::new::<#ident>(
                            ::core::concat!(::core::module_path!(), "::", #name),
                        )
                        #(.field(#field_descriptors))*
                        #(#casts)*
                        #qualifier
                    });
                &DESCRIPTOR
            }

            fn descriptor(&self) -> &'static #krate::TypeDescriptor {
                <Self as #krate::Injectable>::type_descriptor()
            }

            #[allow(unused_variables)]
            fn visit_fields(
                &self,
                visitor: &mut dyn #krate::FieldVisitor,
            ) -> #krate::AssemblyResult<()> {
                #(#visits)*
                ::core::result::Result::Ok(())
            }
        }

        impl #krate::Pointee for #ident {
            fn allocate() -> Self {
                <Self as ::core::default::Default>::default()
            }

            fn terminal(&self) -> ::core::option::Option<&dyn #krate::Injectable> {
                ::core::option::Option::Some(self)
            }
        }
    })
}
