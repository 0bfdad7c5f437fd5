//! Derive macros for service-manager
//!
//! `#[derive(Inject)]` implements `service_manager::Inject` for a struct,
//! declaring which fields are filled from other named services.
//!
//! # Example
//!
//! ```rust,ignore
//! use service_manager::{Constructed, Inject, ServiceManager};
//! use std::sync::Arc;
//!
//! trait Adder: Send + Sync {
//!     fn add(&self, a: i64, b: i64) -> i64;
//! }
//!
//! struct Log { prefix: String }
//!
//! #[derive(Default, Inject)]
//! struct Calculator {
//!     #[inject("Add")]
//!     adder: Option<Arc<dyn Adder>>,
//!     #[inject(name = "Log")]
//!     log: Option<Arc<Log>>,
//!     // Fields without #[inject] are left alone
//!     calls: u64,
//! }
//!
//! let manager = ServiceManager::new();
//! manager.set("Calc", |_| Ok(Constructed::injectable(Calculator::default())))?;
//! ```

use proc_macro::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Attribute, Data, DeriveInput, Expr, ExprLit, Fields, Lit, LitStr, Meta, Type, parse_macro_input};

/// Derive macro for field injection.
///
/// # Attributes
///
/// - `#[inject("Name")]` - fill the field with the service registered as `Name`
/// - `#[inject(name = "Name")]` - same, spelled out
/// - `#[inject]` - the service name is the field name
///
/// Injected fields must have type `Option<Arc<T>>`; they are `None` until the
/// manager fills them. When `T` is a trait object (`Option<Arc<dyn Trait>>`)
/// the service must have been published with `Constructed::shared`.
///
/// # Generated Code
///
/// ```rust,ignore
/// impl Inject for Calculator {
///     fn injection_points(&self) -> &'static [InjectionPoint] {
///         const POINTS: &[InjectionPoint] = &[
///             InjectionPoint::new("adder", "Add"),
///             InjectionPoint::new("log", "Log"),
///         ];
///         POINTS
///     }
///
///     fn set_injection(&mut self, field: &str, value: &Instance) -> Result<()> {
///         match field {
///             "adder" => { self.adder = Some(value.downcast_shared::<dyn Adder>()?); Ok(()) }
///             "log" => { self.log = Some(value.downcast::<Log>()?); Ok(()) }
///             _ => Err(ServiceError::unknown_field::<Self>(field)),
///         }
///     }
/// }
/// ```
#[proc_macro_derive(Inject, attributes(inject))]
pub fn derive_inject(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand_inject(&input) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(err) => err.to_compile_error().into(),
    }
}

/// One `#[inject]` field
struct Binding<'a> {
    ident: &'a syn::Ident,
    field: String,
    service: String,
    inner: &'a Type,
    shared: bool,
}

fn expand_inject(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // Only support structs with named fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Inject can only be derived for structs with named fields",
                ));
            }
        },
        _ => return Err(syn::Error::new_spanned(input, "Inject can only be derived for structs")),
    };

    let mut bindings = Vec::new();

    for field in fields.iter() {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let Some(attr) = find_inject_attr(&field.attrs)? else {
            continue;
        };

        let field_name = ident.unraw().to_string();
        let service = service_name(attr, &field_name)?;

        let Some(inner) = extract_option_arc_inner_type(&field.ty) else {
            return Err(syn::Error::new_spanned(
                &field.ty,
                "Fields marked with #[inject] must have type Option<Arc<T>>",
            ));
        };

        bindings.push(Binding {
            ident,
            field: field_name,
            service,
            inner,
            shared: is_trait_object(inner),
        });
    }

    let points = bindings.iter().map(|b| {
        let (field, service) = (&b.field, &b.service);
        quote! { ::service_manager::InjectionPoint::new(#field, #service) }
    });

    let arms = bindings.iter().map(|b| {
        let (ident, field, inner) = (b.ident, &b.field, b.inner);
        let recover = if b.shared {
            quote! { value.downcast_shared::<#inner>()? }
        } else {
            quote! { value.downcast::<#inner>()? }
        };
        quote! {
            #field => {
                self.#ident = ::std::option::Option::Some(#recover);
                ::std::result::Result::Ok(())
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::service_manager::Inject for #name #ty_generics #where_clause {
            fn injection_points(&self) -> &'static [::service_manager::InjectionPoint] {
                const POINTS: &[::service_manager::InjectionPoint] = &[#(#points),*];
                POINTS
            }

            #[allow(unused_variables)]
            fn set_injection(
                &mut self,
                field: &str,
                value: &::service_manager::Instance,
            ) -> ::service_manager::Result<()> {
                match field {
                    #(#arms)*
                    _ => ::std::result::Result::Err(
                        ::service_manager::ServiceError::unknown_field::<Self>(field)
                    ),
                }
            }
        }
    })
}

/// Find the #[inject] attribute, rejecting duplicates
fn find_inject_attr(attrs: &[Attribute]) -> syn::Result<Option<&Attribute>> {
    let mut found = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("inject")) {
        if found.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate #[inject] attribute"));
        }
        found = Some(attr);
    }
    Ok(found)
}

/// Service name from `#[inject]`, `#[inject("Name")]`, `#[inject(name = "Name")]`
/// or `#[inject = "Name"]`
fn service_name(attr: &Attribute, field_name: &str) -> syn::Result<String> {
    let lit = match &attr.meta {
        Meta::Path(_) => return Ok(field_name.to_owned()),
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(ExprLit { lit: Lit::Str(s), .. }) => s.clone(),
            other => return Err(syn::Error::new_spanned(other, "expected a string literal")),
        },
        Meta::List(list) => {
            if let Ok(lit) = list.parse_args::<LitStr>() {
                lit
            } else {
                let mut name = None;
                list.parse_nested_meta(|meta| {
                    if meta.path.is_ident("name") {
                        name = Some(meta.value()?.parse::<LitStr>()?);
                        Ok(())
                    } else {
                        Err(meta.error("expected `name = \"...\"` or a service name string"))
                    }
                })?;
                name.ok_or_else(|| syn::Error::new_spanned(list, "missing service name"))?
            }
        }
    };

    let service = lit.value();
    if service.is_empty() {
        return Err(syn::Error::new_spanned(lit, "service name must not be empty"));
    }
    Ok(service)
}

/// Whether the type is `dyn Trait`, possibly parenthesized
fn is_trait_object(ty: &Type) -> bool {
    match ty {
        Type::TraitObject(_) => true,
        Type::Paren(paren) => is_trait_object(&paren.elem),
        Type::Group(group) => is_trait_object(&group.elem),
        _ => false,
    }
}

/// Extract T from Arc<T>
fn extract_arc_inner_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident == "Arc" {
            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                    return Some(inner);
                }
            }
        }
    }
    None
}

/// Extract T from Option<Arc<T>>
fn extract_option_arc_inner_type(ty: &Type) -> Option<&Type> {
    if let Type::Path(type_path) = ty {
        let segment = type_path.path.segments.last()?;
        if segment.ident == "Option" {
            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                    return extract_arc_inner_type(inner);
                }
            }
        }
    }
    None
}
