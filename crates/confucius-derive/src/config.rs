//! `#[derive(Config)]` implementation.
//!
//! # Generated items
//!
//! 1. `impl Field` - kind `Struct(name)`, never string-coercible, always set,
//!    decoded from a mapping field by field, walked field by field
//! 2. `impl Config` - marks the struct as loadable
//!
//! # Field-level attributes `#[conf(...)]`
//!
//! | Key | Example | Description |
//! |-----|---------|-------------|
//! | `name` | `name = "port"` | Alt name for the `conf` tag |
//! | `tag` | `tag(yaml = "port")` | Alt names for other tag keys |
//! | `required` | `required` | Field must be set after decode and env overlay |
//! | `validate` | `validate = "required"` | Same as `required` |
//! | `default` | `default = "8080"` | Literal applied when the field is unset |
//! | `flatten` | `flatten` | Promote nested fields into this record |
//! | `skip` | `skip` | Field is neither decoded nor walked |

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{
    Attribute, Data, DeriveInput, Field, Fields, Ident, LitStr, parse_quote, spanned::Spanned,
};

/// Tag key `name = "..."` declares an alt name for.
const DEFAULT_TAG: &str = "conf";

// ============================================================================
// Attribute structures
// ============================================================================

/// Per-field `#[conf(...)]` options.
#[derive(Default)]
struct FieldAttrs {
    names: Vec<(String, String)>,
    required: bool,
    default: Option<String>,
    flatten: bool,
    skip: bool,
}

/// A field that takes part in decoding and walking.
struct ConfigField<'a> {
    ident: &'a Ident,
    attrs: FieldAttrs,
}

// ============================================================================
// Entry point
// ============================================================================

pub fn derive_config(input: &DeriveInput) -> syn::Result<TokenStream> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new(
                    input.span(),
                    "Config can only be derived for structs with named fields",
                ));
            }
        },
        Data::Enum(_) => {
            return Err(syn::Error::new(
                input.span(),
                "Config does not support enums",
            ));
        }
        Data::Union(_) => {
            return Err(syn::Error::new(
                input.span(),
                "Config cannot be derived for unions",
            ));
        }
    };

    let mut config_fields = Vec::with_capacity(fields.len());
    for field in fields {
        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        config_fields.push(ConfigField {
            ident: field_ident(field)?,
            attrs,
        });
    }

    Ok(generate_impl(input, &config_fields))
}

fn field_ident(field: &Field) -> syn::Result<&Ident> {
    field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new(field.span(), "expected a named field"))
}

// ============================================================================
// Attribute parsing
// ============================================================================

fn parse_field_attrs(attrs: &[Attribute]) -> syn::Result<FieldAttrs> {
    let mut out = FieldAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("conf") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let name = meta.value()?.parse::<LitStr>()?.value();
                out.names.push((DEFAULT_TAG.to_string(), name));
            } else if meta.path.is_ident("tag") {
                meta.parse_nested_meta(|inner| {
                    let key = inner
                        .path
                        .get_ident()
                        .map(|ident| ident.unraw().to_string())
                        .ok_or_else(|| inner.error("expected a tag key such as `yaml`"))?;
                    let name = inner.value()?.parse::<LitStr>()?.value();
                    out.names.push((key, name));
                    Ok(())
                })?;
            } else if meta.path.is_ident("required") {
                out.required = true;
            } else if meta.path.is_ident("validate") {
                let rule = meta.value()?.parse::<LitStr>()?;
                if rule.value() != "required" {
                    return Err(syn::Error::new(
                        rule.span(),
                        "the only supported validation is \"required\"",
                    ));
                }
                out.required = true;
            } else if meta.path.is_ident("default") {
                out.default = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("flatten") {
                out.flatten = true;
            } else if meta.path.is_ident("skip") {
                out.skip = true;
            } else {
                return Err(meta.error("unknown conf attribute"));
            }
            Ok(())
        })?;
    }

    Ok(out)
}

// ============================================================================
// Code generation
// ============================================================================

fn segment_tokens(field: &ConfigField<'_>) -> TokenStream {
    let ident = field.ident.unraw().to_string();
    let names = field.attrs.names.iter().map(|(tag, name)| quote! { (#tag, #name) });
    let flatten = field.attrs.flatten;
    quote! {
        ::confucius::__private::Segment {
            ident: #ident,
            names: &[#(#names),*],
            flatten: #flatten,
        }
    }
}

fn policy_tokens(field: &ConfigField<'_>) -> TokenStream {
    let required = field.attrs.required;
    let default = match &field.attrs.default {
        Some(value) => quote! { ::core::option::Option::Some(#value) },
        None => quote! { ::core::option::Option::None },
    };
    quote! { ::confucius::__private::Policy::from_annotations(#required, #default) }
}

fn generate_impl(input: &DeriveInput, fields: &[ConfigField<'_>]) -> TokenStream {
    let name = &input.ident;
    let name_str = name.unraw().to_string();

    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param
            .bounds
            .push(parse_quote!(::confucius::__private::Field));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let idents: Vec<&Ident> = fields.iter().map(|f| f.ident).collect();
    let bindings: Vec<Ident> = (0..fields.len())
        .map(|i| Ident::new(&format!("__field{i}"), proc_macro2::Span::call_site()))
        .collect();
    let segments: Vec<TokenStream> = fields.iter().map(segment_tokens).collect();
    let policies: Vec<TokenStream> = fields.iter().map(policy_tokens).collect();

    quote! {
        impl #impl_generics ::confucius::__private::Field for #name #ty_generics #where_clause {
            fn kind() -> ::confucius::__private::Kind {
                ::confucius::__private::Kind::Struct(#name_str)
            }

            fn parse(
                _raw: &str,
                _coercer: &::confucius::__private::Coercer,
            ) -> ::core::result::Result<Self, ::confucius::__private::CoerceError> {
                ::core::result::Result::Err(::confucius::__private::CoerceError::Unsupported {
                    kind: <Self as ::confucius::__private::Field>::kind(),
                })
            }

            fn is_set(&self) -> bool {
                true
            }

            fn decode(
                &mut self,
                node: &::confucius::__private::JsonValue,
                cx: &mut ::confucius::__private::DecodeContext<'_>,
            ) -> ::core::result::Result<(), ::confucius::__private::DecodeError> {
                ::confucius::__private::decode_mapping(self, node, cx)
            }

            #[allow(unused_variables)]
            fn decode_map(
                &mut self,
                map: &::confucius::__private::Tree,
                cx: &mut ::confucius::__private::DecodeContext<'_>,
            ) -> ::core::result::Result<(), ::confucius::__private::DecodeError> {
                let Self { #(#idents: #bindings,)* .. } = self;
                #(
                    {
                        const SEGMENT: ::confucius::__private::Segment = #segments;
                        cx.field(map, &SEGMENT, #bindings)?;
                    }
                )*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn visit<'__a>(
                &'__a mut self,
                walker: &mut ::confucius::__private::Walker<'__a>,
                path: &::confucius::__private::FieldPath,
                policy: ::confucius::__private::Policy,
            ) {
                walker.composite(path, policy, <Self as ::confucius::__private::Field>::kind(), true);
                let Self { #(#idents: #bindings,)* .. } = self;
                #(
                    {
                        const SEGMENT: ::confucius::__private::Segment = #segments;
                        let child = walker.child_path(path, &SEGMENT);
                        ::confucius::__private::Field::visit(#bindings, walker, &child, #policies);
                    }
                )*
            }
        }

        impl #impl_generics ::confucius::__private::Config for #name #ty_generics #where_clause {}
    }
}
