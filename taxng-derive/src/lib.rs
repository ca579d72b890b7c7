use proc_macro::TokenStream;
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{parse_macro_input, Data, DeriveInput, Fields, Lit, LitStr, Meta, Token, Type};

/// Derive macro that generates input field metadata from struct fields.
///
/// For each field, extracts:
/// - Field name (respects #[serde(rename = "...")])
/// - Required (false if the field is Option<T> or carries #[serde(default)])
/// - Description (from doc comments)
///
/// Fields marked #[serde(skip)] or #[serde(flatten)] are left out.
///
/// Generates an `input_fields() -> &'static [InputField]` method. `InputField`
/// must be in scope where the derive is used.
#[proc_macro_derive(InputFields, attributes(serde))]
pub fn derive_input_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => panic!("InputFields only supports structs with named fields"),
        },
        _ => panic!("InputFields only supports structs"),
    };

    let mut field_info = Vec::new();
    for field in fields {
        let options = match serde_options(&field.attrs) {
            Ok(options) => options,
            Err(err) => return err.to_compile_error().into(),
        };
        if options.skip {
            continue;
        }

        let field_name = field.ident.as_ref().unwrap().to_string();
        let input_name = options.rename.unwrap_or(field_name);
        let required = !options.default && !is_option_type(&field.ty);
        let doc = get_doc_comment(&field.attrs);

        field_info.push((input_name, required, doc));
    }

    let field_entries = field_info.iter().map(|(name, required, desc)| {
        quote! {
            InputField {
                name: #name,
                required: #required,
                description: #desc,
            }
        }
    });

    let expanded = quote! {
        impl #name {
            pub fn input_fields() -> &'static [InputField] {
                static FIELDS: &[InputField] = &[
                    #(#field_entries),*
                ];
                FIELDS
            }
        }
    };

    TokenStream::from(expanded)
}

#[derive(Default)]
struct SerdeOptions {
    rename: Option<String>,
    default: bool,
    skip: bool,
}

fn serde_options(attrs: &[syn::Attribute]) -> syn::Result<SerdeOptions> {
    let mut options = SerdeOptions::default();
    for attr in attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                if meta.input.peek(Token![=]) {
                    let value: LitStr = meta.value()?.parse()?;
                    options.rename = Some(value.value());
                } else {
                    // rename(serialize = "...", deserialize = "...")
                    meta.parse_nested_meta(|inner| {
                        let value: LitStr = inner.value()?.parse()?;
                        if inner.path.is_ident("deserialize") {
                            options.rename = Some(value.value());
                        }
                        Ok(())
                    })?;
                }
            } else if meta.path.is_ident("default") {
                options.default = true;
                if meta.input.peek(Token![=]) {
                    let _: LitStr = meta.value()?.parse()?;
                }
            } else if meta.path.is_ident("skip")
                || meta.path.is_ident("skip_deserializing")
                || meta.path.is_ident("flatten")
            {
                options.skip = true;
            } else {
                skip_option(meta)?;
            }
            Ok(())
        })?;
    }
    Ok(options)
}

/// Consume an unrecognised serde option, including any `key = value` or list form
fn skip_option(meta: ParseNestedMeta) -> syn::Result<()> {
    if meta.input.peek(Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        meta.parse_nested_meta(skip_option)?;
    }
    Ok(())
}

fn get_doc_comment(attrs: &[syn::Attribute]) -> String {
    attrs
        .iter()
        .filter_map(|attr| {
            if !attr.path().is_ident("doc") {
                return None;
            }
            if let Meta::NameValue(meta) = &attr.meta {
                if let syn::Expr::Lit(expr_lit) = &meta.value {
                    if let Lit::Str(lit_str) = &expr_lit.lit {
                        return Some(lit_str.value().trim().to_string());
                    }
                }
            }
            None
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_option_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "Option";
        }
    }
    false
}
