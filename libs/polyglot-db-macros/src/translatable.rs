use heck::ToUpperCamelCase;
use proc_macro_error2::abort;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{Data, DeriveInput, spanned::Spanned};

const DEFAULT_MASTER_COL: &str = "master_id";
const DEFAULT_LANGUAGE_COL: &str = "language_code";

/// Configuration parsed from `#[translatable(...)]` attributes
#[derive(Default)]
struct TranslatableConfig {
    shared: Option<(syn::Path, Span)>,
    master_col: Option<(String, Span)>,
    language_col: Option<(String, Span)>,
}

#[allow(clippy::needless_pass_by_value)] // DeriveInput is consumed by proc-macro pattern
pub fn expand_derive_translatable(input: DeriveInput) -> TokenStream {
    if !matches!(&input.data, Data::Struct(_)) {
        abort!(
            input.ident.span(),
            "#[derive(Translatable)] can only be applied to structs"
        );
    }

    let config = parse_translatable_attrs(&input);

    let Some((shared, _)) = config.shared else {
        abort!(
            input.ident.span(),
            "translatable: missing shared entity, use `#[translatable(shared = \"path::to::Entity\")]`"
        );
    };

    let span = input.ident.span();
    let entity_ident = syn::Ident::new("Entity", span);
    let master_variant = column_variant(config.master_col.as_ref(), DEFAULT_MASTER_COL, span);
    let language_variant =
        column_variant(config.language_col.as_ref(), DEFAULT_LANGUAGE_COL, span);

    quote! {
        impl ::polyglot_db::TranslatableEntity for #entity_ident {
            type Shared = #shared;

            fn master_col() -> Column {
                Column::#master_variant
            }

            fn language_col() -> Column {
                Column::#language_variant
            }

            fn master_relation() -> ::polyglot_db::sea_orm::RelationDef {
                <Self as ::polyglot_db::sea_orm::Related<#shared>>::to()
            }
        }
    }
}

/// Resolve the `Column` enum variant for a configured (or default) column name
fn column_variant(col: Option<&(String, Span)>, default: &str, span: Span) -> syn::Ident {
    let name = col.map_or(default, |(name, _)| name.as_str());
    syn::Ident::new(&snake_to_upper_camel(name), span)
}

/// Parse all `#[translatable(...)]` attributes with duplicate detection
fn parse_translatable_attrs(input: &DeriveInput) -> TranslatableConfig {
    let mut config = TranslatableConfig::default();

    for attr in &input.attrs {
        if !attr.path().is_ident("translatable") {
            continue;
        }

        let result = attr.parse_nested_meta(|meta| {
            let span = meta.path.span();

            let key = meta
                .path
                .get_ident()
                .map(ToString::to_string)
                .unwrap_or_default();

            if key.is_empty() {
                abort!(span, "Expected attribute name");
            }

            let value: String = match meta.value() {
                Ok(v) => match v.parse::<syn::LitStr>() {
                    Ok(lit) => lit.value(),
                    Err(_) => abort!(span, "Expected string literal"),
                },
                Err(_) => abort!(span, "Expected '=' followed by a string value"),
            };

            match key.as_str() {
                "shared" => {
                    if config.shared.is_some() {
                        abort!(span, "duplicate attribute 'shared'");
                    }
                    let Ok(path) = syn::parse_str::<syn::Path>(&value) else {
                        abort!(span, "translatable: `shared` must be a type path, got '{}'", value);
                    };
                    config.shared = Some((path, span));
                }
                "master_col" => {
                    if config.master_col.is_some() {
                        abort!(span, "duplicate attribute 'master_col'");
                    }
                    config.master_col = Some((value, span));
                }
                "language_col" => {
                    if config.language_col.is_some() {
                        abort!(span, "duplicate attribute 'language_col'");
                    }
                    config.language_col = Some((value, span));
                }
                _ => {
                    abort!(
                        span,
                        "Unknown attribute '{}'. Valid attributes: shared, master_col, language_col",
                        key
                    );
                }
            }

            Ok(())
        });

        if let Err(err) = result {
            abort!(err.span(), "{}", err);
        }
    }

    config
}

/// Convert `snake_case` to `UpperCamelCase` for enum variant names
fn snake_to_upper_camel(s: &str) -> String {
    s.to_upper_camel_case()
}
