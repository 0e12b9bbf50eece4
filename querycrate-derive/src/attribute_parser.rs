use super::structs::{FieldMeta, QueryMeta, RenameRule};
use syn::parse::Parser;
use syn::{Lit, Meta, punctuated::Punctuated, token::Comma};

/// Parse the comma-separated items of every `#[query(...)]` attribute in `attrs`
fn query_items(attrs: &[syn::Attribute]) -> Result<Vec<Meta>, syn::Error> {
    let mut items = Vec::new();
    for attr in attrs {
        if attr.path().is_ident("query") {
            let Meta::List(meta_list) = &attr.meta else {
                return Err(syn::Error::new_spanned(attr, "expected #[query(...)]"));
            };
            let metas =
                Punctuated::<Meta, Comma>::parse_terminated.parse2(meta_list.tokens.clone())?;
            items.extend(metas);
        }
    }
    Ok(items)
}

fn string_value(nv: &syn::MetaNameValue) -> Result<syn::LitStr, syn::Error> {
    if let syn::Expr::Lit(expr_lit) = &nv.value
        && let Lit::Str(s) = &expr_lit.lit
    {
        Ok(s.clone())
    } else {
        Err(syn::Error::new_spanned(
            &nv.value,
            format!(
                "`{}` expects a string literal",
                nv.path.get_ident().map(ToString::to_string).unwrap_or_default()
            ),
        ))
    }
}

/// Parses query metadata from struct-level attributes.
/// Looks for `#[query(...)]` attributes and extracts configuration.
pub(crate) fn parse_query_meta(attrs: &[syn::Attribute]) -> Result<QueryMeta, syn::Error> {
    let mut meta = QueryMeta::default();

    for item in query_items(attrs)? {
        match item {
            Meta::NameValue(nv) if nv.path.is_ident("sql") => {
                meta.sql = Some(string_value(&nv)?);
            }
            Meta::NameValue(nv) if nv.path.is_ident("output") => {
                let value = string_value(&nv)?;
                meta.output = Some(value.parse::<syn::Type>().map_err(|_| {
                    syn::Error::new_spanned(&value, "`output` must name a type")
                })?);
            }
            Meta::NameValue(nv) if nv.path.is_ident("name") => {
                meta.name = Some(string_value(&nv)?.value());
            }
            Meta::NameValue(nv) if nv.path.is_ident("rename_all") => {
                let value = string_value(&nv)?;
                meta.rename_all = RenameRule::from_name(&value.value()).ok_or_else(|| {
                    syn::Error::new_spanned(
                        &value,
                        "rename_all must be one of \"PascalCase\", \"camelCase\", \"snake_case\"",
                    )
                })?;
            }
            // Handle path values: sort_options = ORG_SORTS
            Meta::NameValue(nv) if nv.path.is_ident("sort_options") => {
                let syn::Expr::Path(expr_path) = &nv.value else {
                    return Err(syn::Error::new_spanned(
                        &nv.value,
                        "`sort_options` expects the path of a const or static",
                    ));
                };
                meta.sort_options = Some(expr_path.path.clone());
            }
            other => {
                return Err(syn::Error::new_spanned(other, "unknown query attribute"));
            }
        }
    }
    Ok(meta)
}

/// Parses `#[query(expr = "...", test = <value>, rename = "...", skip)]` on a field.
pub(crate) fn parse_field_meta(field: &syn::Field) -> Result<FieldMeta, syn::Error> {
    let mut meta = FieldMeta::default();

    for item in query_items(&field.attrs)? {
        match item {
            Meta::NameValue(nv) if nv.path.is_ident("expr") => {
                meta.expr = Some(string_value(&nv)?);
            }
            Meta::NameValue(nv) if nv.path.is_ident("rename") => {
                meta.rename = Some(string_value(&nv)?.value());
            }
            // Any expression; evaluated when the self-test runs
            Meta::NameValue(nv) if nv.path.is_ident("test") => {
                meta.test = Some(nv.value);
            }
            Meta::Path(path) if path.is_ident("skip") => {
                meta.skip = true;
            }
            other => {
                return Err(syn::Error::new_spanned(other, "unknown query field attribute"));
            }
        }
    }
    Ok(meta)
}
