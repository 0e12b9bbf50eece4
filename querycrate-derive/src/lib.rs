mod attribute_parser;
mod codegen;
mod field_analyzer;
mod structs;

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

/// Implements `querycrate::Query` for a struct whose fields are the optional criteria of a SQL
/// template.
///
/// Struct attributes:
///
/// - `sql = "..."` (required): the template, with optional `{where}`, `{andWhere}`, `{orderBy}`
/// - `output = "Type"` (required): the row type, which must implement `sea_orm::FromQueryResult`
/// - `sort_options = PATH`: a `&[SortOption]` const or a `[SortOption; N]` static
/// - `rename_all = "PascalCase" | "camelCase" | "snake_case"`: how field names become parameter names
/// - `name = "..."`: name used in errors, defaults to the struct name
///
/// Field attributes:
///
/// - `expr = "..."`: SQL fragment for the criterion, defaults to `[Name]=@Name`
/// - `test = <expr>`: sample value used by `Query::self_test`
/// - `rename = "..."`: parameter name for this field
/// - `skip`: leave the field out entirely
///
/// Every other field is both a criterion and a parameter, and must implement `serde::Serialize`.
/// A field referenced by the template itself (`@orgId`) is bound but never turned into a
/// criterion.
///
/// ```rust,ignore
/// use querycrate::{Query, SortOption};
///
/// const ORG_SORTS: &[SortOption] = &[SortOption::new("Name", "[Name]")];
///
/// #[derive(Default, Query)]
/// #[query(
///     sql = "SELECT * FROM [dbo].[Organization] {where} {orderBy}",
///     output = "Organization",
///     sort_options = ORG_SORTS,
///     rename_all = "PascalCase"
/// )]
/// pub struct AllOrgs {
///     #[query(expr = "[Name] LIKE '%' + @name + '%'", test = "sample")]
///     pub name: Option<String>,
/// }
/// ```
#[proc_macro_derive(Query, attributes(query))]
pub fn derive_query(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let meta = match attribute_parser::parse_query_meta(&input.attrs) {
        Ok(meta) => meta,
        Err(e) => return e.to_compile_error().into(),
    };
    let fields = match field_analyzer::analyze_query_fields(&input, meta.rename_all) {
        Ok(fields) => fields,
        Err(e) => return e.to_compile_error().into(),
    };

    match codegen::generate_query_impl(&input, &meta, &fields) {
        Ok(expanded) => TokenStream::from(expanded),
        Err(e) => e.to_compile_error().into(),
    }
}
