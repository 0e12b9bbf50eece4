use syn::{Data, DeriveInput, Fields};

use crate::attribute_parser::parse_field_meta;
use crate::structs::{CriterionField, RenameRule};

/// Collect the fields that become criteria and parameters, in declaration order.
/// Unit structs declare none; tuple structs and enums are rejected.
pub(crate) fn analyze_query_fields(
    input: &DeriveInput,
    rename_all: RenameRule,
) -> Result<Vec<CriterionField<'_>>, syn::Error> {
    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            input,
            "Query can only be derived for structs",
        ));
    };

    let named = match &data.fields {
        Fields::Named(named) => &named.named,
        Fields::Unit => return Ok(Vec::new()),
        Fields::Unnamed(_) => {
            return Err(syn::Error::new_spanned(
                &data.fields,
                "Query only supports structs with named fields",
            ));
        }
    };

    let mut fields = Vec::with_capacity(named.len());
    for field in named {
        let meta = parse_field_meta(field)?;
        if meta.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let name = meta
            .rename
            .clone()
            .unwrap_or_else(|| rename_all.apply(&ident.to_string()));
        fields.push(CriterionField { ident, name, meta });
    }

    check_unique_names(&fields)?;
    Ok(fields)
}

/// Parameter lookup ignores case, so two names differing only in case would be ambiguous
fn check_unique_names(fields: &[CriterionField<'_>]) -> Result<(), syn::Error> {
    for (i, field) in fields.iter().enumerate() {
        if let Some(other) = fields[..i]
            .iter()
            .find(|other| other.name.eq_ignore_ascii_case(&field.name))
        {
            return Err(syn::Error::new_spanned(
                field.ident,
                format!(
                    "parameter name `{}` is already used by field `{}`",
                    field.name, other.ident
                ),
            ));
        }
    }
    Ok(())
}
