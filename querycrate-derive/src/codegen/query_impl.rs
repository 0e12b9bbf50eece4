use proc_macro2::TokenStream;
use quote::quote;

use crate::structs::{CriterionField, QueryMeta};

fn generate_criterion(field: &CriterionField<'_>) -> TokenStream {
    let ident = field.ident;
    let name = &field.name;

    let expression = field.meta.expr.as_ref().map(|expr| {
        quote! { .with_expression(#expr) }
    });
    let test_value = field.meta.test.as_ref().map(|test| {
        quote! { .with_test_value(::querycrate::param_value(&(#test))) }
    });

    quote! {
        ::querycrate::Criterion::new(#name, ::querycrate::param_value(&self.#ident))
            #expression
            #test_value
    }
}

fn generate_sort_options(meta: &QueryMeta) -> Option<TokenStream> {
    meta.sort_options.as_ref().map(|path| {
        quote! {
            fn sort_options() -> Option<&'static [::querycrate::SortOption]> {
                let options: &'static [::querycrate::SortOption] = &#path;
                Some(options)
            }
        }
    })
}

/// Generate `impl querycrate::Query`. `sql` and `output` are required.
pub(crate) fn generate_query_impl(
    input: &syn::DeriveInput,
    meta: &QueryMeta,
    fields: &[CriterionField<'_>],
) -> Result<TokenStream, syn::Error> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let sql = meta.sql.as_ref().ok_or_else(|| {
        syn::Error::new_spanned(ident, "missing #[query(sql = \"...\")]")
    })?;
    let output = meta.output.as_ref().ok_or_else(|| {
        syn::Error::new_spanned(ident, "missing #[query(output = \"RowType\")]")
    })?;
    let query_name = meta.name.clone().unwrap_or_else(|| ident.to_string());

    let sort_options = generate_sort_options(meta);
    let criteria = fields.iter().map(generate_criterion);
    let parameters = fields.iter().map(|field| {
        let field_ident = field.ident;
        let name = &field.name;
        quote! { .with(#name, &self.#field_ident) }
    });

    Ok(quote! {
        impl #impl_generics ::querycrate::Query for #ident #ty_generics #where_clause {
            type Output = #output;

            const NAME: &'static str = #query_name;

            fn template() -> &'static ::querycrate::QueryTemplate {
                ::querycrate::query_template!(#sql)
            }

            #sort_options

            fn criteria(&self) -> Vec<::querycrate::Criterion> {
                vec![#(#criteria),*]
            }

            fn parameters(&self) -> ::querycrate::ParameterBag {
                ::querycrate::ParameterBag::new()
                    #(#parameters)*
            }
        }
    })
}
