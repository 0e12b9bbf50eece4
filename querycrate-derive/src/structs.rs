use heck::{ToLowerCamelCase, ToPascalCase, ToSnakeCase};

/// How field names become criterion and parameter names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum RenameRule {
    /// Use the Rust field name as written
    #[default]
    None,
    PascalCase,
    CamelCase,
    SnakeCase,
}

impl RenameRule {
    pub(crate) fn from_name(value: &str) -> Option<Self> {
        match value {
            "PascalCase" => Some(Self::PascalCase),
            "camelCase" => Some(Self::CamelCase),
            "snake_case" => Some(Self::SnakeCase),
            _ => None,
        }
    }

    pub(crate) fn apply(self, name: &str) -> String {
        match self {
            Self::None => name.to_string(),
            Self::PascalCase => name.to_pascal_case(),
            Self::CamelCase => name.to_lower_camel_case(),
            Self::SnakeCase => name.to_snake_case(),
        }
    }
}

/// Struct-level `#[query(...)]` configuration
#[derive(Default)]
pub(crate) struct QueryMeta {
    pub(crate) sql: Option<syn::LitStr>,
    pub(crate) output: Option<syn::Type>,
    pub(crate) sort_options: Option<syn::Path>,
    pub(crate) name: Option<String>,
    pub(crate) rename_all: RenameRule,
}

/// Field-level `#[query(...)]` configuration
#[derive(Default)]
pub(crate) struct FieldMeta {
    pub(crate) expr: Option<syn::LitStr>,
    pub(crate) test: Option<syn::Expr>,
    pub(crate) rename: Option<String>,
    pub(crate) skip: bool,
}

/// A field that takes part in the query, with its configuration resolved
pub(crate) struct CriterionField<'a> {
    pub(crate) ident: &'a syn::Ident,
    /// Criterion and parameter name after renaming
    pub(crate) name: String,
    pub(crate) meta: FieldMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rename_rules() {
        assert_eq!(RenameRule::PascalCase.apply("org_id"), "OrgId");
        assert_eq!(RenameRule::CamelCase.apply("org_id"), "orgId");
        assert_eq!(RenameRule::SnakeCase.apply("OrgId"), "org_id");
        assert_eq!(RenameRule::None.apply("org_id"), "org_id");
        assert_eq!(RenameRule::from_name("kebab-case"), None);
    }
}
