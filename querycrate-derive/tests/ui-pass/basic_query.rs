//! Test that a query with one annotated criterion compiles and resolves

use querycrate::Query;
use sea_orm::FromQueryResult;

#[derive(Debug, FromQueryResult)]
pub struct Organization {
    pub id: i32,
    pub name: String,
}

#[derive(Default, Query)]
#[query(
    sql = "SELECT * FROM [dbo].[Organization] {where}",
    output = "Organization",
    rename_all = "PascalCase"
)]
pub struct AllOrgs {
    #[query(expr = "[Name] LIKE '%' + @name + '%'", test = "sample")]
    pub name: Option<String>,
}

fn main() {
    assert_eq!(AllOrgs::NAME, "AllOrgs");

    let query = AllOrgs {
        name: Some("sample".to_string()),
    };
    let resolved = query.resolve(None).unwrap();
    assert_eq!(
        resolved.sql,
        "SELECT * FROM [dbo].[Organization] WHERE [Name] LIKE '%' + @name + '%'"
    );
    assert!(resolved.parameters.lookup("name").is_some());

    let resolved = AllOrgs::default().resolve(None).unwrap();
    assert_eq!(resolved.sql, "SELECT * FROM [dbo].[Organization] ");
}
