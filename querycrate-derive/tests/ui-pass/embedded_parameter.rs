//! Test that a field referenced by the template is bound but not added as a criterion

use querycrate::Query;
use sea_orm::FromQueryResult;

#[derive(Debug, FromQueryResult)]
pub struct Item {
    pub id: i32,
    pub name: String,
}

#[derive(Default, Query)]
#[query(
    sql = "SELECT * FROM [Item] WHERE [OrganizationId]=@orgId {andWhere} ORDER BY [Name]",
    output = "Item",
    rename_all = "PascalCase"
)]
pub struct ItemsInOrg {
    pub org_id: i32,
    pub name: Option<String>,
    #[query(skip)]
    pub label: &'static str,
}

fn main() {
    let query = ItemsInOrg {
        org_id: 1,
        name: None,
        label: "ignored",
    };
    let resolved = query.resolve(None).unwrap();
    assert_eq!(
        resolved.sql,
        "SELECT * FROM [Item] WHERE [OrganizationId]=@orgId  ORDER BY [Name]"
    );
    assert_eq!(resolved.parameters.lookup("orgId"), Some(&serde_json::json!(1)));
    assert!(!resolved.parameters.contains_key("Label"));
    assert_eq!(query.criteria().len(), 2);
}
