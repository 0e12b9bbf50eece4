//! Test sort options declared as a const slice and as a static array

use querycrate::{Query, QueryError, SortOption};
use sea_orm::FromQueryResult;

#[derive(Debug, FromQueryResult)]
pub struct Item {
    pub id: i32,
}

const ITEM_SORTS: &[SortOption] = &[
    SortOption::new("Name", "[Name] ASC"),
    SortOption::new("Newest", "[Id] DESC"),
];

static TABLE_SORTS: [SortOption; 1] = [SortOption::new("Name", "[name]")];

#[derive(Default, Query)]
#[query(sql = "SELECT * FROM [Item] {orderBy}", output = "Item", sort_options = ITEM_SORTS)]
pub struct AllItems;

#[derive(Default, Query)]
#[query(
    sql = "SELECT * FROM [sys].[tables] {where} {orderBy}",
    output = "Item",
    sort_options = TABLE_SORTS,
    name = "Tables"
)]
pub struct TablesQuery {
    #[query(rename = "name")]
    pub table_name: Option<String>,
}

#[derive(Default, Query)]
#[query(sql = "SELECT * FROM [Item] {orderBy}", output = "Item")]
pub struct Unsorted;

fn main() {
    let sql = AllItems.resolve(Some(1)).unwrap().sql;
    assert_eq!(sql, "SELECT * FROM [Item] ORDER BY [Id] DESC");
    assert_eq!(AllItems::sort_expression(0).unwrap(), "[Name] ASC");
    assert!(matches!(
        AllItems.resolve(Some(2)),
        Err(QueryError::SortIndexOutOfRange { index: 2, len: 2, .. })
    ));

    let query = TablesQuery {
        table_name: Some("org".to_string()),
    };
    let sql = query.resolve(Some(0)).unwrap().sql;
    assert_eq!(sql, "SELECT * FROM [sys].[tables] WHERE [name]=@name ORDER BY [name]");
    assert_eq!(TablesQuery::NAME, "Tables");

    assert!(matches!(
        Unsorted.resolve(Some(0)),
        Err(QueryError::NoSortOptions { .. })
    ));
}
