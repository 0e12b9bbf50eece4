#![allow(dead_code)]

use querycrate::{Query, SortOption};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, FromQueryResult};

const SCHEMA: &str = "
    CREATE TABLE [Organization] (
        [id] INTEGER PRIMARY KEY,
        [name] TEXT NOT NULL
    );
    CREATE TABLE [Item] (
        [id] INTEGER PRIMARY KEY,
        [organization_id] INTEGER NOT NULL,
        [name] TEXT NOT NULL,
        [color] TEXT NULL
    );
    INSERT INTO [Organization] ([id], [name]) VALUES
        (1, 'Acme'),
        (2, 'Sample Corp'),
        (3, 'Parts Unlimited'),
        (4, 'Resampled Ltd');
    INSERT INTO [Item] ([id], [organization_id], [name], [color]) VALUES
        (1, 1, 'Anvil', 'red'),
        (2, 1, 'Bolt', NULL),
        (3, 1, 'Crate', 'blue'),
        (4, 2, 'Drill', 'red');
";

/// Organization 3 owns 25 parts, `Part 01` to `Part 25`, for paging tests
pub const PART_COUNT: i32 = 25;

pub async fn seed(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute_unprepared(SCHEMA).await?;

    let parts: Vec<String> = (1..=PART_COUNT)
        .map(|n| format!("({}, 3, 'Part {n:02}', NULL)", 100 + n))
        .collect();
    db.execute_unprepared(&format!(
        "INSERT INTO [Item] ([id], [organization_id], [name], [color]) VALUES {};",
        parts.join(", ")
    ))
    .await?;
    Ok(())
}

/// Route library logs to the test output. `RUST_LOG=querycrate=debug` shows resolved SQL.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    init_tracing();
    let db = Database::connect("sqlite::memory:").await?;
    seed(&db).await?;
    Ok(db)
}

#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct Organization {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct Item {
    pub id: i32,
    pub organization_id: i32,
    pub name: String,
    pub color: Option<String>,
}

pub const ORG_SORTS: &[SortOption] = &[
    SortOption::new("Name", "[name] ASC"),
    SortOption::new("Newest", "[id] DESC"),
];

#[derive(Debug, Default, Query)]
#[query(
    sql = "SELECT * FROM [Organization] {where} {orderBy}",
    output = "Organization",
    sort_options = ORG_SORTS
)]
pub struct AllOrgs {
    #[query(expr = "[name] LIKE '%' || @name || '%'", test = "sample")]
    pub name: Option<String>,
    #[query(test = 1)]
    pub id: Option<i32>,
}

#[derive(Debug, Default, Query)]
#[query(
    sql = "SELECT * FROM [Item] WHERE [organization_id]=@orgId {andWhere} ORDER BY [name]",
    output = "Item",
    name = "ItemsInOrg"
)]
pub struct ItemsInOrg {
    #[query(rename = "OrgId")]
    pub org_id: i32,
    #[query(test = "Anvil")]
    pub name: Option<String>,
    #[query(test = "red")]
    pub color: Option<String>,
}

pub const ITEM_SORTS: &[SortOption] = &[
    SortOption::new("Name", "[name] ASC"),
    SortOption::new("Name descending", "[name] DESC"),
];

#[derive(Debug, Default, Query)]
#[query(sql = "SELECT * FROM [Item] {where}", output = "Item", sort_options = ITEM_SORTS)]
pub struct ItemsQuery {
    pub organization_id: Option<i32>,
    #[query(expr = "[name] LIKE @prefix || '%'", rename = "prefix")]
    pub name_prefix: Option<String>,
}

/// Self-test fixtures that fail on purpose
#[derive(Debug, Default, Query)]
#[query(
    sql = "SELECT * FROM [Organization] {where} {orderBy}",
    output = "Organization",
    sort_options = BROKEN_SORTS
)]
pub struct BrokenSortQuery {
    pub name: Option<String>,
}

pub const BROKEN_SORTS: &[SortOption] = &[
    SortOption::new("Name", "[name]"),
    SortOption::new("Missing", "[no_such_column]"),
];

#[derive(Debug, Default, Query)]
#[query(sql = "SELECT * FROM [Organization] {where}", output = "Organization")]
pub struct BrokenFieldQuery {
    pub name: Option<String>,
    #[query(expr = "[missing_column]=@region", test = "north")]
    pub region: Option<String>,
}
