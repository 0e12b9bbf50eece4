use querycrate::{Query, QueryError};

mod common;
use common::{AllOrgs, ItemsQuery, PART_COUNT, setup_test_db};

fn parts_query() -> ItemsQuery {
    ItemsQuery {
        organization_id: Some(3),
        name_prefix: None,
    }
}

#[tokio::test]
async fn test_pages_cover_all_rows_once() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let query = parts_query();

    let mut seen = Vec::new();
    for page in 0..3 {
        let rows = query.execute_paged_on(&db, "[name]", 10, page).await.unwrap();
        seen.extend(rows.into_iter().map(|item| item.name));
    }

    seen.sort();
    let expected: Vec<String> = (1..=PART_COUNT).map(|n| format!("Part {n:02}")).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_page_sizes() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let query = parts_query();

    assert_eq!(query.execute_paged_on(&db, "[name]", 10, 0).await.unwrap().len(), 10);
    assert_eq!(query.execute_paged_on(&db, "[name]", 10, 2).await.unwrap().len(), 5);
    assert!(query.execute_paged_on(&db, "[name]", 10, 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_second_page_window() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let query = parts_query();

    let resolved = query.resolve_paged("[name]", 10, 1).unwrap();
    assert!(resolved.sql.ends_with("WHERE [RowNumber] BETWEEN 11 AND 20;"));

    let rows = query.execute_paged_on(&db, "[name]", 10, 1).await.unwrap();
    let mut names: Vec<&str> = rows.iter().map(|i| i.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names.first(), Some(&"Part 11"));
    assert_eq!(names.last(), Some(&"Part 20"));
}

#[tokio::test]
async fn test_sorted_page_uses_declared_sort_option() {
    let db = setup_test_db().await.expect("Failed to setup test database");
    let query = parts_query();

    let rows = query.execute_sorted_page_on(&db, 1, 5, 0).await.unwrap();
    let mut names: Vec<&str> = rows.iter().map(|i| i.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Part 21", "Part 22", "Part 23", "Part 24", "Part 25"]);
}

#[tokio::test]
async fn test_sorted_page_rejects_bad_index() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let err = parts_query()
        .execute_sorted_page_on(&db, 7, 5, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::SortIndexOutOfRange { index: 7, .. }));
}

#[tokio::test]
async fn test_paging_strips_order_by_token() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let query = AllOrgs::default();
    let resolved = query.resolve_paged("[id]", 2, 0).unwrap();
    assert!(!resolved.sql.contains("{orderBy}"));
    assert!(!resolved.sql.contains("ORDER BY [name]"));

    let rows = query.execute_paged_on(&db, "[id]", 2, 1).await.unwrap();
    let mut ids: Vec<i32> = rows.iter().map(|o| o.id).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![3, 4]);
}

#[tokio::test]
async fn test_paged_with_provider() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let rows = parts_query().execute_paged(&db, "[id]", 4, 0).await.unwrap();
    assert_eq!(rows.len(), 4);

    let rows = parts_query().execute_sorted_page(&db, 0, 4, 6).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].name, "Part 25");
}
