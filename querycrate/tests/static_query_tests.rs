use querycrate::{Query, QueryError};

mod common;
use common::{AllOrgs, ItemsInOrg, ItemsQuery, setup_test_db};

#[tokio::test]
async fn test_where_token_filters_by_annotated_expression() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let query = AllOrgs {
        name: Some("ample".to_string()),
        ..Default::default()
    };
    let orgs = query.execute_on(&db, Some(0)).await.unwrap();

    let names: Vec<&str> = orgs.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["Resampled Ltd", "Sample Corp"]);
}

#[tokio::test]
async fn test_unset_criteria_return_everything() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let orgs = AllOrgs::default().execute_on(&db, None).await.unwrap();
    assert_eq!(orgs.len(), 4);
}

#[tokio::test]
async fn test_criteria_are_joined_with_and() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let query = AllOrgs {
        name: Some("Corp".to_string()),
        id: Some(4),
    };
    assert!(query.execute_on(&db, None).await.unwrap().is_empty());

    let query = AllOrgs {
        name: Some("Corp".to_string()),
        id: Some(2),
    };
    let orgs = query.execute_on(&db, None).await.unwrap();
    assert_eq!(orgs.len(), 1);
    assert_eq!(orgs[0].name, "Sample Corp");
}

#[tokio::test]
async fn test_sort_options_order_rows() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let by_name = AllOrgs::default().execute_on(&db, Some(0)).await.unwrap();
    let newest = AllOrgs::default().execute_on(&db, Some(1)).await.unwrap();

    assert_eq!(by_name.first().map(|o| o.name.as_str()), Some("Acme"));
    assert_eq!(newest.first().map(|o| o.id), Some(4));
}

#[tokio::test]
async fn test_sort_index_out_of_range_is_reported_before_execution() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let err = AllOrgs::default().execute_on(&db, Some(5)).await.unwrap_err();
    assert!(matches!(
        err,
        QueryError::SortIndexOutOfRange { index: 5, len: 2, ref query } if query == "AllOrgs"
    ));
    assert!(err.is_template_error());
}

#[tokio::test]
async fn test_and_where_skips_template_parameter() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let query = ItemsInOrg {
        org_id: 1,
        name: None,
        color: None,
    };
    let resolved = query.resolve(None).unwrap();
    assert_eq!(
        resolved.sql,
        "SELECT * FROM [Item] WHERE [organization_id]=@orgId  ORDER BY [name]"
    );

    let items = query.execute_on(&db, None).await.unwrap();
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Anvil", "Bolt", "Crate"]);
}

#[tokio::test]
async fn test_and_where_appends_populated_criteria() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let query = ItemsInOrg {
        org_id: 1,
        name: None,
        color: Some("red".to_string()),
    };
    let items = query.execute_on(&db, None).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Anvil");
    assert_eq!(items[0].color.as_deref(), Some("red"));
}

#[tokio::test]
async fn test_renamed_parameter_with_custom_expression() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let query = ItemsQuery {
        organization_id: Some(3),
        name_prefix: Some("Part 1".to_string()),
    };
    let items = query.execute_on(&db, None).await.unwrap();
    assert_eq!(items.len(), 10);
    assert!(items.iter().all(|i| i.name.starts_with("Part 1")));
}

#[tokio::test]
async fn test_single_row() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let query = AllOrgs {
        id: Some(3),
        ..Default::default()
    };
    let org = query.execute_single_on(&db).await.unwrap();
    assert_eq!(org.map(|o| o.name), Some("Parts Unlimited".to_string()));

    let query = AllOrgs {
        id: Some(99),
        ..Default::default()
    };
    assert!(query.execute_single_on(&db).await.unwrap().is_none());
}

#[tokio::test]
async fn test_provider_acquires_connection_per_call() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let query = ItemsInOrg {
        org_id: 2,
        ..Default::default()
    };
    let items = query.execute(&db, None).await.unwrap();
    assert_eq!(items.len(), 1);

    let org = AllOrgs {
        id: Some(1),
        ..Default::default()
    }
    .execute_single(&db)
    .await
    .unwrap();
    assert_eq!(org.map(|o| o.name), Some("Acme".to_string()));

    // the caller's connection is still usable afterwards
    assert_eq!(AllOrgs::default().execute_on(&db, None).await.unwrap().len(), 4);
}

#[tokio::test]
async fn test_database_errors_pass_through() {
    let db = setup_test_db().await.expect("Failed to setup test database");

    let err = common::BrokenFieldQuery {
        region: Some("north".to_string()),
        ..Default::default()
    }
    .execute_on(&db, None)
    .await
    .unwrap_err();

    assert!(matches!(err, QueryError::Database(_)));
    assert!(!err.is_template_error());
}
