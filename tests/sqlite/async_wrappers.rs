use kata::prelude::*;

use crate::common::schema::UserName;
use crate::common::setup_factory;

#[tokio::test]
async fn select_async_materializes() {
    let (db, _) = setup_factory();

    let users: Vec<UserName> = db
        .select_async("SELECT id, name FROM users WHERE active = :active", [("active", true)])
        .await
        .unwrap();

    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn statement_async_reports_affected_rows() {
    let (db, _) = setup_factory();

    let deleted = db
        .statement_async("DELETE FROM comments WHERE post_id = $post", [("post", 1)])
        .await
        .unwrap();
    assert_eq!(deleted, 2);

    let left: i64 = db.count(&db.query("comments")).unwrap();
    assert_eq!(left, 1);
}
