use kata::error::KataError;
use kata::prelude::*;
use kata::resolve_include;

use crate::common::schema::{Comment, Post, User, UserName};
use crate::common::setup_factory;

fn ids<T: Record>(records: &[Loaded<T>]) -> Vec<i64> {
    records
        .iter()
        .map(|r| r.require_field("id").unwrap().as_i64().unwrap())
        .collect()
}

#[test]
fn attaches_matching_children_in_result_order() {
    let (db, _) = setup_factory();

    let users: Vec<Loaded<UserName>> = db
        .get(
            &db.query("users")
                .order_by("id", OrderBy::Asc)
                .include(Include::new("posts", "user_id", "id").with_query(
                    Query::new("posts").order_by("id", OrderBy::Desc),
                )),
        )
        .unwrap();

    assert_eq!(ids(users[0].related_rows("posts").unwrap()), [2, 1]);
    assert_eq!(ids(users[1].related_rows("posts").unwrap()), [3]);
}

#[test]
fn unmatched_parents_get_an_empty_collection() {
    let (db, _) = setup_factory();

    let users: Vec<Loaded<User>> = db
        .get(
            &db.query("users")
                .order_by("id", OrderBy::Asc)
                .include(Include::new("posts", "user_id", "id")),
        )
        .unwrap();

    let cy = &users[2];
    assert_eq!(cy.name, "cy");
    assert!(cy.has_relation("posts"));
    assert!(cy.related_rows("posts").unwrap().is_empty());
    assert_eq!(users[0].related_rows("posts").unwrap().len(), 2);
}

#[test]
fn typed_children_are_materialized_once_per_key() {
    let (db, _) = setup_factory();

    let users: Vec<Loaded<User>> = db
        .get(
            &db.query("users")
                .order_by("id", OrderBy::Asc)
                .include(Include::typed::<Post>("posts", "user_id", "id")),
        )
        .unwrap();

    let posts = users[0].related::<Post>("posts").unwrap();
    assert_eq!(
        posts.iter().map(|p| p.title.as_str()).collect::<Vec<_>>(),
        ["first", "second"]
    );
    assert!(users[0].related_rows("posts").is_none());
    assert!(users[2].related::<Post>("posts").unwrap().is_empty());
}

#[test]
fn no_children_at_all_attaches_nothing() {
    let (db, _) = setup_factory();

    let users: Vec<Loaded<Row>> = db
        .get(
            &db.query("users")
                .include(Include::new("comments", "post_id", "id").with_query(
                    Query::new("comments").where_eq("body", "absent"),
                )),
        )
        .unwrap();

    assert_eq!(users.len(), 3);
    assert!(users.iter().all(|u| !u.has_relation("comments")));
}

#[test]
fn empty_parents_issue_no_child_query() {
    let (db, log) = setup_factory();

    let users: Vec<Loaded<Row>> = db
        .get(
            &db.query("users")
                .where_eq("id", 99)
                .include(Include::new("posts", "user_id", "id")),
        )
        .unwrap();

    assert!(users.is_empty());
    assert_eq!(log.len(), 1);

    log.clear();
    let resolved = resolve_include::<Row, _, _>(
        &db,
        Vec::new(),
        &Include::new("posts", "user_id", "id"),
    )
    .unwrap();
    assert!(resolved.is_empty());
    assert!(log.is_empty());
}

#[test]
fn child_query_filters_by_every_parent_key() {
    let (db, log) = setup_factory();

    db.get::<Row>(
        &db.query("users")
            .where_eq("active", true)
            .include(Include::new("posts", "user_id", "id")),
    )
    .unwrap();

    let statements = log.statements();
    assert_eq!(statements.len(), 2);
    assert_eq!(
        statements[1],
        r#"SELECT * FROM "posts" WHERE "user_id" IN (:p0, :p1)"#
    );
}

#[test]
fn relation_name_comes_from_the_include() {
    let (db, _) = setup_factory();

    let users: Vec<Loaded<UserName>> = db
        .get(
            &db.query("users")
                .where_eq("id", 1)
                .include(Include::new("articles", "user_id", "id").with_query(Query::new("posts"))),
        )
        .unwrap();

    assert_eq!(users[0].related_rows("articles").unwrap().len(), 2);
    assert!(!users[0].has_relation("posts"));
}

#[test]
fn includes_resolve_independently() {
    let (db, _) = setup_factory();

    let posts: Vec<Loaded<Post>> = db
        .get(
            &db.query("posts")
                .order_by("id", OrderBy::Asc)
                .include(Include::typed::<UserName>("author", "id", "user_id").with_query(Query::new("users")))
                .include(Include::typed::<Comment>("comments", "post_id", "id")),
        )
        .unwrap();

    assert_eq!(posts[2].related::<UserName>("author").unwrap()[0].name, "bob");
    assert_eq!(posts[0].related::<Comment>("comments").unwrap().len(), 2);
    assert!(posts[1].related::<Comment>("comments").unwrap().is_empty());
}

#[test]
fn nested_includes_resolve_on_children() {
    let (db, _) = setup_factory();

    let posts = Query::new("posts")
        .order_by("id", OrderBy::Asc)
        .include(Include::typed::<Comment>("comments", "post_id", "id"));
    let users: Vec<Loaded<UserName>> = db
        .get(
            &db.query("users")
                .where_eq("id", 1)
                .include(Include::typed::<Post>("posts", "user_id", "id").with_query(posts)),
        )
        .unwrap();

    let posts = users[0].related::<Post>("posts").unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].related::<Comment>("comments").unwrap().len(), 2);
    assert!(posts[1].related::<Comment>("comments").unwrap().is_empty());
}

#[test]
fn missing_local_key_is_an_error() {
    let (db, _) = setup_factory();

    let result = db.get::<Row>(
        &db.query("users")
            .select(["name"])
            .include(Include::new("posts", "user_id", "id")),
    );

    assert!(matches!(
        result,
        Err(KataError::MissingField { shape: "Row", ref field }) if field == "id"
    ));
}

#[test]
fn parents_sharing_a_key_share_children() {
    let (db, _) = setup_factory();

    let posts: Vec<Loaded<Post>> = db
        .get(
            &db.query("posts")
                .where_eq("user_id", 1)
                .include(Include::new("author", "id", "user_id").with_query(Query::new("users"))),
        )
        .unwrap();

    let first = posts[0].related_rows("author").unwrap();
    let second = posts[1].related_rows("author").unwrap();
    assert!(std::ptr::eq(first, second));
}
