use kata::error::KataError;
use kata::prelude::*;

use crate::common::schema::{Post, UserName};
use crate::common::setup_factory;

#[test]
fn row_round_trips_through_the_accessor() {
    let row = Row::from_iter([("id", Value::from(1)), ("name", Value::from("a"))]);

    let record = UserName::from_row(row).unwrap();
    assert_eq!(record.field("id"), Some(Value::Integer(1)));
    assert_eq!(record.field("name"), Some(Value::Text("a".into())));
}

#[test]
fn extra_columns_are_ignored_and_missing_fields_default() {
    let (db, _) = setup_factory();

    let posts: Vec<Post> = db
        .select(
            "SELECT id AS ID, title AS Title, 'x' AS unrelated FROM posts WHERE id = 1",
            NO_BINDINGS,
        )
        .unwrap();

    assert_eq!(
        posts[0],
        Post {
            id: 1,
            user_id: 0,
            title: "first".into(),
            views: 0,
        }
    );
}

#[test]
fn coercion_failure_is_fatal() {
    let (db, _) = setup_factory();

    let result = db.select::<UserName, _, _>("SELECT name AS id, name FROM users", NO_BINDINGS);
    match result {
        Err(KataError::Mapping(message)) => assert!(message.starts_with("UserName.id:"), "{message}"),
        other => panic!("expected a mapping error, got {other:?}"),
    }
}

#[test]
fn accessor_sets_fields_by_name() {
    let mut record = UserName::default();
    record.set_field("NAME", Value::from("zed")).unwrap();

    assert_eq!(record.name, "zed");
    assert!(matches!(
        record.set_field("missing", Value::Null),
        Err(KataError::MissingField { shape: "UserName", .. })
    ));
}
