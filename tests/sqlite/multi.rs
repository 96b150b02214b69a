use kata::prelude::*;

use crate::common::schema::UserName;
use crate::common::setup_factory;

#[test]
fn batch_logs_once_and_reads_in_order() {
    let (db, log) = setup_factory();

    let mut reader = db
        .get_multiple(&[
            db.query("users").where_eq("id", 1),
            db.query("posts").where_in("user_id", [1, 2]),
            db.query("numbers").r#where(gt("n", 20)).as_count(["n"]),
        ])
        .unwrap();

    assert_eq!(log.len(), 1);
    assert_eq!(
        log.statements()[0],
        concat!(
            r#"SELECT * FROM "users" WHERE "id" = :p0;"#,
            "\n",
            r#"SELECT * FROM "posts" WHERE "user_id" IN (:p1, :p2);"#,
            "\n",
            r#"SELECT COUNT("n") AS "count" FROM "numbers" WHERE "n" > :p3"#,
        )
    );

    assert_eq!(reader.remaining(), 3);
    let user: UserName = reader.read_first().unwrap();
    assert_eq!(user.name, "ada");
    assert_eq!(reader.read::<Row>().unwrap().len(), 3);
    let count: Row = reader.read_first().unwrap();
    assert_eq!(count.get_as::<i64>("count").unwrap(), 5);
    assert!(reader.is_consumed());
}

#[test]
fn get_many_returns_one_list_per_query() {
    let (db, _) = setup_factory();

    let lists: Vec<Vec<Row>> = db
        .get_many(&[
            db.query("posts").where_eq("user_id", 1),
            db.query("posts").where_eq("user_id", 2),
            db.query("posts").where_eq("user_id", 3),
        ])
        .unwrap();

    assert_eq!(
        lists.iter().map(Vec::len).collect::<Vec<_>>(),
        [2, 1, 0]
    );
}

#[test]
fn batch_separator_comes_from_config() {
    let (db, log) = setup_factory();
    let db = db.with_config(ExecutionConfig::default().with_batch_separator(";\n\n"));

    db.get_multiple(&[db.query("users"), db.query("posts")])
        .unwrap();

    assert_eq!(
        log.statements()[0],
        "SELECT * FROM \"users\";\n\nSELECT * FROM \"posts\""
    );
}
