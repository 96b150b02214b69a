use kata::error::KataError;
use kata::prelude::*;

use crate::common::schema::{User, UserName};
use crate::common::{setup_db, setup_factory};

#[test]
fn get_materializes_typed_records() {
    let (db, _) = setup_factory();

    let users: Vec<Loaded<User>> = db
        .get(&db.query("users").order_by("id", OrderBy::Asc))
        .unwrap();

    assert_eq!(users.len(), 3);
    assert_eq!(users[0].name, "ada");
    assert_eq!(users[1].email, None);
    assert_eq!(users[2].active, false);
}

#[test]
fn get_rows_keeps_column_order() {
    let (db, _) = setup_factory();

    let rows = db
        .get_rows(&db.query("users").select(["name", "id"]).where_eq("id", 2))
        .unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].column_names().collect::<Vec<_>>(), ["name", "id"]);
    assert_eq!(rows[0].get("ID"), Some(&Value::Integer(2)));
}

#[test]
fn first_and_first_or_default() {
    let (db, log) = setup_factory();

    let ada: Loaded<UserName> = db.first(&db.query("users").where_eq("name", "ada")).unwrap();
    assert_eq!(ada.id, 1);
    assert!(log.statements()[0].ends_with("LIMIT 1"));

    let missing = db.query("users").where_eq("name", "nobody");
    assert!(matches!(db.first::<Row>(&missing), Err(KataError::NotFound)));
    assert!(db.first_or_default::<Row>(&missing).unwrap().is_none());
}

#[test]
fn execute_returns_affected_rows() {
    let (db, _) = setup_factory();

    let inserted = db
        .execute(&db.query("users").as_insert([
            ("id", Value::from(4)),
            ("name", Value::from("dee")),
            ("active", Value::from(true)),
        ]))
        .unwrap();
    assert_eq!(inserted, 1);

    let updated = db
        .execute(
            &db.query("users")
                .r#where(gt("id", 2))
                .as_update([("active", false)]),
        )
        .unwrap();
    assert_eq!(updated, 2);

    let deleted = db
        .execute(&db.query("users").where_eq("id", 4).as_delete())
        .unwrap();
    assert_eq!(deleted, 1);

    let remaining: i64 = db.count(&db.query("users")).unwrap();
    assert_eq!(remaining, 3);
}

#[test]
fn execute_scalar_reads_the_first_column() {
    let (db, _) = setup_factory();

    let name: String = db
        .execute_scalar(&db.query("users").select(["name"]).where_eq("id", 2))
        .unwrap();
    assert_eq!(name, "bob");

    let nothing: Option<String> = db
        .execute_scalar(&db.query("users").select(["name"]).where_eq("id", 99))
        .unwrap();
    assert_eq!(nothing, None);
}

#[test]
fn conditions_compose() {
    let (db, _) = setup_factory();

    let query = db
        .query("users")
        .r#where(or([is_null("email"), like("name", "c%")]))
        .order_by("id", OrderBy::Desc);
    let users: Vec<Loaded<UserName>> = db.get(&query).unwrap();

    assert_eq!(
        users.iter().map(|u| u.name.as_str()).collect::<Vec<_>>(),
        ["cy", "bob"]
    );
}

#[test]
fn from_query_is_independent_of_its_source() {
    let (db, _) = setup_factory();

    let base = db.query("users").where_eq("active", true);
    let copy = db.from_query(&base).limit(1);

    assert_eq!(db.get::<Row>(&base).unwrap().len(), 2);
    assert_eq!(db.get::<Row>(&copy).unwrap().len(), 1);
    assert_eq!(base.limit, None);
}

#[test]
fn raw_select_and_statement() {
    let (db, log) = setup_factory();

    let users: Vec<UserName> = db
        .select("SELECT id, name FROM users WHERE id > :min ORDER BY id", [("min", 1)])
        .unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[0].name, "bob");

    let changed = db
        .statement("UPDATE posts SET views = views + 1 WHERE user_id = @user", [("user", 1)])
        .unwrap();
    assert_eq!(changed, 2);

    // raw SQL is not compiled, so the logger never sees it
    assert!(log.is_empty());
}

#[test]
fn builder_requires_connection_and_compiler() {
    let missing_connection = QueryFactory::<::rusqlite::Connection, SqliteCompiler>::builder()
        .compiler(SqliteCompiler)
        .build();
    assert!(matches!(missing_connection, Err(KataError::Misconfigured(_))));

    let missing_compiler = QueryFactory::<::rusqlite::Connection, SqliteCompiler>::builder()
        .connection(setup_db())
        .build();
    assert!(matches!(missing_compiler, Err(KataError::Misconfigured(_))));

    let db = QueryFactory::builder()
        .connection(setup_db())
        .compiler(SqliteCompiler)
        .config(ExecutionConfig::default().with_default_per_page(2))
        .build()
        .unwrap();
    assert_eq!(db.first_page::<Row>(&db.query("users")).unwrap().list().len(), 2);
}

#[test]
fn logger_sees_each_compiled_statement_once() {
    let (db, log) = setup_factory();

    db.get::<Row>(&db.query("users")).unwrap();
    db.count::<i64>(&db.query("posts")).unwrap();

    assert_eq!(
        log.statements(),
        [
            r#"SELECT * FROM "users""#,
            r#"SELECT COUNT(*) AS "count" FROM "posts" LIMIT 1"#,
        ]
    );
}

#[test]
fn stored_procedure_commands_are_rejected() {
    let (db, _) = setup_factory();
    let procedure = db.command_options().command_type(CommandType::StoredProcedure);

    assert!(matches!(
        db.execute_with(&db.query("posts").as_delete(), procedure),
        Err(KataError::Unsupported(_))
    ));
    assert_eq!(db.count::<i64>(&db.query("posts")).unwrap(), 3);
}

#[test]
fn unbound_parameters_are_an_error() {
    let (db, _) = setup_factory();

    let result = db.select::<Row, _, _>("SELECT * FROM users WHERE id = :id", [("idd", 1)]);

    assert!(matches!(result, Err(KataError::Other(_))));
}
