use std::ops::ControlFlow;

use kata::error::KataError;
use kata::prelude::*;

use crate::common::setup_factory;

fn numbers(db: &QueryFactory<::rusqlite::Connection, SqliteCompiler>) -> Query {
    db.query("numbers").order_by("n", OrderBy::Asc)
}

fn ns(rows: &[Loaded<Row>]) -> Vec<i64> {
    rows.iter().map(|r| r.get_as::<i64>("n").unwrap()).collect()
}

#[test]
fn first_page_of_many() {
    let (db, _) = setup_factory();

    let page = db.paginate::<Row>(&numbers(&db), 1, 10).unwrap();

    assert_eq!(page.count(), 25);
    assert_eq!(page.list().len(), 10);
    assert!(page.has_next());
    assert!(page.is_first());
    assert_eq!(page.total_pages(), 3);
}

#[test]
fn last_partial_page() {
    let (db, _) = setup_factory();

    let page = db.paginate::<Row>(&numbers(&db), 3, 10).unwrap();

    assert_eq!(ns(page.list()), (21..=25).collect::<Vec<_>>());
    assert!(!page.has_next());
    assert!(page.has_previous());
}

#[test]
fn empty_result_skips_the_fetch() {
    let (db, log) = setup_factory();

    let page = db
        .paginate::<Row>(&db.query("numbers").r#where(gt("n", 100)), 1, 10)
        .unwrap();

    assert_eq!(page.count(), 0);
    assert!(page.list().is_empty());
    assert!(!page.has_next());
    assert_eq!(log.len(), 1);
    assert!(log.statements()[0].contains("COUNT(*)"));
}

#[test]
fn zero_arguments_are_rejected_before_any_query() {
    let (db, log) = setup_factory();

    assert!(matches!(
        db.paginate::<Row>(&numbers(&db), 0, 10),
        Err(KataError::InvalidArgument { name: "page", .. })
    ));
    assert!(matches!(
        db.paginate::<Row>(&numbers(&db), 1, 0),
        Err(KataError::InvalidArgument { name: "per_page", .. })
    ));
    assert!(log.is_empty());
}

#[test]
fn next_pages_over_the_original_query() {
    let (db, _) = setup_factory();

    let base = numbers(&db).r#where(lte("n", 12));
    let first = db.paginate::<Row>(&base, 1, 5).unwrap();
    let second = first.next().unwrap();
    let third = second.next().unwrap();

    assert_eq!(ns(second.list()), [6, 7, 8, 9, 10]);
    assert_eq!(ns(third.list()), [11, 12]);
    assert!(!third.has_next());
    assert_eq!(third.query().limit, None);
    assert_eq!(ns(first.list()), [1, 2, 3, 4, 5]);
    assert_eq!(ns(second.previous().unwrap().list()), [1, 2, 3, 4, 5]);
}

#[test]
fn pages_iterator_stops_after_the_last_page() {
    let (db, _) = setup_factory();

    let sizes = db
        .pages::<Row>(&numbers(&db), 10)
        .map(|page| page.map(|p| (p.page(), p.list().len())))
        .collect::<kata::Result<Vec<_>>>()
        .unwrap();

    assert_eq!(sizes, [(1, 10), (2, 10), (3, 5)]);
}

#[test]
fn chunk_visits_every_page() {
    let (db, _) = setup_factory();

    let mut seen = Vec::new();
    db.chunk::<Row, _, _>(&numbers(&db), 10, |rows, page| {
        seen.push((page, rows.len()));
        true
    })
    .unwrap();

    assert_eq!(seen, [(1, 10), (2, 10), (3, 5)]);
}

#[test]
fn chunk_stops_when_the_consumer_says_so() {
    let (db, log) = setup_factory();

    let mut seen = Vec::new();
    db.chunk::<Row, _, _>(&numbers(&db), 10, |_, page| {
        seen.push(page);
        page < 2
    })
    .unwrap();

    assert_eq!(seen, [1, 2]);
    // a count and a fetch per visited page, nothing for page 3
    assert_eq!(log.len(), 4);
}

#[test]
fn chunk_action_form_never_stops() {
    let (db, _) = setup_factory();

    let mut total = 0;
    db.chunk::<Row, _, _>(&numbers(&db), 7, |rows, _| total += rows.len())
        .unwrap();

    assert_eq!(total, 25);
}

#[test]
fn chunk_control_flow_form() {
    let (db, _) = setup_factory();

    let mut pages = 0;
    db.chunk::<Row, _, _>(&numbers(&db), 5, |_, page| {
        pages += 1;
        if page == 3 {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    })
    .unwrap();

    assert_eq!(pages, 3);
}

#[test]
fn pages_resolve_includes() {
    let (db, _) = setup_factory();

    let users = db
        .query("users")
        .order_by("id", OrderBy::Asc)
        .include(Include::new("posts", "user_id", "id"));
    let page = db.paginate::<Row>(&users, 1, 2).unwrap();

    assert_eq!(page.list().len(), 2);
    assert_eq!(page.list()[0].related_rows("posts").unwrap().len(), 2);
}

#[test]
fn distinct_queries_count_distinct_rows() {
    let (db, _) = setup_factory();

    let authors = db
        .query("posts")
        .select(["user_id"])
        .distinct()
        .order_by("user_id", OrderBy::Asc);
    let page = db.paginate::<Row>(&authors, 1, 2).unwrap();

    assert_eq!(page.count(), 2);
    assert_eq!(page.list().len(), 2);
    assert!(!page.has_next());

    let mut seen = Vec::new();
    db.chunk::<Row, _, _>(&authors, 2, |rows, page| seen.push((page, rows.len())))
        .unwrap();
    assert_eq!(seen, [(1, 2)]);
}
