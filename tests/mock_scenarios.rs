//! End-to-end mock scenarios through the public API.

use rstest::rstest;
use typed_sql::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
}

typed_sql::row_record!(User { id, name });

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
}

typed_sql::row_record!(Order { id, user_id });

fn user(id: i64, name: &str) -> User {
    User {
        id,
        name: name.to_string(),
    }
}

#[test]
fn two_row_scenario() {
    let conn = MockConnection::new();
    conn.inject_response(vec![user(1, "a"), user(2, "b")]);

    let mut cursor = conn.execute_map::<User>("SELECT * FROM users", &[]).unwrap();
    assert_eq!(cursor.arraysize(), 1);
    assert_eq!(cursor.fetchmany(None).unwrap(), vec![user(1, "a")]);
    assert_eq!(cursor.fetchone().unwrap(), Some(user(2, "b")));
    assert_eq!(cursor.fetchone().unwrap(), None);
    assert_eq!(cursor.fetchall().unwrap(), Vec::<User>::new());
    assert_eq!(cursor.fetchone().unwrap(), None);
}

#[test]
fn responses_are_served_in_injection_order() {
    let conn = MockConnection::new();
    conn.inject_response(vec![user(1, "first")]);
    conn.inject_response(vec![Order { id: 9, user_id: 1 }]);
    conn.inject_response(vec![user(2, "third")]);

    let first = conn.execute_map::<User>("q1", &[]).unwrap().fetchall().unwrap();
    let second = conn.execute_map::<Order>("q2", &[]).unwrap().fetchall().unwrap();
    let third = conn.execute_map::<User>("q3", &[]).unwrap().fetchall().unwrap();

    assert_eq!(first, vec![user(1, "first")]);
    assert_eq!(second, vec![Order { id: 9, user_id: 1 }]);
    assert_eq!(third, vec![user(2, "third")]);
    assert_eq!(conn.remaining(), 0);
}

#[test]
fn mismatched_entry_is_consumed() {
    let conn = MockConnection::new();
    conn.inject_response(vec![Order { id: 1, user_id: 1 }]);
    conn.inject_response(vec![user(1, "a")]);

    let err = conn.execute_map::<User>("SELECT", &[]).err().unwrap();
    assert!(matches!(err, Error::ResponseTypeMismatch { .. }));
    assert_eq!(conn.remaining(), 1);

    let rows = conn.execute_map::<User>("SELECT", &[]).unwrap().fetchall().unwrap();
    assert_eq!(rows, vec![user(1, "a")]);
}

#[test]
fn empty_store_fails_on_execute() {
    let conn = MockConnection::new();
    let err = conn.execute_map::<User>("SELECT", &[]).err().unwrap();
    assert!(matches!(err, Error::StoreDataNotFound { .. }));
}

#[test]
fn fetchone_tolerates_missing_execute_but_bulk_fetch_does_not() {
    let conn = MockConnection::new();
    let mut cursor = conn.cursor().unwrap();
    assert_eq!(cursor.fetchone().unwrap(), None);
    assert!(matches!(cursor.fetchall(), Err(Error::UnexpectedFetch)));
    assert!(matches!(cursor.fetchmany(Some(3)), Err(Error::UnexpectedFetch)));
    assert!(matches!(cursor.rows().next(), Some(Err(Error::UnexpectedFetch))));
}

#[test]
fn no_data_response_leaves_cursor_unbound() {
    let conn = MockConnection::new();
    conn.inject_no_data::<RawRow>();
    let mut cursor = conn.execute("UPDATE users SET name = 'x'", &[]).unwrap();
    assert_eq!(cursor.fetchone().unwrap(), None);
    assert!(matches!(cursor.fetchall(), Err(Error::UnexpectedFetch)));
}

#[test]
fn injected_error_is_raised_at_execute() {
    let conn = MockConnection::new();
    conn.inject_error::<User>(std::io::Error::other("connection reset"));
    let err = conn.execute_map::<User>("SELECT", &[]).err().unwrap();
    assert_eq!(err.to_string(), "connection reset");
}

#[rstest]
#[case::update_for_insert(false)]
#[case::insert_for_other_table(true)]
fn tag_mismatch_scenario(#[case] same_kind: bool) {
    let conn = MockConnection::new();
    conn.inject_operation_with_tag::<Insert<User>>();

    let result = if same_kind {
        conn.execute_with_tag::<Insert<Order>>("INSERT INTO orders VALUES (1, 1)", &[])
    } else {
        conn.execute_with_tag::<Update<User>>("UPDATE users SET name = 'b'", &[])
    };
    assert!(matches!(result.err(), Some(Error::ResponseTypeMismatch { .. })));
}

#[test]
fn matching_tags_pass_in_order() {
    let conn = MockConnection::new();
    conn.inject_operation_with_tag::<Insert<User>>();
    conn.inject_operation_with_tag::<Delete<User>>();

    conn.execute_with_tag::<Insert<User>>("INSERT INTO users VALUES (?1, ?2)", &params![1, "a"])
        .unwrap();
    conn.execute_with_tag::<Delete<User>>("DELETE FROM users WHERE id = ?1", &params![1])
        .unwrap();
    assert_eq!(conn.remaining(), 0);
}

#[test]
fn exhaustion_is_idempotent_through_iteration() {
    let conn = MockConnection::new();
    conn.inject_response(vec![user(1, "a")]);
    let mut cursor = conn.execute_map::<User>("SELECT", &[]).unwrap();

    let collected: Vec<User> = cursor.rows().collect::<Result<_>>().unwrap();
    assert_eq!(collected, vec![user(1, "a")]);
    assert!(cursor.rows().next().is_none());
    assert!(cursor.fetchmany(None).unwrap().is_empty());
}

#[test]
fn recording_a_mock_cursor_writes_what_was_fetched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.csv");

    let conn = MockConnection::new();
    conn.inject_response(vec![user(1, "a"), user(2, "b"), user(3, "c")]);
    let cursor = record_to_csv(
        &path,
        conn.cursor().unwrap(),
        RecordOptions {
            limit: Some(2),
            ..RecordOptions::default()
        },
    )
    .unwrap();

    let mut cursor = cursor.execute_map::<User>("SELECT", &[]).unwrap();
    assert_eq!(cursor.fetchall().unwrap().len(), 3);
    cursor.close().unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "id,name\n1,a\n2,b\n");

    let replay = MockConnection::new();
    replay.inject_response_from_csv::<User>(&path, true).unwrap();
    let rows = replay.execute_map::<User>("SELECT", &[]).unwrap().fetchall().unwrap();
    assert_eq!(rows, vec![user(1, "a"), user(2, "b")]);
}

#[test]
fn empty_text_survives_record_and_replay() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.csv");

    let conn = MockConnection::new();
    conn.inject_response(vec![user(1, ""), user(2, "b")]);
    let mut cursor = record_to_csv(&path, conn.cursor().unwrap(), RecordOptions::default())
        .unwrap()
        .execute_map::<User>("SELECT", &[])
        .unwrap();
    let live = cursor.fetchall().unwrap();
    cursor.close().unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "id,name\n1,\n2,b\n");

    let replay = MockConnection::new();
    replay.inject_response_from_csv::<User>(&path, true).unwrap();
    let rows = replay.execute_map::<User>("SELECT", &[]).unwrap().fetchall().unwrap();
    assert_eq!(rows, live);
}

#[test]
fn frames_round_trip_through_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.csv");
    std::fs::write(&path, "id,name\n1,a\n").unwrap();

    let conn = MockConnection::new();
    conn.inject_frame_from_csv(&path, true).unwrap();
    assert!(matches!(
        conn.inject_frame_from_csv(&path, false),
        Err(Error::CsvHeaderOptionRequired)
    ));

    let mut cursor = conn.execute("SELECT", &[]).unwrap();
    let frame = cursor.fetch_frame().unwrap();
    assert_eq!(frame.columns, vec!["id".to_string(), "name".to_string()]);
    assert_eq!(frame.rows, vec![vec![Value::Text("1".into()), Value::Text("a".into())]]);
}
