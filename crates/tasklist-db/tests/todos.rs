use tasklist_db::models::TodoRow;
use tasklist_db::{Database, DbError};

struct Fixture {
    db: Database,
    alice: i64,
    bob: i64,
    list: i64,
}

fn fixture() -> Fixture {
    let db = Database::open_in_memory().unwrap();
    let alice = db.add_user("alice", "alice@example.com", "pw").unwrap().id;
    let bob = db.add_user("bob", "bob@example.com", "pw").unwrap().id;
    let list = db.add_list("Groceries", alice).unwrap().id;
    Fixture { db, alice, bob, list }
}

#[test]
fn add_assigns_id_and_keeps_fields() {
    let f = fixture();

    let todo = f.db.add_todo("milk", "2 litres", f.list, f.alice).unwrap();
    assert!(todo.id > 0);
    assert_eq!(todo.title, "milk");
    assert_eq!(todo.description, "2 litres");
    assert_eq!(todo.list_id, f.list);
    assert_eq!(todo.user_id, f.alice);

    assert_eq!(f.db.get_todo_by_id(todo.id).unwrap(), todo);
}

#[test]
fn todos_are_filtered_by_owner() {
    let f = fixture();
    let bobs_list = f.db.add_list("Bob's", f.bob).unwrap().id;
    f.db.add_todo("milk", "", f.list, f.alice).unwrap();
    f.db.add_todo("eggs", "", f.list, f.alice).unwrap();
    f.db.add_todo("nails", "", bobs_list, f.bob).unwrap();

    assert_eq!(f.db.get_all_todos().unwrap().len(), 3);
    assert_eq!(f.db.get_all_todos_for_user(f.alice).unwrap().len(), 2);
    assert_eq!(f.db.get_all_todos_for_user(f.bob).unwrap().len(), 1);
    assert!(f.db.get_all_todos_for_user(-2).unwrap().is_empty());
    assert!(f.db.get_all_todos_for_user(1000).unwrap().is_empty());
}

#[test]
fn add_with_unknown_owner_violates_foreign_key() {
    let f = fixture();

    let err = f.db.add_todo("ghost", "", f.list, -1).unwrap_err();
    assert!(matches!(err, DbError::Sqlite(_)));
    assert!(f.db.get_all_todos().unwrap().is_empty());
}

#[test]
fn update_and_delete_report_rows_affected() {
    let f = fixture();
    let todo = f.db.add_todo("milk", "", f.list, f.alice).unwrap();

    let edited = TodoRow {
        title: "oat milk".into(),
        ..todo.clone()
    };
    assert_eq!(f.db.update_todo(&edited).unwrap(), 1);
    assert_eq!(f.db.get_todo_by_id(todo.id).unwrap().title, "oat milk");

    assert_eq!(f.db.update_todo(&TodoRow { id: 999, ..edited }).unwrap(), 0);

    assert_eq!(f.db.delete_todo_by_id(todo.id).unwrap(), 1);
    assert_eq!(f.db.delete_todo_by_id(todo.id).unwrap(), 0);
    assert!(matches!(
        f.db.get_todo_by_id(todo.id),
        Err(DbError::NotFound { resource: "todo", .. })
    ));
}
