//! Integration tests for fieldstore

use fieldstore::hooks::{use_selector, FieldsList};
use fieldstore::{registry, FieldId, Props, Record, SingleStore, Store, Update, UpdateConfig};
use serde_json::{json, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

fn record(value: Value) -> Record {
    serde_json::from_value(value).unwrap()
}

fn patch(value: Value) -> serde_json::Map<String, Value> {
    Record::patch(value)
}

fn count_of(store: &Store<Record>, field: &str) -> Option<i64> {
    store
        .get_props(&field.into())
        .and_then(|props| props.get("count").and_then(Value::as_i64))
}

#[test]
fn update_notifies_subscriber_once() {
    let store = Store::new([record(json!({ "id": "a", "count": 0 }))]);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.subscribe("a", move |props: &Record| sink.borrow_mut().push(props.clone()));

    store.patch("a", patch(json!({ "count": 1 })));

    let expected = record(json!({ "id": "a", "count": 1 }));
    assert_eq!(store.get_props(&"a".into()), Some(expected.clone()));
    assert_eq!(*seen.borrow(), vec![expected]);
}

#[test]
fn batch_is_silent_until_finish() {
    let store = Store::new([record(json!({ "id": "a", "count": 0 }))]);
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    store.subscribe("a", move |_| counter.set(counter.get() + 1));

    store.batch_init();
    store.patch("a", patch(json!({ "count": 1 })));
    store.patch("a", patch(json!({ "count": 2 })));
    store.batch_finish();

    assert_eq!(count_of(&store, "a"), Some(2));
    assert_eq!(calls.get(), 0);
}

#[test]
fn held_updates_flush_on_next_emitting_update() {
    let store: Store<Record> = Store::default();
    let log = Rc::new(RefCell::new(Vec::new()));
    for field in ["x", "y"] {
        let log = Rc::clone(&log);
        store.subscribe(field, move |props: &Record| {
            log.borrow_mut()
                .push((props.id().to_string(), props.get("v").cloned()));
        });
    }

    store.update("x", Update::Patch(patch(json!({ "v": 1 }))), UpdateConfig::held());
    store.update("y", Update::Patch(patch(json!({ "v": 2 }))), UpdateConfig::held());
    store.update(
        "x",
        Update::with(|props: &Record| {
            let v = props.get("v").and_then(Value::as_i64).unwrap_or(0);
            Record::patch(json!({ "v": v + 10 }))
        }),
        UpdateConfig::held(),
    );
    assert!(log.borrow().is_empty());

    store.patch("y", patch(json!({ "v": 3 })));

    assert_eq!(
        *log.borrow(),
        vec![
            ("x".to_string(), Some(json!(1))),
            ("y".to_string(), Some(json!(2))),
            ("x".to_string(), Some(json!(11))),
            ("y".to_string(), Some(json!(3))),
        ]
    );
}

#[test]
fn delete_then_recreate_starts_fresh() {
    let store = Store::new([Record::new("a")]);
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    store.subscribe("a", move |_| counter.set(counter.get() + 1));

    store.delete(&"a".into());
    assert_eq!(store.get_props(&"a".into()), None);

    store.patch("a", patch(json!({ "count": 1 })));
    assert_eq!(calls.get(), 0);
    assert_eq!(count_of(&store, "a"), Some(1));
}

#[test]
fn copies_are_isolated() {
    let store = Store::new([record(json!({ "id": "a", "tags": ["x"] }))]);

    let mut props = store.get_props(&"a".into()).unwrap();
    props.set("tags", json!([]));
    let mut fields = store.fields();
    fields.shift_remove(&FieldId::from("a"));

    assert_eq!(
        store.get_props(&"a".into()).unwrap().get("tags"),
        Some(&json!(["x"]))
    );
    assert_eq!(store.fields().len(), 1);
}

#[test]
fn selection_and_list_hooks_together() {
    registry::reset();
    let rows = Store::new([Record::new(1), Record::new(2)]);
    registry::register("rows", rows.clone());

    let list = FieldsList::named::<Record>("rows").unwrap();
    let checked = use_selector(&rows, 1, |props: &Record| props.get("checked").cloned());
    let renders = Rc::new(Cell::new(0));
    let counter = Rc::clone(&renders);
    checked.on_change(move |_| counter.set(counter.get() + 1));

    let rows = registry::lookup::<Record>("rows").unwrap();
    rows.patch(1, patch(json!({ "checked": true })));
    rows.patch(1, patch(json!({ "label": "first" })));
    rows.patch(3, patch(json!({ "checked": false })));

    assert_eq!(checked.get(), Some(json!(true)));
    assert_eq!(renders.get(), 1);
    assert_eq!(
        list.ids(),
        vec![FieldId::from(1), FieldId::from(2), FieldId::from(3)]
    );
}

#[test]
fn single_store_integration() {
    let state = SingleStore::<Record>::new(Some(patch(json!({ "count": 0, "name": "test" }))));
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let sub = state.subscribe(move |_| counter.set(counter.get() + 1));

    state.update_with(|props| {
        let count = props.get("count").and_then(Value::as_i64).unwrap_or(0);
        Record::patch(json!({ "count": count + 42 }))
    });
    assert_eq!(state.get_props().unwrap().get("count"), Some(&json!(42)));
    assert_eq!(state.get_props().unwrap().get("name"), Some(&json!("test")));

    sub.unsubscribe();
    sub.unsubscribe();
    state.patch(patch(json!({ "count": 1 })));
    assert_eq!(calls.get(), 1);
}
