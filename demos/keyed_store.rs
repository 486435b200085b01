//! Keyed store example: a validated form with one field per input

use fieldstore::hooks::{use_selector, FieldsList};
use fieldstore::{registry, Record, Store, StoreConfig, Update, UpdateConfig};
use serde_json::{json, Value};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Keyed Store Example ===\n");

    // Create a store with one record per form input
    let form = Store::with_config(
        [
            Record::new("email"),
            Record::new("password"),
        ],
        StoreConfig::labeled("signup-form"),
    );
    registry::register("signup-form", form.clone());

    // Each input renders only from its own field
    let email_valid = use_selector(&form, "email", |props: &Record| {
        props.get("valid").and_then(Value::as_bool).unwrap_or(true)
    });
    email_valid.on_change(|valid| println!("   [email] valid = {valid}"));

    let inputs = FieldsList::named::<Record>("signup-form").expect("form is registered");
    inputs.on_change(|ids| println!("   [form] inputs: {ids:?}"));

    // Typing updates the value without touching validity
    println!("Typing an email...");
    form.patch("email", Record::patch(json!({ "value": "not-an-email" })));

    // Validation derives from the current props
    println!("\nValidating...");
    form.update_with("email", |props| {
        let value = props.get("value").and_then(Value::as_str).unwrap_or_default();
        Record::patch(json!({ "valid": value.contains('@') }))
    });

    // Hold back intermediate updates, then emit them with the next one
    println!("\nHolding two updates...");
    form.update(
        "password",
        Update::Patch(Record::patch(json!({ "value": "hunter2" }))),
        UpdateConfig::held(),
    );
    form.update(
        "email",
        Update::Patch(Record::patch(json!({ "value": "me@example.com" }))),
        UpdateConfig::held(),
    );
    println!("Releasing them...");
    form.patch("email", Record::patch(json!({ "valid": true })));

    // Adding a field notifies list subscribers
    println!("\nAdding a confirmation input...");
    form.patch("confirm", Record::patch(json!({ "value": "" })));

    // Read final state
    println!("\nFinal state:");
    for (id, props) in form.fields() {
        println!("   {id}: {}", props.into_value());
    }
}
