//! Complete counter application demonstrating all features together

use fieldstore::hooks::{use_selector_with, use_state_selector};
use fieldstore::{FieldId, Props, SingleStore, Store, STATE_ID};
use tracing_subscriber::EnvFilter;

#[derive(Clone, Debug)]
struct CounterState {
    id: FieldId,
    count: i32,
    step: i32,
    history: Vec<i32>,
}

#[derive(Default)]
struct CounterPatch {
    count: Option<i32>,
    step: Option<i32>,
    history: Option<Vec<i32>>,
}

impl CounterState {
    fn increment(&self) -> CounterPatch {
        self.moved_to(self.count + self.step)
    }

    fn decrement(&self) -> CounterPatch {
        self.moved_to(self.count - self.step)
    }

    fn reset(&self) -> CounterPatch {
        self.moved_to(0)
    }

    fn moved_to(&self, count: i32) -> CounterPatch {
        let mut history = self.history.clone();
        history.push(count);
        CounterPatch {
            count: Some(count),
            history: Some(history),
            ..Default::default()
        }
    }
}

impl Props for CounterState {
    type Patch = CounterPatch;

    fn from_id(id: FieldId) -> Self {
        Self {
            id,
            count: 0,
            step: 1,
            history: vec![0],
        }
    }

    fn id(&self) -> &FieldId {
        &self.id
    }

    fn merge(&mut self, patch: CounterPatch) {
        if let Some(count) = patch.count {
            self.count = count;
        }
        if let Some(step) = patch.step {
            self.step = step;
        }
        if let Some(history) = patch.history {
            self.history = history;
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Complete Counter Application ===\n");

    println!("1. Initializing counter with SingleStore");
    let store: SingleStore<CounterState> = SingleStore::new(None);

    // Setup a subscriber to log changes
    let _logger = store.subscribe(|state| {
        println!("   [State] Count: {}, Step: {}", state.count, state.step);
    });

    println!("\n2. Selecting derived values");
    let is_positive = use_state_selector(&store, |s: &CounterState| s.count > 0);
    is_positive.on_change(|positive| println!("   [View] positive -> {positive}"));

    let is_even = use_state_selector(&store, |s: &CounterState| s.count % 2 == 0);
    is_even.on_change(|even| println!("   [View] even -> {even}"));

    // Only re-render when the magnitude changes by ten or more
    let magnitude = use_selector_with(
        store.store(),
        STATE_ID,
        |s: &CounterState| s.count.abs(),
        |last: &i32, next: &i32| (last - next).abs() < 10,
    );
    magnitude.on_change(|abs| println!("   [View] magnitude -> {abs}"));

    let print_state = || {
        println!(
            "   Positive: {} | Even: {} | Abs: {}",
            is_positive.get(),
            is_even.get(),
            magnitude.get()
        );
    };

    println!("\n3. Initial state:");
    print_state();

    println!("\n4. Incrementing...");
    for _ in 0..3 {
        store.update_with(CounterState::increment);
    }
    print_state();

    println!("\n5. Changing step size to 5");
    store.patch(CounterPatch {
        step: Some(5),
        ..Default::default()
    });

    println!("\n6. Incrementing with new step...");
    store.update_with(CounterState::increment);
    print_state();

    println!("\n7. Jumping to 100 with step 10 in one batch (no notifications)...");
    let keyed: &Store<CounterState> = store.store();
    keyed.batch_init();
    keyed.patch(
        STATE_ID,
        CounterPatch {
            step: Some(10),
            ..Default::default()
        },
    );
    keyed.update_with(STATE_ID, |s: &CounterState| s.moved_to(100));
    keyed.batch_finish();
    // Selections still show the pre-batch values
    print_state();

    println!("\n8. Decrementing after the batch...");
    store.update_with(CounterState::decrement);
    print_state();

    println!("\n9. History:");
    if let Some(state) = store.get_props() {
        println!("   {:?}", state.history);
    }

    println!("\n10. Resetting...");
    store.update_with(CounterState::reset);
    print_state();

    println!("\n11. Final history:");
    if let Some(state) = store.get_props() {
        println!("   {:?}", state.history);
    }

    println!("\n✓ Counter application complete!");
}
