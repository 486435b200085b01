use crate::error::Result;
use crate::field::{FieldId, Props};
use crate::registry;
use crate::store::{Store, Subscription};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Render = Box<dyn FnMut(&[FieldId])>;

struct ListState {
    ids: RefCell<Vec<FieldId>>,
    render: RefCell<Option<Render>>,
}

/// The ordered id list of a store, kept current as fields come and go.
///
/// Dropping the list unsubscribes it.
pub struct FieldsList {
    state: Rc<ListState>,
    subscription: Subscription,
}

impl FieldsList {
    /// Track the field ids of `store`.
    pub fn new<P: Props>(store: &Store<P>) -> Self {
        let state = Rc::new(ListState {
            ids: RefCell::new(store.field_ids()),
            render: RefCell::new(None),
        });

        let listener = Rc::clone(&state);
        let subscription = store.subscribe_to_list(move |ids| {
            *listener.ids.borrow_mut() = ids.to_vec();
            let render = listener.render.borrow_mut().take();
            if let Some(mut render) = render {
                render(ids);
                let mut slot = listener.render.borrow_mut();
                if slot.is_none() {
                    *slot = Some(render);
                }
            }
        });

        Self {
            state,
            subscription,
        }
    }

    /// Track the store registered under `name`.
    pub fn named<P: Props>(name: &str) -> Result<Self> {
        let store = registry::fetch::<P>(name)?;
        Ok(Self::new(&store))
    }

    /// The current id list.
    pub fn ids(&self) -> Vec<FieldId> {
        self.state.ids.borrow().clone()
    }

    /// Number of ids.
    pub fn len(&self) -> usize {
        self.state.ids.borrow().len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.state.ids.borrow().is_empty()
    }

    /// Set the callback invoked with the new list on every change.
    pub fn on_change(&self, render: impl FnMut(&[FieldId]) + 'static) {
        *self.state.render.borrow_mut() = Some(Box::new(render));
    }
}

impl Drop for FieldsList {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

impl fmt::Debug for FieldsList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldsList")
            .field("ids", &self.state.ids.borrow())
            .finish()
    }
}
