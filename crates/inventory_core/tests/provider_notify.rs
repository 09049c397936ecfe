use inventory_core::{
    ChangeObserver, ObserverRegistry, ProductProvider, ProductValues, Projection, ResourceUri,
};
use std::sync::{Arc, Mutex};

const PICTURE: &[u8] = &[0x89, 0x50, 0x4e, 0x47];

fn widget() -> ProductValues {
    ProductValues::new()
        .with_name("Widget")
        .with_price(10)
        .with_quantity(5)
        .with_picture(PICTURE.to_vec())
}

#[derive(Default)]
struct RecordingObserver {
    seen: Mutex<Vec<String>>,
}

impl RecordingObserver {
    fn seen(&self) -> Vec<String> {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl ChangeObserver for RecordingObserver {
    fn on_change(&self, uri: &ResourceUri) {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(uri.to_string());
    }
}

fn provider_with_observer() -> (ProductProvider, Arc<RecordingObserver>) {
    let registry = Arc::new(ObserverRegistry::new());
    let observer = Arc::new(RecordingObserver::default());
    registry.register(ResourceUri::collection(), &observer);
    let provider = ProductProvider::open_in_memory(registry).unwrap();
    (provider, observer)
}

#[test]
fn collection_observer_hears_inserts_updates_and_deletes() {
    let (provider, observer) = provider_with_observer();

    let id = provider
        .insert(&ResourceUri::collection(), &widget())
        .unwrap();
    provider
        .update(
            &ResourceUri::item(id),
            &ProductValues::new().with_quantity(4),
            None,
        )
        .unwrap();
    provider.delete(&ResourceUri::item(id), None).unwrap();

    assert_eq!(
        observer.seen(),
        vec![
            ResourceUri::collection().to_string(),
            ResourceUri::item(id).to_string(),
            ResourceUri::item(id).to_string(),
        ]
    );
}

#[test]
fn zero_row_mutations_raise_no_notification() {
    let (provider, observer) = provider_with_observer();
    let id = provider
        .insert(&ResourceUri::collection(), &widget())
        .unwrap();
    let baseline = observer.seen().len();

    // Empty field set: documented no-op.
    provider
        .update(&ResourceUri::item(id), &ProductValues::new(), None)
        .unwrap();
    // Row that does not exist.
    provider.delete(&ResourceUri::item(id + 100), None).unwrap();

    assert_eq!(observer.seen().len(), baseline);
}

#[test]
fn collection_cursor_goes_stale_on_insert_and_refresh_recovers() {
    let registry = Arc::new(ObserverRegistry::new());
    let provider = ProductProvider::open_in_memory(registry).unwrap();

    let mut cursor = provider
        .query(&ResourceUri::collection(), &Projection::Full, None, None)
        .unwrap();
    assert_eq!(cursor.count().unwrap(), 0);
    assert!(!cursor.is_stale());

    provider
        .insert(&ResourceUri::collection(), &widget())
        .unwrap();
    assert!(cursor.is_stale());

    cursor.refresh().unwrap();
    assert!(!cursor.is_stale());
    assert_eq!(cursor.count().unwrap(), 1);
}

#[test]
fn item_cursor_goes_stale_when_that_item_changes() {
    let registry = Arc::new(ObserverRegistry::new());
    let provider = ProductProvider::open_in_memory(registry).unwrap();
    let id = provider
        .insert(&ResourceUri::collection(), &widget())
        .unwrap();
    let other = provider
        .insert(&ResourceUri::collection(), &widget().with_name("Gadget"))
        .unwrap();

    let mut cursor = provider
        .query(&ResourceUri::item(id), &Projection::Full, None, None)
        .unwrap();
    assert_eq!(cursor.count().unwrap(), 1);

    provider
        .update(
            &ResourceUri::item(other),
            &ProductValues::new().with_quantity(1),
            None,
        )
        .unwrap();
    assert!(!cursor.is_stale());

    provider
        .update(
            &ResourceUri::item(id),
            &ProductValues::new().with_quantity(1),
            None,
        )
        .unwrap();
    assert!(cursor.is_stale());

    cursor.refresh().unwrap();
    assert_eq!(cursor.next().unwrap().unwrap().quantity, 1);
}

#[test]
fn item_cursor_goes_stale_on_collection_wide_delete() {
    let registry = Arc::new(ObserverRegistry::new());
    let provider = ProductProvider::open_in_memory(registry).unwrap();
    let id = provider
        .insert(&ResourceUri::collection(), &widget())
        .unwrap();

    let mut cursor = provider
        .query(&ResourceUri::item(id), &Projection::Full, None, None)
        .unwrap();
    assert_eq!(cursor.count().unwrap(), 1);

    provider.delete(&ResourceUri::collection(), None).unwrap();
    assert!(cursor.is_stale());

    cursor.refresh().unwrap();
    assert_eq!(cursor.count().unwrap(), 0);
}

#[test]
fn dropped_cursors_are_pruned_from_the_registry() {
    let registry = Arc::new(ObserverRegistry::new());
    let provider = ProductProvider::open_in_memory(Arc::clone(&registry)).unwrap();

    let cursor = provider
        .query(&ResourceUri::collection(), &Projection::Full, None, None)
        .unwrap();
    assert_eq!(registry.watcher_count(), 1);

    drop(cursor);
    assert_eq!(registry.watcher_count(), 0);
}
