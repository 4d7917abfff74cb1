//! Property tests for the timer lifecycle controller

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;
use tempfile::TempDir;
use timerstore::controller::TimerController;
use timerstore::error::TimerError;
use timerstore::storage::{MemoryTimerStore, SqliteTimerStore, TimerStore};
use timerstore::Timer;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn arb_timer() -> impl Strategy<Value = Timer> {
    (
        "[a-z0-9-]{1,16}",
        "[0-9T:Z-]{0,24}",
        prop::collection::btree_map("[a-z]{1,6}", "[ -~]{0,12}", 0..4),
        "[ -~]{0,24}",
        any::<i64>(),
    )
        .prop_map(|(id, expires, metadata, callback, delete_after)| Timer {
            id,
            expires,
            metadata,
            callback_reference: callback,
            delete_after,
        })
}

fn body(timer: &Timer) -> Vec<u8> {
    serde_json::to_vec(timer).unwrap()
}

fn controller() -> (TimerController, Arc<MemoryTimerStore>) {
    let store = Arc::new(MemoryTimerStore::new());
    (TimerController::new(store.clone(), None), store)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_created_timer_lists_back_unchanged(timer in arb_timer()) {
        let (controller, _) = controller();
        let rt = runtime();

        let created = rt.block_on(controller.create(&body(&timer))).unwrap();
        let listed = rt.block_on(controller.list()).unwrap();

        prop_assert_eq!(&created, &timer);
        prop_assert_eq!(listed, vec![timer]);
    }

    #[test]
    fn prop_second_create_is_rejected(first in arb_timer(), second in arb_timer()) {
        let (controller, store) = controller();
        let rt = runtime();
        let duplicate = Timer { id: first.id.clone(), ..second };

        rt.block_on(controller.create(&body(&first))).unwrap();
        let result = rt.block_on(controller.create(&body(&duplicate)));

        prop_assert!(matches!(result, Err(TimerError::DuplicateIdentifier(_))));
        prop_assert_eq!(store.count_by_id(&first.id).unwrap(), 1);
        prop_assert_eq!(store.find_one(&first.id).unwrap(), Some(first));
    }

    #[test]
    fn prop_changed_delete_after_leaves_entry_untouched(
        original in arb_timer(),
        replacement in arb_timer(),
    ) {
        prop_assume!(original.delete_after != replacement.delete_after);

        let (controller, store) = controller();
        let rt = runtime();
        let replacement = Timer { id: original.id.clone(), ..replacement };

        rt.block_on(controller.create(&body(&original))).unwrap();
        let result = rt.block_on(controller.replace(&original.id, &body(&replacement)));

        prop_assert!(matches!(result, Err(TimerError::Unauthorized)));
        prop_assert_eq!(store.find_one(&original.id).unwrap(), Some(original));
    }

    #[test]
    fn prop_replace_is_idempotent(
        original in arb_timer(),
        expires in "[0-9T:Z-]{0,24}",
        metadata in prop::collection::btree_map("[a-z]{1,6}", "[a-z]{0,6}", 0..3),
    ) {
        let (controller, store) = controller();
        let rt = runtime();
        let replacement = Timer {
            expires,
            metadata,
            ..original.clone()
        };

        rt.block_on(controller.create(&body(&original))).unwrap();
        let first = rt.block_on(controller.replace(&original.id, &body(&replacement))).unwrap();
        let after_first = store.find_one(&original.id).unwrap();
        let second = rt.block_on(controller.replace(&original.id, &body(&replacement))).unwrap();
        let after_second = store.find_one(&original.id).unwrap();

        prop_assert_eq!(&first, &replacement);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(after_first, after_second);
        prop_assert_eq!(store.len(), 1);
    }
}

#[test]
fn test_null_meta_tags_decode_to_empty_map() {
    let (controller, _) = controller();
    let rt = runtime();

    let created = rt
        .block_on(controller.create(br#"{"timerid":"t1","metaTags":null}"#))
        .unwrap();

    assert_eq!(created.metadata, BTreeMap::new());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_with_same_id_admit_one() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(SqliteTimerStore::new(dir.path().join("timers.db")).unwrap());
    let controller = TimerController::new(store.clone(), None);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let controller = controller.clone();
            let timer = Timer::new("shared").with_expires(format!("2030-01-0{}T00:00:00Z", i + 1));
            tokio::spawn(async move { controller.create(&body(&timer)).await })
        })
        .collect();

    let mut created = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(err) => assert!(matches!(err, TimerError::DuplicateIdentifier(_))),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(store.count_by_id("shared").unwrap(), 1);
}
