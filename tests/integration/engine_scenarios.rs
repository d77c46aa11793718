use std::sync::Arc;
use std::time::Duration;

use dirorder::compare::host_is_case_sensitive;
use dirorder::{
    CaseSensitivity, Comparator, DirectoryIdentity, EngineOptions, MemoryStorage, OrderChange,
    OrderEngine, OrderError,
};

use crate::integration::support::{
    engine_over, has_record, names, seed_record, workspace, LaggingReads, METADATA_ROOT,
};

#[tokio::test]
async fn default_order_lists_directories_first_without_a_record() {
    let (storage, engine, ws) = workspace();

    let order = engine.effective_order(&ws).await.unwrap();

    assert_eq!(order, names(&["folder1", "folder2", "file1", "file2", "file3"]));
    assert!(storage.files_under(METADATA_ROOT).is_empty());
    assert_eq!(storage.write_count(), 0);
}

#[tokio::test]
async fn reconciliation_twice_writes_once() {
    let (storage, engine, ws) = workspace();
    seed_record(&storage, &engine, &ws, &["file3", "folder1"]);
    storage.add_file("/ws/file4", "");

    let first = engine.effective_order(&ws).await.unwrap();
    let writes_after_first = storage.write_count();
    let second = engine.effective_order(&ws).await.unwrap();

    assert_eq!(
        first,
        names(&["file3", "folder1", "folder2", "file1", "file2", "file4"])
    );
    assert_eq!(first, second);
    assert_eq!(writes_after_first, 1);
    assert_eq!(storage.write_count(), 1);
}

#[tokio::test]
async fn remove_scenario() {
    let (_, engine, ws) = workspace();
    let order = engine
        .apply_change(&ws, OrderChange::Remove { index: 0 })
        .await
        .unwrap();
    assert_eq!(order, names(&["folder2", "file1", "file2", "file3"]));
}

#[tokio::test]
async fn swap_scenario_persists() {
    let (storage, engine, ws) = workspace();
    let order = engine
        .apply_change(&ws, OrderChange::Swap { a: 0, b: 1 })
        .await
        .unwrap();

    let expected = names(&["folder2", "folder1", "file1", "file2", "file3"]);
    assert_eq!(order, expected);
    let on_disk: Vec<String> =
        serde_json::from_slice(&storage.file(engine.record_path(&ws)).unwrap()).unwrap();
    assert_eq!(on_disk, expected);
}

#[tokio::test]
async fn move_lot_scenario_persists_once() {
    let (storage, engine, ws) = workspace();
    let order = engine
        .apply_change(
            &ws,
            OrderChange::MoveLot {
                indices: vec![2, 3, 4],
                destination: 0,
            },
        )
        .await
        .unwrap();

    assert_eq!(order, names(&["file1", "file2", "file3", "folder1", "folder2"]));
    assert_eq!(storage.write_count(), 1);
}

#[tokio::test]
async fn add_lot_then_remove_lot_restores_order() {
    let (storage, engine, ws) = workspace();
    let changes = vec![
        OrderChange::AddLot {
            names: names(&["draft-a", "draft-b"]),
            indices: vec![1, 4],
        },
        OrderChange::RemoveLot {
            indices: vec![1, 4],
        },
    ];

    let order = engine.apply_batch(&ws, &changes).await.unwrap();

    assert_eq!(order, names(&["folder1", "folder2", "file1", "file2", "file3"]));
    assert_eq!(storage.write_count(), 0);
}

#[tokio::test]
async fn mismatched_add_lot_leaves_record_unchanged() {
    let (storage, engine, ws) = workspace();
    engine
        .apply_change(&ws, OrderChange::Swap { a: 0, b: 1 })
        .await
        .unwrap();
    let before = storage.file(engine.record_path(&ws)).unwrap();

    let err = engine
        .apply_change(
            &ws,
            OrderChange::AddLot {
                names: names(&["a", "b"]),
                indices: vec![0],
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, OrderError::InvalidBatch(_)));
    assert_eq!(storage.file(engine.record_path(&ws)).unwrap(), before);
    assert_eq!(storage.write_count(), 1);
}

#[tokio::test]
async fn batch_with_bad_change_persists_nothing() {
    let (storage, engine, ws) = workspace();
    let changes = vec![
        OrderChange::Swap { a: 0, b: 4 },
        OrderChange::Remove { index: 17 },
    ];

    assert!(engine.apply_batch(&ws, &changes).await.is_err());
    assert!(!has_record(&storage, &engine, &ws));
}

#[tokio::test]
async fn lot_of_changes_is_one_write() {
    let (storage, engine, ws) = workspace();
    let changes = vec![
        OrderChange::Swap { a: 0, b: 1 },
        OrderChange::Move { from: 4, to: 0 },
        OrderChange::MoveLot {
            indices: vec![1, 2],
            destination: 3,
        },
    ];

    let order = engine.apply_batch(&ws, &changes).await.unwrap();

    assert_eq!(order, names(&["file3", "file1", "file2", "folder2", "folder1"]));
    assert_eq!(storage.write_count(), 1);
}

#[tokio::test]
async fn empty_directory_never_gets_a_record() {
    let (storage, engine, _) = workspace();
    storage.add_dir("/ws/empty");
    let empty = DirectoryIdentity::new("/ws/empty");

    let noop = engine
        .apply_change(
            &empty,
            OrderChange::MoveLot {
                indices: vec![],
                destination: 0,
            },
        )
        .await
        .unwrap();
    let swap = engine
        .apply_change(&empty, OrderChange::Swap { a: 0, b: 0 })
        .await;

    assert!(noop.is_empty());
    assert!(matches!(swap, Err(OrderError::IndexOutOfRange { .. })));
    assert!(!has_record(&storage, &engine, &empty));
}

#[tokio::test]
async fn emptied_directory_loses_its_record() {
    let (storage, engine, _) = workspace();
    storage.add_file("/ws/folder1/a", "");
    storage.add_file("/ws/folder1/b", "");
    let folder = DirectoryIdentity::new("/ws/folder1");
    engine
        .apply_change(&folder, OrderChange::Swap { a: 0, b: 1 })
        .await
        .unwrap();
    assert!(has_record(&storage, &engine, &folder));

    storage.remove("/ws/folder1/a");
    storage.remove("/ws/folder1/b");
    assert!(engine.effective_order(&folder).await.unwrap().is_empty());
    assert!(!has_record(&storage, &engine, &folder));
}

#[tokio::test]
async fn failed_persist_keeps_previous_order() {
    let (storage, engine, ws) = workspace();
    engine
        .apply_change(&ws, OrderChange::Swap { a: 0, b: 1 })
        .await
        .unwrap();

    storage.set_fail_writes(true);
    let err = engine
        .apply_change(&ws, OrderChange::Swap { a: 2, b: 3 })
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::StorageUnavailable(_)));

    storage.set_fail_writes(false);
    assert_eq!(
        engine.effective_order(&ws).await.unwrap(),
        names(&["folder2", "folder1", "file1", "file2", "file3"])
    );
}

#[tokio::test]
async fn corrupt_record_falls_back_and_is_rewritten() {
    let (storage, engine, ws) = workspace();
    storage.add_file(engine.record_path(&ws), "[\"file1\", ");

    assert_eq!(
        engine.effective_order(&ws).await.unwrap(),
        names(&["folder1", "folder2", "file1", "file2", "file3"])
    );

    engine
        .apply_change(&ws, OrderChange::Move { from: 4, to: 0 })
        .await
        .unwrap();
    let on_disk: Vec<String> =
        serde_json::from_slice(&storage.file(engine.record_path(&ws)).unwrap()).unwrap();
    assert_eq!(on_disk, names(&["file3", "folder1", "folder2", "file1", "file2"]));
}

#[tokio::test]
async fn add_places_new_child_and_keeps_it_unique() {
    let (storage, engine, ws) = workspace();
    engine
        .apply_change(&ws, OrderChange::Swap { a: 0, b: 1 })
        .await
        .unwrap();
    storage.add_file("/ws/notes.md", "");

    let order = engine
        .apply_change(
            &ws,
            OrderChange::Add {
                name: "notes.md".to_string(),
                index: 1,
            },
        )
        .await
        .unwrap();

    assert_eq!(
        order,
        names(&["folder2", "notes.md", "folder1", "file1", "file2", "file3"])
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_changes_to_one_directory_are_not_lost() {
    let (storage, engine, ws) = workspace();
    let added: Vec<String> = (0..8).map(|i| format!("n{}", i)).collect();
    for name in &added {
        storage.add_file(format!("/ws/{}", name), "");
    }
    let engine = Arc::new(engine);

    let mut handles = vec![];
    for name in added.clone() {
        let engine = engine.clone();
        let ws = ws.clone();
        handles.push(tokio::spawn(async move {
            engine
                .apply_change(&ws, OrderChange::Add { name, index: 0 })
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let order = engine.effective_order(&ws).await.unwrap();
    let mut front: Vec<String> = order[..8].to_vec();
    front.sort();
    assert_eq!(front, added);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn slow_read_does_not_hide_a_completed_change() {
    let memory = Arc::new(MemoryStorage::new());
    memory.add_dir(METADATA_ROOT);
    for child in ["a", "b", "c"] {
        memory.add_file(format!("/ws/d/{}", child), "");
    }
    let storage = Arc::new(LaggingReads::new(memory.clone(), Duration::from_millis(150)));
    let options = EngineOptions::new(METADATA_ROOT)
        .with_comparator(Comparator::new(CaseSensitivity::Sensitive));
    let engine = Arc::new(OrderEngine::new(storage, options));
    let dir = DirectoryIdentity::new("/ws/d");
    seed_record(&memory, &engine, &dir, &["b", "a", "c"]);

    let reader = {
        let engine = engine.clone();
        let dir = dir.clone();
        tokio::spawn(async move { engine.record(&dir).await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;

    let changed = engine
        .apply_change(&dir, OrderChange::Swap { a: 1, b: 2 })
        .await
        .unwrap();
    assert_eq!(changed, names(&["b", "c", "a"]));

    reader.await.unwrap().unwrap();
    assert_eq!(engine.effective_order(&dir).await.unwrap(), names(&["b", "c", "a"]));
}

#[tokio::test]
async fn unicode_spellings_are_separate_directories() {
    if !host_is_case_sensitive() {
        return;
    }
    let storage = Arc::new(MemoryStorage::new());
    storage.add_dir(METADATA_ROOT);
    let composed = DirectoryIdentity::new("/ws/caf\u{e9}");
    let decomposed = DirectoryIdentity::new("/ws/cafe\u{301}");
    for dir in [&composed, &decomposed] {
        storage.add_file(dir.path().join("x"), "");
        storage.add_file(dir.path().join("y"), "");
    }
    let engine = engine_over(&storage);
    assert_ne!(engine.record_path(&composed), engine.record_path(&decomposed));

    engine
        .apply_change(&composed, OrderChange::Swap { a: 0, b: 1 })
        .await
        .unwrap();

    assert_eq!(engine.effective_order(&composed).await.unwrap(), names(&["y", "x"]));
    assert_eq!(engine.effective_order(&decomposed).await.unwrap(), names(&["x", "y"]));
    assert!(!has_record(&storage, &engine, &decomposed));
}
