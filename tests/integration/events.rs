use std::path::PathBuf;

use dirorder::{ChangeEvent, DirectoryIdentity};

use crate::integration::support::{has_record, names, seed_record, workspace};

#[tokio::test]
async fn created_entries_appear_on_next_read() {
    let (storage, engine, ws) = workspace();
    seed_record(&storage, &engine, &ws, &["file2", "file1", "file3", "folder2", "folder1"]);

    storage.add_file("/ws/file0", "");
    engine
        .handle_event(&ChangeEvent::Created(PathBuf::from("/ws/file0")))
        .await
        .unwrap();
    assert_eq!(storage.write_count(), 0);
    assert_eq!(storage.delete_count(), 0);

    assert_eq!(
        engine.effective_order(&ws).await.unwrap(),
        names(&["file2", "file1", "file3", "folder2", "folder1", "file0"])
    );
}

#[tokio::test]
async fn removed_entry_is_dropped_from_parent_record() {
    let (storage, engine, ws) = workspace();
    seed_record(&storage, &engine, &ws, &["file2", "file1", "file3", "folder2", "folder1"]);

    storage.remove("/ws/file1");
    engine
        .handle_event(&ChangeEvent::Removed(PathBuf::from("/ws/file1")))
        .await
        .unwrap();

    assert_eq!(
        engine.record(&ws).await.unwrap().unwrap().names(),
        names(&["file2", "file3", "folder2", "folder1"]).as_slice()
    );
}

#[tokio::test]
async fn removed_directory_forgets_its_own_record() {
    let (storage, engine, ws) = workspace();
    storage.add_file("/ws/folder1/a", "");
    let folder = DirectoryIdentity::new("/ws/folder1");
    seed_record(&storage, &engine, &folder, &["a"]);

    storage.remove("/ws/folder1");
    engine
        .handle_event(&ChangeEvent::Removed(PathBuf::from("/ws/folder1")))
        .await
        .unwrap();

    assert!(!has_record(&storage, &engine, &folder));
    assert_eq!(storage.delete_count(), 1);
    // The parent never had a record and still has none.
    assert!(!has_record(&storage, &engine, &ws));
}

#[tokio::test]
async fn removing_the_last_entry_deletes_the_parent_record() {
    let (storage, engine, _) = workspace();
    storage.add_file("/ws/folder2/only", "");
    let folder = DirectoryIdentity::new("/ws/folder2");
    seed_record(&storage, &engine, &folder, &["only"]);

    storage.remove("/ws/folder2/only");
    engine
        .handle_event(&ChangeEvent::Removed(PathBuf::from("/ws/folder2/only")))
        .await
        .unwrap();

    assert!(!has_record(&storage, &engine, &folder));
}

#[tokio::test]
async fn rename_in_place_keeps_position() {
    let (storage, engine, ws) = workspace();
    seed_record(&storage, &engine, &ws, &["file3", "file2", "folder1", "file1", "folder2"]);

    storage.rename("/ws/file2", "/ws/renamed.md");
    engine
        .handle_event(&ChangeEvent::Renamed {
            from: PathBuf::from("/ws/file2"),
            to: PathBuf::from("/ws/renamed.md"),
        })
        .await
        .unwrap();

    assert_eq!(
        engine.effective_order(&ws).await.unwrap(),
        names(&["file3", "renamed.md", "folder1", "file1", "folder2"])
    );
}

#[tokio::test]
async fn renamed_directory_keeps_position_and_record() {
    let (storage, engine, ws) = workspace();
    storage.add_file("/ws/folder1/a", "");
    storage.add_file("/ws/folder1/b", "");
    let folder = DirectoryIdentity::new("/ws/folder1");
    seed_record(&storage, &engine, &ws, &["file1", "folder1", "folder2", "file2", "file3"]);
    seed_record(&storage, &engine, &folder, &["b", "a"]);

    storage.rename("/ws/folder1", "/ws/archive");
    engine
        .handle_event(&ChangeEvent::Renamed {
            from: PathBuf::from("/ws/folder1"),
            to: PathBuf::from("/ws/archive"),
        })
        .await
        .unwrap();

    assert_eq!(
        engine.effective_order(&ws).await.unwrap(),
        names(&["file1", "archive", "folder2", "file2", "file3"])
    );
    assert_eq!(
        engine
            .effective_order(&DirectoryIdentity::new("/ws/archive"))
            .await
            .unwrap(),
        names(&["b", "a"])
    );
    assert!(!has_record(&storage, &engine, &folder));
}

#[tokio::test]
async fn move_across_parents_drops_from_old_parent() {
    let (storage, engine, ws) = workspace();
    seed_record(&storage, &engine, &ws, &["file3", "file1", "folder1", "folder2", "file2"]);

    storage.rename("/ws/file1", "/ws/folder2/file1");
    engine
        .handle_event(&ChangeEvent::Renamed {
            from: PathBuf::from("/ws/file1"),
            to: PathBuf::from("/ws/folder2/file1"),
        })
        .await
        .unwrap();

    assert_eq!(
        engine.record(&ws).await.unwrap().unwrap().names(),
        names(&["file3", "folder1", "folder2", "file2"]).as_slice()
    );
}

#[tokio::test]
async fn copied_directory_gets_a_copy_of_the_record() {
    let (storage, engine, _) = workspace();
    storage.add_file("/ws/folder1/a", "");
    storage.add_file("/ws/folder1/b", "");
    let folder = DirectoryIdentity::new("/ws/folder1");
    seed_record(&storage, &engine, &folder, &["b", "a"]);

    storage.duplicate("/ws/folder1", "/ws/folder2/folder1");
    engine
        .handle_event(&ChangeEvent::Copied {
            from: PathBuf::from("/ws/folder1"),
            to: PathBuf::from("/ws/folder2/folder1"),
        })
        .await
        .unwrap();

    assert!(has_record(&storage, &engine, &folder));
    assert_eq!(
        engine
            .effective_order(&DirectoryIdentity::new("/ws/folder2/folder1"))
            .await
            .unwrap(),
        names(&["b", "a"])
    );
}
