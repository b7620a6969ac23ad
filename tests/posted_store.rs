// tests/posted_store.rs
use newsbot::dedup::{PostedStore, ENV_POSTED_STORIES};
use std::path::{Path, PathBuf};
use std::{env, fs};

#[test]
fn missing_file_is_empty_and_first_persist_creates_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posted_stories.json");

    let mut store = PostedStore::load(&path);
    assert!(store.is_empty());
    assert_eq!(store.path(), Some(path.as_path()));

    store.add("https://b.example/2");
    store.add("https://a.example/1");
    store.persist().unwrap();

    let raw = fs::read_to_string(&path).unwrap();
    let v: Vec<String> = serde_json::from_str(&raw).unwrap();
    assert_eq!(v, vec!["https://a.example/1", "https://b.example/2"]);
    assert!(!path.with_extension("json.tmp").exists());

    let reloaded = PostedStore::load(&path);
    assert_eq!(reloaded.len(), 2);
    assert!(reloaded.contains("https://b.example/2"));
}

fn quarantined_files(dir: &Path, name: &str) -> Vec<PathBuf> {
    let prefix = format!("{name}.corrupt-");
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&prefix))
        })
        .collect()
}

#[test]
fn corrupt_or_blank_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();

    let corrupt = dir.path().join("corrupt.json");
    fs::write(&corrupt, "{not json").unwrap();
    assert!(PostedStore::load(&corrupt).is_empty());
    assert!(!corrupt.exists());
    assert_eq!(quarantined_files(dir.path(), "corrupt.json").len(), 1);

    let blank = dir.path().join("blank.json");
    fs::write(&blank, "  \n").unwrap();
    assert!(PostedStore::load(&blank).is_empty());
    assert!(blank.exists());
    assert!(quarantined_files(dir.path(), "blank.json").is_empty());
}

#[test]
fn truncated_history_survives_the_next_persist() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posted_stories.json");
    let mut body = String::from("[\n");
    for i in 0..200 {
        body.push_str(&format!("  \"https://old.example/{i}\",\n"));
    }
    body.push_str("  \"https://old.example/trunc");
    fs::write(&path, &body).unwrap();

    let mut store = PostedStore::load(&path);
    assert!(store.is_empty());
    store.add("https://new.example/1");
    assert!(store.persist_best_effort());

    let moved = quarantined_files(dir.path(), "posted_stories.json");
    assert_eq!(moved.len(), 1);
    assert_eq!(fs::read_to_string(&moved[0]).unwrap(), body);

    let v: Vec<String> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(v, vec!["https://new.example/1"]);
}

#[test]
fn persist_into_missing_directory_fails_but_keeps_memory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope").join("posted.json");

    let mut store = PostedStore::load(&path);
    store.add("https://a.example/1");
    assert!(store.persist().is_err());
    assert!(!store.persist_best_effort());
    assert!(store.contains("https://a.example/1"));
}

#[test]
fn retain_unseen_drops_posted_urls_in_order() {
    use newsbot::{Story, Topic};
    let mk = |u: &str| Story::new("t", "", u, Topic::AI, "s", None).unwrap();

    let store = PostedStore::in_memory(["https://x.example/2"]);
    let left = store.retain_unseen(vec![
        mk("https://x.example/1"),
        mk("https://x.example/2"),
        mk("https://x.example/3"),
    ]);
    let urls: Vec<_> = left.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(urls, vec!["https://x.example/1", "https://x.example/3"]);
}

#[serial_test::serial]
#[test]
fn env_list_is_merged_with_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posted.json");
    fs::write(&path, r#"["https://file.example/1"]"#).unwrap();

    env::set_var(
        ENV_POSTED_STORIES,
        r#"["https://env.example/1", "", "https://file.example/1"]"#,
    );
    let store = PostedStore::load_with_env(&path);
    env::remove_var(ENV_POSTED_STORIES);

    assert_eq!(
        store.snapshot(),
        vec!["https://env.example/1", "https://file.example/1"]
    );
}

#[serial_test::serial]
#[test]
fn malformed_env_list_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posted.json");

    env::set_var(ENV_POSTED_STORIES, "not a list");
    let store = PostedStore::load_with_env(&path);
    env::remove_var(ENV_POSTED_STORIES);

    assert!(store.is_empty());
}
