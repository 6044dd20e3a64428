use std::thread;

use anyhow::Result;
use hmpact_codec::{AnyValue, Predicate};
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};

use super::*;

fn new_store() -> Result<(TempDir, CacheStore)> {
    let temp = tempdir()?;
    let store = CacheStore::new(temp.path().join("cache"));
    Ok((temp, store))
}

#[test]
fn put_then_get_round_trips() -> Result<()> {
    let (_temp, store) = new_store()?;
    let integrity = store.put("1.2.0-pack-en", b"language pack bytes")?;
    let blob = store.get("1.2.0-pack-en")?;
    assert_eq!(blob.data, b"language pack bytes");
    assert_eq!(blob.integrity, integrity);
    assert_eq!(blob.size, 19);
    assert!(integrity.to_string().starts_with("sha256-"));
    Ok(())
}

#[test]
fn missing_key_is_not_found() -> Result<()> {
    let (_temp, store) = new_store()?;
    let err = store.get("absent").unwrap_err();
    assert!(err.is_not_found(), "{err}");
    assert_eq!(err.code(), "HM100");
    assert!(!store.has("absent")?);
    Ok(())
}

#[test]
fn has_requires_index_and_content() -> Result<()> {
    let (_temp, store) = new_store()?;
    assert!(!store.has("k")?);
    let integrity = store.put("k", b"v")?;
    assert!(store.has("k")?);

    fs::remove_file(store.content_path(&integrity))?;
    assert!(!store.has("k")?);
    Ok(())
}

#[test]
fn puts_leave_no_staging_files_behind() -> Result<()> {
    let (_temp, store) = new_store()?;
    store.put("a", b"one")?;
    store.put("a", b"two")?;
    let leftovers = fs::read_dir(store.root().join(TMP_DIR))?.count();
    assert_eq!(leftovers, 0);
    Ok(())
}

#[test]
fn same_key_is_last_writer_wins() -> Result<()> {
    let (_temp, store) = new_store()?;
    store.put("meta", b"old")?;
    let second = store.put("meta", b"new")?;
    let blob = store.get("meta")?;
    assert_eq!(blob.data, b"new");
    assert_eq!(blob.integrity, second);
    assert_eq!(store.list()?.len(), 1);
    Ok(())
}

#[test]
fn identical_content_is_stored_once() -> Result<()> {
    let (_temp, store) = new_store()?;
    let first = store.put("a", b"shared")?;
    let second = store.put("b", b"shared")?;
    assert_eq!(first, second);
    let usage = store.usage()?;
    assert_eq!(usage.entries, 2);
    assert_eq!(usage.content_files, 1);
    assert_eq!(usage.total_bytes, 6);
    Ok(())
}

#[test]
fn tampered_content_is_reported_as_corrupt() -> Result<()> {
    let (_temp, store) = new_store()?;
    let integrity = store.put("k", b"genuine")?;
    fs::write(store.content_path(&integrity), b"forged!")?;
    let err = store.get("k").unwrap_err();
    assert!(matches!(err, CacheError::Corrupt { .. }), "{err}");

    fs::write(store.content_path(&integrity), b"short")?;
    let err = store.get("k").unwrap_err();
    assert!(err.to_string().contains("size mismatch"), "{err}");
    Ok(())
}

#[test]
fn put_rewrites_tampered_content_of_the_same_size() -> Result<()> {
    let (_temp, store) = new_store()?;
    let integrity = store.put("k", b"genuine")?;
    fs::write(store.content_path(&integrity), b"forged!")?;

    assert_eq!(store.put("k", b"genuine")?, integrity);
    assert_eq!(fs::read(store.content_path(&integrity))?, b"genuine");
    assert_eq!(store.get("k")?.data, b"genuine");
    Ok(())
}

#[test]
fn unreadable_index_entry_is_corrupt_not_missing() -> Result<()> {
    let (_temp, store) = new_store()?;
    store.put("k", b"v")?;
    fs::write(store.index_path("k"), b"{not json")?;
    assert!(matches!(store.get("k"), Err(CacheError::Corrupt { .. })));
    assert!(store.list()?.is_empty());
    Ok(())
}

#[test]
fn keys_of_any_shape_are_safe() -> Result<()> {
    let (_temp, store) = new_store()?;
    for key in ["../../escape", "with/slash", "ключ", "a:b*c?"] {
        store.put(key, key.as_bytes())?;
        assert_eq!(store.get(key)?.data, key.as_bytes());
    }
    assert!(!store.root().parent().is_some_and(|p| p.join("escape").exists()));
    Ok(())
}

#[test]
fn list_is_sorted_and_clear_empties_it() -> Result<()> {
    let (_temp, store) = new_store()?;
    store.put("zeta", b"1")?;
    store.put("alpha", b"22")?;
    let keys: Vec<_> = store.list()?.into_iter().map(|e| e.key).collect();
    assert_eq!(keys, ["alpha", "zeta"]);

    store.clear()?;
    assert!(store.list()?.is_empty());
    assert!(!store.root().exists());
    store.clear()?;
    Ok(())
}

#[test]
fn usage_of_missing_root_is_empty() -> Result<()> {
    let (_temp, store) = new_store()?;
    assert_eq!(store.usage()?, CacheUsage::default());
    Ok(())
}

#[test]
fn json_helpers_validate_on_read() -> Result<()> {
    let (_temp, store) = new_store()?;
    store.put_json("pack", &json!({"lang": "en", "messages": {"hi": "Hello"}}))?;

    let any = store.get_validated::<Value>("pack", Some(&AnyValue)).into_result()?;
    assert_eq!(any["lang"], "en");

    let guard = Predicate::new("array", Value::is_array);
    let rejected = store.get_validated::<Value>("pack", Some(&guard));
    assert_eq!(rejected.status(), "validation_failed");

    let missing = store.get_validated::<Value>("nope", None);
    assert_eq!(missing.status(), "not_found");

    store.put("garbage", b"{\"a\" 1}")?;
    assert_eq!(store.get_validated::<Value>("garbage", None).status(), "error");
    Ok(())
}

#[test]
fn concurrent_writers_never_tear_a_value() -> Result<()> {
    let (_temp, store) = new_store()?;
    let payloads: Vec<Vec<u8>> = (0..8u8).map(|n| vec![n; 4096]).collect();
    thread::scope(|scope| {
        for payload in &payloads {
            let store = &store;
            scope.spawn(move || store.put("shared", payload));
        }
    });
    let blob = store.get("shared")?;
    assert!(payloads.contains(&blob.data));
    assert_eq!(store.list()?.len(), 1);
    Ok(())
}
