mod common;

use anyhow::Result;
use common::{TestTree, age_file, set_mtime};
use std::cell::Cell;
use std::fs;
use std::time::{Duration, SystemTime};
use walkcache::Error;
use walkcache::TEMP_PREFIX;
use walkcache::cache::{CachePurger, CompiledCache, Freshness, Origin, is_artifact_name};
use walkcache::decode::{Decoder, DescriptorDecoder, Value};
use walkcache::storage::LocalStorage;

#[test]
fn test_second_load_reads_artifact() -> Result<()> {
    let tree = TestTree::new()?;
    let source = tree.write("cfg.json", r#"{"k":"v"}"#)?;
    let decodes = Cell::new(0);
    let counting = |path: &str, bytes: &[u8]| -> walkcache::Result<Value> {
        decodes.set(decodes.get() + 1);
        DescriptorDecoder.decode(path, bytes)
    };
    let cache = CompiledCache::new(LocalStorage::new(), counting, tree.cache_root());

    let first = cache.load(&source)?;
    let second = cache.load(&source)?;

    assert_eq!(first.get("k").and_then(Value::as_str), Some("v"));
    assert_eq!(first, second);
    assert_eq!(decodes.get(), 1);
    Ok(())
}

#[test]
fn test_edited_source_is_recompiled() -> Result<()> {
    let tree = TestTree::new()?;
    let source = tree.write("cfg.json", r#"{"k":"v"}"#)?;
    let cache = tree.cache();
    cache.load(&source)?;

    // Make sure the edit lands strictly after the artifact
    let artifact = cache.artifact_path(&source)?;
    age_file(&artifact, Duration::from_secs(60))?;
    fs::write(&source, r#"{"k":"w"}"#)?;

    let loaded = cache.load_traced(&source)?;
    assert_eq!(loaded.origin, Origin::Compiled);
    assert_eq!(loaded.value.get("k").and_then(Value::as_str), Some("w"));

    let again = cache.load_traced(&source)?;
    assert_eq!(again.origin, Origin::Artifact);
    assert_eq!(again.value, loaded.value);
    Ok(())
}

#[test]
fn test_same_timestamp_is_fresh() -> Result<()> {
    let tree = TestTree::new()?;
    let source = tree.write("cfg.toml", "k = 1")?;
    let cache = tree.cache();
    cache.load(&source)?;

    let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    set_mtime(&source, when)?;
    set_mtime(cache.artifact_path(&source)?, when)?;

    assert!(matches!(cache.status(&source)?, Freshness::Fresh { .. }));
    assert_eq!(cache.load_traced(&source)?.origin, Origin::Artifact);
    Ok(())
}

#[test]
fn test_artifact_named_after_source() -> Result<()> {
    let tree = TestTree::new()?;
    let source = tree.write("service.toml", "k = 1")?;
    tree.cache().load(&source)?;

    let names = tree.artifact_names();
    assert_eq!(names.len(), 1);
    assert!(names[0].starts_with("service.toml-"));
    assert!(is_artifact_name(&names[0]));
    Ok(())
}

#[test]
fn test_same_file_name_in_two_dirs() -> Result<()> {
    let tree = TestTree::new()?;
    let one = tree.write("one/app.json", r#"{"n":1}"#)?;
    let two = tree.write("two/app.json", r#"{"n":2}"#)?;
    let cache = tree.cache();

    assert_eq!(cache.load(&one)?.get("n").and_then(Value::as_i64), Some(1));
    assert_eq!(cache.load(&two)?.get("n").and_then(Value::as_i64), Some(2));
    assert_eq!(cache.load(&one)?.get("n").and_then(Value::as_i64), Some(1));
    assert_eq!(tree.artifact_names().len(), 2);
    Ok(())
}

#[test]
fn test_purge_then_load_recompiles() -> Result<()> {
    let tree = TestTree::new()?;
    let source = tree.write("cfg.json", "{}")?;
    let cache = tree.cache();
    cache.load(&source)?;

    let removed = CachePurger::new(LocalStorage::new(), tree.cache_root()).purge()?;

    assert_eq!(removed, 1);
    assert!(tree.artifact_names().is_empty());
    assert_eq!(cache.load_traced(&source)?.origin, Origin::Compiled);
    Ok(())
}

#[test]
fn test_purge_leaves_foreign_files() -> Result<()> {
    let tree = TestTree::new()?;
    let source = tree.write("cfg.json", "{}")?;
    tree.cache().load(&source)?;
    fs::write(tree.cache_dir().join("notes.txt"), "keep")?;

    assert_eq!(tree.cache().purge()?, 1);
    assert_eq!(tree.artifact_names(), vec!["notes.txt".to_string()]);
    Ok(())
}

#[test]
fn test_purge_sweeps_interrupted_writes() -> Result<()> {
    let tree = TestTree::new()?;
    let source = tree.write("cfg.json", "{}")?;
    tree.cache().load(&source)?;
    let leftover = tree.cache_dir().join(format!("{TEMP_PREFIX}x7Qp2m"));
    fs::write(&leftover, "half an artifact")?;

    assert_eq!(tree.cache().purge()?, 1);
    assert!(!leftover.exists());
    assert!(tree.artifact_names().is_empty());
    Ok(())
}

#[test]
fn test_purge_of_missing_or_empty_root() -> Result<()> {
    let tree = TestTree::new()?;
    let purger = CachePurger::new(LocalStorage::new(), tree.cache_root());

    assert_eq!(purger.purge()?, 0);
    fs::create_dir_all(tree.cache_dir())?;
    assert_eq!(purger.purge()?, 0);
    Ok(())
}

#[test]
fn test_deleted_source_is_not_found_despite_artifact() -> Result<()> {
    let tree = TestTree::new()?;
    let source = tree.write("cfg.json", r#"{"k":"v"}"#)?;
    let cache = tree.cache();
    cache.load(&source)?;
    fs::remove_file(&source)?;

    let err = cache.load(&source).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.path(), Some(source.as_str()));
    Ok(())
}

#[test]
fn test_malformed_source_is_decode_error() -> Result<()> {
    let tree = TestTree::new()?;
    let source = tree.write("broken.toml", "k = = 1")?;

    let err = tree.cache().load(&source).unwrap_err();

    assert!(matches!(err, Error::Decode { .. }));
    assert_eq!(err.path(), Some(source.as_str()));
    assert!(tree.artifact_names().is_empty());
    Ok(())
}

#[test]
fn test_malformed_edit_does_not_fall_back_to_old_artifact() -> Result<()> {
    let tree = TestTree::new()?;
    let source = tree.write("cfg.json", r#"{"k":"v"}"#)?;
    let cache = tree.cache();
    cache.load(&source)?;

    age_file(cache.artifact_path(&source)?, Duration::from_secs(60))?;
    fs::write(&source, "{")?;

    assert!(matches!(cache.load(&source), Err(Error::Decode { .. })));
    Ok(())
}

#[test]
fn test_unknown_format_is_unsupported() -> Result<()> {
    let tree = TestTree::new()?;
    let source = tree.write("cfg.yaml", "k: v")?;
    assert!(matches!(tree.cache().load(&source), Err(Error::Unsupported(_))));
    Ok(())
}

#[test]
fn test_invalidate_forces_one_recompile() -> Result<()> {
    let tree = TestTree::new()?;
    let source = tree.write("cfg.json", "{}")?;
    let cache = tree.cache();
    cache.load(&source)?;

    assert!(cache.invalidate(&source)?);
    assert_eq!(cache.status(&source)?, Freshness::Missing);
    assert_eq!(cache.load_traced(&source)?.origin, Origin::Compiled);
    Ok(())
}

#[test]
fn test_higher_compression_level_loads_identically() -> Result<()> {
    let tree = TestTree::new()?;
    let body: String = (0..200).map(|i| format!("\"k{i}\":{i},")).collect();
    let source = tree.write("big.json", &format!("{{{}\"end\":true}}", body))?;

    let fast = tree.cache().load(&source)?;
    tree.cache().purge()?;
    let tight = tree.cache().with_compression_level(19).load(&source)?;

    assert_eq!(fast, tight);
    Ok(())
}
