use proptest::prelude::*;
use std::collections::BTreeSet;
use walkcache::cache::CacheRoot;
use walkcache::storage::MemoryStorage;
use walkcache::walk::walk;

/// Relative file paths of up to four levels over a small alphabet, so
/// generated trees share directories.
fn tree_paths() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::collection::vec("[a-d]{1,2}", 1..=4), 0..40)
        .prop_map(|paths| paths.into_iter().map(|segments| segments.join("/")).collect())
}

/// Builds the tree, skipping paths that would put a file where a directory
/// already is (or the reverse). Returns every node created below `/r`.
fn build(storage: &MemoryStorage, paths: &[String]) -> BTreeSet<String> {
    storage.add_dir("/r").unwrap();
    let mut nodes = BTreeSet::new();
    for relative in paths {
        let full = format!("/r/{relative}");
        if storage.add_file(&full, "x").is_ok() {
            let mut prefix = String::from("/r");
            for segment in relative.split('/') {
                prefix = format!("{prefix}/{segment}");
                nodes.insert(prefix.clone());
            }
        }
    }
    nodes
}

proptest! {
    #[test]
    fn test_walk_visits_every_node_once_in_pre_order(
        paths in tree_paths(),
        dots in any::<bool>(),
    ) {
        let storage = MemoryStorage::new().with_dot_entries(dots);
        let nodes = build(&storage, &paths);

        let emitted = walk(&storage, "/r", None)
            .unwrap()
            .collect::<walkcache::Result<Vec<_>>>()
            .unwrap();

        let unique: BTreeSet<_> = emitted.iter().cloned().collect();
        prop_assert_eq!(unique.len(), emitted.len());
        prop_assert_eq!(&unique, &nodes);
        prop_assert!(emitted.iter().all(|p| !p.ends_with("/.") && !p.ends_with("/..")));

        // Each descendant follows its parent
        for (i, path) in emitted.iter().enumerate() {
            let parent = &path[..path.rfind('/').unwrap()];
            if parent != "/r" {
                let p = emitted.iter().position(|q| q == parent).unwrap();
                prop_assert!(p < i);
            }
        }

        // No container is listed twice
        let listings = storage.listings();
        let distinct: BTreeSet<_> = listings.iter().collect();
        prop_assert_eq!(distinct.len(), listings.len());
        prop_assert_eq!(storage.open_handles(), 0);
    }

    #[test]
    fn test_abandoning_anywhere_releases_handles(paths in tree_paths(), stop in 0usize..50) {
        let storage = MemoryStorage::new();
        build(&storage, &paths);

        let taken = walk(&storage, "/r", None).unwrap().take(stop).count();
        prop_assert!(taken <= stop);
        prop_assert_eq!(storage.open_handles(), 0);
    }

    #[test]
    fn test_artifact_paths_stay_under_root(source in "/[a-zA-Z0-9 _./-]{1,60}") {
        let root = CacheRoot::new("/cache");
        let artifact = root.artifact_path(&source);

        prop_assert!(artifact.starts_with("/cache/"));
        prop_assert!(!artifact["/cache/".len()..].contains('/'));
        prop_assert_eq!(artifact, root.artifact_path(&source));
    }
}
