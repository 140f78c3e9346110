#[cfg(test)]
pub mod fixtures {
    use crate::WalkcacheContext;
    use crate::cache::CacheRoot;
    use anyhow::Result;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Scratch tree with its own config file and cache root.
    pub struct TestEnv {
        pub temp_dir: TempDir,
        pub context: WalkcacheContext,
    }

    impl TestEnv {
        pub fn new() -> Result<Self> {
            let temp_dir = tempfile::tempdir()?;
            let config_path = temp_dir.path().join("config/config.toml");
            let cache_root = CacheRoot::new(temp_dir.path().join("cache").to_string_lossy());
            let context = WalkcacheContext::new_explicit(config_path, cache_root)?;
            Ok(Self { temp_dir, context })
        }

        pub fn create_file(&self, name: &str, content: &str) -> Result<PathBuf> {
            let path = self.temp_dir.path().join("tree").join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, content)?;
            Ok(path)
        }

        pub fn tree(&self) -> String {
            self.temp_dir.path().join("tree").to_string_lossy().into_owned()
        }

        pub fn cache_dir(&self) -> PathBuf {
            PathBuf::from(self.context.cache_root.as_str())
        }

        pub fn artifact_count(&self) -> usize {
            fs::read_dir(self.cache_dir()).map_or(0, Iterator::count)
        }
    }
}
