//! Flat-file storage implementation.

use std::path::{Path, PathBuf};

use rand::Rng;
use tokio::fs;

use crate::{Page, PageStore, Result, StoreError, validate_title};

/// Filesystem storage backend.
///
/// Stores each page as `<root>/<title>.txt`. Writes go through a temp
/// file and rename, so a concurrent load sees either the old or the new
/// content, never a partial write.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn page_path(&self, title: &str) -> Result<PathBuf> {
        validate_title(title)?;
        Ok(self.root.join(format!("{title}.txt")))
    }

    /// Generate a random hex string for temp file names.
    fn random_hex() -> String {
        let bytes: [u8; 16] = rand::rng().random();
        hex::encode(bytes)
    }

    /// Atomic write using temp file + rename.
    async fn atomic_write(path: &Path, content: &str) -> std::io::Result<()> {
        let temp_path = path.with_extension(format!("{}.tmp", Self::random_hex()));

        if let Err(e) = fs::write(&temp_path, content).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        // Pages hold user-submitted content; owner read/write only
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) =
                fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600)).await
            {
                let _ = fs::remove_file(&temp_path).await;
                return Err(e);
            }
        }

        if let Err(e) = fs::rename(&temp_path, path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e);
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl PageStore for FileStore {
    async fn load(&self, title: &str) -> Result<Page> {
        let path = self.page_path(title)?;

        let body = fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(title.to_string())
            } else {
                StoreError::from(e)
            }
        })?;

        Ok(Page::new(title, body))
    }

    async fn save(&self, title: &str, body: &str) -> Result<()> {
        let path = self.page_path(title)?;
        let clean = wiki_sanitize::sanitize(body);
        Self::atomic_write(&path, &clean).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut titles = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(title) = name.strip_suffix(".txt") {
                if validate_title(title).is_ok() {
                    titles.push(title.to_string());
                }
            }
        }

        Ok(titles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (TempDir, FileStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path()).await.unwrap();
        (temp_dir, store)
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (temp, store) = create_test_store().await;

        store.save("Foo", "Hello, world!").await.unwrap();
        assert!(temp.path().join("Foo.txt").exists());

        let page = store.load("Foo").await.unwrap();
        assert_eq!(page.title, "Foo");
        assert_eq!(page.body, "Hello, world!");
    }

    #[tokio::test]
    async fn test_load_nonexistent_returns_not_found() {
        let (_temp, store) = create_test_store().await;

        let result = store.load("Missing").await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_save_strips_scripts() {
        let (_temp, store) = create_test_store().await;

        store
            .save("Bar", "<script>alert(1)</script>Hello")
            .await
            .unwrap();

        let page = store.load("Bar").await.unwrap();
        assert_eq!(page.body, "Hello");
    }

    #[tokio::test]
    async fn test_round_trip_matches_sanitizer() {
        let (_temp, store) = create_test_store().await;

        let body = r#"<p>Hi <em>there</em></p><a href="javascript:x">link</a> & more"#;
        store.save("Rich", body).await.unwrap();

        let page = store.load("Rich").await.unwrap();
        assert_eq!(page.body, wiki_sanitize::sanitize(body));
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let (_temp, store) = create_test_store().await;

        store.save("Foo", "first").await.unwrap();
        store.save("Foo", "second").await.unwrap();

        let page = store.load("Foo").await.unwrap();
        assert_eq!(page.body, "second");
    }

    #[tokio::test]
    async fn test_rejects_traversal_titles() {
        let (_temp, store) = create_test_store().await;

        let result = store.load("../etc/passwd").await;
        assert!(matches!(result, Err(StoreError::InvalidTitle(_))));

        let result = store.save("../../evil", "content").await;
        assert!(matches!(result, Err(StoreError::InvalidTitle(_))));
    }

    #[tokio::test]
    async fn test_list() {
        let (temp, store) = create_test_store().await;

        store.save("Alpha", "a").await.unwrap();
        store.save("Beta", "b").await.unwrap();

        // Files that are not pages are ignored
        fs::write(temp.path().join("notes.md"), "x").await.unwrap();

        let mut titles = store.list().await.unwrap();
        titles.sort();
        assert_eq!(titles, vec!["Alpha", "Beta"]);
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let (temp, store) = create_test_store().await;

        store.save("Foo", "content").await.unwrap();

        let mut entries = fs::read_dir(temp.path()).await.unwrap();
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.unwrap() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        assert_eq!(names, vec!["Foo.txt"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_pages_are_owner_read_write_only() {
        use std::os::unix::fs::PermissionsExt;

        let (temp, store) = create_test_store().await;
        store.save("Foo", "content").await.unwrap();

        let mode = std::fs::metadata(temp.path().join("Foo.txt"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
