use std::io;
use std::path::{Component, Path, PathBuf};

use url::Url;

use crate::collaborators::{ServiceError, Storage};

const SERVICE: &str = "dir storage";

fn io_error(path: &Path, error: &io::Error) -> ServiceError {
    let message = format!("'{}': {error}", path.display());
    match error.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
            ServiceError::permanent(SERVICE, message)
        }
        _ => ServiceError::transient(SERVICE, message),
    }
}

#[derive(Debug, Clone)]
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let root = root.as_ref();
        std::fs::create_dir_all(root).map_err(|error| io_error(root, &error))?;
        let root = root.canonicalize().map_err(|error| io_error(root, &error))?;
        Ok(Self { root })
    }

    fn local_path(&self, name: &str) -> Result<PathBuf, ServiceError> {
        let relative = Path::new(name);
        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if name.is_empty() || !is_plain {
            return Err(ServiceError::permanent(
                SERVICE,
                format!("refusing to use '{name}' as a storage name"),
            ));
        }
        Ok(self.root.join(relative))
    }

    /// `file://` URLs are read directly; any other URL is looked up by its
    /// decoded file name inside the storage directory.
    fn resolve(&self, url: &str) -> Result<PathBuf, ServiceError> {
        let Ok(parsed) = Url::parse(url) else {
            return self.local_path(url);
        };
        if parsed.scheme() == "file" {
            return parsed.to_file_path().map_err(|()| {
                ServiceError::permanent(SERVICE, format!("'{url}' is not a local file URL"))
            });
        }

        let name = parsed
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .ok_or_else(|| ServiceError::permanent(SERVICE, format!("'{url}' has no file name")))?;
        let decoded = urlencoding::decode(name)
            .map_err(|error| ServiceError::permanent(SERVICE, format!("'{url}': {error}")))?;
        self.local_path(&decoded)
    }
}

impl Storage for DirStorage {
    fn download(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        let path = self.resolve(url)?;
        std::fs::read(&path).map_err(|error| io_error(&path, &error))
    }

    fn upload(&self, name: &str, bytes: &[u8]) -> Result<String, ServiceError> {
        let path = self.local_path(name)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| io_error(parent, &error))?;
        }
        std::fs::write(&path, bytes).map_err(|error| io_error(&path, &error))?;
        Url::from_file_path(&path)
            .map(String::from)
            .map_err(|()| ServiceError::permanent(SERVICE, format!("'{}' is not absolute", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::DirStorage;
    use crate::collaborators::Storage;

    #[test]
    fn uploads_and_reads_back_by_file_url() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let storage = DirStorage::new(dir.path()).expect("storage should open");

        let url = storage
            .upload("report_table_00.csv", b"a,b\n")
            .expect("upload should succeed");
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("report_table_00.csv"));
        assert_eq!(storage.download(&url).expect("download should succeed"), b"a,b\n");
    }

    #[test]
    fn resolves_remote_urls_by_decoded_file_name() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let storage = DirStorage::new(dir.path()).expect("storage should open");
        std::fs::write(dir.path().join("annual report_table_01.png"), b"img")
            .expect("fixture should be written");

        let bytes = storage
            .download("https://account.blob/container-tables/annual%20report_table_01.png")
            .expect("download should succeed");
        assert_eq!(bytes, b"img");
    }

    #[test]
    fn missing_files_are_permanent_errors() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let storage = DirStorage::new(dir.path()).expect("storage should open");
        let error = storage
            .download("https://x/none.png")
            .expect_err("file does not exist");
        assert!(!error.is_transient());
    }

    #[test]
    fn rejects_names_escaping_the_directory() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let storage = DirStorage::new(dir.path()).expect("storage should open");
        assert!(storage.upload("../outside.txt", b"x").is_err());
        assert!(storage.download("https://x/..%2Foutside.txt").is_err());
    }
}
