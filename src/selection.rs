// Selection set builder: turns the folders the operator picked into the
// list of images that will go into one archive.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::constants::ALLOWED_EXTENSIONS;
use crate::error::{Result, UploaderError};
use crate::quota::Credential;

/// One image of a selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    /// `<folder>/<file name>`, relative to the images root. Also the entry
    /// name inside the archive.
    pub relative_path: String,
    pub size: u64,
}

/// The validated images of one run, in archive order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    files: Vec<SelectedFile>,
    total_size: u64,
}

impl SelectionSet {
    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    pub fn photo_count(&self) -> u64 {
        self.files.len() as u64
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }
}

/// Names of the photo-set folders directly below `images_dir`, sorted.
pub fn list_folders(images_dir: &Path) -> Result<Vec<String>> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(images_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            folders.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    folders.sort();
    Ok(folders)
}

/// Whether `name` ends in one of the allowed image extensions.
pub fn is_allowed_image(name: &str) -> bool {
    match name.rfind('.') {
        // A leading dot is a hidden file, not an extension.
        Some(idx) if idx > 0 => ALLOWED_EXTENSIONS.contains(&&name[idx..]),
        _ => false,
    }
}

/// Collect the images of `folders` and check them against the limits of
/// `credential`.
///
/// Only files directly inside each folder are considered. An empty result
/// is `EmptySelection`; going over either limit is `QuotaExceeded`.
pub fn build(images_dir: &Path, folders: &[String], credential: &Credential) -> Result<SelectionSet> {
    let mut files = Vec::new();
    for folder in folders {
        let folder_path = images_dir.join(folder);
        let mut names: Vec<(String, u64)> = Vec::new();
        for entry in fs::read_dir(&folder_path)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_allowed_image(&name) {
                continue;
            }
            // Follows symlinks; a dangling link is skipped.
            let meta = match fs::metadata(entry.path()) {
                Ok(meta) => meta,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            if meta.is_file() {
                names.push((name, meta.len()));
            }
        }
        names.sort();
        for (name, size) in names {
            files.push(SelectedFile {
                relative_path: format!("{}/{}", folder, name),
                size,
            });
        }
    }

    if files.is_empty() {
        return Err(UploaderError::EmptySelection);
    }

    let total_size: u64 = files.iter().map(|f| f.size).sum();
    let photos = files.len() as u64;
    tracing::debug!(photos, total_size, "selection collected");

    if total_size > credential.limit_filesize || photos > credential.limit_photos {
        return Err(UploaderError::QuotaExceeded {
            photos,
            bytes: total_size,
            limit_photos: credential.limit_photos,
            limit_bytes: credential.limit_filesize,
        });
    }

    Ok(SelectionSet { files, total_size })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn credential(limit_filesize: u64, limit_photos: u64) -> Credential {
        Credential {
            token: "tok".into(),
            limit_filesize,
            limit_photos,
            credit: 1.0,
        }
    }

    fn write(dir: &Path, name: &str, len: usize) {
        fs::write(dir.join(name), vec![7u8; len]).unwrap();
    }

    #[test]
    fn allow_list_is_case_exact() {
        for ok in ["a.jpg", "a.JPG", "a.jpeg", "a.JPEG", "a.png", "a.PNG", "x.y.png"] {
            assert!(is_allowed_image(ok), "{ok} should be accepted");
        }
        for bad in ["a.Jpg", "a.gif", "a.tiff", "jpg", ".jpg", "a.jpg.txt"] {
            assert!(!is_allowed_image(bad), "{bad} should be rejected");
        }
    }

    #[test]
    fn collects_images_non_recursively_in_order() {
        let root = tempdir().unwrap();
        let set = root.path().join("set1");
        fs::create_dir_all(set.join("nested")).unwrap();
        write(&set, "b.JPG", 20);
        write(&set, "a.png", 10);
        write(&set, "notes.txt", 5);
        write(&set.join("nested"), "c.jpg", 30);

        let selection = build(root.path(), &["set1".into()], &credential(1_000, 10)).unwrap();
        let names: Vec<_> = selection.files().iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(names, vec!["set1/a.png", "set1/b.JPG"]);
        assert_eq!(selection.total_size(), 30);
        assert_eq!(selection.photo_count(), 2);
    }

    #[test]
    fn folders_keep_chosen_order() {
        let root = tempdir().unwrap();
        for folder in ["alpha", "beta"] {
            fs::create_dir(root.path().join(folder)).unwrap();
            write(&root.path().join(folder), "img.jpg", 1);
        }
        let selection = build(
            root.path(),
            &["beta".into(), "alpha".into()],
            &credential(1_000, 10),
        )
        .unwrap();
        assert_eq!(selection.files()[0].relative_path, "beta/img.jpg");
        assert_eq!(selection.files()[1].relative_path, "alpha/img.jpg");
    }

    #[test]
    fn no_images_is_empty_selection() {
        let root = tempdir().unwrap();
        let set = root.path().join("set1");
        fs::create_dir(&set).unwrap();
        write(&set, "readme.md", 3);
        let err = build(root.path(), &["set1".into()], &credential(1_000, 10)).unwrap_err();
        assert!(matches!(err, UploaderError::EmptySelection));
    }

    #[test]
    fn over_size_limit_is_rejected() {
        let root = tempdir().unwrap();
        let set = root.path().join("set1");
        fs::create_dir(&set).unwrap();
        write(&set, "a.jpg", 60);
        write(&set, "b.jpg", 41);
        let err = build(root.path(), &["set1".into()], &credential(100, 10)).unwrap_err();
        match err {
            UploaderError::QuotaExceeded { bytes, photos, .. } => {
                assert_eq!(bytes, 101);
                assert_eq!(photos, 2);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn over_photo_limit_is_rejected() {
        let root = tempdir().unwrap();
        let set = root.path().join("set1");
        fs::create_dir(&set).unwrap();
        for i in 0..4 {
            write(&set, &format!("{i}.png"), 1);
        }
        let err = build(root.path(), &["set1".into()], &credential(1_000, 3)).unwrap_err();
        assert!(matches!(err, UploaderError::QuotaExceeded { .. }));
    }

    #[test]
    fn exactly_at_limits_is_accepted() {
        let root = tempdir().unwrap();
        let set = root.path().join("set1");
        fs::create_dir(&set).unwrap();
        write(&set, "a.jpg", 50);
        write(&set, "b.jpg", 50);
        let selection = build(root.path(), &["set1".into()], &credential(100, 2)).unwrap();
        assert_eq!(selection.total_size(), 100);
    }

    #[test]
    fn lists_only_folders_sorted() {
        let root = tempdir().unwrap();
        fs::create_dir(root.path().join("zeta")).unwrap();
        fs::create_dir(root.path().join("alpha")).unwrap();
        write(root.path(), "stray.jpg", 1);
        assert_eq!(list_folders(root.path()).unwrap(), vec!["alpha", "zeta"]);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_images_are_included() {
        use std::os::unix::fs::symlink;

        let root = tempdir().unwrap();
        let store = root.path().join("store");
        let set = root.path().join("set1");
        fs::create_dir(&store).unwrap();
        fs::create_dir(&set).unwrap();
        write(&store, "real.jpg", 25);
        symlink(store.join("real.jpg"), set.join("linked.jpg")).unwrap();
        symlink(store.join("gone.jpg"), set.join("dangling.jpg")).unwrap();
        write(&set, "plain.png", 5);

        let selection = build(root.path(), &["set1".into()], &credential(1_000, 10)).unwrap();
        let names: Vec<_> = selection.files().iter().map(|f| f.relative_path.as_str()).collect();
        assert_eq!(names, vec!["set1/linked.jpg", "set1/plain.png"]);
        assert_eq!(selection.total_size(), 30);
    }
}
