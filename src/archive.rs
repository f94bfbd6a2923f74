// Archiver/splitter: packs a selection into one zip archive in the staging
// directory and, when the archive is too large for one transfer, cuts it
// into numbered parts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::constants::{PLACEHOLDER_FILE, PROJECT_SUFFIX};
use crate::error::{Result, UploaderError};
use crate::selection::SelectionSet;

/// A contiguous byte range of the archive, staged as its own file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// 1-based position; parts are uploaded in this order.
    pub index: usize,
    pub path: PathBuf,
    /// Offset of the first byte within the whole archive.
    pub offset: u64,
    pub size: u64,
}

/// A packaged selection, ready to be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    pub name: String,
    pub photo_count: u64,
    /// Size of the whole archive, i.e. the sum of all part sizes.
    pub total_size: u64,
    pub parts: Vec<Part>,
}

/// Project name for `now`: hundredths of a second since the epoch plus the
/// fixed suffix.
pub fn project_name(now: DateTime<Utc>) -> String {
    format!("{}{}", now.timestamp_millis() / 10, PROJECT_SUFFIX)
}

/// `(offset, len)` of each part when an archive of `total` bytes is cut
/// every `threshold` bytes. An archive that fits is a single range; the
/// last range is never empty.
pub fn split_plan(total: u64, threshold: u64) -> Vec<(u64, u64)> {
    assert!(threshold > 0, "split threshold must be positive");
    if total <= threshold {
        return vec![(0, total)];
    }
    let mut ranges = Vec::with_capacity(total.div_ceil(threshold) as usize);
    let mut offset = 0;
    while offset < total {
        let len = threshold.min(total - offset);
        ranges.push((offset, len));
        offset += len;
    }
    ranges
}

/// Remove everything in the staging directory except the placeholder.
pub fn clear_workdir(temp_dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(temp_dir)? {
        let entry = entry?;
        if entry.file_name() == PLACEHOLDER_FILE {
            continue;
        }
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

/// Write the selected images into a deflate-compressed zip at `dest`,
/// entries named by their relative paths, in selection order.
fn write_zip(images_dir: &Path, selection: &SelectionSet, dest: &Path) -> Result<u64> {
    let file = File::create(dest)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for selected in selection.files() {
        let mut src = File::open(images_dir.join(&selected.relative_path))?;
        zip.start_file(selected.relative_path.as_str(), options)
            .map_err(|e| UploaderError::ArchiveWriteFailed(e.to_string()))?;
        io::copy(&mut src, &mut zip)?;
    }
    let mut writer = zip
        .finish()
        .map_err(|e| UploaderError::ArchiveWriteFailed(e.to_string()))?;
    writer.flush()?;
    drop(writer);
    Ok(fs::metadata(dest)?.len())
}

/// Cut `archive` into `<archive>_1`, `<archive>_2`, ... following
/// [`split_plan`], then delete the archive.
pub fn split_file(archive: &Path, threshold: u64) -> Result<Vec<Part>> {
    let total = fs::metadata(archive)?.len();
    let mut src = File::open(archive)?;
    let mut parts = Vec::new();
    for (i, (offset, len)) in split_plan(total, threshold).into_iter().enumerate() {
        let index = i + 1;
        let mut name = archive.as_os_str().to_os_string();
        name.push(format!("_{}", index));
        let path = PathBuf::from(name);

        src.seek(SeekFrom::Start(offset))?;
        let mut out = BufWriter::new(File::create(&path)?);
        let copied = io::copy(&mut (&mut src).take(len), &mut out)?;
        out.flush()?;
        if copied != len {
            return Err(UploaderError::ArchiveWriteFailed(format!(
                "part {} is {} bytes, expected {}",
                index, copied, len
            )));
        }
        tracing::debug!(index, offset, size = len, "part written");
        parts.push(Part {
            index,
            path,
            offset,
            size: len,
        });
    }
    drop(src);
    fs::remove_file(archive)?;
    Ok(parts)
}

/// Clear the staging directory, archive `selection` into it and split the
/// result if it exceeds `threshold` bytes.
///
/// Any filesystem failure here is reported as `ArchiveWriteFailed`.
pub fn package(
    images_dir: &Path,
    selection: &SelectionSet,
    temp_dir: &Path,
    threshold: u64,
    now: DateTime<Utc>,
) -> Result<Archive> {
    package_inner(images_dir, selection, temp_dir, threshold, now).map_err(|e| match e {
        UploaderError::Io(io) => UploaderError::ArchiveWriteFailed(io.to_string()),
        other => other,
    })
}

fn package_inner(
    images_dir: &Path,
    selection: &SelectionSet,
    temp_dir: &Path,
    threshold: u64,
    now: DateTime<Utc>,
) -> Result<Archive> {
    clear_workdir(temp_dir)?;

    let name = project_name(now);
    let archive_path = temp_dir.join(&name);
    tracing::info!(project = %name, photos = selection.photo_count(), "writing archive");
    let total_size = write_zip(images_dir, selection, &archive_path)?;

    let parts = if total_size > threshold {
        split_file(&archive_path, threshold)?
    } else {
        vec![Part {
            index: 1,
            path: archive_path,
            offset: 0,
            size: total_size,
        }]
    };
    tracing::info!(project = %name, total_size, parts = parts.len(), "archive staged");

    Ok(Archive {
        name,
        photo_count: selection.photo_count(),
        total_size,
        parts,
    })
}
