use crate::container::header::{ArchiveHeader, HEADER_LEN, SIGNATURE};
use crate::container::index::{self, ENTRY_SIZE};
use crate::error::{CrsError, Result};
use crate::patch::paths::{self, DEFAULT_TARGET_PATH, PathRewrite};
use crate::patch::remove::{self, RemovedBlock};
use crate::report;
use crate::scan;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

#[derive(Debug, Clone)]
pub struct PatchOptions {
    /// Byte signatures whose blocks are stripped from the archive.
    pub exclude: Vec<Vec<u8>>,
    /// Path written into every surviving sub-header.
    pub target_path: String,
    /// Route the patched archive here instead of next to the source.
    pub output_dir: Option<PathBuf>,
    /// Route the companion log here instead of next to the source.
    pub log_dir: Option<PathBuf>,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            exclude: default_exclusions(),
            target_path: DEFAULT_TARGET_PATH.to_string(),
            output_dir: None,
            log_dir: None,
        }
    }
}

/// Legacy sub-files stripped by default.
pub fn default_exclusions() -> Vec<Vec<u8>> {
    vec![b"PATCH.OFS".to_vec(), b"OBJECT.OFS".to_vec()]
}

/// Per-file result consumed by the batch orchestrator.
#[derive(Debug)]
pub struct PatchOutcome {
    pub archive_path: PathBuf,
    pub log_path: PathBuf,
    pub file_count: usize,
    pub base_offset: usize,
    pub removed: Vec<RemovedBlock>,
    pub paths: PathRewrite,
}

/// Run the whole rewrite pipeline for one archive: scan, strip excluded
/// blocks, rebuild index and header, reassemble, patch internal paths,
/// write the artifact plus its log, and carry the source timestamps over.
pub fn patch_file(src: &Path, opts: &PatchOptions) -> Result<PatchOutcome> {
    if opts.target_path.len() > u8::MAX as usize {
        return Err(CrsError::Format(format!(
            "target path exceeds {} bytes",
            u8::MAX
        )));
    }

    let metadata = fs::metadata(src)?;
    let mtime = OffsetDateTime::from(metadata.modified()?);
    let data = fs::read(src)?;

    let positions = scan::find_all(&data, SIGNATURE);
    let (data, removed) = remove::remove_blocks(data, &positions, &opts.exclude);

    // Rescan: removal shifted every surviving block
    let positions = scan::find_all(&data, SIGNATURE);
    let table = index::build(&data, &positions, &opts.exclude)?;
    // the header stores count and count*17 as u16 words
    if table.entries.len() * ENTRY_SIZE > u16::MAX as usize {
        return Err(CrsError::Format(format!(
            "index table for {} entries exceeds the u16 header field",
            table.entries.len()
        )));
    }

    let header = ArchiveHeader::new(table.entries.len() as u16, mtime);
    let mut assembled =
        Vec::with_capacity(HEADER_LEN + table.entries.len() * ENTRY_SIZE + data.len());
    assembled.extend_from_slice(&header.encode());
    index::write_table(&mut assembled, &table.entries)?;
    assembled.extend_from_slice(&data);

    let path_stats = paths::rewrite_paths(&mut assembled, opts.target_path.as_bytes());

    let archive_path = output_path(src, "_patched", opts.output_dir.as_deref())?;
    write_artifact(&archive_path, &assembled)?;
    copy_timestamps(&metadata, &archive_path)?;

    let log_path = output_path(src, "_patched_log.txt", opts.log_dir.as_deref())?;
    report::write_log(&log_path, &table, &header)?;

    Ok(PatchOutcome {
        archive_path,
        log_path,
        file_count: table.entries.len(),
        base_offset: table.base_offset,
        removed,
        paths: path_stats,
    })
}

/// Write through a temp file in the destination directory, then persist.
/// Keeps a crash from leaving a half-written artifact under the final name.
fn write_artifact(dest: &Path, bytes: &[u8]) -> Result<()> {
    let dir = dest.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}

fn copy_timestamps(source: &fs::Metadata, dest: &Path) -> Result<()> {
    let times = fs::FileTimes::new()
        .set_accessed(source.accessed()?)
        .set_modified(source.modified()?);
    let f = fs::OpenOptions::new().write(true).open(dest)?;
    f.set_times(times)?;
    Ok(())
}

/// `<stem><suffix><ext>` next to the source, or under `dir` when given.
/// A `.txt` suffix replaces the extension instead of preserving it.
fn output_path(src: &Path, suffix: &str, dir: Option<&Path>) -> Result<PathBuf> {
    let stem = src
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = if suffix.ends_with(".txt") {
        format!("{stem}{suffix}")
    } else {
        match src.extension() {
            Some(ext) => format!("{stem}{suffix}.{}", ext.to_string_lossy()),
            None => format!("{stem}{suffix}"),
        }
    };
    match dir {
        Some(d) => {
            fs::create_dir_all(d)?;
            Ok(d.join(file_name))
        }
        None => Ok(src.with_file_name(file_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_name_keeps_extension() {
        let p = output_path(Path::new("/course/PEBBLE.CRS"), "_patched", None).unwrap();
        assert_eq!(p, Path::new("/course/PEBBLE_patched.CRS"));
    }

    #[test]
    fn log_name_drops_extension() {
        let p = output_path(Path::new("/course/PEBBLE.CRS"), "_patched_log.txt", None).unwrap();
        assert_eq!(p, Path::new("/course/PEBBLE_patched_log.txt"));
    }

    #[test]
    fn output_dir_reroutes_and_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("patched");
        let p = output_path(Path::new("PEBBLE.CRS"), "_patched", Some(&dir)).unwrap();
        assert_eq!(p, dir.join("PEBBLE_patched.CRS"));
        assert!(dir.is_dir());
    }

    #[test]
    fn default_exclusions_are_the_legacy_pair() {
        assert_eq!(
            default_exclusions(),
            vec![b"PATCH.OFS".to_vec(), b"OBJECT.OFS".to_vec()]
        );
    }

    #[test]
    fn overlong_target_path_is_rejected() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let opts = PatchOptions {
            target_path: "X".repeat(300),
            ..PatchOptions::default()
        };
        let err = patch_file(tmp.path(), &opts).unwrap_err();
        assert!(matches!(err, CrsError::Format(_)));
    }
}
