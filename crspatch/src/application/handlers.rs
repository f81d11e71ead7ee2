use crs_core::error::{CrsError, Result};
use crs_core::{PatchOptions, patch_file};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn is_crs(path: &Path) -> bool {
    path.extension().is_some_and(|e| e.eq_ignore_ascii_case("crs"))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Expand files and directories into the CRS work list. Directories
/// contribute their immediate `.crs` children (case-insensitive), sorted;
/// duplicates collapse, first occurrence wins.
pub fn discover(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            if is_crs(input) {
                files.push(input.clone());
            } else {
                eprintln!("warning: {} is not a CRS file", input.display());
            }
        } else if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && is_crs(e.path()))
                .map(walkdir::DirEntry::into_path)
                .collect();
            found.sort();
            files.extend(found);
        } else {
            eprintln!("error: {} is not a valid file or directory", input.display());
        }
    }

    let mut seen = HashSet::new();
    files.retain(|p| seen.insert(p.clone()));
    files
}

/// Sequential batch over the work list with per-file accounting; one file's
/// failure never stops the rest. Returns (successful, total).
pub fn handle_batch(
    inputs: Vec<PathBuf>,
    extra_exclude: Vec<String>,
    target_path: Option<String>,
    out_dir: Option<PathBuf>,
) -> Result<(usize, usize)> {
    let files = discover(&inputs);
    if files.is_empty() {
        return Err(CrsError::Format("no CRS files found to process".into()));
    }

    let mut opts = PatchOptions::default();
    opts.exclude
        .extend(extra_exclude.into_iter().map(String::into_bytes));
    if let Some(target) = target_path {
        opts.target_path = target;
    }
    let out_root = out_dir
        .unwrap_or_else(|| files[0].parent().unwrap_or(Path::new(".")).join("patched"));
    opts.log_dir = Some(out_root.join("logs"));
    opts.output_dir = Some(out_root.clone());

    eprintln!("batch: {} CRS file(s)", files.len());
    eprintln!("output directory: {}", out_root.display());

    let mut successful = 0usize;
    for file in &files {
        eprintln!("processing: {}", display_name(file));
        match patch_file(file, &opts) {
            Ok(outcome) => {
                successful += 1;
                for block in &outcome.removed {
                    eprintln!(
                        "  removed {}: 0x{:06X}-0x{:06X}",
                        String::from_utf8_lossy(&block.signature),
                        block.start,
                        block.end
                    );
                }
                eprintln!(
                    "  {} entries, base offset 0x{:X}",
                    outcome.file_count, outcome.base_offset
                );
                eprintln!("  path replacements: {}", outcome.paths.replaced);
                eprintln!("  saved: {}", outcome.archive_path.display());
                eprintln!("  log: {}", outcome.log_path.display());
            }
            Err(e) => eprintln!("error: {}: {e}", display_name(file)),
        }
    }

    eprintln!("files processed: {successful}/{}", files.len());
    if successful < files.len() {
        eprintln!("failures: {}", files.len() - successful);
    }
    Ok((successful, files.len()))
}
