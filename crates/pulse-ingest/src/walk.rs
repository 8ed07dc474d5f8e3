// SPDX-License-Identifier: Apache-2.0

use std::path::{Path, PathBuf};

use pulse_model::{PeriodKey, Quarter, StateName, Year};
use walkdir::WalkDir;

use crate::report::SkippedFile;
use crate::{IngestError, IngestErrorCode};

/// A `<state>/<year>/<quarter>.json` leaf and the key parsed from its path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuarterFile {
    pub path: PathBuf,
    pub key: PeriodKey,
}

#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub files: Vec<QuarterFile>,
    pub skipped: Vec<SkippedFile>,
}

/// Lists quarter files under `root` in name order. Files sitting at the
/// state or year level are ignored; leaves whose path does not parse into a
/// key are reported as skipped.
pub fn walk_quarter_files(root: &Path) -> Result<WalkOutcome, IngestError> {
    if !root.is_dir() {
        return Err(IngestError::new(
            IngestErrorCode::MissingRoot,
            format!("source directory does not exist: {}", root.display()),
        ));
    }
    let mut out = WalkOutcome::default();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(3)
        .follow_links(true)
        .sort_by_file_name();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(root).to_path_buf();
                out.skipped.push(SkippedFile::new(path, err.to_string()));
                continue;
            }
        };
        if entry.depth() != 3 {
            continue;
        }
        let path = entry.path();
        if entry.file_type().is_dir() {
            out.skipped
                .push(SkippedFile::new(path, "expected a quarter file, found a directory"));
            continue;
        }
        match period_key(root, path) {
            Ok(key) => out.files.push(QuarterFile {
                path: path.to_path_buf(),
                key,
            }),
            Err(reason) => out.skipped.push(SkippedFile::new(path, reason)),
        }
    }
    Ok(out)
}

fn period_key(root: &Path, path: &Path) -> Result<PeriodKey, String> {
    let rel = path.strip_prefix(root).map_err(|e| e.to_string())?;
    let parts: Vec<&str> = rel
        .components()
        .map(|c| c.as_os_str().to_str().ok_or("path is not valid UTF-8"))
        .collect::<Result<_, _>>()?;
    let [state, year, file] = parts.as_slice() else {
        return Err(format!("unexpected layout: {}", rel.display()));
    };
    let state = StateName::parse(state).map_err(|e| e.to_string())?;
    let year = Year::parse(year).map_err(|e| e.to_string())?;
    let quarter = Quarter::from_file_name(file).map_err(|e| e.to_string())?;
    Ok(PeriodKey::new(state, year, quarter))
}
