// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;

use pulse_model::{ExtractionRule, FlatRecord};
use serde_json::Value;

use crate::extract::extract_rows;
use crate::report::SkippedFile;
use crate::walk::QuarterFile;

/// Rows pulled from every readable quarter file of one family.
#[derive(Debug, Default)]
pub struct DecodedFamily {
    pub records: Vec<FlatRecord>,
    pub files_loaded: u64,
    pub dropped_entries: u64,
    pub skipped: Vec<SkippedFile>,
}

pub fn read_document(path: &Path) -> Result<Value, String> {
    let raw = fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;
    serde_json::from_str(&raw).map_err(|e| format!("invalid JSON: {e}"))
}

/// Decodes and flattens each file; a file that cannot be read or does not
/// fit the rule is skipped and the rest still load.
pub fn decode_quarter_files(rule: ExtractionRule, files: &[QuarterFile]) -> DecodedFamily {
    let mut out = DecodedFamily::default();
    for file in files {
        let extracted = read_document(&file.path)
            .and_then(|doc| extract_rows(rule, &doc, &file.key).map_err(|e| e.to_string()));
        match extracted {
            Ok(extracted) => {
                tracing::debug!(
                    path = %file.path.display(),
                    rows = extracted.rows.len(),
                    dropped = extracted.dropped.len(),
                    "quarter file decoded"
                );
                for reason in &extracted.dropped {
                    tracing::debug!(path = %file.path.display(), %reason, "entry dropped");
                }
                out.files_loaded += 1;
                out.dropped_entries += extracted.dropped.len() as u64;
                out.records.extend(extracted.rows);
            }
            Err(reason) => {
                tracing::warn!(path = %file.path.display(), %reason, "skipping quarter file");
                out.skipped.push(SkippedFile::new(&file.path, reason));
            }
        }
    }
    out
}
