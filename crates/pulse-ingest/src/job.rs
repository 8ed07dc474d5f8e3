// SPDX-License-Identifier: Apache-2.0

use std::path::PathBuf;

use pulse_model::{ExtractionRule, Family, TableSchema};

use crate::{IngestOptions, LoadMode};

/// One family run resolved against the configured data root and store.
#[derive(Debug, Clone)]
pub struct IngestJob {
    pub family: Family,
    pub source_root: PathBuf,
    pub db_path: PathBuf,
    pub mode: LoadMode,
}

impl IngestJob {
    #[must_use]
    pub fn new(options: &IngestOptions, family: Family) -> Self {
        Self {
            family,
            source_root: options.data_root.join(family.source_dir()),
            db_path: options.db_path.clone(),
            mode: options.mode,
        }
    }

    #[must_use]
    pub fn schema(&self) -> &'static TableSchema {
        self.family.schema()
    }

    #[must_use]
    pub fn rule(&self) -> ExtractionRule {
        self.family.rule()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn source_root_joins_family_dir() {
        let opts = IngestOptions::new("/srv/pulse/data", "/tmp/p.sqlite");
        let job = IngestJob::new(&opts, Family::MapUser);
        assert_eq!(
            job.source_root,
            Path::new("/srv/pulse/data/map/user/hover/country/india/state")
        );
        assert_eq!(job.schema().name, "map_user");
        assert_eq!(job.mode, LoadMode::Append);
    }
}
