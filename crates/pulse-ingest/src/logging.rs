// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestStage {
    Prepare,
    Walk,
    Extract,
    Persist,
    Finalize,
}

impl IngestStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Walk => "walk",
            Self::Extract => "extract",
            Self::Persist => "persist",
            Self::Finalize => "finalize",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IngestEvent {
    pub stage: IngestStage,
    pub name: String,
    pub fields: BTreeMap<String, String>,
}

/// Ordered record of what one family run did. Every event is also
/// forwarded to `tracing` at debug level.
#[derive(Debug, Default, Clone)]
pub struct IngestLog {
    events: Vec<IngestEvent>,
}

impl IngestLog {
    pub fn emit(
        &mut self,
        stage: IngestStage,
        name: impl Into<String>,
        fields: BTreeMap<String, String>,
    ) {
        let name = name.into();
        tracing::debug!(stage = stage.as_str(), event = %name, ?fields, "ingest event");
        self.events.push(IngestEvent {
            stage,
            name,
            fields,
        });
    }

    #[must_use]
    pub fn events(&self) -> &[IngestEvent] {
        &self.events
    }

    #[must_use]
    pub fn into_events(self) -> Vec<IngestEvent> {
        self.events
    }
}

/// Builds an event field map from `(key, value)` pairs.
#[must_use]
pub fn fields<const N: usize>(pairs: [(&str, String); N]) -> BTreeMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_keep_emission_order() {
        let mut log = IngestLog::default();
        log.emit(IngestStage::Prepare, "ingest.family.start", BTreeMap::new());
        log.emit(
            IngestStage::Walk,
            "ingest.walk.complete",
            fields([("files", "3".to_string())]),
        );
        let names: Vec<&str> = log.events().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["ingest.family.start", "ingest.walk.complete"]);
        assert_eq!(log.events()[1].fields["files"], "3");
    }

    #[test]
    fn stage_serializes_snake_case() {
        let json = serde_json::to_string(&IngestStage::Finalize).expect("json");
        assert_eq!(json, "\"finalize\"");
    }
}
