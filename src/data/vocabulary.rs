use std::collections::HashMap;

use burn::config::Config;

use crate::error::{self, LabelerError};

/// Vocabulary side of a dataset: where each measurement lives on the field
/// axis, where its values start in the unified index space, which event-type
/// label owns each id, and the order of the task's output classes.
#[derive(Config, Debug)]
pub struct EventVocabulary {
    measurements_idxmap: HashMap<String, usize>,
    vocab_offsets_by_measurement: HashMap<String, usize>,
    event_types_idxmap: HashMap<String, usize>,
    label_vocab: Vec<String>,
}

impl EventVocabulary {
    pub fn measurement_index(&self, measurement: &str) -> error::Result<usize> {
        self.measurements_idxmap
            .get(measurement)
            .copied()
            .ok_or_else(|| LabelerError::MissingMeasurement(measurement.to_string()))
    }

    pub fn vocab_offset(&self, measurement: &str) -> error::Result<usize> {
        self.vocab_offsets_by_measurement
            .get(measurement)
            .copied()
            .ok_or_else(|| LabelerError::MissingMeasurement(measurement.to_string()))
    }

    pub fn label_index(&self, label: &str) -> error::Result<usize> {
        self.label_vocab
            .iter()
            .position(|l| l == label)
            .ok_or_else(|| LabelerError::MissingLabel(label.to_string()))
    }

    pub fn labels(&self) -> &[String] {
        &self.label_vocab
    }

    /// Ids of every event type whose compound label has `token` as one of its
    /// `separator`-joined members. Sorted, without duplicates.
    pub fn event_type_ids_with_token(&self, token: &str, separator: &str) -> Vec<i64> {
        let mut ids: Vec<i64> = self
            .event_types_idxmap
            .iter()
            .filter(|(label, _)| compound_label_has_token(label, token, separator))
            .map(|(_, &id)| id as i64)
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Exact member match: `"READMISSION"` does not carry the token `"ADMISSION"`.
pub fn compound_label_has_token(label: &str, token: &str, separator: &str) -> bool {
    label.split(separator).any(|part| part == token)
}
