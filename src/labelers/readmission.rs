use burn::config::Config;
use burn::tensor::{backend::Backend, Bool, Int, Tensor};
use tracing::{debug, warn};

use crate::data::batch::EventBatch;
use crate::data::event_types::{EventTypeResolver, MeasurementEventTypeResolver};
use crate::data::vocabulary::EventVocabulary;
use crate::error::{self, LabelerError};
use crate::labelers::reference::{
    label_sequence, GeneratedSequence, ReadmissionOutcome, ReadmissionRule,
};
use crate::labelers::{LabelOutput, Labeler};
use crate::utils::{
    any_dim1, bool_and, bool_or, cumulative_sum, first_true_index, masked_idx_in_set, none_dim1,
};

/// 30 days, in minutes.
pub const READMISSION_WINDOW_MINUTES: i64 = 60 * 24 * 30;

#[derive(Config, Debug)]
pub struct ReadmissionLabelerConfig {
    #[config(default = "READMISSION_WINDOW_MINUTES")]
    window_minutes: i64,

    #[config(default = "String::from(\"ADMISSION\")")]
    admission_token: String,

    #[config(default = "String::from(\"DEATH\")")]
    death_token: String,

    #[config(default = "String::from(\"&\")")]
    separator: String,

    #[config(default = "String::from(\"event_type\")")]
    event_type_measurement: String,

    #[config(default = "String::from(\"False\")")]
    no_readmit_label: String,

    #[config(default = "String::from(\"True\")")]
    readmit_label: String,
}

impl ReadmissionLabelerConfig {
    pub fn init(&self, vocab: &EventVocabulary) -> error::Result<ReadmissionLabeler> {
        self.init_with_resolver(vocab, MeasurementEventTypeResolver)
    }

    pub fn init_with_resolver<R: EventTypeResolver>(
        &self,
        vocab: &EventVocabulary,
        resolver: R,
    ) -> error::Result<ReadmissionLabeler<R>> {
        for (name, value) in [
            ("admission_token", &self.admission_token),
            ("death_token", &self.death_token),
            ("separator", &self.separator),
        ] {
            if value.is_empty() {
                return Err(LabelerError::InvalidConfig(format!("{name} is empty")));
            }
        }
        if self.window_minutes <= 0 {
            return Err(LabelerError::InvalidConfig(format!(
                "window_minutes must be positive, got {}",
                self.window_minutes
            )));
        }

        let labels = vocab.labels();
        if labels.len() != 2 {
            return Err(LabelerError::InvalidConfig(format!(
                "readmission needs exactly two output labels, vocabulary has {:?}",
                labels
            )));
        }
        let no_readmit_channel = vocab.label_index(&self.no_readmit_label)?;
        let readmit_channel = vocab.label_index(&self.readmit_label)?;
        if no_readmit_channel == readmit_channel {
            return Err(LabelerError::InvalidConfig(format!(
                "'{}' and '{}' map to the same label",
                self.no_readmit_label, self.readmit_label
            )));
        }

        let event_type_field_index = vocab.measurement_index(&self.event_type_measurement)?;
        let event_type_id_offset = vocab.vocab_offset(&self.event_type_measurement)?;

        let admission_ids = vocab.event_type_ids_with_token(&self.admission_token, &self.separator);
        let death_ids = vocab.event_type_ids_with_token(&self.death_token, &self.separator);
        if admission_ids.is_empty() {
            warn!(token = %self.admission_token, "no event type carries the admission token");
        }
        if death_ids.is_empty() {
            warn!(token = %self.death_token, "no event type carries the death token");
        }

        Ok(ReadmissionLabeler {
            resolver,
            event_type_field_index,
            event_type_id_offset,
            admission_ids,
            death_ids,
            window_minutes: self.window_minutes,
            no_readmit_channel,
        })
    }
}

/// Labels whether the generated continuation shows a re-admission within the
/// window, a confident absence of one, or neither.
#[derive(Clone, Debug)]
pub struct ReadmissionLabeler<R = MeasurementEventTypeResolver> {
    resolver: R,
    event_type_field_index: usize,
    event_type_id_offset: usize,
    admission_ids: Vec<i64>,
    death_ids: Vec<i64>,
    window_minutes: i64,
    no_readmit_channel: usize,
}

/// Per-step quantities of the generated region, shared by the tensor and
/// reference paths.
struct GeneratedRegion<B: Backend> {
    mask: Tensor<B, 2, Bool>,
    event_types: Tensor<B, 2, Int>,
    time_deltas: Tensor<B, 2>,
}

impl<R: EventTypeResolver> ReadmissionLabeler<R> {
    pub fn admission_ids(&self) -> &[i64] {
        &self.admission_ids
    }

    pub fn death_ids(&self) -> &[i64] {
        &self.death_ids
    }

    fn rule(&self) -> ReadmissionRule<'_> {
        ReadmissionRule {
            admission_ids: &self.admission_ids,
            death_ids: &self.death_ids,
            window_minutes: self.window_minutes,
        }
    }

    /// Validates the batch against the split point and slices out the
    /// generated region. `None` when the region is empty.
    fn generated_region<B: Backend>(
        &self,
        batch: &EventBatch<B>,
        input_seq_len: usize,
    ) -> error::Result<Option<GeneratedRegion<B>>> {
        batch.sequence_lengths()?;

        let [batch_size, seq_len] = batch.event_mask.dims();
        let num_fields = batch.num_fields();
        if input_seq_len == 0 || input_seq_len > seq_len {
            return Err(LabelerError::SplitOutOfRange {
                input_seq_len,
                sequence_len: seq_len,
            });
        }
        if input_seq_len == seq_len || batch_size == 0 {
            return Ok(None);
        }

        let mask = batch
            .event_mask
            .clone()
            .slice([0..batch_size, input_seq_len..seq_len]);
        let measurements = batch
            .dynamic_measurement_indices
            .clone()
            .slice([0..batch_size, input_seq_len..seq_len, 0..num_fields]);
        let indices = batch
            .dynamic_indices
            .clone()
            .slice([0..batch_size, input_seq_len..seq_len, 0..num_fields]);

        let event_types = self.resolver.resolve(
            measurements,
            indices,
            self.event_type_field_index,
            self.event_type_id_offset,
        )?;

        // Deltas run one step behind, so time is counted from the last input step.
        let time_deltas = batch
            .time_delta
            .clone()
            .slice([0..batch_size, input_seq_len - 1..seq_len - 1])
            .float();

        Ok(Some(GeneratedRegion {
            mask,
            event_types,
            time_deltas,
        }))
    }

    fn encode<B: Backend>(
        &self,
        no_readmit: Tensor<B, 1, Bool>,
        readmit: Tensor<B, 1, Bool>,
    ) -> Tensor<B, 2> {
        let channels = if self.no_readmit_channel == 0 {
            vec![no_readmit.float(), readmit.float()]
        } else {
            vec![readmit.float(), no_readmit.float()]
        };
        Tensor::stack(channels, 1)
    }

    /// Same labels as [`Labeler::label`], computed one example at a time.
    pub fn label_reference<B: Backend>(
        &self,
        batch: &EventBatch<B>,
        input_seq_len: usize,
    ) -> error::Result<Vec<ReadmissionOutcome>> {
        let region = self.generated_region(batch, input_seq_len)?;
        let lengths = batch.sequence_lengths()?;
        let rule = self.rule();

        let region = match region {
            Some(region) => region,
            None => {
                let empty = GeneratedSequence {
                    event_types: &[],
                    time_deltas: &[],
                    mask: &[],
                    sequence_length: 0,
                };
                return Ok(lengths
                    .into_iter()
                    .map(|sequence_length| {
                        label_sequence(
                            &GeneratedSequence {
                                sequence_length,
                                ..empty
                            },
                            &rule,
                        )
                    })
                    .collect());
            }
        };

        let [_, steps] = region.mask.dims();
        let mask = region.mask.into_data().value;
        let event_types = region.event_types.into_data().convert::<i64>().value;
        let time_deltas: Vec<i64> = region
            .time_deltas
            .into_data()
            .convert::<f32>()
            .value
            .into_iter()
            .map(|delta| delta as i64)
            .collect();

        Ok(lengths
            .into_iter()
            .enumerate()
            .map(|(b, sequence_length)| {
                let row = b * steps..(b + 1) * steps;
                label_sequence(
                    &GeneratedSequence {
                        event_types: &event_types[row.clone()],
                        time_deltas: &time_deltas[row.clone()],
                        mask: &mask[row],
                        sequence_length,
                    },
                    &rule,
                )
            })
            .collect())
    }
}

impl<R: EventTypeResolver> Labeler for ReadmissionLabeler<R> {
    fn label<B: Backend>(
        &self,
        batch: &EventBatch<B>,
        input_seq_len: usize,
    ) -> error::Result<LabelOutput<B>> {
        let batch_size = batch.batch_size();

        let region = match self.generated_region(batch, input_seq_len)? {
            Some(region) => region,
            None => {
                debug!(batch_size, input_seq_len, "empty generated region");
                let unknown: Tensor<B, 1> = Tensor::ones([batch_size]);
                return Ok(LabelOutput {
                    labels: Tensor::zeros([batch_size, 2]),
                    unknown: unknown.greater_elem(0.0),
                });
            }
        };
        debug!(
            batch_size,
            input_seq_len,
            generated_len = region.mask.dims()[1],
            "labeling readmission"
        );

        // Minutes since the end of the input window.
        let gen_times = cumulative_sum(region.time_deltas);
        let is_within_window = gen_times.lower_elem(self.window_minutes as f32);

        let is_admission =
            masked_idx_in_set(region.event_types.clone(), &self.admission_ids, region.mask.clone());
        let is_death = masked_idx_in_set(region.event_types, &self.death_ids, region.mask);

        let any_admission_within_window =
            any_dim1(bool_and(is_admission.clone(), is_within_window.clone()));
        let any_post_window = any_dim1(is_within_window.bool_not());

        let no_death = none_dim1(is_death.clone());
        let no_admission = none_dim1(is_admission.clone());

        let sentinel = batch.sequence_length.clone().float() + 1.0;
        let first_death = first_true_index(is_death, no_death, sentinel.clone());
        let first_admission = first_true_index(is_admission, no_admission, sentinel);

        let no_readmit = bool_or(
            bool_and(any_admission_within_window.clone().bool_not(), any_post_window),
            first_death.lower(first_admission),
        );
        let readmit = bool_and(any_admission_within_window, no_readmit.clone().bool_not());
        let unknown = bool_and(readmit.clone().bool_not(), no_readmit.clone().bool_not());

        Ok(LabelOutput {
            labels: self.encode(no_readmit, readmit),
            unknown,
        })
    }
}
