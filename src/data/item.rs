use burn::data::dataloader::batcher::Batcher;
use burn::tensor::backend::Backend;
use burn::tensor::{Data, Shape, Tensor};
use serde::{Deserialize, Serialize};

use crate::data::batch::EventBatch;

/// Measurement index reserved for empty fields and padding steps.
pub const PADDING_MEASUREMENT: usize = 0;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EventStep {
    /// `(measurement_index, value_index)` pairs observed at this step.
    pub measurements: Vec<(usize, usize)>,
    /// Minutes until the next step of the sequence.
    pub time_delta: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EventSequenceItem {
    pub steps: Vec<EventStep>,
}

/// Right-pads variable-length sequences into one rectangular `EventBatch`.
#[derive(Clone, Debug, Default)]
pub struct EventBatcher {
    min_sequence_len: usize,
}

impl EventBatcher {
    pub fn new(min_sequence_len: usize) -> Self {
        Self { min_sequence_len }
    }
}

impl<B: Backend> Batcher<EventSequenceItem, EventBatch<B>> for EventBatcher {
    fn batch(&self, items: Vec<EventSequenceItem>) -> EventBatch<B> {
        let batch_size = items.len();
        let seq_len = items
            .iter()
            .map(|item| item.steps.len())
            .max()
            .unwrap_or(0)
            .max(self.min_sequence_len);
        let num_fields = items
            .iter()
            .flat_map(|item| item.steps.iter())
            .map(|step| step.measurements.len())
            .max()
            .unwrap_or(0)
            .max(1);

        let cells = batch_size * seq_len;
        let mut event_mask = vec![false; cells];
        let mut time_delta = vec![0i64; cells];
        let mut measurement_indices = vec![PADDING_MEASUREMENT as i64; cells * num_fields];
        let mut value_indices = vec![0i64; cells * num_fields];

        for (b, item) in items.iter().enumerate() {
            for (t, step) in item.steps.iter().enumerate() {
                let cell = b * seq_len + t;
                event_mask[cell] = true;
                time_delta[cell] = step.time_delta as i64;

                for (f, &(measurement, value)) in step.measurements.iter().enumerate() {
                    measurement_indices[cell * num_fields + f] = measurement as i64;
                    value_indices[cell * num_fields + f] = value as i64;
                }
            }
        }

        let sequence_length: Vec<i64> = items
            .iter()
            .map(|item| item.steps.len() as i64)
            .collect();

        EventBatch {
            event_mask: Tensor::from_data(Data::new(event_mask, Shape::new([batch_size, seq_len]))),
            dynamic_measurement_indices: Tensor::from_data(
                Data::new(
                    measurement_indices,
                    Shape::new([batch_size, seq_len, num_fields]),
                )
                .convert(),
            ),
            dynamic_indices: Tensor::from_data(
                Data::new(value_indices, Shape::new([batch_size, seq_len, num_fields])).convert(),
            ),
            time_delta: Tensor::from_data(
                Data::new(time_delta, Shape::new([batch_size, seq_len])).convert(),
            ),
            sequence_length: Tensor::from_data(
                Data::new(sequence_length, Shape::new([batch_size])).convert(),
            ),
        }
    }
}
