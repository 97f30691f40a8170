use burn::tensor::{backend::Backend, Bool, Int, Tensor};

use crate::error::{LabelerError, Result};

#[derive(Clone, Debug)]
pub struct EventBatch<B: Backend> {
    pub event_mask: Tensor<B, 2, Bool>,                  // [N, T]
    pub dynamic_measurement_indices: Tensor<B, 3, Int>, // [N, T, F]
    pub dynamic_indices: Tensor<B, 3, Int>,             // [N, T, F]
    pub time_delta: Tensor<B, 2, Int>,                  // [N, T], minutes to the next step
    pub sequence_length: Tensor<B, 1, Int>,             // [N]
}

impl<B: Backend> EventBatch<B> {
    pub fn batch_size(&self) -> usize {
        self.event_mask.dims()[0]
    }

    pub fn sequence_len(&self) -> usize {
        self.event_mask.dims()[1]
    }

    pub fn num_fields(&self) -> usize {
        self.dynamic_measurement_indices.dims()[2]
    }

    /// Checks that every tensor agrees on the batch and time axes, and that
    /// both per-field tensors agree on the field axis.
    pub fn validate(&self) -> Result<()> {
        let [batch_size, seq_len] = self.event_mask.dims();
        let num_fields = self.num_fields();

        check_shape(
            "dynamic_measurement_indices",
            &[batch_size, seq_len, num_fields],
            &self.dynamic_measurement_indices.dims(),
        )?;
        check_shape(
            "dynamic_indices",
            &[batch_size, seq_len, num_fields],
            &self.dynamic_indices.dims(),
        )?;
        check_shape("time_delta", &[batch_size, seq_len], &self.time_delta.dims())?;
        check_shape(
            "sequence_length",
            &[batch_size],
            &self.sequence_length.dims(),
        )?;

        Ok(())
    }

    /// Per-example declared lengths, checked against the padded time axis and
    /// the mask: no valid step may sit at or past its example's length, so
    /// `length + 1` exceeds every valid step index.
    pub fn sequence_lengths(&self) -> Result<Vec<i64>> {
        self.validate()?;

        let max = self.sequence_len();
        let lengths = self.sequence_length.to_data().convert::<i64>().value;
        let mask = self.event_mask.to_data().value;

        for (example, &length) in lengths.iter().enumerate() {
            if length < 0 || length as usize > max {
                return Err(LabelerError::InvalidSequenceLength {
                    example,
                    length,
                    max,
                });
            }

            let row = &mask[example * max..(example + 1) * max];
            if let Some(offset) = row[length as usize..].iter().position(|&valid| valid) {
                return Err(LabelerError::ValidStepPastLength {
                    example,
                    step: length as usize + offset,
                    length,
                });
            }
        }

        Ok(lengths)
    }
}

fn check_shape(tensor: &'static str, expected: &[usize], actual: &[usize]) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(LabelerError::ShapeMismatch {
            tensor,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        })
    }
}
