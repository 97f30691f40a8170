use burn::tensor::{backend::Backend, Int, Tensor};

use crate::error::{LabelerError, Result};

/// Event-type id given to steps that carry no event-type measurement.
pub const MISSING_EVENT_TYPE: i64 = -1;

/// Maps per-step (measurement, value) index pairs to one event-type id per step.
pub trait EventTypeResolver {
    fn resolve<B: Backend>(
        &self,
        measurement_indices: Tensor<B, 3, Int>, // [N, T, F]
        value_indices: Tensor<B, 3, Int>,       // [N, T, F]
        event_type_field_index: usize,
        event_type_id_offset: usize,
    ) -> Result<Tensor<B, 2, Int>>;
}

/// Reads the value of the single event-type field of each step and shifts it
/// out of the unified index space, so ids line up with the event-type vocabulary.
#[derive(Clone, Copy, Debug, Default)]
pub struct MeasurementEventTypeResolver;

impl EventTypeResolver for MeasurementEventTypeResolver {
    fn resolve<B: Backend>(
        &self,
        measurement_indices: Tensor<B, 3, Int>,
        value_indices: Tensor<B, 3, Int>,
        event_type_field_index: usize,
        event_type_id_offset: usize,
    ) -> Result<Tensor<B, 2, Int>> {
        let is_event_type = measurement_indices
            .equal_elem(event_type_field_index as i64)
            .float();

        let counts: Tensor<B, 2> = is_event_type.clone().sum_dim(2).squeeze(2);
        ensure_single_event_type(counts.clone())?;

        let shifted = value_indices.float() - event_type_id_offset as f32;
        let event_types: Tensor<B, 2> = (shifted * is_event_type).sum_dim(2).squeeze(2);
        let missing = counts.equal_elem(0.0);

        Ok(event_types
            .mask_fill(missing, MISSING_EVENT_TYPE as f32)
            .int())
    }
}

fn ensure_single_event_type<B: Backend>(counts: Tensor<B, 2>) -> Result<()> {
    let [_, seq_len] = counts.dims();
    if seq_len == 0 {
        return Ok(());
    }

    let counts = counts.into_data().convert::<f32>().value;
    match counts.iter().position(|&c| c > 1.0) {
        None => Ok(()),
        Some(flat) => Err(LabelerError::AmbiguousEventType {
            example: flat / seq_len,
            step: flat % seq_len,
            count: counts[flat] as usize,
        }),
    }
}
