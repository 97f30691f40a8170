//! Zero-shot labelers: each one turns the generated continuation of a batch
//! into a label distribution plus a flag for examples whose label the
//! generated horizon cannot settle.

pub mod readmission;
pub mod reference;

use burn::tensor::{backend::Backend, Bool, Tensor};

use crate::data::batch::EventBatch;
use crate::error::Result;

pub use readmission::{ReadmissionLabeler, ReadmissionLabelerConfig};
pub use reference::{label_sequence, GeneratedSequence, ReadmissionOutcome, ReadmissionRule};

pub trait Labeler {
    /// Labels the steps at and after `input_seq_len`, which the model generated.
    fn label<B: Backend>(
        &self,
        batch: &EventBatch<B>,
        input_seq_len: usize,
    ) -> Result<LabelOutput<B>>;
}

#[derive(Clone, Debug)]
pub struct LabelOutput<B: Backend> {
    pub labels: Tensor<B, 2>,        // [N, C], 0.0 / 1.0 in label-vocab order
    pub unknown: Tensor<B, 1, Bool>, // [N]
}

impl<B: Backend> LabelOutput<B> {
    pub fn batch_size(&self) -> usize {
        self.unknown.dims()[0]
    }

    /// Examples that may be used for supervision or metrics.
    pub fn known_mask(&self) -> Tensor<B, 1, Bool> {
        self.unknown.clone().bool_not()
    }

    pub fn num_unknown(&self) -> usize {
        self.unknown
            .to_data()
            .value
            .iter()
            .filter(|&&unknown| unknown)
            .count()
    }
}
