use std::collections::HashMap;

use burn::backend::NdArray;
use burn::tensor::{Data, Shape, Tensor};
use event_labelers::{
    EventBatch, EventVocabulary, Labeler, ReadmissionLabeler, ReadmissionLabelerConfig,
};
use proptest::prelude::*;

type TestBackend = NdArray<f32>;

const EVENT_TYPE_MEASUREMENT: i64 = 1;
const EVENT_TYPE_OFFSET: i64 = 3;

fn vocabulary() -> EventVocabulary {
    EventVocabulary::new(
        HashMap::from([("event_type".to_string(), EVENT_TYPE_MEASUREMENT as usize)]),
        HashMap::from([("event_type".to_string(), EVENT_TYPE_OFFSET as usize)]),
        HashMap::from([
            ("ADMISSION".to_string(), 0),
            ("DEATH".to_string(), 1),
            ("LAB".to_string(), 2),
            ("LAB&ADMISSION".to_string(), 3),
            ("READMISSION".to_string(), 4),
            ("DEATH&DISCHARGE".to_string(), 5),
        ]),
        vec!["False".to_string(), "True".to_string()],
    )
}

/// Per cell: event type (-1 for none), mask bit, minutes to the next step.
type Cell = (i64, bool, i64);

const ADMISSION: i64 = 0;
const DEATH: i64 = 1;

#[derive(Clone, Debug)]
struct Sample {
    batch_size: usize,
    seq_len: usize,
    cells: Vec<Cell>,
    lengths: Vec<i64>,
    input_seq_len: usize,
}

fn sample_strategy() -> impl Strategy<Value = Sample> {
    (1usize..5, 2usize..9)
        .prop_flat_map(|(batch_size, seq_len)| {
            (
                Just(batch_size),
                Just(seq_len),
                prop::collection::vec(
                    (-1i64..6, any::<bool>(), 0i64..30_000),
                    batch_size * seq_len,
                ),
                prop::collection::vec(0..=seq_len as i64, batch_size),
                1..=seq_len,
            )
        })
        .prop_map(|(batch_size, seq_len, cells, lengths, input_seq_len)| {
            // Steps at or past an example's length are padding.
            let cells = cells
                .into_iter()
                .enumerate()
                .map(|(cell, (event_type, valid, delta))| {
                    let within = ((cell % seq_len) as i64) < lengths[cell / seq_len];
                    (event_type, valid && within, delta)
                })
                .collect();
            Sample {
                batch_size,
                seq_len,
                cells,
                lengths,
                input_seq_len,
            }
        })
}

fn build_batch(sample: &Sample) -> EventBatch<TestBackend> {
    let Sample {
        batch_size,
        seq_len,
        ref cells,
        ref lengths,
        ..
    } = *sample;
    let mask: Vec<bool> = cells.iter().map(|c| c.1).collect();
    let measurements: Vec<i64> = cells
        .iter()
        .map(|c| if c.0 < 0 { 0 } else { EVENT_TYPE_MEASUREMENT })
        .collect();
    let indices: Vec<i64> = cells
        .iter()
        .map(|c| if c.0 < 0 { 0 } else { c.0 + EVENT_TYPE_OFFSET })
        .collect();
    let deltas: Vec<i64> = cells.iter().map(|c| c.2).collect();

    EventBatch {
        event_mask: Tensor::from_data(Data::new(mask, Shape::new([batch_size, seq_len]))),
        dynamic_measurement_indices: Tensor::from_data(
            Data::new(measurements, Shape::new([batch_size, seq_len, 1])).convert(),
        ),
        dynamic_indices: Tensor::from_data(
            Data::new(indices, Shape::new([batch_size, seq_len, 1])).convert(),
        ),
        time_delta: Tensor::from_data(
            Data::new(deltas, Shape::new([batch_size, seq_len])).convert(),
        ),
        sequence_length: Tensor::from_data(
            Data::new(lengths.clone(), Shape::new([batch_size])).convert(),
        ),
    }
}

fn tensor_labels(
    labeler: &ReadmissionLabeler,
    batch: &EventBatch<TestBackend>,
    input_seq_len: usize,
) -> (Vec<f32>, Vec<bool>) {
    let output = labeler.label(batch, input_seq_len).unwrap();
    (
        output.labels.into_data().convert::<f32>().value,
        output.unknown.into_data().value,
    )
}

proptest! {
    #[test]
    fn tensor_labels_match_reference(sample in sample_strategy()) {
        let labeler = ReadmissionLabelerConfig::new().init(&vocabulary()).unwrap();
        let batch = build_batch(&sample);

        let (labels, unknown) = tensor_labels(&labeler, &batch, sample.input_seq_len);
        let reference = labeler.label_reference(&batch, sample.input_seq_len).unwrap();

        prop_assert_eq!(reference.len(), sample.batch_size);
        for (b, outcome) in reference.iter().enumerate() {
            prop_assert_eq!(labels[2 * b] == 1.0, outcome.no_readmit);
            prop_assert_eq!(labels[2 * b + 1] == 1.0, outcome.readmit);
            prop_assert_eq!(unknown[b], outcome.unknown);
        }
    }

    #[test]
    fn outcomes_are_exclusive(sample in sample_strategy()) {
        let labeler = ReadmissionLabelerConfig::new().init(&vocabulary()).unwrap();
        let batch = build_batch(&sample);

        for outcome in labeler.label_reference(&batch, sample.input_seq_len).unwrap() {
            prop_assert!(!(outcome.readmit && outcome.no_readmit));
            prop_assert_eq!(outcome.unknown, !outcome.readmit && !outcome.no_readmit);
            if outcome.first_death < outcome.first_admission {
                prop_assert!(outcome.no_readmit);
            }
        }
    }

    #[test]
    fn masked_steps_never_change_labels(sample in sample_strategy()) {
        let labeler = ReadmissionLabelerConfig::new().init(&vocabulary()).unwrap();
        let batch = build_batch(&sample);
        let reference = labeler.label_reference(&batch, sample.input_seq_len).unwrap();
        let labels = tensor_labels(&labeler, &batch, sample.input_seq_len);

        for claimed in [ADMISSION, DEATH] {
            // Masked steps keep their time but claim an admission or a death.
            let relabeled = Sample {
                cells: sample
                    .cells
                    .iter()
                    .map(|&(event_type, valid, delta)| {
                        (if valid { event_type } else { claimed }, valid, delta)
                    })
                    .collect(),
                ..sample.clone()
            };
            let relabeled_batch = build_batch(&relabeled);

            prop_assert_eq!(
                &labeler.label_reference(&relabeled_batch, sample.input_seq_len).unwrap(),
                &reference
            );
            prop_assert_eq!(
                tensor_labels(&labeler, &relabeled_batch, sample.input_seq_len),
                labels.clone()
            );
        }
    }
}
