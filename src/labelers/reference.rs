//! Per-example readmission rule over plain slices. The tensor labeler must
//! agree with it on every batch.

/// One example restricted to its generated region. `time_deltas[t]` is the
/// gap in minutes between generated step `t` and the step before it.
#[derive(Clone, Copy, Debug)]
pub struct GeneratedSequence<'a> {
    pub event_types: &'a [i64],
    pub time_deltas: &'a [i64],
    pub mask: &'a [bool],
    pub sequence_length: i64,
}

#[derive(Clone, Copy, Debug)]
pub struct ReadmissionRule<'a> {
    pub admission_ids: &'a [i64],
    pub death_ids: &'a [i64],
    pub window_minutes: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReadmissionOutcome {
    pub no_readmit: bool,
    pub readmit: bool,
    pub unknown: bool,
    /// Generated step of the first death, or `sequence_length + 1`.
    pub first_death: i64,
    /// Generated step of the first admission, or `sequence_length + 1`.
    pub first_admission: i64,
}

pub fn label_sequence(
    seq: &GeneratedSequence<'_>,
    rule: &ReadmissionRule<'_>,
) -> ReadmissionOutcome {
    let sentinel = seq.sequence_length + 1;

    let mut elapsed = 0i64;
    let mut any_admission_within_window = false;
    let mut any_post_window = false;
    let mut first_death = None;
    let mut first_admission = None;

    for (step, ((&event_type, &delta), &valid)) in seq
        .event_types
        .iter()
        .zip(seq.time_deltas)
        .zip(seq.mask)
        .enumerate()
    {
        elapsed += delta;
        let within_window = elapsed < rule.window_minutes;
        any_post_window |= !within_window;

        if !valid {
            continue;
        }

        if rule.admission_ids.contains(&event_type) {
            any_admission_within_window |= within_window;
            first_admission.get_or_insert(step as i64);
        }
        if rule.death_ids.contains(&event_type) {
            first_death.get_or_insert(step as i64);
        }
    }

    let first_death = first_death.unwrap_or(sentinel);
    let first_admission = first_admission.unwrap_or(sentinel);

    let no_readmit =
        (!any_admission_within_window && any_post_window) || first_death < first_admission;
    let readmit = any_admission_within_window && !no_readmit;

    ReadmissionOutcome {
        no_readmit,
        readmit,
        unknown: !readmit && !no_readmit,
        first_death,
        first_admission,
    }
}
