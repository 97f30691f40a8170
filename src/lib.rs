pub mod data;
pub mod error;
pub mod labelers;
pub mod utils;

pub use data::batch::EventBatch;
pub use data::event_types::{EventTypeResolver, MeasurementEventTypeResolver, MISSING_EVENT_TYPE};
pub use data::item::{EventBatcher, EventSequenceItem, EventStep};
pub use data::vocabulary::{compound_label_has_token, EventVocabulary};
pub use error::{LabelerError, Result};
pub use labelers::{LabelOutput, Labeler, ReadmissionLabeler, ReadmissionLabelerConfig};
