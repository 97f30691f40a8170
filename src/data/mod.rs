pub mod batch;
pub mod event_types;
pub mod item;
pub mod vocabulary;
