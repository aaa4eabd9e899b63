//! Pure helpers shared across the sync pipeline

pub mod event_classifier;
