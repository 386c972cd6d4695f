//! UI components for AIRA Writer

pub mod assistant;
pub mod editor;
pub mod notes;
pub mod notifications;
pub mod toolbar;
