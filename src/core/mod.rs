//! Core functionality for documents, editing, and configuration

pub mod command;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod history;
pub mod markup;
pub mod notification;
pub mod surface;
