//! Shared helpers: dates, subprocesses, HTML entities, pluralization.

pub mod date;
pub mod exec;
pub mod html;
pub mod plural;
