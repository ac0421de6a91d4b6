//! Process models
pub mod case_centric;
