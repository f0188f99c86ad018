pub mod case;
pub mod submission;
