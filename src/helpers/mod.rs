pub mod hours;
pub mod ppmpro;
pub mod report;
pub mod upload;
