pub mod ppmpro;
