mod config_gen;
mod tables;

pub use config_gen::config_generate;
pub use tables::list_tables;
