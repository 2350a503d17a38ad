pub mod config;
pub mod extract;
pub mod run;
