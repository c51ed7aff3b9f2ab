pub mod collect;
pub mod config;
pub mod rules;
pub mod run;
