pub mod app;
pub mod commands;
pub mod config;
pub mod context;
pub mod env;
pub mod info;
pub mod output;
pub mod run;
pub mod runtime;
