#![forbid(unsafe_code)]

pub mod assets;
pub mod build;
pub mod cli;
pub mod config;
pub mod formats;
pub mod gallery;
pub mod inject;
pub mod logging;
pub mod markdown;
pub mod serve;
pub mod watch;
