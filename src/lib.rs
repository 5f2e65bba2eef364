#![forbid(unsafe_code)]

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod editor;
pub mod error;
pub mod identity;
pub mod logging;
pub mod sections;
pub mod session;
pub mod shell;
pub mod store;
pub mod upload;
pub mod web;
