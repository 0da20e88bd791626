pub mod api;
pub mod cache;
pub mod commands;
pub mod config;
pub mod forms;
pub mod gateway;
pub mod metrics;
pub mod models;
pub mod pages;
pub mod ui;
