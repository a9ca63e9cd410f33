//! Podium - Paris 2024 Olympic Games analytics.
//!
//! Loads the Games' CSV export, answers the dashboard's questions through the
//! `analysis` module and draws the answers as interactive or static charts.

pub mod analysis;
pub mod charts;
pub mod cli;
pub mod commands;
pub mod config;
pub mod data;
pub mod filters;
pub mod gui;
pub mod report;
