// src/lib.rs

//! feedrelay: posts new RSS entries to a Telegram chat.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
