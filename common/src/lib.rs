pub mod domain;
pub mod models;
pub mod openai;
pub mod repositories;
pub mod sample;
pub mod services;
pub mod settings;
