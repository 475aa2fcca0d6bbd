//! chat-service: answers chat messages through a generative text provider.
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
