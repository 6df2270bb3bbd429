pub mod common;
pub mod controller;
pub mod engine;
pub mod geometry;
pub mod host;
pub mod layout_engine;
pub mod model;
pub mod rules;
pub mod sim;
