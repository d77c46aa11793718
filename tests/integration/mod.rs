//! Integration tests for the directory order engine

mod engine_scenarios;
mod events;
mod properties;
mod support;
