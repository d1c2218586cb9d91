//! Integration Tests Module
//!
//! Integration tests for the Fractal History tree engine. Tests cover seed
//! loading and tree reads, response parsing against the prompt renderers, and
//! end-to-end generation with a scripted completion provider.

// Scripted provider and seeded store fixtures
mod support;

// Tree store integration tests
mod tree_store_test;

// Prompt rendering / response parsing agreement
mod parser_test;

// End-to-end generation tests
mod generation_test;
