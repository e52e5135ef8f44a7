//! Integration tests for the Augury service.
//!
//! These exercise the full question → SQL → forecast pipeline against a
//! temporary SQLite database, with a local stub standing in for the
//! chat-completion API where a test needs one.

#[path = "integration/test_api.rs"]
mod test_api;

#[path = "integration/test_pipeline.rs"]
mod test_pipeline;
