//! Integration Tests Module
//!
//! Cross-module tests for the memory and RAG subsystem: durable store
//! behavior on real (temporary) directories, summary scheduling against a
//! fake model, and pipeline orchestration against a fake process runner.

// Memory store persistence and ordering tests
mod memory_store_test;

// Summary trigger policy tests
mod summarizer_test;
