//! Property-based tests for the lifecycle coordinator
