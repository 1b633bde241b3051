//! Integration tests for the staged lifecycle coordinator

mod coordinator_lifecycle;
mod host_driver;
mod phase_hooks;
