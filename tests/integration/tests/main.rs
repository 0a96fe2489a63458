//! End-to-End Integration Tests
//!
//! These tests run the complete bridge over a real TCP listener and
//! exercise the artifact and authorization endpoints the way the
//! search appliance does.

mod artifact_flow;
mod authorization;
mod operational;
mod protocol_faults;
