//! Common test utilities for the streamable client
//!
//! - Mock server setup for API testing
//! - Fixtures for response payloads and upload files

#![allow(dead_code)]

pub mod fixtures;
pub mod mock_server;
