//! Test helper modules for lexctl integration tests
//!
//! Provides the in-process stub of the lexicon server the client is
//! exercised against.

pub mod stub_server;

// Re-export commonly used types
pub use stub_server::StubServer;
