/// Canned upstream responses and a client wired to a mock server.
pub mod fixtures;
