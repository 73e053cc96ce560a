pub mod accuracy;
pub mod codec;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod provider;
pub mod roundtrip;
pub mod validation;
