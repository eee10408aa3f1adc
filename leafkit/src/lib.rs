//! Small stateless utilities: a positive-doubling average, credential query
//! handling with a hashed lookup replacement, and a flat `key=value` parser.
//! Each operation owns its inputs and touches no shared state.

pub mod average;
pub mod config;
pub mod credentials;
pub mod demo;
pub mod telemetry;

pub use average::{average_of_doubled_positives, average_of_doubled_positives_lossy, AverageError};
pub use config::{
    load_flat_config, load_flat_config_lenient, parse_flat_config, parse_flat_config_lenient,
    ConfigError, FlatConfig, LenientParse, SkippedLine,
};
pub use credentials::{
    authenticate, format_credential_query, hash_secret, verify_secret, CredentialError,
    CredentialQuery, CredentialStore, InMemoryCredentialStore,
};
