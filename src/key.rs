//! Store key management utilities.
//!
//! All counter, history, and fetch-cache keys are built here so the write
//! and read paths can never disagree on a key name.

/// Builder for the store keys used by instrumentation and caching.
pub struct KeyBuilder;

impl KeyBuilder {
    /// Counter key for an operation identity (the identity itself).
    pub fn call_count(op: &str) -> String {
        op.to_string()
    }

    /// Inputs-log key for an operation identity.
    pub fn inputs_log(op: &str) -> String {
        format!("{}:inputs", op)
    }

    /// Outputs-log key for an operation identity.
    pub fn outputs_log(op: &str) -> String {
        format!("{}:outputs", op)
    }

    /// Access-counter key for a fetched resource.
    pub fn fetch_count(resource: &str) -> String {
        format!("count:{}", resource)
    }

    /// Cached-body key for a fetched resource.
    pub fn fetch_body(resource: &str) -> String {
        format!("cached:{}", resource)
    }

    /// Build composite key from multiple parts.
    pub fn build_composite(parts: &[&str]) -> String {
        parts.join(":")
    }

    /// Parse a composite key into parts.
    pub fn parse(key: &str) -> Vec<&str> {
        key.split(':').collect()
    }
}
