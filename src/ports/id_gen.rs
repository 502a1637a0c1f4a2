//! ID generator port.

/// Generates unique identifiers for alias entries.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;
}
