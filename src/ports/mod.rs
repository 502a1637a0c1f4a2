//! Port traits defining external boundaries.
//!
//! Each trait is a seam between the finder core and something it does not
//! own: wall-clock time, the disk, identifier generation and the web search
//! collaborator. Implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod search;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use id_gen::IdGenerator;
pub use search::{SearchFuture, SearchProvider, SearchQuery};

/// Error type shared by all fallible port methods.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;
