//! Port implementations.
//!
//! - `live`: real clock, disk, UUIDs and HTTP search.
//! - `recording`: wrap another adapter and capture every call to a cassette.
//! - `replaying`: serve calls from a cassette.

pub mod live;
pub mod recording;
pub mod replaying;
