//! Set the charmhub channel of charms in deployment bundles without parsing the YAML.
//!
//! The heart of the crate is [`upsert`], a single-pass line scanner that inserts or rewrites
//! the `channel:` key inside each block whose `charm:` key names a selected charm. The other
//! modules find bundles, read the charm list, rewrite files atomically and, separately,
//! report charms whose branches are ahead of their released revisions.

pub mod bundle;
pub mod channel;
pub mod charms;
pub mod config;
pub mod edit_plan;
pub mod error;
pub mod input;
pub mod stale;
pub mod upsert;

pub use channel::Channel;
pub use error::{Error, Result};
