//! Persistence layer: repository ports and their Postgres adapters.

pub mod ports;

#[cfg(feature = "database")]
#[cfg_attr(docsrs, doc(cfg(feature = "database")))]
pub mod infrastructure;

#[cfg(feature = "database")]
pub use infrastructure::postgres::PostgresDatabase;
