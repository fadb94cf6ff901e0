//! Repository ports (interfaces) grouped by bounded context.
//!
//! Services depend on these traits only; the Postgres adapters live under
//! `database::infrastructure::postgres` and tests supply in-memory versions.

pub mod content;
pub mod my_list;
pub mod watch_progress;
