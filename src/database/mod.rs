//! calmfeed database layer.
//!
//! SQLite connection management and schema migrations for the persistent
//! storage area.
//!
//! ```no_run
//! use calmfeed::database::Database;
//!
//! let db = Database::open("calmfeed.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
