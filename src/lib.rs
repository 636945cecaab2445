pub mod hash_table;
pub mod loader;
pub mod logger;
pub mod reservation;

pub use hash_table::{Bucket, Entry, HashTable, HashTableError};
pub use loader::{parse_record, LoadError, LoadReport, Loader, ParseErrorPolicy, RecordError};
pub use reservation::Reservation;
