mod hash_table_impl;

pub use hash_table_impl::{Bucket, Entry, HashTable, HashTableError};
