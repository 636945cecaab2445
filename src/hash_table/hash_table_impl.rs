use std::fmt;
use log::trace;

/// Error raised when a hash table cannot be constructed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HashTableError {
    ZeroBuckets,
    /// The chain array could not be allocated
    TooManyBuckets(usize),
}

impl fmt::Display for HashTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashTableError::ZeroBuckets => write!(f, "bucket count must be greater than zero"),
            HashTableError::TooManyBuckets(n) => write!(f, "unable to allocate {} buckets", n),
        }
    }
}

impl std::error::Error for HashTableError {}

/// Represents a key-value pair stored in one bucket chain
#[derive(Debug, Clone)]
pub struct Entry<V> {
    pub key: String,
    pub value: V,
}

impl<V> Entry<V> {
    /// Creates a new entry with the given key and value
    pub fn new(key: &str, value: V) -> Entry<V> {
        Entry { key: key.to_string(), value }
    }
}

/// Fixed-size hash table resolving collisions by separate chaining.
/// The bucket count is chosen at construction and never changes, so a key
/// lands in the same chain for the whole lifetime of the table.
#[derive(Debug, Clone)]
pub struct HashTable<V> {
    /// One chain per bucket, entries kept in insertion order
    chains: Vec<Vec<Entry<V>>>,
    /// Number of distinct keys across all chains
    len: usize,
}

impl<V> HashTable<V> {
    /// Creates a new hash table with `num_buckets` empty chains
    pub fn new(num_buckets: usize) -> Result<HashTable<V>, HashTableError> {
        if num_buckets == 0 {
            return Err(HashTableError::ZeroBuckets);
        }
        let mut chains = Vec::new();
        chains
            .try_reserve_exact(num_buckets)
            .map_err(|_| HashTableError::TooManyBuckets(num_buckets))?;
        chains.resize_with(num_buckets, Vec::new);
        Ok(HashTable { chains, len: 0 })
    }

    /// Returns the bucket index `key` hashes to
    pub fn bucket_of(&self, key: &str) -> usize {
        get_hash(key, self.chains.len())
    }

    /// Inserts or replaces the value stored under `key`.
    /// Returns the previous value when the key was already present; in that
    /// case the entry keeps its position in the chain and the size is unchanged.
    pub fn put(&mut self, key: &str, value: V) -> Option<V> {
        let index = self.bucket_of(key);
        let chain = &mut self.chains[index];

        if let Some(entry) = chain.iter_mut().find(|entry| entry.key == key) {
            trace!("replacing '{}' in bucket {}", key, index);
            return Some(std::mem::replace(&mut entry.value, value));
        }

        trace!("appending '{}' to bucket {}", key, index);
        chain.push(Entry::new(key, value));
        self.len += 1;
        None
    }

    /// Retrieves the value stored under `key`
    pub fn get(&self, key: &str) -> Option<&V> {
        let index = self.bucket_of(key);
        self.chains[index]
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Returns true if `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key` from its chain and hands back the stored value
    pub fn remove(&mut self, key: &str) -> Option<V> {
        let index = self.bucket_of(key);
        let chain = &mut self.chains[index];

        let position = chain.iter().position(|entry| entry.key == key)?;
        // Vec::remove shifts the tail left, preserving chain order
        let entry = chain.remove(position);
        self.len -= 1;
        trace!("removed '{}' from bucket {}", key, index);
        Some(entry.value)
    }

    /// Number of distinct keys stored
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets fixed at construction
    pub fn num_buckets(&self) -> usize {
        self.chains.len()
    }

    /// Ratio of stored keys to buckets. Not managed: the table never resizes.
    pub fn load_factor(&self) -> f64 {
        self.len as f64 / self.chains.len() as f64
    }

    /// Enumerates every bucket from 0 to N-1, empty ones included
    pub fn buckets(&self) -> impl Iterator<Item = Bucket<'_, V>> {
        self.chains
            .iter()
            .enumerate()
            .map(|(index, chain)| Bucket { index, entries: chain })
    }

    /// Iterates over all `(key, value)` pairs in bucket order, then chain order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.chains
            .iter()
            .flat_map(|chain| chain.iter())
            .map(|entry| (entry.key.as_str(), &entry.value))
    }
}

/// Read-only view of a single bucket chain
#[derive(Debug, Clone, Copy)]
pub struct Bucket<'a, V> {
    index: usize,
    entries: &'a [Entry<V>],
}

impl<'a, V> Bucket<'a, V> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries of this chain in insertion order
    pub fn entries(&self) -> &'a [Entry<V>] {
        self.entries
    }

    /// Values of this chain in insertion order
    pub fn values(&self) -> impl Iterator<Item = &'a V> + 'a {
        self.entries.iter().map(|entry| &entry.value)
    }
}

/// Dumps every chain as `Bucket i: v -> v -> null`
impl<V: fmt::Display> fmt::Display for HashTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bucket in self.buckets() {
            write!(f, "Bucket {}: ", bucket.index())?;
            for value in bucket.values() {
                write!(f, "{} -> ", value)?;
            }
            writeln!(f, "null")?;
        }
        Ok(())
    }
}

/// Sums the UTF-16 code units of `key`, reducing modulo `num_buckets`
/// after every addition. The result is always in `[0, num_buckets)`.
fn get_hash(key: &str, num_buckets: usize) -> usize {
    let mut hash = 0usize;
    for unit in key.encode_utf16() {
        hash = (hash + unit as usize) % num_buckets;
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain_keys<V>(table: &HashTable<V>, index: usize) -> Vec<String> {
        table
            .buckets()
            .nth(index)
            .map(|bucket| bucket.entries().iter().map(|e| e.key.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn zero_buckets_is_rejected() {
        let result: Result<HashTable<u32>, _> = HashTable::new(0);
        assert_eq!(result.unwrap_err(), HashTableError::ZeroBuckets);
    }

    #[test]
    fn unallocatable_bucket_count_is_rejected() {
        let result: Result<HashTable<u32>, _> = HashTable::new(usize::MAX);
        assert_eq!(result.unwrap_err(), HashTableError::TooManyBuckets(usize::MAX));
        let result: Result<HashTable<u32>, _> = HashTable::new(99_999_999_999_999);
        assert_eq!(result.unwrap_err(), HashTableError::TooManyBuckets(99_999_999_999_999));
    }

    #[test]
    fn hash_sums_character_codes() {
        // 'A' = 65, 'B' = 66 -> 131
        assert_eq!(get_hash("AB", 1000), 131);
        assert_eq!(get_hash("AB", 5), 131 % 5);
        assert_eq!(get_hash("", 7), 0);
        assert_eq!(get_hash("anything", 1), 0);
    }

    #[test]
    fn hash_stays_in_range_for_long_keys() {
        let key = "z".repeat(100_000);
        for n in [1, 2, 3, 17, 127, 4096] {
            let index = get_hash(&key, n);
            assert!(index < n);
            assert_eq!(index, (122 * 100_000) % n);
        }
    }

    #[test]
    fn hash_counts_surrogate_pairs() {
        // U+1F600 encodes as 0xD83D 0xDE00
        assert_eq!(get_hash("\u{1F600}", 1 << 20), 0xD83D + 0xDE00);
    }

    #[test]
    fn put_then_get() {
        let mut table = HashTable::new(5).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.put("ABC123", 1), None);
        assert_eq!(table.get("ABC123"), Some(&1));
        assert_eq!(table.get("abc123"), None);
        assert_eq!(table.len(), 1);
        assert!(!table.is_empty());
    }

    #[test]
    fn put_existing_key_replaces_in_place() {
        let mut table = HashTable::new(1).unwrap();
        table.put("a", 1);
        table.put("b", 2);
        table.put("c", 3);

        assert_eq!(table.put("b", 20), Some(2));
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("b"), Some(&20));
        assert_eq!(chain_keys(&table, 0), vec!["a", "b", "c"]);
    }

    #[test]
    fn remove_returns_value_and_shrinks() {
        let mut table = HashTable::new(5).unwrap();
        table.put("ABC123", "sol");
        table.put("XYZ999", "mar");

        assert_eq!(table.remove("ABC123"), Some("sol"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("ABC123"), None);
        assert!(!table.contains_key("ABC123"));
        assert!(table.contains_key("XYZ999"));
    }

    #[test]
    fn remove_absent_key_leaves_size() {
        let mut table: HashTable<u8> = HashTable::new(3).unwrap();
        table.put("k", 1);
        assert_eq!(table.remove("missing"), None);
        assert_eq!(table.len(), 1);

        assert_eq!(table.remove("k"), Some(1));
        assert_eq!(table.remove("k"), None);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn remove_from_middle_and_tail_of_chain() {
        // single bucket forces every key into one chain
        let mut table = HashTable::new(1).unwrap();
        for (i, key) in ["a", "b", "c", "d"].iter().enumerate() {
            table.put(key, i);
        }

        assert_eq!(table.remove("c"), Some(2));
        assert_eq!(chain_keys(&table, 0), vec!["a", "b", "d"]);
        assert_eq!(table.get("d"), Some(&3));

        assert_eq!(table.remove("d"), Some(3));
        assert_eq!(chain_keys(&table, 0), vec!["a", "b"]);

        assert_eq!(table.remove("a"), Some(0));
        assert_eq!(chain_keys(&table, 0), vec!["b"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().count(), 1);
    }

    #[test]
    fn colliding_keys_share_a_bucket() {
        // "ab" and "ba" have the same character sum
        let mut table = HashTable::new(7).unwrap();
        table.put("ab", 1);
        table.put("ba", 2);
        let index = table.bucket_of("ab");
        assert_eq!(index, table.bucket_of("ba"));
        assert_eq!(chain_keys(&table, index), vec!["ab", "ba"]);
        assert_eq!(table.get("ab"), Some(&1));
        assert_eq!(table.get("ba"), Some(&2));
    }

    #[test]
    fn size_tracks_new_keys_minus_removals() {
        let mut table = HashTable::new(4).unwrap();
        let mut expected = 0usize;
        for i in 0..50 {
            let key = format!("key{}", i % 20);
            if table.put(&key, i).is_none() {
                expected += 1;
            }
            if i % 3 == 0 && table.remove(&format!("key{}", i % 7)).is_some() {
                expected -= 1;
            }
            assert_eq!(table.len(), expected);
            assert_eq!(table.iter().count(), expected);
        }
    }

    #[test]
    fn buckets_lists_every_index_once() {
        let mut table = HashTable::new(6).unwrap();
        table.put("x", 'x');
        let indexes: Vec<usize> = table.buckets().map(|b| b.index()).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(table.buckets().filter(|b| !b.is_empty()).count(), 1);
        // restartable
        assert_eq!(table.buckets().count(), 6);
        assert_eq!(table.num_buckets(), 6);
    }

    #[test]
    fn display_dumps_chains() {
        let mut table = HashTable::new(2).unwrap();
        // 'a' = 97 -> bucket 1, 'b' = 98 -> bucket 0
        table.put("a", 1);
        table.put("b", 2);
        table.put("c", 3);
        assert_eq!(
            table.to_string(),
            "Bucket 0: 2 -> null\nBucket 1: 1 -> 3 -> null\n"
        );
    }

    #[test]
    fn load_factor_is_unmanaged() {
        let mut table = HashTable::new(2).unwrap();
        for i in 0..6 {
            table.put(&i.to_string(), i);
        }
        assert_eq!(table.num_buckets(), 2);
        assert!((table.load_factor() - 3.0).abs() < f64::EPSILON);
    }
}
