// Hash containers used across the runtime.
//
// Keys are small handles, so the default SipHash is replaced by aHash.

pub type HashMap<K, V> = hashbrown::HashMap<K, V, ahash::RandomState>;
pub type HashSet<K> = hashbrown::HashSet<K, ahash::RandomState>;
