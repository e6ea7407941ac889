//! Reading-key → ranked candidate dictionary.
//!
//! The dictionary maps a reading key (space-joined tone-numbered syllables,
//! e.g. `"fei1 chang2"`) to candidates ordered by descending corpus
//! frequency. It is read-only at runtime: loaded once at startup, never
//! mutated by composition. A missing key is a normal empty result; a failed
//! load is a startup error, since the engine cannot compose without it.
//!
//! Storage is an FST index over the sorted keys plus a bincode payload
//! vector, with an in-memory map layered on top for dynamically inserted
//! entries (demo data, tests) and an LRU cache in front of lookups, which
//! run on every keystroke.

use crate::candidate::Candidate;
use crate::tokenizer::Syllable;
use ahash::AHashMap;
use fst::Map;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs::File;
use std::io::Read;
use std::num::NonZeroUsize;

/// Join syllables into the canonical lookup key, tone digits included.
pub fn reading_key(syllables: &[Syllable]) -> String {
    syllables
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Persisted dictionary record, matching the builder output format.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DictEntry {
    pub text: String,
    #[serde(default)]
    pub rare_tone: bool,
}

/// Candidate dictionary with FST + bincode backing and a lookup cache.
pub struct CandidateDict {
    // In-memory map for dynamic entries, consulted before the fst
    map: AHashMap<String, Vec<DictEntry>>,
    // FST map for key -> payload index lookups
    fst_map: Option<Map<Vec<u8>>>,
    // Bincode-serialized payload vector (index -> Vec<DictEntry>)
    payloads: Option<Vec<Vec<DictEntry>>>,
    // Reading key -> candidates, refreshed on every keystroke
    cache: RefCell<LruCache<String, Vec<Candidate>>>,
}

impl CandidateDict {
    pub fn new() -> Self {
        Self::with_cache_size(1024)
    }

    /// Create an empty dictionary with the given lookup cache capacity.
    pub fn with_cache_size(capacity: usize) -> Self {
        let capacity =
            NonZeroUsize::new(capacity).unwrap_or_else(|| NonZeroUsize::new(1024).unwrap());
        Self {
            map: AHashMap::new(),
            fst_map: None,
            payloads: None,
            cache: RefCell::new(LruCache::new(capacity)),
        }
    }

    /// Insert a dynamic entry for a reading key, after any existing entries
    /// for that key.
    pub fn insert<K: Into<String>, T: Into<String>>(&mut self, key: K, text: T, rare_tone: bool) {
        self.map.entry(key.into()).or_default().push(DictEntry {
            text: text.into(),
            rare_tone,
        });
        // Cached results for the key are stale now
        self.cache.borrow_mut().clear();
    }

    /// Look up candidates for a syllable sequence.
    ///
    /// An empty sequence short-circuits to an empty list; there is nothing to
    /// read before the first completed syllable.
    pub fn lookup(&self, syllables: &[Syllable]) -> Vec<Candidate> {
        if syllables.is_empty() {
            return Vec::new();
        }
        self.lookup_key(&reading_key(syllables))
    }

    /// Look up candidates for an already-joined reading key.
    pub fn lookup_key(&self, key: &str) -> Vec<Candidate> {
        if let Some(cached) = self.cache.borrow_mut().get(key) {
            return cached.clone();
        }

        let candidates = self.lookup_uncached(key);
        tracing::debug!(key, hits = candidates.len(), "dictionary lookup");
        self.cache
            .borrow_mut()
            .put(key.to_string(), candidates.clone());
        candidates
    }

    fn lookup_uncached(&self, key: &str) -> Vec<Candidate> {
        // Prefer in-memory entries
        if let Some(entries) = self.map.get(key) {
            return entries
                .iter()
                .map(|e| Candidate::new(e.text.clone(), e.rare_tone))
                .collect();
        }

        // FST + bincode lookup
        if let (Some(map), Some(payloads)) = (&self.fst_map, &self.payloads) {
            if let Some(idx) = map.get(key) {
                if let Some(entries) = payloads.get(idx as usize) {
                    return entries
                        .iter()
                        .map(|e| Candidate::new(e.text.clone(), e.rare_tone))
                        .collect();
                }
            }
        }

        Vec::new()
    }

    /// Load the dictionary from FST + bincode artifacts.
    ///
    /// - `fst_path`: dict.fst mapping reading keys to payload indices
    /// - `bincode_path`: dict.bincode containing `Vec<Vec<DictEntry>>`
    pub fn load_from_fst_bincode<P: AsRef<std::path::Path>>(
        fst_path: P,
        bincode_path: P,
    ) -> Result<Self, String> {
        let fst_path = fst_path.as_ref();
        let bincode_path = bincode_path.as_ref();

        let mut f =
            File::open(fst_path).map_err(|e| format!("open fst {}: {}", fst_path.display(), e))?;
        let mut buf = Vec::new();
        f.read_to_end(&mut buf)
            .map_err(|e| format!("read fst: {}", e))?;
        let map = Map::new(buf).map_err(|e| format!("fst map: {}", e))?;

        let mut f = File::open(bincode_path)
            .map_err(|e| format!("open bincode {}: {}", bincode_path.display(), e))?;
        let mut buf = Vec::new();
        f.read_to_end(&mut buf)
            .map_err(|e| format!("read bincode: {}", e))?;
        let payloads: Vec<Vec<DictEntry>> =
            bincode::deserialize(&buf).map_err(|e| format!("deserialize bincode: {}", e))?;

        tracing::info!(
            readings = payloads.len(),
            path = %fst_path.display(),
            "loaded candidate dictionary"
        );

        let mut dict = Self::new();
        dict.fst_map = Some(map);
        dict.payloads = Some(payloads);
        Ok(dict)
    }

    /// Load the dictionary from the JSON interchange form used by browser
    /// hosts: a map from reading key to a list of `{text, rare_tone}`
    /// records.
    pub fn load_from_json<P: AsRef<std::path::Path>>(path: P) -> Result<Self, String> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("open json {}: {}", path.display(), e))?;
        let parsed: std::collections::HashMap<String, Vec<DictEntry>> =
            serde_json::from_str(&content)
                .map_err(|e| format!("parse json {}: {}", path.display(), e))?;

        tracing::info!(
            readings = parsed.len(),
            path = %path.display(),
            "loaded candidate dictionary (json)"
        );

        let mut dict = Self::new();
        dict.map = parsed.into_iter().collect();
        Ok(dict)
    }

    /// Small built-in dictionary for tests and for running without data
    /// files. Entries per key are frequency-ordered like built artifacts.
    pub fn load_demo() -> Self {
        let mut dict = Self::new();
        dict.insert("fei1", "非", false);
        dict.insert("fei1 chang2", "非常", false);
        dict.insert("wo3", "我", false);
        dict.insert("wo3", "婐", true);
        for text in [
            "不", "部", "步", "布", "簿", "埔", "歩", "怖", "埠", "埗", "鈈", "蔀", "吥", "鈽",
            "佈", "歨", "餔", "篰", "悑", "捗", "瓿",
        ] {
            dict.insert("bu4", text, false);
        }
        dict.insert("dong1", "东", false);
        dict.insert("dong1 xi1", "东西", false);
        dict.insert("dong1 xi1 nan2", "东西南", false);
        dict.insert("ni3", "你", false);
        dict.insert("ni3 hao3", "你好", false);
        dict
    }
}

impl Default for CandidateDict {
    fn default() -> Self {
        Self::new()
    }
}
