//! Per-VRF forwarding table with longest-prefix-match lookup.

use pbr_types::{IpAddress, IpPrefix};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::types::FibEntry;

/// FIBs of a device, by VRF name.
pub type FibsByVrf = HashMap<String, Fib>;

/// A forwarding table for one VRF.
///
/// Several entries under one prefix model ECMP. Routes are keyed by their
/// network prefix, so host bits in an entry's prefix do not split paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<FibEntry>", into = "Vec<FibEntry>")]
pub struct Fib {
    routes: BTreeMap<IpPrefix, Vec<FibEntry>>,
}

impl Fib {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry under its prefix, keeping existing ECMP paths.
    pub fn insert(&mut self, entry: FibEntry) {
        let paths = self.routes.entry(entry.prefix.network()).or_default();
        if !paths.contains(&entry) {
            paths.push(entry);
        }
    }

    pub fn with_entry(mut self, entry: FibEntry) -> Self {
        self.insert(entry);
        self
    }

    /// Returns the entries of the longest prefix containing `ip`; empty
    /// when nothing matches.
    pub fn get(&self, ip: &IpAddress) -> &[FibEntry] {
        (0..=ip.bit_len())
            .rev()
            .filter_map(|len| IpPrefix::new(*ip, len).ok())
            .find_map(|key| self.routes.get(&key.network()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct prefixes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &FibEntry> {
        self.routes.values().flatten()
    }
}

impl From<Vec<FibEntry>> for Fib {
    fn from(entries: Vec<FibEntry>) -> Self {
        entries.into_iter().fold(Fib::new(), Fib::with_entry)
    }
}

impl From<Fib> for Vec<FibEntry> {
    fn from(fib: Fib) -> Self {
        fib.routes.into_values().flatten().collect()
    }
}

impl FromIterator<FibEntry> for Fib {
    fn from_iter<T: IntoIterator<Item = FibEntry>>(iter: T) -> Self {
        iter.into_iter().fold(Fib::new(), Fib::with_entry)
    }
}
