//! Sets of IP addresses referenced by match expressions.

use pbr_types::{IpAddress, IpPrefix};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Named IP spaces defined on a device.
pub type IpSpacesByName = HashMap<String, IpSpace>;

/// A set of IP addresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IpSpace {
    /// Every address.
    Universe,
    /// No address.
    Empty,
    /// Addresses inside one prefix.
    Prefix(IpPrefix),
    /// Union of several spaces.
    Union(Vec<IpSpace>),
    /// Reference to a named space; undefined names contain nothing.
    Named(String),
}

impl IpSpace {
    /// Creates the space of a single prefix.
    pub fn prefix(prefix: IpPrefix) -> Self {
        Self::Prefix(prefix)
    }

    /// Creates the space containing exactly `ip`.
    pub fn ip(ip: IpAddress) -> Self {
        Self::Prefix(IpPrefix::host(ip))
    }

    /// Returns true if `ip` is in this space.
    pub fn contains(&self, ip: &IpAddress, named: &IpSpacesByName) -> bool {
        let mut resolving = Vec::new();
        self.contains_inner(ip, named, &mut resolving)
    }

    fn contains_inner<'a>(
        &'a self,
        ip: &IpAddress,
        named: &'a IpSpacesByName,
        resolving: &mut Vec<&'a str>,
    ) -> bool {
        match self {
            Self::Universe => true,
            Self::Empty => false,
            Self::Prefix(prefix) => prefix.contains(ip),
            Self::Union(spaces) => spaces
                .iter()
                .any(|space| space.contains_inner(ip, named, resolving)),
            Self::Named(name) => {
                // Self-referencing definitions contain nothing on the cycle.
                if resolving.contains(&name.as_str()) {
                    return false;
                }
                let Some(space) = named.get(name) else {
                    return false;
                };
                resolving.push(name);
                let found = space.contains_inner(ip, named, resolving);
                resolving.pop();
                found
            }
        }
    }
}
