//! Cluster topology: the `juju status` snapshot and the unit sequence derived from it.
//!
//! Pure functions only; no I/O.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::error::TopologyError;

// ── Unit names ────────────────────────────────────────────────────────────────

/// A unit identifier of the form `<application>/<ordinal>`.
///
/// Ordered naturally: `etcd/2` sorts before `etcd/10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitName(String);

impl UnitName {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Application part of the name (the whole name when there is no `/`).
    #[must_use]
    pub fn application(&self) -> &str {
        self.0.split_once('/').map_or(self.0.as_str(), |(app, _)| app)
    }

    /// Ordinal part of the name, if present.
    #[must_use]
    pub fn ordinal(&self) -> Option<&str> {
        self.0
            .split_once('/')
            .map(|(_, n)| n)
            .filter(|n| !n.is_empty())
    }

    /// Filesystem-safe form, e.g. `etcd/0` → `etcd-0`.
    #[must_use]
    pub fn slug(&self) -> String {
        self.0.replace('/', "-")
    }

    fn numeric_ordinal(&self) -> Option<u64> {
        self.ordinal()?.parse().ok()
    }
}

impl Ord for UnitName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.application()
            .cmp(other.application())
            .then_with(|| match (self.numeric_ordinal(), other.numeric_ordinal()) {
                (Some(a), Some(b)) => a.cmp(&b),
                _ => Ordering::Equal,
            })
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for UnitName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Status snapshot ───────────────────────────────────────────────────────────

/// Immutable snapshot of `juju status --format json`.
///
/// Only the fields needed to walk the unit tree are kept; everything else in
/// the payload is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub applications: BTreeMap<String, Application>,
}

/// One deployed application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Application {
    #[serde(default, deserialize_with = "null_as_default")]
    pub units: BTreeMap<UnitName, Unit>,
}

/// One unit; subordinates are units of the same shape nested under it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Unit {
    #[serde(default, deserialize_with = "null_as_default")]
    pub subordinates: BTreeMap<UnitName, Unit>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A unit to act on, with its principal when it is a subordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUnit {
    pub name: UnitName,
    pub principal: Option<UnitName>,
}

impl ClusterStatus {
    /// Parse the JSON output of `juju status`.
    ///
    /// # Errors
    ///
    /// Returns `TopologyError::Parse` if the payload is not a status document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, TopologyError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Units of the named applications, in the given application order.
    ///
    /// Each unit is followed immediately by its subordinates (recursively).
    /// Applications absent from the snapshot are skipped; no unit is
    /// emitted twice.
    #[must_use]
    pub fn target_units<S: AsRef<str>>(&self, applications: &[S]) -> Vec<TargetUnit> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for name in applications {
            if let Some(app) = self.applications.get(name.as_ref()) {
                for (unit_name, unit) in &app.units {
                    push_unit(&mut out, &mut seen, unit_name, unit, None);
                }
            }
        }
        out
    }

    /// Every unit of every application in the snapshot.
    #[must_use]
    pub fn all_units(&self) -> Vec<TargetUnit> {
        let names: Vec<&str> = self.applications.keys().map(String::as_str).collect();
        self.target_units(&names)
    }
}

fn push_unit(
    out: &mut Vec<TargetUnit>,
    seen: &mut HashSet<UnitName>,
    name: &UnitName,
    unit: &Unit,
    principal: Option<&UnitName>,
) {
    if !seen.insert(name.clone()) {
        return;
    }
    out.push(TargetUnit {
        name: name.clone(),
        principal: principal.cloned(),
    });
    for (sub_name, sub) in &unit.subordinates {
        push_unit(out, seen, sub_name, sub, Some(name));
    }
}
