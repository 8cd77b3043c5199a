//! Usage counter names and snapshots.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// A named, monotonically increasing usage counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Counter {
    /// Bytes written by publishes plus bytes served.
    Bandwidth,
    /// Successful publishes.
    Deployments,
    /// Asset responses served from a deployment.
    Requests,
}

impl Counter {
    /// Every counter, in display order.
    pub const ALL: [Counter; 3] = [Counter::Deployments, Counter::Requests, Counter::Bandwidth];

    /// Storage name of the counter.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bandwidth => "bandwidth",
            Self::Deployments => "deployments",
            Self::Requests => "requests",
        }
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Counter {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "bandwidth" => Ok(Self::Bandwidth),
            "deployments" => Ok(Self::Deployments),
            "requests" => Ok(Self::Requests),
            other => Err(crate::Error::Config(format!("unknown counter: {other}"))),
        }
    }
}

/// Point-in-time values of all counters. Missing counters read as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub deployments: u64,
    pub requests: u64,
    pub bandwidth: u64,
}

impl CounterSnapshot {
    /// Build a snapshot from raw `name → value` pairs, ignoring unknown names.
    pub fn from_map(values: &HashMap<String, u64>) -> Self {
        let read = |counter: Counter| values.get(counter.as_str()).copied().unwrap_or(0);
        Self {
            deployments: read(Counter::Deployments),
            requests: read(Counter::Requests),
            bandwidth: read(Counter::Bandwidth),
        }
    }

    /// Value of a single counter.
    pub fn get(&self, counter: Counter) -> u64 {
        match counter {
            Counter::Bandwidth => self.bandwidth,
            Counter::Deployments => self.deployments,
            Counter::Requests => self.requests,
        }
    }
}
