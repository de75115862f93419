//! Router notification classification.
//!
//! # Responsibilities
//! - Recognize the two notice shapes the router emits
//! - Extract the target URL they name
//! - Map a target URL to a role (primary/spare) by substring markers
//!
//! # Design Decisions
//! - Markers are matched anywhere in the line so log prefixes are tolerated
//! - Unrecognized text is a value, not an error
//! - Role matching is case-insensitive; primary markers are checked first

use serde::Serialize;
use std::fmt;

use crate::config::TargetConfig;

const ROUTING_MARKER: &str = "Proxying request:";
const FAILOVER_MARKER: &str = "Switching active target to:";

/// A classified router notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// `Proxying request: <path> -> <url>`: one request was routed to `target`.
    Routing { path: String, target: String },
    /// `Switching active target to: <url>`: durable routing change.
    Failover { target: String },
    /// Anything else.
    Unrecognized,
}

impl Notice {
    pub fn parse(raw: &str) -> Self {
        if let Some(at) = raw.find(FAILOVER_MARKER) {
            let rest = &raw[at + FAILOVER_MARKER.len()..];
            return match first_token(rest) {
                Some(target) => Notice::Failover { target },
                None => Notice::Unrecognized,
            };
        }

        if let Some(at) = raw.find(ROUTING_MARKER) {
            let rest = &raw[at + ROUTING_MARKER.len()..];
            if let Some((path, target)) = rest.split_once("->") {
                if let Some(target) = first_token(target) {
                    return Notice::Routing {
                        path: path.trim().to_string(),
                        target,
                    };
                }
            }
        }

        Notice::Unrecognized
    }

    /// The target URL named by the notice, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Notice::Routing { target, .. } | Notice::Failover { target } => Some(target),
            Notice::Unrecognized => None,
        }
    }
}

fn first_token(s: &str) -> Option<String> {
    s.split_whitespace().next().map(str::to_string)
}

/// Which backend a target URL denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetRole {
    Primary,
    Spare,
    Unknown,
}

impl TargetRole {
    /// The other backend of the pair.
    pub fn counterpart(self) -> Option<TargetRole> {
        match self {
            TargetRole::Primary => Some(TargetRole::Spare),
            TargetRole::Spare => Some(TargetRole::Primary),
            TargetRole::Unknown => None,
        }
    }
}

impl fmt::Display for TargetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TargetRole::Primary => "primary",
            TargetRole::Spare => "spare",
            TargetRole::Unknown => "unknown",
        })
    }
}

/// The target currently receiving routed traffic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveTarget {
    pub url: String,
    pub role: TargetRole,
}

/// Derives a role from a target URL.
#[derive(Debug, Clone)]
pub struct TargetClassifier {
    primary: Vec<String>,
    spare: Vec<String>,
}

impl TargetClassifier {
    pub fn new(config: &TargetConfig) -> Self {
        let lower = |v: &[String]| v.iter().map(|m| m.to_lowercase()).collect();
        Self {
            primary: lower(&config.primary_markers),
            spare: lower(&config.spare_markers),
        }
    }

    pub fn role_of(&self, url: &str) -> TargetRole {
        let url = url.to_lowercase();
        if self.primary.iter().any(|m| url.contains(m.as_str())) {
            TargetRole::Primary
        } else if self.spare.iter().any(|m| url.contains(m.as_str())) {
            TargetRole::Spare
        } else {
            TargetRole::Unknown
        }
    }

    pub fn identify(&self, url: &str) -> ActiveTarget {
        ActiveTarget {
            url: url.to_string(),
            role: self.role_of(url),
        }
    }
}

impl Default for TargetClassifier {
    fn default() -> Self {
        Self::new(&TargetConfig::default())
    }
}
