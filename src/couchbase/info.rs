// src/couchbase/info.rs
use serde::Deserialize;
use std::fmt;

/// A release number, `major.minor.patch`, without build or edition suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    /// Reads the leading `X[.Y[.Z]]` of a node version such as
    /// `6.5.0-4960-enterprise`. Missing parts are 0. `None` when the string
    /// does not start with a number.
    pub fn parse(raw: &str) -> Option<Version> {
        let mut parts = [0u32; 3];
        let mut rest = raw.trim();

        for (i, part) in parts.iter_mut().enumerate() {
            if i > 0 {
                match rest.strip_prefix('.') {
                    Some(r) if r.starts_with(|c: char| c.is_ascii_digit()) => rest = r,
                    _ => break,
                }
            }

            let end = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            if end == 0 {
                return None;
            }
            *part = rest[..end].parse().ok()?;
            rest = &rest[end..];
        }

        Some(Version {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Snapshot of cluster-wide metadata, one version string per distinct release
/// running in the cluster.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterInfo {
    versions: Vec<String>,
}

impl ClusterInfo {
    pub fn new<I, S>(versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            versions: versions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn all_versions(&self) -> &[String] {
        &self.versions
    }

    pub(crate) fn from_pool(pool: PoolPayload) -> Self {
        let mut seen: Vec<Version> = Vec::with_capacity(pool.nodes.len());
        for raw in pool.nodes.iter().filter_map(|n| n.version.as_deref()) {
            match Version::parse(raw) {
                Some(version) if !seen.contains(&version) => seen.push(version),
                Some(_) => {}
                None => tracing::debug!("Ignoring unparseable node version: {}", raw),
            }
        }
        Self {
            versions: seen.iter().map(Version::to_string).collect(),
        }
    }
}

/// Snapshot of one bucket: the addresses of the nodes serving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketInfo {
    name: String,
    nodes: Vec<String>,
}

impl BucketInfo {
    pub fn new<I, S>(name: impl Into<String>, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            nodes: nodes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_list(&self) -> &[String] {
        &self.nodes
    }

    pub(crate) fn from_payload(payload: BucketPayload) -> Self {
        let nodes = payload
            .nodes
            .iter()
            .filter_map(|n| n.hostname.as_deref())
            .map(|h| strip_port(h).to_string())
            .collect();
        Self {
            name: payload.name,
            nodes,
        }
    }
}

// `GET /pools/default`
#[derive(Debug, Deserialize)]
pub(crate) struct PoolPayload {
    pub nodes: Vec<NodePayload>,
}

// `GET /pools/default/buckets/{bucket}`
#[derive(Debug, Deserialize)]
pub(crate) struct BucketPayload {
    pub name: String,
    pub nodes: Vec<NodePayload>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NodePayload {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
}

/// `10.0.0.1:8091` -> `10.0.0.1`, `[::1]:8091` -> `[::1]`. Bare IPv6 is left alone.
fn strip_port(hostname: &str) -> &str {
    if let Some(rest) = hostname.strip_prefix('[') {
        return match rest.find(']') {
            Some(end) => &hostname[..end + 2],
            None => hostname,
        };
    }

    match hostname.rsplit_once(':') {
        Some((host, port))
            if !host.contains(':') && !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) =>
        {
            host
        }
        _ => hostname,
    }
}
