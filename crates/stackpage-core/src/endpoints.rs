//! Regional endpoint resolution.
//!
//! A stack lives in one hosting region, and every API (content delivery,
//! REST preview, GraphQL delivery, GraphQL preview, the web application)
//! has a distinct host per region. [`resolve_endpoints`] maps a [`Region`]
//! to those hosts, letting per-host overrides win.
//!
//! Hosts are bare names without a scheme; callers add `https://`.
//!
//! # Example
//!
//! ```
//! use stackpage_core::endpoints::{HostOverrides, Region, resolve_endpoints};
//!
//! let endpoints = resolve_endpoints(&Region::from_token("eu"), true, &HostOverrides::default());
//! assert_eq!(endpoints.graphql_host().unwrap(), "eu-graphql.contentstack.com");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ============================================================================
// Region
// ============================================================================

/// Hosting region of a stack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Region {
    /// North America (AWS).
    Na,
    /// Europe (AWS).
    #[default]
    Eu,
    /// Australia (AWS).
    Au,
    /// North America (Azure).
    AzureNa,
    /// Europe (Azure).
    AzureEu,
    /// North America (GCP).
    GcpNa,
    /// Europe (GCP).
    GcpEu,
    /// Any token the built-in table does not know. Hosts must come from overrides.
    Custom(String),
}

impl Region {
    /// Token used when no region is configured.
    pub const DEFAULT_TOKEN: &'static str = "EU";

    /// Parse a region token.
    ///
    /// Matching is case-insensitive and treats `_` like `-`. An empty token
    /// selects [`Region::DEFAULT_TOKEN`]; unknown tokens are kept verbatim
    /// as [`Region::Custom`].
    pub fn from_token(token: &str) -> Self {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Self::Eu;
        }

        match trimmed.to_ascii_lowercase().replace('_', "-").as_str() {
            "us" | "na" | "aws-na" | "aws-us" => Self::Na,
            "eu" | "aws-eu" => Self::Eu,
            "au" | "aws-au" => Self::Au,
            "azure-na" | "azure-us" => Self::AzureNa,
            "azure-eu" => Self::AzureEu,
            "gcp-na" | "gcp-us" => Self::GcpNa,
            "gcp-eu" => Self::GcpEu,
            _ => Self::Custom(trimmed.to_string()),
        }
    }

    /// Canonical token for this region.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Na => "NA",
            Self::Eu => "EU",
            Self::Au => "AU",
            Self::AzureNa => "AZURE-NA",
            Self::AzureEu => "AZURE-EU",
            Self::GcpNa => "GCP-NA",
            Self::GcpEu => "GCP-EU",
            Self::Custom(token) => token,
        }
    }

    /// Whether the built-in table has hosts for this region.
    pub fn is_managed(&self) -> bool {
        self.managed_hosts().is_some()
    }

    fn managed_hosts(&self) -> Option<&'static RegionHosts> {
        let hosts = match self {
            Self::Na => &NA,
            Self::Eu => &EU,
            Self::Au => &AU,
            Self::AzureNa => &AZURE_NA,
            Self::AzureEu => &AZURE_EU,
            Self::GcpNa => &GCP_NA,
            Self::GcpEu => &GCP_EU,
            Self::Custom(_) => return None,
        };
        Some(hosts)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_token(s))
    }
}

impl From<String> for Region {
    fn from(token: String) -> Self {
        Self::from_token(&token)
    }
}

impl From<Region> for String {
    fn from(region: Region) -> Self {
        region.as_str().to_string()
    }
}

// ============================================================================
// Managed endpoint table
// ============================================================================

struct RegionHosts {
    content_delivery: &'static str,
    preview: &'static str,
    graphql: &'static str,
    graphql_preview: &'static str,
    application: &'static str,
}

const NA: RegionHosts = RegionHosts {
    content_delivery: "cdn.contentstack.io",
    preview: "rest-preview.contentstack.com",
    graphql: "graphql.contentstack.com",
    graphql_preview: "graphql-preview.contentstack.com",
    application: "app.contentstack.com",
};

const EU: RegionHosts = RegionHosts {
    content_delivery: "eu-cdn.contentstack.com",
    preview: "eu-rest-preview.contentstack.com",
    graphql: "eu-graphql.contentstack.com",
    graphql_preview: "eu-graphql-preview.contentstack.com",
    application: "eu-app.contentstack.com",
};

const AU: RegionHosts = RegionHosts {
    content_delivery: "au-cdn.contentstack.com",
    preview: "au-rest-preview.contentstack.com",
    graphql: "au-graphql.contentstack.com",
    graphql_preview: "au-graphql-preview.contentstack.com",
    application: "au-app.contentstack.com",
};

const AZURE_NA: RegionHosts = RegionHosts {
    content_delivery: "azure-na-cdn.contentstack.com",
    preview: "azure-na-rest-preview.contentstack.com",
    graphql: "azure-na-graphql.contentstack.com",
    graphql_preview: "azure-na-graphql-preview.contentstack.com",
    application: "azure-na-app.contentstack.com",
};

const AZURE_EU: RegionHosts = RegionHosts {
    content_delivery: "azure-eu-cdn.contentstack.com",
    preview: "azure-eu-rest-preview.contentstack.com",
    graphql: "azure-eu-graphql.contentstack.com",
    graphql_preview: "azure-eu-graphql-preview.contentstack.com",
    application: "azure-eu-app.contentstack.com",
};

const GCP_NA: RegionHosts = RegionHosts {
    content_delivery: "gcp-na-cdn.contentstack.com",
    preview: "gcp-na-rest-preview.contentstack.com",
    graphql: "gcp-na-graphql.contentstack.com",
    graphql_preview: "gcp-na-graphql-preview.contentstack.com",
    application: "gcp-na-app.contentstack.com",
};

const GCP_EU: RegionHosts = RegionHosts {
    content_delivery: "gcp-eu-cdn.contentstack.com",
    preview: "gcp-eu-rest-preview.contentstack.com",
    graphql: "gcp-eu-graphql.contentstack.com",
    graphql_preview: "gcp-eu-graphql-preview.contentstack.com",
    application: "gcp-eu-app.contentstack.com",
};

// ============================================================================
// Overrides and resolved endpoints
// ============================================================================

/// Caller-supplied hosts that take precedence over the regional table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostOverrides {
    /// Content delivery (CDN) host.
    pub content_delivery: Option<String>,
    /// REST preview host.
    pub preview: Option<String>,
    /// GraphQL delivery host.
    pub graphql: Option<String>,
    /// GraphQL preview host.
    pub graphql_preview: Option<String>,
    /// Web application host, used by the live preview bridge.
    pub application: Option<String>,
}

/// The set of hosts used to talk to one stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// Region the hosts were resolved for.
    pub region: Region,
    /// Content delivery (CDN) host.
    pub content_delivery: Option<String>,
    /// REST preview host.
    pub preview: Option<String>,
    /// GraphQL delivery host.
    pub graphql: Option<String>,
    /// GraphQL preview host.
    pub graphql_preview: Option<String>,
    /// Web application host.
    pub application: Option<String>,
}

impl Endpoints {
    /// Content delivery host, or a configuration error if none is known.
    pub fn content_delivery_host(&self) -> Result<&str> {
        require(&self.content_delivery, "content delivery", &self.region)
    }

    /// REST preview host.
    pub fn preview_host(&self) -> Result<&str> {
        require(&self.preview, "preview", &self.region)
    }

    /// GraphQL delivery host.
    pub fn graphql_host(&self) -> Result<&str> {
        require(&self.graphql, "GraphQL delivery", &self.region)
    }

    /// GraphQL preview host.
    pub fn graphql_preview_host(&self) -> Result<&str> {
        require(&self.graphql_preview, "GraphQL preview", &self.region)
    }

    /// Application host.
    pub fn application_host(&self) -> Result<&str> {
        require(&self.application, "application", &self.region)
    }
}

fn require<'a>(host: &'a Option<String>, name: &str, region: &Region) -> Result<&'a str> {
    host.as_deref().ok_or_else(|| {
        Error::config(format!(
            "no {name} host for region '{region}'; set an override for custom regions"
        ))
    })
}

/// Resolve the endpoints of a stack.
///
/// With `use_managed_table` set and a known region, hosts come from the
/// built-in regional table. Each non-empty override replaces the matching
/// host. Unknown regions (or a disabled table) rely on overrides alone, and
/// hosts with no source stay `None`.
///
/// This is a pure function: no I/O, no environment access.
pub fn resolve_endpoints(
    region: &Region,
    use_managed_table: bool,
    overrides: &HostOverrides,
) -> Endpoints {
    let table = if use_managed_table {
        region.managed_hosts()
    } else {
        None
    };

    let pick = |over: &Option<String>, managed: Option<&'static str>| -> Option<String> {
        non_empty(over).or_else(|| managed.map(str::to_string))
    };

    Endpoints {
        region: region.clone(),
        content_delivery: pick(&overrides.content_delivery, table.map(|t| t.content_delivery)),
        preview: pick(&overrides.preview, table.map(|t| t.preview)),
        graphql: pick(&overrides.graphql, table.map(|t| t.graphql)),
        graphql_preview: pick(&overrides.graphql_preview, table.map(|t| t.graphql_preview)),
        application: pick(&overrides.application, table.map(|t| t.application)),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ============================================================================
// Tests
// ============================================================================
