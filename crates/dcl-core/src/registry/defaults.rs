//! Built-in subordinate servers.
//!
//! All built-ins launch through `npx`, so they work without local paths.
//! Empty env values are filled from the ambient environment when the
//! registry is built.

use crate::credentials::RequiredCredentials;
use crate::domain::ServerDescriptor;

const GOOGLE_ANALYTICS_SSE_URL: &str =
    "https://mcp.pipedream.net/9148c057-4cf8-4b35-ac39-b596ce6f68bc/google_analytics";

/// Built-in server descriptors, in catalog order.
pub fn builtin_servers() -> Vec<ServerDescriptor> {
    vec![
        ServerDescriptor::new(
            "context7",
            "npx",
            "Context7 for checking current code documentation",
        )
        .with_args(["-y", "@upstash/context7-mcp"]),
        ServerDescriptor::new(
            "google-analytics",
            "npx",
            "Google Analytics reporting and metrics",
        )
        .with_args(["-y", "supergateway", "--sse", GOOGLE_ANALYTICS_SSE_URL]),
        ServerDescriptor::new(
            "actors-mcp-server",
            "npx",
            "Apify Actor platform: web scraping, automation, data extraction",
        )
        .with_args(["-y", "@apify/actors-mcp-server"])
        .with_env("APIFY_TOKEN", ""),
        ServerDescriptor::new(
            "github",
            "npx",
            "GitHub: repositories, issues, PRs, code search, CI/CD workflows, security",
        )
        .with_args(["-y", "@modelcontextprotocol/server-github"])
        .with_env("GITHUB_PERSONAL_ACCESS_TOKEN", ""),
        ServerDescriptor::new(
            "dataforseo",
            "npx",
            "DataForSEO: SERP data, keywords, backlinks, domain analytics, content analysis",
        )
        .with_args(["-y", "dataforseo-mcp-server", "local", "--debug"])
        .with_env("DATAFORSEO_USERNAME", "")
        .with_env("DATAFORSEO_PASSWORD", ""),
    ]
}

/// Credentials the built-in servers cannot work without.
pub fn builtin_required_credentials() -> RequiredCredentials {
    let mut required = RequiredCredentials::new();
    required.insert("actors-mcp-server", ["APIFY_TOKEN"]);
    required.insert("dataforseo", ["DATAFORSEO_USERNAME", "DATAFORSEO_PASSWORD"]);
    required.insert("github", ["GITHUB_PERSONAL_ACCESS_TOKEN"]);
    required
}
