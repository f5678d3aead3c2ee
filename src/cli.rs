// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
//
// Every option can also come from an environment variable (the `env`
// attribute), which is how the service is configured when deployed.
//
// Rust concepts:
// - Structs: Custom data types that group related data
// - Enums: Types that can be one of several variants
// - Derive macros: Automatically generate code for our types
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::checker::DomainMatch;
use crate::config::{CheckerConfig, DEFAULT_USER_AGENT};
use crate::logging::LogFormat;

// This struct represents our entire CLI application
#[derive(Parser, Debug)]
#[command(
    name = "link-guardian",
    version,
    about = "Find the broken links on a web page",
    long_about = "link-guardian fetches a web page, checks every link on it and reports which \
                  ones work, which are broken and which could not be verified. \
                  Run it once from the terminal or as an HTTP service behind a web form."
)]
pub struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text, env = "LOG_FORMAT", global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service (POST /check-links)
    ///
    /// Example: link-guardian serve --listen 127.0.0.1:8080
    Serve(ServeArgs),

    /// Check the links on one page and print the results
    ///
    /// Example: link-guardian check https://example.com --json
    Check {
        /// Page URL to check (e.g., https://example.com)
        url: String,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        checker: CheckerArgs,
    },
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on (host:port)
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: String,

    /// Origin allowed to call the service from a browser (repeatable)
    #[arg(
        long = "allowed-origin",
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_values = ["http://localhost:5173", "https://linkcheckr.vercel.app"]
    )]
    pub allowed_origins: Vec<String>,

    #[command(flatten)]
    pub checker: CheckerArgs,
}

// Options shared by `serve` and `check`
#[derive(Args, Debug)]
pub struct CheckerArgs {
    /// Domain whose links are reported as unverifiable instead of checked (repeatable)
    #[arg(
        long = "restricted-domain",
        env = "RESTRICTED_DOMAINS",
        value_delimiter = ',',
        default_values = ["linkedin.com", "x.com", "twitter.com"]
    )]
    pub restricted_domains: Vec<String>,

    /// How hosts are matched against restricted domains
    #[arg(long, value_enum, env = "DOMAIN_MATCH", default_value_t = DomainMatch::Suffix)]
    pub domain_match: DomainMatch,

    /// Maximum number of links checked at the same time
    #[arg(long, env = "CHECK_CONCURRENCY", default_value_t = 10)]
    pub concurrency: usize,

    /// Seconds before a single link check gives up
    #[arg(long, env = "LINK_TIMEOUT_SECS", default_value_t = 10)]
    pub link_timeout_secs: u64,

    /// Seconds before the whole check gives up
    #[arg(long, env = "BATCH_TIMEOUT_SECS", default_value_t = 120)]
    pub batch_timeout_secs: u64,

    /// Redirects followed per link
    #[arg(long, env = "MAX_REDIRECTS", default_value_t = 5)]
    pub max_redirects: usize,

    /// On batch timeout, report unfinished links as broken instead of failing
    #[arg(long, env = "ALLOW_PARTIAL")]
    pub allow_partial: bool,

    /// User-Agent sent with every request
    #[arg(long, env = "USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

impl CheckerArgs {
    pub fn to_config(&self) -> CheckerConfig {
        CheckerConfig {
            restricted_domains: self.restricted_domains.clone(),
            domain_match: self.domain_match,
            concurrency: self.concurrency,
            link_timeout: Duration::from_secs(self.link_timeout_secs),
            batch_timeout: Duration::from_secs(self.batch_timeout_secs),
            max_redirects: self.max_redirects,
            allow_partial: self.allow_partial,
            user_agent: self.user_agent.clone(),
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[command(flatten)] do?
//    - It pulls the fields of another struct in as if they were written here
//    - Both subcommands get the same checker options without copy/paste
//
// 2. What is value_delimiter = ','?
//    - Lets one argument carry a list: --restricted-domain a.com,b.com
//    - Also splits the environment variable: RESTRICTED_DOMAINS=a.com,b.com
//
// 3. Why convert CheckerArgs into CheckerConfig?
//    - CheckerArgs is shaped for humans typing flags (seconds as numbers)
//    - CheckerConfig is shaped for the code using it (Duration)
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_check_defaults() {
        let cli = Cli::try_parse_from(["link-guardian", "check", "https://example.com"]).unwrap();
        let Commands::Check { url, json, checker } = cli.command else {
            panic!("expected check subcommand");
        };
        assert_eq!(url, "https://example.com");
        assert!(!json);

        let config = checker.to_config();
        assert_eq!(config.concurrency, 10);
        assert_eq!(config.link_timeout, Duration::from_secs(10));
        assert_eq!(config.batch_timeout, Duration::from_secs(120));
        assert_eq!(config.max_redirects, 5);
        assert!(!config.allow_partial);
        assert_eq!(config.domain_match, DomainMatch::Suffix);
        assert_eq!(
            config.restricted_domains,
            vec!["linkedin.com", "x.com", "twitter.com"]
        );
    }

    #[test]
    fn test_serve_options() {
        let cli = Cli::try_parse_from([
            "link-guardian",
            "serve",
            "--listen",
            "127.0.0.1:8080",
            "--allowed-origin",
            "https://a.example,https://b.example",
            "--restricted-domain",
            "facebook.com",
            "--domain-match",
            "contains",
            "--concurrency",
            "4",
            "--allow-partial",
        ])
        .unwrap();

        let Commands::Serve(args) = cli.command else {
            panic!("expected serve subcommand");
        };
        assert_eq!(args.listen, "127.0.0.1:8080");
        assert_eq!(args.allowed_origins, vec!["https://a.example", "https://b.example"]);

        let config = args.checker.to_config();
        assert_eq!(config.restricted_domains, vec!["facebook.com"]);
        assert_eq!(config.domain_match, DomainMatch::Contains);
        assert_eq!(config.concurrency, 4);
        assert!(config.allow_partial);
    }
}
