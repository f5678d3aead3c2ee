// src/main.rs
// =============================================================================
// This is the entry point of our application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Dispatch to the appropriate subcommand handler
//    - serve: run the HTTP service until Ctrl+C
//    - check: check one page and print the results
// 4. Exit with proper code (0 = success, 1 = broken links, 2 = error)
//
// Rust concepts used:
// - async/await: Because we need to make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// - match: Pattern matching to handle different subcommands
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - link checking logic
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - checker settings
mod logging; // src/logging.rs - tracing setup
mod server; // src/server/ - the HTTP service

use clap::Parser;
use cli::{CheckerArgs, Cli, Commands};

use anyhow::{Context, Result};

use checker::{BatchChecker, CheckResult, LinkStatus, Report, UnverifiableReason};
use server::dto::CheckLinksResponse;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = no broken links (or the server shut down cleanly)
//   Ok(1) = broken links found
//   Ok(2) = the check itself failed
//   Err = unexpected error
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    logging::init_logging(cli.log_format)?;

    match cli.command {
        Commands::Serve(args) => {
            server::run(args).await?;
            Ok(0)
        }
        Commands::Check { url, json, checker } => handle_check(&url, json, &checker).await,
    }
}

// Handles the 'check' subcommand
// Parameters:
//   url: page to check (e.g., "https://example.com")
//   json: whether to output the same JSON the HTTP service returns
//   args: checker options
async fn handle_check(url: &str, json: bool, args: &CheckerArgs) -> Result<i32> {
    let config = args.to_config();
    config.validate().context("Invalid checker configuration")?;

    let checker = BatchChecker::new(config).context("Failed to create link checker")?;

    if !json {
        println!("🔍 Checking links on: {}", url);
    }

    let report = match checker.check(url).await {
        Ok(report) => report,
        Err(e) => {
            // A failed check is an expected outcome, not a crash
            if json {
                println!("{}", serde_json::json!({ "error": e.to_string() }));
            } else {
                eprintln!("❌ {}", e);
            }
            return Ok(2);
        }
    };

    print_results(&report, json)?;

    if report.summary.broken > 0 {
        Ok(1) // Exit code 1 = broken links found
    } else {
        Ok(0) // Exit code 0 = all good
    }
}

// Prints the report either as a table or JSON
fn print_results(report: &Report, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(&CheckLinksResponse::from(report))?;
        println!("{}", json_output);
    } else {
        print_table(report);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal
fn print_table(report: &Report) {
    if let Some(reason) = &report.parse_error {
        println!("⚠️  Could not read the page: {}", reason);
    }

    if report.total_links == 0 {
        println!("✅ No links found to check");
        return;
    }

    println!();
    println!("{:<60} {:<15} {:<30}", "URL", "STATUS", "MESSAGE");
    println!("{}", "=".repeat(105));

    // Working links first, then broken ones, each in page order
    for result in report.working_links.iter().chain(&report.broken_links) {
        print_row(result);
    }

    println!();

    let unverifiable = report
        .broken_links
        .iter()
        .filter(|r| matches!(r.status, LinkStatus::Unverifiable(_)))
        .count();

    println!("📊 Summary for {}:", report.site_url);
    println!("   ✅ Working: {}", report.summary.working);
    println!("   ❌ Broken: {}", report.summary.broken);
    if unverifiable > 0 {
        println!("      (🚫 {} of them could not be verified)", unverifiable);
    }
    println!("   📋 Total: {}", report.summary.total);
}

fn print_row(result: &CheckResult) {
    let url = &result.link.url;

    // Truncate URL if too long for display
    let url_display = if url.chars().count() > 57 {
        format!("{}...", url.chars().take(57).collect::<String>())
    } else {
        url.clone()
    };

    println!(
        "{:<60} {:<15} {:<30}",
        url_display,
        format_status(&result.status),
        result.message
    );
}

fn format_status(status: &LinkStatus) -> String {
    match status {
        LinkStatus::Working(code) => format!("✅ {}", code),
        LinkStatus::Broken(Some(code)) => format!("❌ {}", code),
        LinkStatus::Broken(None) => "❌ UNKNOWN".to_string(),
        LinkStatus::Unverifiable(UnverifiableReason::DomainRestricted) => "🚫 RESTRICTED".to_string(),
    }
}
