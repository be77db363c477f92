use clap::ArgMatches;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use sitegraph_core::audit::{AuditOptions, execute_audit};
use sitegraph_core::report::{
    Report, ReportFormat, generate_json_report, generate_text_report, save_report,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber;
use url::Url;

pub fn print_banner() {
    println!(
        "{} {}",
        "sitegraph".bright_cyan().bold(),
        env!("CARGO_PKG_VERSION").bright_white()
    );
    println!("{}", "link-graph crawler and integrity auditor".bright_blue());
    println!();
}

/// Build audit options from the parsed `audit` subcommand arguments.
pub fn audit_options_from_args(sub_matches: &ArgMatches) -> AuditOptions {
    let url = sub_matches.get_one::<Url>("url").unwrap();

    AuditOptions {
        base_url: url.to_string(),
        max_pages: *sub_matches.get_one::<usize>("max-pages").unwrap_or(&200),
        delay_ms: *sub_matches.get_one::<u64>("delay-ms").unwrap_or(&250),
        timeout_secs: *sub_matches.get_one::<u64>("timeout").unwrap_or(&10),
        use_sitemap: !sub_matches.get_flag("no-sitemap"),
        probe_concurrency: *sub_matches.get_one::<usize>("probes").unwrap_or(&8),
    }
}

/// Expand `~` in a user-supplied output path.
pub fn resolve_output_path(raw: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(&raw.display().to_string()).to_string();
    PathBuf::from(expanded)
}

pub fn render_report(report: &Report, format: &ReportFormat) -> String {
    match format {
        ReportFormat::Json => {
            generate_json_report(report).expect("report serialization cannot fail")
        }
        ReportFormat::Text => generate_text_report(report),
    }
}

/// Exit status for CI gating: 1 when the audit found broken links,
/// broken images or page errors, 0 otherwise.
pub fn exit_code(report: &Report) -> i32 {
    if report.has_defects() { 1 } else { 0 }
}

fn print_summary(report: &Report) {
    let count = |n: usize| {
        if n == 0 {
            n.to_string().green().bold()
        } else {
            n.to_string().yellow().bold()
        }
    };

    println!(
        "{} {} pages, {} links, {} external domains",
        "→".blue(),
        report.summary.total_pages.to_string().bright_white(),
        report.summary.total_links.to_string().bright_white(),
        report.summary.external_domains.to_string().bright_white()
    );
    println!("{} broken links:  {}", "→".blue(), count(report.summary.broken_links));
    println!("{} broken images: {}", "→".blue(), count(report.summary.broken_images));
    println!("{} page errors:   {}", "→".blue(), count(report.summary.errors));
    println!("{} redirects:     {}", "→".blue(), count(report.summary.redirects));
    println!("{} orphan pages:  {}", "→".blue(), count(report.summary.isolated_pages));
}

pub async fn handle_audit(sub_matches: &ArgMatches) {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let options = audit_options_from_args(sub_matches);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Auditing {}...", options.base_url));

    let spinner_clone = spinner.clone();
    let progress_callback = Arc::new(move |message: String| {
        spinner_clone.set_message(message);
    });

    let report = match execute_audit(options, Some(progress_callback)).await {
        Ok(report) => report,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("✗ Audit failed: {}", e);
            std::process::exit(2);
        }
    };
    spinner.finish_and_clear();

    println!("✓ Audit complete!\n");
    print_summary(&report);
    println!();

    let format = sub_matches
        .get_one::<String>("format")
        .and_then(|raw| ReportFormat::from_str(raw))
        .unwrap_or(ReportFormat::Text);
    let rendered = render_report(&report, &format);

    if let Some(output) = sub_matches.get_one::<PathBuf>("output") {
        let path = resolve_output_path(output);
        match save_report(&rendered, &path) {
            Ok(()) => println!(
                "{} Report saved to {}",
                "✓".green().bold(),
                path.display().to_string().bright_white()
            ),
            Err(e) => {
                eprintln!("✗ Failed to save report to {}: {}", path.display(), e);
                std::process::exit(2);
            }
        }
    } else {
        print!("{}", rendered);
    }

    std::process::exit(exit_code(&report));
}
