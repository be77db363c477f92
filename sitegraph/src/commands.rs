use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("sitegraph")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("sitegraph")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("audit")
                .about(
                    "Crawl a site breadth-first and audit its link graph for broken links, \
                broken images, redirects and orphan pages.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("The base URL of the site to audit")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-m --"max-pages" <NUM>)
                        .required(false)
                        .help("Stop fetching after this many pages")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("200"),
                )
                .arg(
                    arg!(-d --"delay-ms" <MILLIS>)
                        .required(false)
                        .help("Politeness delay between page fetches")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("250"),
                )
                .arg(
                    arg!(-T --"timeout" <SECS>)
                        .required(false)
                        .help("Per-request timeout for fetches and probes")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"no-sitemap")
                        .required(false)
                        .help("Skip sitemap seeding and start from the homepage")
                        .action(clap::ArgAction::SetTrue),
                )
                .arg(
                    arg!(-p --"probes" <NUM>)
                        .required(false)
                        .help("Concurrent existence probes for uncrawled link targets")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("8"),
                )
                .arg(
                    arg!(-o --"output" <PATH>)
                        .required(false)
                        .help("Save the report to a file (default: print to screen)")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-f --"format" <FORMAT>)
                        .required(false)
                        .help("Report format: text, json")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                ),
        )
}
