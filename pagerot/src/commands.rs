use crate::CLAP_STYLING;
use clap::{arg, command};
use url::Url;

pub(crate) fn command_argument_builder() -> clap::Command {
    clap::Command::new("pagerot")
        .version(env!("CARGO_PKG_VERSION"))
        .bin_name("pagerot")
        .styles(CLAP_STYLING)
        .arg(arg!(-q --"quiet" "Suppress banner and non-essential output").required(false))
        .subcommand_required(false)
        .subcommand(
            command!("scan")
                .about(
                    "Discover article URLs, extract their metadata and reconcile the results \
                into the dataset.",
                )
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(false)
                        .help("Base URL of the site to scan")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-s --"strategy" <STRATEGY>)
                        .required(false)
                        .help(
                            "URL discovery strategy: sitemap, crawl, hybrid, url-file or \
                        existing (prompted when omitted)",
                        ),
                )
                .arg(
                    arg!(-d --"dataset" <PATH>)
                        .required(false)
                        .help("Path of the dataset CSV to read and write")
                        .value_parser(clap::value_parser!(String))
                        .default_value("pages.csv"),
                )
                .arg(
                    arg!(-m --"merge" <STRATEGY>)
                        .required(false)
                        .help(
                            "Merge strategy for existing data: skip, update or append \
                        (prompted when omitted and existing data is found)",
                        ),
                )
                .arg(
                    arg!(-U --"url-file" <PATH>)
                        .required(false)
                        .help("Newline-delimited URL list for the url-file strategy")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(-e --"external" <PATH>)
                        .required(false)
                        .help("External CSV to outer-join on url after the scan")
                        .value_parser(clap::value_parser!(std::path::PathBuf)),
                )
                .arg(
                    arg!(--"joined-output" <PATH>)
                        .required(false)
                        .help("Where to write the joined table when --external is given")
                        .value_parser(clap::value_parser!(String))
                        .default_value("pages_joined.csv"),
                )
                .arg(
                    arg!(--"max-pages" <NUM>)
                        .required(false)
                        .help("Page budget for crawl-based discovery")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("100"),
                )
                .arg(
                    arg!(--"delay-ms" <MILLIS>)
                        .required(false)
                        .help("Delay between requests in milliseconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("500"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds for discovery")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                )
                .arg(
                    arg!(--"extract-timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds for metadata extraction")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("15"),
                ),
        )
        .subcommand(
            command!("discover")
                .about("Discover article URLs and print them without scraping")
                .arg(
                    arg!(-u --"url" <URL>)
                        .required(true)
                        .help("Base URL of the site")
                        .value_parser(clap::value_parser!(Url)),
                )
                .arg(
                    arg!(-s --"strategy" <STRATEGY>)
                        .required(false)
                        .help("URL discovery strategy: sitemap, crawl or hybrid")
                        .value_parser(["sitemap", "crawl", "hybrid"])
                        .default_value("hybrid"),
                )
                .arg(
                    arg!(--"max-pages" <NUM>)
                        .required(false)
                        .help("Page budget for crawl-based discovery")
                        .value_parser(clap::value_parser!(usize))
                        .default_value("100"),
                )
                .arg(
                    arg!(--"delay-ms" <MILLIS>)
                        .required(false)
                        .help("Delay between requests in milliseconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("500"),
                )
                .arg(
                    arg!(--"timeout" <SECONDS>)
                        .required(false)
                        .help("Request timeout in seconds")
                        .value_parser(clap::value_parser!(u64))
                        .default_value("10"),
                ),
        )
        .subcommand(
            command!("report")
                .about("Build freshness report tables from the dataset")
                .arg(
                    arg!(-d --"dataset" <PATH>)
                        .required(false)
                        .help("Path of the dataset CSV")
                        .value_parser(clap::value_parser!(String))
                        .default_value("pages.csv"),
                )
                .arg(
                    arg!(-p --"previous" <PATH>)
                        .required(false)
                        .help("Previous dataset snapshot for change detection")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(-o --"output-dir" <PATH>)
                        .required(false)
                        .help("Directory to write the report CSVs into")
                        .value_parser(clap::value_parser!(String))
                        .default_value("."),
                ),
        )
}
