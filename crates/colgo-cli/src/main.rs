use std::process;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use colgo::registry;
use colgo::types::{Meeting, Status};
use colgo::utils::{MeetingFilter, MeetingStats};
use colgo::{Spider, WebScraper};
use log::LevelFilter;

#[derive(Parser)]
#[command(name = "colgo")]
#[command(about = "Public meeting scrapers for the Columbia River Gorge", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// List the registered spiders with their agency and source platform
    List {
        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
    /// Crawl one or more agencies and print their meetings
    Crawl {
        #[arg(help = "Names of the spiders to run, as shown by `colgo list`")]
        spiders: Vec<String>,

        #[arg(long, conflicts_with = "spiders", help = "Run every registered spider")]
        all: bool,

        #[arg(
            long,
            help = "Maximum number of meetings to return",
            value_parser = clap::value_parser!(u16).range(1..)
        )]
        limit: Option<u16>,

        #[arg(
            long,
            help = "Number of meetings to skip from the beginning",
            value_parser = clap::value_parser!(u16).range(1..)
        )]
        offset: Option<u16>,

        #[arg(
            long,
            value_name = "YYYY-MM-DD",
            help = "Only meetings on or after this date",
            value_parser = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string()),
        )]
        start_date: Option<NaiveDate>,

        #[arg(
            long,
            value_name = "YYYY-MM-DD",
            help = "Only meetings on or before this date",
            value_parser = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string()),
        )]
        end_date: Option<NaiveDate>,

        #[arg(long, value_parser = parse_status, help = "Filter by status (tentative, passed, cancelled)")]
        status: Option<Status>,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
    /// Print the JSON schema of the meeting records
    Schema,
}

fn parse_status(s: &str) -> Result<Status, String> {
    Status::from_str(s).map_err(|e| e.to_string())
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

#[derive(serde::Serialize)]
struct SpiderInfo<'a> {
    name: &'a str,
    agency: &'a str,
    family: &'a str,
}

fn select_spiders(names: &[String], all: bool) -> Vec<Box<dyn Spider>> {
    let registered = registry::spiders().unwrap_or_else(|e| {
        log::error!("Invalid spider configuration: {}", e);
        process::exit(1);
    });
    if all {
        return registered;
    }
    if names.is_empty() {
        log::error!("Name at least one spider or pass --all");
        process::exit(1);
    }

    let mut selected = Vec::new();
    let mut registered: Vec<Option<Box<dyn Spider>>> = registered.into_iter().map(Some).collect();
    for name in names {
        let found = registered
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|s| s.name() == name))
            .and_then(Option::take);
        match found {
            Some(spider) => selected.push(spider),
            None => {
                log::error!("Unknown spider '{}'; run `colgo list` to see the options", name);
                process::exit(1);
            }
        }
    }
    selected
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    match cli.command {
        Commands::List { format } => {
            let spiders = registry::spiders().unwrap_or_else(|e| {
                log::error!("Invalid spider configuration: {}", e);
                process::exit(1);
            });
            match format {
                OutputFormat::Json => {
                    let infos: Vec<SpiderInfo> = spiders
                        .iter()
                        .map(|s| SpiderInfo {
                            name: s.name(),
                            agency: s.agency(),
                            family: s.family(),
                        })
                        .collect();
                    serialize_json(&infos);
                }
                OutputFormat::Text => {
                    for spider in &spiders {
                        println!(
                            "{:<42} {:<18} {}",
                            spider.name(),
                            spider.family(),
                            spider.agency()
                        );
                    }
                }
            }
        }

        Commands::Crawl {
            spiders,
            all,
            limit,
            offset,
            start_date,
            end_date,
            status,
            format,
        } => {
            let filter = MeetingFilter {
                start_date,
                end_date,
                status,
                limit: limit.map(usize::from),
                offset: offset.map(usize::from),
            };
            let filter = filter.validate().unwrap_or_else(|e| {
                log::error!("Invalid args: {e}");
                process::exit(1);
            });

            let scraper = WebScraper::new().unwrap_or_else(|e| {
                log::error!("Error creating scraper: {}", e);
                process::exit(1);
            });

            let mut meetings: Vec<Meeting> = Vec::new();
            for spider in select_spiders(&spiders, all) {
                log::info!("Crawling {} ({})...", spider.name(), spider.agency());
                meetings.extend(scraper.crawl(spider.as_ref()).await);
            }

            let meetings = filter.apply(meetings);

            match format {
                OutputFormat::Json => serialize_json(&meetings),
                OutputFormat::Text => {
                    if meetings.is_empty() {
                        println!("No meetings to display.");
                    } else {
                        for (i, meeting) in meetings.iter().enumerate() {
                            println!("{:>3}. {}", i + 1, meeting);
                        }
                        print!("{}", MeetingStats::from_meetings(&meetings));
                    }
                }
            }
        }

        Commands::Schema => serialize_json(&schemars::schema_for!(Vec<Meeting>)),
    }
}
