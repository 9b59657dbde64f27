use crate::{
    client,
    config::{DiningLocation, MenuConfig, RowPolicy, ScheduleConfig},
};
use anyhow::{Error, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::log::LevelFilter;
use clap_verbosity_flag::{ErrorLevel, Verbosity};
use std::{io, time::Duration};
use tracing_subscriber::filter::LevelFilter as TFilter;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

#[derive(Debug, Clone, Default, ValueEnum)]
pub enum LogFormat {
    Normal,
    Compact,
    Pretty,
    #[default]
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None, propagate_version = true)]
pub struct Cli {
    /// Log level verbosity
    #[command(flatten)]
    pub verbosity: Verbosity<ErrorLevel>,

    /// Which log formatter to use
    // env will pick up the value if the field name is given as the key in uppercase
    #[arg(short = 'f', long, env, default_value_t, value_enum, global = true)]
    pub log_format: LogFormat,

    #[command(flatten)]
    pub http: HttpArgs,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Args)]
pub struct HttpArgs {
    /// Timeout for each page request
    #[arg(long, env, default_value = "30s", value_parser = humantime::parse_duration, global = true)]
    pub request_timeout: Duration,

    /// Max random pause before each page request
    #[arg(long, env, default_value = "500ms", value_parser = humantime::parse_duration, global = true)]
    pub request_delay: Duration,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Scrape dining hall menus and print them as JSON
    Menus {
        /// Site root, ending with a slash. Location pages are looked up below it.
        #[arg(short, long, env = "DINING_BASE_URL")]
        base_url: Option<Url>,

        /// Only scrape these locations (slug, repeatable). Defaults to all known locations.
        #[arg(short, long = "location")]
        locations: Vec<String>,
    },
    /// Scrape the food truck schedule and print it as JSON
    Trucks {
        /// Schedule page
        #[arg(short, long, env = "TRUCK_SCHEDULE_URL")]
        url: Option<Url>,

        /// Year to use for the schedule dates. Defaults to the current year.
        #[arg(short, long)]
        year: Option<i32>,

        /// How long to wait for the schedule tables to show up
        #[arg(long, default_value = "10s", value_parser = humantime::parse_duration)]
        table_wait: Duration,

        /// Log and skip unreadable rows instead of failing
        #[arg(long)]
        skip_bad_rows: bool,
    },
    /// List known dining locations as JSON
    Locations,
}

impl HttpArgs {
    pub fn client_opts(&self) -> client::Opts {
        client::Opts {
            request_delay: self.request_delay,
            request_timeout: self.request_timeout,
        }
    }
}

impl Commands {
    /// Menu config with any overrides from the command line applied
    pub fn menu_config(&self) -> MenuConfig {
        let mut cfg = MenuConfig::default();
        if let Self::Menus {
            base_url,
            locations,
        } = self
        {
            if let Some(u) = base_url {
                cfg.base_url = u.clone();
            }
            if !locations.is_empty() {
                cfg.locations = locations
                    .iter()
                    .map(|s| DiningLocation::from_slug(s))
                    .collect();
            }
        }
        cfg
    }

    /// Schedule config with any overrides from the command line applied
    pub fn schedule_config(&self) -> ScheduleConfig {
        let mut cfg = ScheduleConfig::default();
        if let Self::Trucks {
            url,
            year,
            table_wait,
            skip_bad_rows,
        } = self
        {
            if let Some(u) = url {
                cfg.url = u.clone();
            }
            if let Some(y) = year {
                cfg.year = *y;
            }
            cfg.table_wait = *table_wait;
            if *skip_bad_rows {
                cfg.row_policy = RowPolicy::Skip;
            }
        }
        cfg
    }
}

impl Cli {
    /// Wrapper for clap::Parser::try_parse_from
    pub fn try_parse_opts<I, T>(itr: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::try_parse_from(itr).map_err(Error::from)
    }

    // this thin wrapper makes it possible to do the parsing without importing clap::Parser at the
    // call site
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Maps clap_verbosity_flag::LevelFilter values to tracing_subscriber::filter::LevelFilter
    /// values
    fn tracing_level_filter(&self) -> TFilter {
        match self.verbosity.log_level_filter() {
            LevelFilter::Off => TFilter::OFF,
            LevelFilter::Error => TFilter::ERROR,
            LevelFilter::Warn => TFilter::WARN,
            LevelFilter::Info => TFilter::INFO,
            LevelFilter::Debug => TFilter::DEBUG,
            LevelFilter::Trace => TFilter::TRACE,
        }
    }

    /// All diagnostics go to stderr, stdout is reserved for the JSON output
    pub fn init_logger(&self) -> Result<()> {
        let layer = match self.log_format {
            LogFormat::Json => fmt::layer().json().with_writer(io::stderr).boxed(),
            LogFormat::Pretty => fmt::layer().pretty().with_writer(io::stderr).boxed(),
            LogFormat::Compact => fmt::layer()
                .without_time()
                .compact()
                .with_writer(io::stderr)
                .boxed(),
            LogFormat::Normal => fmt::layer().with_writer(io::stderr).boxed(),
        };
        tracing_subscriber::registry()
            .with(
                EnvFilter::builder()
                    .with_default_directive(self.tracing_level_filter().into())
                    .from_env()?,
            )
            .with(layer)
            .init();
        Ok(())
    }
}
