//! Dead Man's Snitch CLI — list, create, edit, tag, pause, and delete snitches from the terminal.

mod output;

use clap::{Parser, Subcommand, ValueEnum};
use snitch_lib::{get_api_key, Client, Interval, Snitch, SnitchOptions};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snitch")]
#[command(about = "Dead Man's Snitch CLI — manage heartbeat monitors", long_about = None)]
struct Cli {
    /// Output format: plain (human-readable), json (structured).
    #[arg(short, long, default_value = "plain", value_enum, global = true)]
    output: OutputFormatArg,

    /// Show timestamps in UTC only. By default timestamps are shown in local timezone.
    #[arg(long, global = true)]
    utc: bool,

    /// API key. Falls back to a configured secret backend when unset.
    #[arg(long, env = "SNITCH_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// API base URL.
    #[arg(long, env = "SNITCH_API_URL", default_value = snitch_lib::API_BASE, global = true)]
    url: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormatArg {
    Plain,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List snitches
    List {
        /// Only snitches carrying this tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Show one snitch
    Get { token: String },
    /// Create a snitch
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, value_parser = parse_interval)]
        interval: Interval,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Change name, interval, notes, or tags of a snitch
    Edit {
        token: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, value_parser = parse_interval)]
        interval: Option<Interval>,
        #[arg(long)]
        notes: Option<String>,
        /// Replace all tags (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
        /// Remove every tag
        #[arg(long, conflicts_with = "tags")]
        clear_tags: bool,
    },
    /// Add tags to a snitch
    Tag {
        token: String,
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Remove a tag from a snitch
    Untag { token: String, tag: String },
    /// Pause a snitch
    Pause { token: String },
    /// Delete a snitch
    Delete { token: String },
    /// List valid check-in intervals
    Intervals,
    /// Show version
    Version,
}

/// Fields of `snitch edit` that overwrite the fetched snitch.
struct EditChanges {
    name: Option<String>,
    interval: Option<Interval>,
    notes: Option<String>,
    tags: Vec<String>,
    clear_tags: bool,
}

impl EditChanges {
    fn apply(self, snitch: &mut Snitch) {
        if let Some(name) = self.name {
            snitch.name = name;
        }
        if let Some(interval) = self.interval {
            snitch.interval = interval;
        }
        if let Some(notes) = self.notes {
            snitch.notes = notes;
        }
        if self.clear_tags {
            snitch.tags.clear();
        } else if !self.tags.is_empty() {
            snitch.tags = self.tags;
        }
    }
}

fn parse_interval(s: &str) -> Result<Interval, String> {
    s.parse::<Interval>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let format = match cli.output {
        OutputFormatArg::Plain => output::OutputFormat::Plain,
        OutputFormatArg::Json => output::OutputFormat::Json,
    };

    match &cli.command {
        Commands::Version => {
            println!("snitch {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Commands::Intervals => {
            let names: Vec<&str> = Interval::ALL.iter().map(|i| i.as_str()).collect();
            return match output::print_value(&serde_json::json!(names), format) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => fail(&e),
            };
        }
        _ => {}
    }

    let (api_key, source) = match get_api_key(cli.api_key.as_deref()) {
        Ok(k) => k,
        Err(e) => return fail(&e.to_string()),
    };
    tracing::debug!(?source, "resolved API key");

    let client = match Client::new(api_key).and_then(|c| c.with_base_url(&cli.url)) {
        Ok(c) => c,
        Err(e) => return fail(&e.to_string()),
    };

    tracing::debug!(command = ?cli.command, "dispatching command");
    let view = output::View {
        format,
        use_utc: cli.utc,
    };
    match run(&client, cli.command, view).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}

fn fail(message: &str) -> ExitCode {
    eprintln!("Error: {}", message);
    ExitCode::FAILURE
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(client: &Client, cmd: Commands, view: output::View) -> Result<(), String> {
    match cmd {
        Commands::List { tags } => {
            let snitches = client
                .list_snitches(&tags)
                .await
                .map_err(|e| e.to_string())?;
            view.print_snitches(&snitches)?;
        }
        Commands::Get { token } => {
            let snitch = client.get_snitch(&token).await.map_err(|e| e.to_string())?;
            view.print_snitch(&snitch)?;
        }
        Commands::Create {
            name,
            interval,
            notes,
            tags,
        } => {
            let mut options = SnitchOptions::new(name, interval.as_str()).tags(tags);
            options.notes = notes;
            let local = Snitch::new(options).map_err(|e| e.to_string())?;
            let created = client
                .create_snitch(&local)
                .await
                .map_err(|e| e.to_string())?;
            view.print_snitch(&created)?;
        }
        Commands::Edit {
            token,
            name,
            interval,
            notes,
            tags,
            clear_tags,
        } => {
            let mut snitch = client.get_snitch(&token).await.map_err(|e| e.to_string())?;
            let changes = EditChanges {
                name,
                interval,
                notes,
                tags,
                clear_tags,
            };
            changes.apply(&mut snitch);
            let edited = client
                .edit_snitch(&snitch)
                .await
                .map_err(|e| e.to_string())?;
            view.print_snitch(&edited)?;
        }
        Commands::Tag { token, tags } => {
            let res = client
                .add_tags(&token, &tags)
                .await
                .map_err(|e| e.to_string())?;
            output::print_value(&res, view.format)?;
        }
        Commands::Untag { token, tag } => {
            let res = client
                .remove_tag(&token, &tag)
                .await
                .map_err(|e| e.to_string())?;
            output::print_value(&res, view.format)?;
        }
        Commands::Pause { token } => {
            let res = client
                .pause_snitch(&token)
                .await
                .map_err(|e| e.to_string())?;
            output::print_value(&res, view.format)?;
        }
        Commands::Delete { token } => {
            let res = client
                .delete_snitch(&token)
                .await
                .map_err(|e| e.to_string())?;
            output::print_value(&res, view.format)?;
        }
        Commands::Intervals | Commands::Version => {}
    }
    Ok(())
}
