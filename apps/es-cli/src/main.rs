use clap::{Args, Parser, Subcommand};
use es_app::{
    AppError, AppResult, Credentials, RunProgressEvent, RunTimingSummary, Settings,
    SimulationRequest, UploadMode, execute_with_progress, load_settings, query,
};
use es_browser::{Session, WebDriverBrowser};
use es_cache::{CacheKey, FieldStore, FileFieldStore};
use es_core::{ChoiceInput, Configuration, FieldKind};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

#[derive(Parser)]
#[command(name = "es-cli")]
#[command(about = "ESPET quicksolver driver - run electrospray simulations from the command line", long_about = None)]
struct Cli {
    /// Settings YAML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one simulation on the quicksolver and collect its results
    Run(RunArgs),
    /// List the options of every configuration field, with their indices
    Domains {
        /// Only this field (e.g. emitter, feed_substrate)
        field: Option<FieldKind>,
    },
    /// Inspect or invalidate cached form field snapshots
    #[command(subcommand)]
    Cache(CacheCommands),
}

#[derive(Args)]
struct SelectionArgs {
    /// Emitter name or index
    #[arg(long)]
    emitter: Option<ChoiceInput>,
    /// Feed name or index
    #[arg(long)]
    feed: Option<ChoiceInput>,
    /// Propellant name or index
    #[arg(long)]
    propellant: Option<ChoiceInput>,
    /// Emitter substrate name or index
    #[arg(long)]
    emitter_substrate: Option<ChoiceInput>,
    /// Feed substrate name or index
    #[arg(long)]
    feed_substrate: Option<ChoiceInput>,
    /// Output field name or index
    #[arg(long)]
    field: Option<ChoiceInput>,
    /// Independent variable (T, V, P) or index
    #[arg(long)]
    independent_variable: Option<ChoiceInput>,
}

impl SelectionArgs {
    fn apply(&self, config: &mut Configuration) -> AppResult<()> {
        let given = [
            (FieldKind::Emitter, &self.emitter),
            (FieldKind::Feed, &self.feed),
            (FieldKind::Propellant, &self.propellant),
            (FieldKind::EmitterSubstrate, &self.emitter_substrate),
            (FieldKind::FeedSubstrate, &self.feed_substrate),
            (FieldKind::Field, &self.field),
            (FieldKind::IndependentVariable, &self.independent_variable),
        ];
        for (kind, value) in given {
            if let Some(value) = value {
                config.set(kind, value.clone())?;
            }
        }
        Ok(())
    }
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    selection: SelectionArgs,
    /// Quicksolver login name
    #[arg(long, env = "ESPET_USERNAME")]
    username: Option<String>,
    /// Quicksolver password
    #[arg(long, env = "ESPET_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    /// How fields are pushed into the form (individual or bulk)
    #[arg(long)]
    upload: Option<UploadMode>,
    /// Scrape the form even if a cached snapshot exists
    #[arg(long)]
    no_cache: bool,
    /// Keep the downloaded CSV in the download directory
    #[arg(long)]
    keep_file: bool,
    /// Seconds to wait for the download
    #[arg(long)]
    timeout: Option<f64>,
    /// Run the browser without a window
    #[arg(long)]
    headless: bool,
    /// Write the result table to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum CacheCommands {
    /// List cached snapshots
    List,
    /// Print one cached snapshot
    Show(CacheKeyArgs),
    /// Remove one cached snapshot, or all with --all
    Clear {
        #[command(flatten)]
        key: CacheKeyArgs,
        /// Remove every cached snapshot
        #[arg(long, conflicts_with_all = ["emitter", "feed", "independent_variable"])]
        all: bool,
    },
}

#[derive(Args)]
struct CacheKeyArgs {
    /// Emitter name or index
    #[arg(long)]
    emitter: Option<ChoiceInput>,
    /// Feed name or index
    #[arg(long)]
    feed: Option<ChoiceInput>,
    /// Independent variable (T, V, P) or index
    #[arg(long)]
    independent_variable: Option<ChoiceInput>,
}

impl CacheKeyArgs {
    fn key(&self, base: &Configuration) -> AppResult<CacheKey> {
        let mut config = *base;
        let given = [
            (FieldKind::Emitter, &self.emitter),
            (FieldKind::Feed, &self.feed),
            (FieldKind::IndependentVariable, &self.independent_variable),
        ];
        for (kind, value) in given {
            if let Some(value) = value {
                config.set(kind, value.clone())?;
            }
        }
        Ok(CacheKey::for_config(&config))
    }
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = match &cli.config {
        Some(path) => {
            let settings = load_settings(path)?;
            info!(path = %path.display(), "loaded settings");
            settings
        }
        None => Settings::default(),
    };

    match cli.command {
        Commands::Run(args) => cmd_run(settings, &args),
        Commands::Domains { field } => cmd_domains(field),
        Commands::Cache(CacheCommands::List) => cmd_cache_list(&settings),
        Commands::Cache(CacheCommands::Show(key)) => cmd_cache_show(&settings, &key),
        Commands::Cache(CacheCommands::Clear { key, all }) => cmd_cache_clear(&settings, &key, all),
    }
}

fn cmd_run(mut settings: Settings, args: &RunArgs) -> AppResult<()> {
    args.selection.apply(&mut settings.selection)?;
    if let Some(mode) = args.upload {
        settings.upload_mode = mode;
    }
    if let Some(timeout) = args.timeout {
        es_app::download_timeout(timeout)
            .map_err(|e| AppError::InvalidInput(format!("--timeout: {}", e)))?;
        settings.download_timeout_s = timeout;
    }
    settings.use_cache &= !args.no_cache;
    settings.delete_download &= !args.keep_file;
    settings.headless |= args.headless;

    let username = args
        .username
        .as_deref()
        .ok_or_else(|| AppError::InvalidInput("missing --username or ESPET_USERNAME".to_string()))?;
    let password = args
        .password
        .as_deref()
        .ok_or_else(|| AppError::InvalidInput("missing --password or ESPET_PASSWORD".to_string()))?;

    let config = settings.selection;
    println!(
        "Running {} / {} sweeping {} ({}, {} upload)",
        config.emitter(),
        config.feed(),
        config.independent_variable(),
        config.field(),
        settings.upload_mode
    );

    let request = SimulationRequest {
        target_url: &settings.target_url,
        download_dir: &settings.download_dir,
        config,
        credentials: Credentials { username, password },
        options: settings.run_options()?,
    };

    let browser = WebDriverBrowser::new(settings.webdriver_options())?;
    let mut session = Session::new(browser);
    let mut store = FileFieldStore::new(&settings.cache_dir)?;

    let mut last_emit = Instant::now();
    let mut last_stage = String::new();
    let response = execute_with_progress(
        &mut session,
        &mut store,
        &request,
        Some(&mut |event| {
            let stage_key = event.stage.label().to_string();
            let emit_now = stage_key != last_stage || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = stage_key;
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    if response.fields_from_cache {
        println!("✓ Simulation completed ({} cached fields)", response.field_count);
    } else {
        println!("✓ Simulation completed ({} scraped fields)", response.field_count);
    }
    print_timing_summary(&response.timing);

    let summary = query::summarize_table(&response.table)?;
    println!("\nResults: {} rows", summary.row_count);
    for range in &summary.numeric_ranges {
        println!("  {:<28} {:>12.4e} .. {:<12.4e}", range.name, range.min, range.max);
    }

    if let Some(path) = &args.output {
        write_table(path, &response.table)?;
        println!("✓ Wrote {} rows to {}", response.table.row_count(), path.display());
    }
    Ok(())
}

fn write_table(path: &Path, table: &es_results::SimulationTable) -> AppResult<()> {
    let file = File::create(path)?;
    table.write_csv(file)?;
    Ok(())
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  elapsed={:.2}s",
        spinner[spin_idx],
        event.stage.label(),
        event.elapsed_wall_s
    );
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{}", line);
    let _ = io::stdout().flush();
}

fn print_timing_summary(timing: &RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);
    let rows = [
        ("Open", timing.open_time_s),
        ("Login", timing.login_time_s),
        ("Fields", timing.select_time_s),
        ("Upload", timing.upload_time_s),
        ("Run", timing.run_time_s),
        ("Collect", timing.collect_time_s),
    ];

    println!("\nTiming summary:");
    for (label, seconds) in rows {
        println!(
            "  {:<8} {:.3}s ({:.1}%)",
            format!("{}:", label),
            seconds,
            100.0 * seconds / total
        );
    }
    println!("  Total:   {:.3}s", timing.total_time_s);
}

fn cmd_domains(field: Option<FieldKind>) -> AppResult<()> {
    let kinds: Vec<FieldKind> = match field {
        Some(kind) => vec![kind],
        None => FieldKind::ALL.to_vec(),
    };
    for kind in kinds {
        println!("{} ({}):", kind.label(), kind.form_name());
        for (index, value) in kind.domain().iter().enumerate() {
            println!("  {:>2}  {}", index, value);
        }
    }
    Ok(())
}

fn cmd_cache_list(settings: &Settings) -> AppResult<()> {
    let store = FileFieldStore::new(&settings.cache_dir)?;
    let keys = store.keys()?;

    if keys.is_empty() {
        println!("No cached field snapshots in {}", store.root_dir().display());
    } else {
        println!("Cached field snapshots in {}:", store.root_dir().display());
        for key in keys {
            match store.load_entry(&key) {
                Ok(Some(entry)) => println!(
                    "  {}  ({} fields, saved {})",
                    key,
                    entry.fields.len(),
                    entry.saved_at
                ),
                Ok(None) => {}
                Err(err) => println!("  {}  (unreadable: {})", key, err),
            }
        }
    }
    Ok(())
}

fn cmd_cache_show(settings: &Settings, key_args: &CacheKeyArgs) -> AppResult<()> {
    let store = FileFieldStore::new(&settings.cache_dir)?;
    let key = key_args.key(&settings.selection)?;

    match store.load_entry(&key)? {
        Some(entry) => {
            println!("{} (saved {}):", key, entry.saved_at);
            for (name, value) in &entry.fields {
                println!("  {} = {}", name, value);
            }
        }
        None => println!("No cached field snapshot for {}", key),
    }
    Ok(())
}

fn cmd_cache_clear(settings: &Settings, key_args: &CacheKeyArgs, all: bool) -> AppResult<()> {
    let mut store = FileFieldStore::new(&settings.cache_dir)?;

    let keys = if all {
        store.keys()?
    } else {
        vec![key_args.key(&settings.selection)?]
    };
    for key in &keys {
        store.remove(key)?;
    }
    println!("✓ Removed {} cached snapshot(s)", keys.len());
    Ok(())
}
