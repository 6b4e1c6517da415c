use std::io;
use std::time::Duration;

use clap::{error::ErrorKind, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::cli::args::CliArgs;
use crate::cli::validation;
use crate::config::{self, ConfigFile};
use crate::loader::{
    Loader, LoaderOptions, SiteRoot, DEFAULT_CONCURRENCY, DEFAULT_MANIFEST,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::output::{self, OutputFormat, TerminalRenderer};
use crate::pager::DEFAULT_PAGE_SIZE;
use crate::query::{self, Criteria, Filter, Sort, SortDirection};
use crate::record::{normalize, Field, NormalizeOptions};
use crate::session::debounce::DEFAULT_DEBOUNCE;
use crate::session::{drive, QueryState, Session, SessionEvent, ViewMode};

fn format_kv_line(label: &str, value: &str) {
    eprintln!(":: {:<10}: {}", label, value);
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("incident_browser={level}")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
struct RunConfig {
    source: SiteRoot,
    loader: LoaderOptions,
    labels: NormalizeOptions,
    state: QueryState,
    format: OutputFormat,
    debounce: Duration,
    no_color: bool,
    interactive: bool,
    list_filters: bool,
}

fn parse_setting<T>(raw: Option<String>, name: &str) -> Result<Option<T>, String>
where
    T: std::str::FromStr<Err = String>,
{
    raw.map(|raw| {
        raw.parse::<T>()
            .map_err(|e| format!("invalid {name} '{raw}': {e}"))
    })
    .transpose()
}

fn build_run_config(args: CliArgs, cfg: ConfigFile) -> Result<RunConfig, String> {
    validation::validate(&args)?;

    let no_color = if args.color {
        false
    } else {
        args.no_color || cfg.no_color.unwrap_or(false)
    };

    let raw_source = args.source.or(cfg.source).ok_or_else(|| {
        "no site root given, pass --source or set `source` in the config file".to_string()
    })?;
    let source = SiteRoot::parse(&raw_source).map_err(|e| e.to_string())?;

    let concurrency = args
        .concurrency
        .or(cfg.concurrency)
        .unwrap_or(DEFAULT_CONCURRENCY);
    if concurrency == 0 {
        return Err("invalid concurrency, expected positive integer".to_string());
    }
    let loader = LoaderOptions {
        manifest: args
            .manifest
            .or(cfg.manifest)
            .unwrap_or_else(|| DEFAULT_MANIFEST.to_string()),
        concurrency,
        timeout_seconds: args.timeout.or(cfg.timeout).unwrap_or(DEFAULT_TIMEOUT_SECONDS),
    };

    let defaults = NormalizeOptions::default();
    let labels = NormalizeOptions {
        missing_label: cfg.missing_label.unwrap_or(defaults.missing_label),
        untitled_label: cfg.untitled_label.unwrap_or(defaults.untitled_label),
        source_placeholder: cfg.source_placeholder.unwrap_or(defaults.source_placeholder),
    };

    let key = parse_setting::<Field>(args.sort.or(cfg.sort), "sort")?.unwrap_or(Field::Date);
    let direction = parse_setting::<SortDirection>(args.sort_dir.or(cfg.sort_dir), "sort-dir")?
        .unwrap_or_else(|| SortDirection::default_for(key));
    let filter_field = parse_setting::<Field>(args.filter_field.or(cfg.filter_field), "filter-field")?
        .unwrap_or(Field::Region);

    let page_size = args.page_size.or(cfg.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err("invalid page-size, expected positive integer".to_string());
    }
    let view = parse_setting::<ViewMode>(args.view.or(cfg.view), "view")?.unwrap_or_default();

    let format = match args.format.or(cfg.output_format) {
        Some(raw) => OutputFormat::parse(&raw)
            .ok_or_else(|| format!("invalid output format '{raw}', expected text or json"))?,
        None => OutputFormat::Text,
    };

    let state = QueryState {
        criteria: Criteria {
            text: args.query.unwrap_or_default(),
            filter: Filter::parse(args.filter.as_deref().unwrap_or_default()),
            filter_field,
            sort: Sort { key, direction },
        },
        page: args.page.unwrap_or(1).max(1),
        page_size,
        view,
    };

    let debounce = args
        .debounce_ms
        .or(cfg.debounce_ms)
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_DEBOUNCE);

    Ok(RunConfig {
        source,
        loader,
        labels,
        state,
        format,
        debounce,
        no_color,
        interactive: args.interactive,
        list_filters: args.list_filters,
    })
}

fn print_summary(run: &RunConfig) {
    format_kv_line("Source", &run.source.to_string());
    format_kv_line("Manifest", &run.loader.manifest);
    let criteria = &run.state.criteria;
    if !criteria.text.trim().is_empty() {
        format_kv_line("Query", criteria.text.trim());
    }
    if !criteria.filter.is_all() {
        format_kv_line("Filter", &format!("{}={}", criteria.filter_field, criteria.filter));
    }
    format_kv_line(
        "Sort",
        &format!("{} {}", criteria.sort.key, criteria.sort.direction.arrow()),
    );
    format_kv_line("Page size", &run.state.page_size.to_string());
}

async fn read_commands(tx: mpsc::Sender<SessionEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let command = line.trim();
        if command.is_empty() {
            continue;
        }
        if command.eq_ignore_ascii_case("quit") || command.eq_ignore_ascii_case("exit") {
            break;
        }
        match line.parse::<SessionEvent>() {
            Ok(event) => {
                debug!(?event, "command");
                if tx.send(event).await.is_err() {
                    break;
                }
            }
            Err(e) => eprintln!("{} {e}", "::".red()),
        }
    }
}

/// Hidden for JSON output; the loader only draws it while fetching per-record files.
fn progress_bar(format: OutputFormat) -> Result<ProgressBar, String> {
    if format == OutputFormat::Json {
        return Ok(ProgressBar::hidden());
    }
    let pb = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::with_template(
            ":: Loading: [{pos}/{len}] :: {per_sec} :: Duration: [{elapsed_precise}]",
        )
        .map_err(|e| format!("failed to build progress bar style: {e}"))?
        .progress_chars(r#"#>-"#),
    );
    Ok(pb)
}

async fn run_async(run: RunConfig) -> Result<(), String> {
    if run.no_color {
        colored::control::set_override(false);
    }
    if run.format == OutputFormat::Text {
        print_summary(&run);
    }

    let pb = progress_bar(run.format)?;
    let loader = Loader::new(run.source.clone(), run.loader.clone())
        .map_err(|e| e.to_string())?
        .with_progress(pb.clone());
    let loaded = loader.load().await;
    pb.finish_and_clear();

    info!(
        origin = ?loaded.report.origin,
        requested = loaded.report.requested,
        failed = loaded.report.failed,
        "load finished"
    );
    if run.format == OutputFormat::Text && loaded.report.failed > 0 {
        format_kv_line(
            "Skipped",
            &format!("{} of {} documents", loaded.report.failed, loaded.report.requested),
        );
    }

    let records = normalize(&loaded.raw, &run.labels);

    if run.list_filters {
        let options = query::filter_options(&records, run.state.criteria.filter_field);
        let mut stdout = io::stdout();
        return output::write_filter_options(&mut stdout, &options, &run.state)
            .map_err(|e| format!("failed to write filter options: {e}"));
    }

    let renderer = TerminalRenderer::new(io::stdout(), run.format);
    let mut session = Session::new(run.state.clone(), renderer);
    session.load(records);

    if run.interactive {
        let (tx, rx) = mpsc::channel::<SessionEvent>(64);
        tokio::join!(read_commands(tx), drive(&mut session, rx, run.debounce));
    }
    Ok(())
}

pub fn run_cli() -> Result<(), String> {
    let args = match CliArgs::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                e.print().map_err(|e| format!("failed to print help: {e}"))?;
                return Ok(());
            }
            _ => return Err(e.to_string()),
        },
    };

    init_tracing(args.verbose);

    let (config_path, explicit) = match args.config.as_deref() {
        Some(path) => (Some(config::expand_tilde(path)), true),
        None => (config::default_config_path(), false),
    };

    if args.init_config {
        let path = config_path.ok_or_else(|| "could not determine home directory".to_string())?;
        config::ensure_default_config_file(&path)?;
        format_kv_line("Config", &path.display().to_string());
        return Ok(());
    }

    let cfg = match config_path.as_ref() {
        Some(path) => config::load_config(path, !explicit)?,
        None => ConfigFile::default(),
    };

    let run = build_run_config(args, cfg)?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build runtime: {e}"))?;

    rt.block_on(run_async(run))
}
