use clap::{ArgAction, Parser};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "incident-browser",
    version,
    about = "browse, search and page through incident reports",
    long_about = "incident-browser loads a site's incident records (manifest, bundle or per-record files), normalizes their heterogeneous field names and lets you filter, search, sort and page through them.\n\nExamples:\n  incident-browser -u https://example.org/incidentes/\n  incident-browser -u ./public -q robo -f Norte -s severity\n  incident-browser -u ./public --interactive\n\nTip: Use --config to persist the site root and browsing defaults."
)]
pub struct CliArgs {
    #[arg(
        short = 'v',
        long = "verbose",
        action = ArgAction::Count,
        help_heading = "Output",
        help = "Increase log verbosity (-v, -vv)."
    )]
    pub verbose: u8,

    #[arg(
        short = 'c',
        long = "color",
        help_heading = "Output",
        help = "Enable colored output (overrides --no-color)."
    )]
    pub color: bool,

    #[arg(
        long = "no-color",
        visible_alias = "nc",
        help_heading = "Output",
        help = "Disable colored output."
    )]
    pub no_color: bool,

    #[arg(
        short = 'o',
        long = "format",
        visible_alias = "output-format",
        value_name = "FORMAT",
        help_heading = "Output",
        help = "Output format (text or json)."
    )]
    pub format: Option<String>,

    #[arg(
        short = 'u',
        long = "source",
        visible_aliases = ["url", "root"],
        value_name = "URL|DIR",
        help_heading = "Input",
        help = "Site root holding the manifest (http(s) URL or local directory)."
    )]
    pub source: Option<String>,

    #[arg(
        short = 'm',
        long = "manifest",
        value_name = "PATH",
        help_heading = "Input",
        help = "Manifest path relative to the site root (default manifest.json)."
    )]
    pub manifest: Option<String>,

    #[arg(
        short = 'C',
        long = "config",
        value_name = "FILE",
        help_heading = "Input",
        help = "Path to config file (defaults to ~/.incident-browser/config.yml)."
    )]
    pub config: Option<String>,

    #[arg(
        long = "init-config",
        help_heading = "Input",
        help = "Write a default config file (if absent) and exit."
    )]
    pub init_config: bool,

    #[arg(
        short = 't',
        long = "concurrency",
        value_name = "N",
        help_heading = "Performance",
        help = "Max in-flight record file fetches."
    )]
    pub concurrency: Option<usize>,

    #[arg(
        short = 'T',
        long = "timeout",
        value_name = "SECONDS",
        help_heading = "Performance",
        help = "Per-request timeout in seconds."
    )]
    pub timeout: Option<u64>,

    #[arg(
        short = 'q',
        long = "query",
        visible_alias = "search",
        value_name = "TEXT",
        help_heading = "Query",
        help = "Free-text search across id, title, description and the category fields."
    )]
    pub query: Option<String>,

    #[arg(
        short = 'f',
        long = "filter",
        value_name = "VALUE",
        help_heading = "Query",
        help = "Only show records whose filter field equals VALUE (case-insensitive; 'all' disables)."
    )]
    pub filter: Option<String>,

    #[arg(
        long = "filter-field",
        value_name = "FIELD",
        help_heading = "Query",
        help = "Field the filter compares against (default region)."
    )]
    pub filter_field: Option<String>,

    #[arg(
        long = "list-filters",
        help_heading = "Query",
        help = "Print the distinct values of the filter field and exit."
    )]
    pub list_filters: bool,

    #[arg(
        short = 's',
        long = "sort",
        value_name = "FIELD",
        help_heading = "Query",
        help = "Sort key (id, title, region, status, severity, date, ...)."
    )]
    pub sort: Option<String>,

    #[arg(
        long = "sort-dir",
        value_name = "DIR",
        help_heading = "Query",
        help = "Sort direction (asc or desc); defaults to desc for date, asc otherwise."
    )]
    pub sort_dir: Option<String>,

    #[arg(
        short = 'p',
        long = "page",
        value_name = "N",
        help_heading = "Paging",
        help = "Page to show (1-based, clamped to the last page)."
    )]
    pub page: Option<usize>,

    #[arg(
        short = 'n',
        long = "page-size",
        value_name = "N",
        help_heading = "Paging",
        help = "Records per page (10, 20, 25, 50, 100 are the usual choices)."
    )]
    pub page_size: Option<usize>,

    #[arg(
        long = "view",
        value_name = "VIEW",
        help_heading = "Paging",
        help = "Presentation (table or cards)."
    )]
    pub view: Option<String>,

    #[arg(
        short = 'i',
        long = "interactive",
        help_heading = "Interactive",
        help = "Read commands from stdin (/text, filter X, sort F, next, prev, size N, view V, quit)."
    )]
    pub interactive: bool,

    #[arg(
        long = "debounce-ms",
        value_name = "MS",
        help_heading = "Interactive",
        help = "Delay before a typed query is applied."
    )]
    pub debounce_ms: Option<u64>,
}
