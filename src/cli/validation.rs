use crate::cli::args::CliArgs;
use crate::output::OutputFormat;
use crate::query::SortDirection;
use crate::record::Field;
use crate::session::ViewMode;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if let Some(size) = args.page_size {
        if size == 0 {
            return Err("invalid page-size, expected positive integer".to_string());
        }
    }
    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 {
            return Err("invalid concurrency, expected positive integer".to_string());
        }
    }
    if let Some(raw) = args.sort.as_deref() {
        raw.parse::<Field>()
            .map_err(|e| format!("invalid --sort '{raw}': {e}"))?;
    }
    if let Some(raw) = args.sort_dir.as_deref() {
        raw.parse::<SortDirection>()
            .map_err(|e| format!("invalid --sort-dir '{raw}': {e}"))?;
    }
    if let Some(raw) = args.filter_field.as_deref() {
        raw.parse::<Field>()
            .map_err(|e| format!("invalid --filter-field '{raw}': {e}"))?;
    }
    if let Some(raw) = args.view.as_deref() {
        raw.parse::<ViewMode>()
            .map_err(|e| format!("invalid --view '{raw}': {e}"))?;
    }
    if let Some(raw) = args.format.as_deref() {
        if OutputFormat::parse(raw).is_none() {
            return Err(format!("invalid --format '{raw}', expected text or json"));
        }
    }
    if args.interactive && args.list_filters {
        return Err("--interactive and --list-filters cannot be combined".to_string());
    }
    Ok(())
}
