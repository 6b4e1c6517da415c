fn main() {
    if let Err(e) = incident_browser::app::run_cli() {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
