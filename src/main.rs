fn main() {
    if let Err(err) = csv_dupmark::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
