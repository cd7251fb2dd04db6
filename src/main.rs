fn main() {
    if let Err(err) = table_normalize::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
