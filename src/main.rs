fn main() {
    if let Err(e) = phasegate::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
