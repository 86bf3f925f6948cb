fn main() {
    if let Err(err) = truck_compare::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
