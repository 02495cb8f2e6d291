fn main() {
    std::process::exit(harmonia_cli::cli::run_from_env());
}
