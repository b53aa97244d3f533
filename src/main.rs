fn main() {
    range_trainer::cli::run();
}
