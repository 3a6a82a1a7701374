fn main() {
    milsymbol_schema::cli::run();
}
