fn main() -> Result<(), eframe::Error> {
    // Set up logging for development
    env_logger::init();

    refboard::run_app()
}
