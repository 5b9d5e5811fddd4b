use usomfeed::app::App;
use usomfeed::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::from_args();

    match App::run(&cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            if cli.error_enabled() {
                eprintln!("Error ({}): {e}", e.category());
            }
            std::process::exit(1);
        }
    }
}
