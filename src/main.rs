use clap::Parser;

mod cli;

#[tokio::main]
async fn main() {
    // Pick up HELLO_* variables from a local .env file, if present
    dotenvy::dotenv().ok();

    let cli = cli::Cli::parse();
    let verbose = cli.verbose;

    if let Err(e) = cli::run(cli).await {
        eprintln!("Error: {:#}", e);
        if verbose {
            eprintln!("{:?}", e);
        }
        std::process::exit(1);
    }
}
