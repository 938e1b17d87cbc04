use anyhow::Result;
use clap::Parser;
use netdiag::cli;

fn main() -> Result<()> {
    // Provider API keys may live in a local .env file.
    dotenvy::dotenv().ok();

    let args = cli::Args::parse();
    if let Err(err) = cli::dispatch(args) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
    Ok(())
}
