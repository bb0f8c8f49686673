use std::error::Error;
use std::thread;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use netex_loader::cli::Args;

/// The schema walks recurse once per nesting level of the NeTEx corpus.
const MAIN_STACK_SIZE: usize = 256 * 1024 * 1024;

fn run(args: Args) -> Result<String, Box<dyn Error>> {
    let ctx = args.context()?;
    args.command.run(&ctx, args.format)
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let output = thread::Builder::new()
        .stack_size(MAIN_STACK_SIZE)
        .spawn(move || run(args).map_err(|e| e.to_string()))?
        .join()
        .map_err(|_| "command thread panicked")??;

    println!("{}", output);
    Ok(())
}
