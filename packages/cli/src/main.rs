use clap::Parser;

use pathdb_cli::Command;

/// pathdb - inspect how JSON documents are stored as ordered leaves
#[derive(Parser, Debug)]
#[command(name = "pathdb")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let args = Args::parse();

    match pathdb_cli::run(&args.command) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
