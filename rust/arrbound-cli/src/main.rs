//! arrbound: run the array boundary oracle from the command line.

use arrbound_cli::{execute, init_logging, Cli, USAGE_EXIT_CODE};
use clap::Parser;

fn red(s: &str) -> String {
    format!("\x1b[31m{}\x1b[0m", s)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stdout = std::io::stdout();
    let code = match execute(cli, &mut stdout.lock()) {
        Ok(status) => status.exit_code(),
        Err(e) => {
            eprintln!("{} {}", red("error:"), e);
            USAGE_EXIT_CODE
        }
    };
    std::process::exit(code);
}
