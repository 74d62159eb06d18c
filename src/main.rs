use std::io;

use anyhow::Context;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use water_sort::cli::Cli;
use water_sort::logging::setup_logging;
use water_sort::menu::App;
use water_sort::prompt::Console;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())
        .context("failed to set up logging")?;

    let rng = match cli.seed {
        Some(seed) => {
            info!(seed, "using fixed seed");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_os_rng(),
    };
    let mut app = App {
        config_path: cli.config,
        saves_dir: cli.saves_dir,
        rng,
    };

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout());
    app.run(&mut console).context("game aborted")?;
    Ok(())
}
