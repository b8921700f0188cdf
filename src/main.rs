use clap::Parser;
use log::info;

use recaller::{App, Cli, Config, NoteStore, Result};

pub fn initialize_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

fn main() {
    initialize_logger();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::resolve(cli.data_dir)?;
    if let Some(backup_dir) = cli.backup_dir {
        config.backup_dir = backup_dir;
    }
    if cli.auto_backup {
        config.auto_backup = true;
    }

    let store = NoteStore::open(config)?;
    let mut app = App::new(store, cli.verbose);
    app.run(cli.command)
}
