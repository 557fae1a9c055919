mod config;
mod error;
mod form;
mod logging;
mod models;
mod query;
mod run;
mod sheet;
mod store;
mod ui;

use anyhow::Result;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let mut config = config::Config::from_env()?;
    let args = config.apply_flags(&args)?;
    config.ensure_data_dir()?;

    match args.len() {
        0 | 1 => {
            logging::init_for_tui(&config)?;
            run::as_tui(&config)
        }
        _ => {
            logging::init_for_cli()?;
            run::as_cli(&args, &config)
        }
    }
}
