//! recache - content-addressed web-asset cache builder.

mod cli;
mod config;
mod emit;
mod engine;
mod ignore;
mod logger;
mod registry;
mod report;

use anyhow::Result;
use clap::Parser;

use cli::Cli;
use config::{Config, FILELIST_FILE, IGNORE_FILE, NOTFOUND_FILE};
use engine::Engine;
use ignore::IgnoreSet;
use registry::{FileRegistry, build_registry, load_filelist, save_filelist, walk_webroot};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli)?;
    logger::set_verbose(config.verbose);

    let registry = enumerate(&config, cli.refresh)?;
    if registry.is_empty() {
        log!("error"; "no files found under {}", config.webroot.display());
        std::process::exit(1);
    }
    debug!("scan"; "{} registered files", registry.len());

    let ignore = IgnoreSet::load(&config.webroot.join(IGNORE_FILE))?;
    if !ignore.is_empty() {
        debug!("scan"; "{} ignored candidates", ignore.len());
    }

    let mut engine = Engine::new(&registry, &config, &ignore);
    engine.run()?;

    report::write_notfound(&config.webroot.join(NOTFOUND_FILE), engine.not_found())?;

    log!(
        "done";
        "{} files emitted to {}, {} unresolved references",
        engine.done_count(),
        config.out_dir.display(),
        engine.not_found().len()
    );
    Ok(())
}

/// Build the registry from the file-list cache, or walk the webroot.
fn enumerate(config: &Config, refresh: bool) -> Result<FileRegistry> {
    let filelist_path = config.webroot.join(FILELIST_FILE);

    if !refresh && filelist_path.is_file() {
        match load_filelist(&filelist_path) {
            Ok(entries) => {
                debug!("scan"; "using cached file list ({} entries)", entries.len());
                return Ok(build_registry(config, &entries));
            }
            Err(err) => log!("error"; "discarding file list cache: {:#}", err),
        }
    }

    let entries = walk_webroot(config);
    if let Err(err) = save_filelist(&filelist_path, &entries) {
        log!("error"; "could not save file list cache: {:#}", err);
    }
    Ok(build_registry(config, &entries))
}
