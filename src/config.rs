use tsc::Result;

use log::LevelFilter;
use simple_logger::SimpleLogger;

pub fn configure_app(verbose: bool) -> Result {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    SimpleLogger::new().with_level(level).env().init()?;

    return Ok(());
}
