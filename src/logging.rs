use std::io;

use log::LevelFilter;

/// Dependencies that are chatty at info/debug level.
const QUIET_TARGETS: &[&str] = &["hyper", "reqwest", "rustls", "ethers_providers", "h2"];

/// Parse a level name, falling back to `Info` for anything unknown.
pub fn parse_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}

/// Install the stderr logger. Lines are `time level target message`.
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {:<5} {} {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level);
    for target in QUIET_TARGETS {
        dispatch = dispatch.level_for(*target, level.min(LevelFilter::Warn));
    }
    dispatch.chain(io::stderr()).apply()
}
