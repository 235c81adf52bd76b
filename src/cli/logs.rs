use std::path::PathBuf;

use clap::Parser;

use crate::logs::LogPaths;

#[derive(Parser)]
pub struct LogsArgs {
    /// Directory holding the logs and the raw archive.
    #[clap(long = "output-dir", env = "PVS6_OUTPUT_DIR", default_value = "PVS6_output")]
    output_dir: PathBuf,

    #[clap(long = "overview-log", env = "PVS6_OVERVIEW_LOG")]
    overview: Option<PathBuf>,

    #[clap(long = "inverters-log", env = "PVS6_INVERTERS_LOG")]
    inverters: Option<PathBuf>,

    #[clap(long = "summary-log", env = "PVS6_SUMMARY_LOG")]
    summary: Option<PathBuf>,
}

impl LogsArgs {
    pub fn paths(&self) -> LogPaths {
        let defaults = LogPaths::in_dir(&self.output_dir);
        LogPaths {
            overview: self.overview.clone().unwrap_or(defaults.overview),
            inverters: self.inverters.clone().unwrap_or(defaults.inverters),
            summary: self.summary.clone().unwrap_or(defaults.summary),
            archive: defaults.archive,
        }
    }
}
