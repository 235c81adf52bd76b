use std::{fs::File, io::BufReader, path::PathBuf};

use clap::Parser;

use crate::{
    api::pvs6::{self, Vars},
    cli::{gateway::GatewayArgs, heartbeat::HeartbeatArgs, logs::LogsArgs},
    logs::{self, LogPaths, archive},
    prelude::*,
    timestamp::Timestamp,
};

#[derive(Parser)]
pub struct CollectArgs {
    #[clap(flatten)]
    gateway: GatewayArgs,

    /// Last five characters of the gateway serial number, used as the login password.
    #[clap(long = "serial-suffix", env = "PVS6_SERIAL_LAST5", hide_env_values = true)]
    serial_suffix: Option<String>,

    /// Replay a previously archived response instead of querying the gateway.
    #[clap(long = "from-file")]
    from_file: Option<PathBuf>,

    #[clap(flatten)]
    logs: LogsArgs,

    #[clap(flatten)]
    heartbeat: HeartbeatArgs,
}

impl CollectArgs {
    pub async fn run(self) -> Result {
        let timestamp = Timestamp::now();
        let paths = self.logs.paths();

        let vars = if let Some(path) = &self.from_file {
            info!(path = %path.display(), "replaying");
            let file =
                File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
            serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("failed to parse `{}`", path.display()))?
        } else {
            let serial_suffix =
                self.serial_suffix.context("the gateway serial suffix is required")?;
            let client = pvs6::Client::new(
                &self.gateway.host,
                serial_suffix,
                self.gateway.timeout.into(),
            )?;
            client.login().await?;
            let vars = client.get_vars().await?;
            archive_best_effort(&paths, timestamp, &vars);
            vars
        };

        record(&paths, timestamp, &vars)?;
        self.heartbeat.send().await;
        Ok(())
    }
}

/// The raw copy is only for reference, the logs still get written if it fails.
fn archive_best_effort(paths: &LogPaths, timestamp: Timestamp, vars: &Vars) -> Option<PathBuf> {
    archive::save(&paths.archive, timestamp, vars)
        .inspect_err(|error| warn!("failed to archive the response: {error:#}"))
        .ok()
}

/// Append one overview row and one row per inverter.
///
/// Both are parsed before anything is written, so a malformed response leaves the logs intact.
#[instrument(skip_all, fields(%timestamp))]
fn record(paths: &LogPaths, timestamp: Timestamp, vars: &Vars) -> Result {
    let overview = vars.overview(timestamp)?;
    let inverters = vars.inverters(timestamp)?;
    info!(
        production = %overview.production,
        consumption = %overview.consumption,
        net_power = %overview.net_power,
        "current",
    );
    logs::append(&paths.overview, [overview])?;

    if inverters.is_empty() {
        warn!("the gateway reported no inverters");
    }
    let n_inverters = logs::append(&paths.inverters, inverters)?;
    info!(n_inverters, "recorded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs::{read_to_string, write};

    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn record_ok() -> Result {
        let dir = TempDir::new()?;
        let paths = LogPaths::in_dir(dir.path());
        let vars: Vars = serde_json::from_value(json!({
            "/sys/livedata/pv_en": "100.5",
            "/sys/livedata/site_load_en": 80.0,
            "/sys/livedata/pv_p": "1.5",
            "/sys/devices/inverter/0/sn": "A",
            "/sys/devices/inverter/0/p3phsumKw": "0.25",
            "/sys/devices/inverter/0/ltea3phsumKwh": "10.0",
        }))?;
        let timestamp: Timestamp = "2025-09-30 12:00:00".parse()?;
        record(&paths, timestamp, &vars)?;
        record(&paths, timestamp, &vars)?;

        let overview = read_to_string(&paths.overview)?;
        assert_eq!(overview.lines().count(), 3, "one header and two rows");
        assert!(overview.lines().nth(1).is_some_and(|line| line.starts_with(
            "2025-09-30 12:00:00,100.5,80.0,0.0,1.5,0.0,0.0"
        )));
        let inverters = read_to_string(&paths.inverters)?;
        assert_eq!(inverters.lines().nth(1), Some("2025-09-30 12:00:00,A,working,0.25,10.0"));
        Ok(())
    }

    #[test]
    fn archive_failure_is_not_fatal() -> Result {
        let dir = TempDir::new()?;
        let paths = LogPaths::in_dir(dir.path());
        write(&paths.archive, "not a directory")?;
        let vars: Vars = serde_json::from_value(json!({ "/sys/livedata/pv_en": "100.5" }))?;
        let timestamp: Timestamp = "2025-09-30 12:00:00".parse()?;
        assert!(archive_best_effort(&paths, timestamp, &vars).is_none());
        record(&paths, timestamp, &vars)?;
        assert!(paths.overview.exists());
        Ok(())
    }

    #[test]
    fn malformed_inverter_writes_nothing() -> Result {
        let dir = TempDir::new()?;
        let paths = LogPaths::in_dir(dir.path());
        let vars: Vars = serde_json::from_value(json!({
            "/sys/livedata/pv_en": "100.5",
            "/sys/devices/inverter/0/sn": "A",
            "/sys/devices/inverter/0/ltea3phsumKwh": "garbage",
        }))?;
        assert!(record(&paths, "2025-09-30 12:00:00".parse()?, &vars).is_err());
        assert!(!paths.overview.exists());
        assert!(!paths.inverters.exists());
        Ok(())
    }
}
