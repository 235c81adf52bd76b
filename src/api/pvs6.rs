//! PVS6 gateway VarServer protocol.

pub mod legacy;

use std::time::Duration;

use reqwest::{Client as HttpClient, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    logs::{inverters::InverterRecord, overview::OverviewRecord},
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts},
    timestamp::Timestamp,
};

pub struct Client {
    inner: HttpClient,
    base_url: Url,
    serial_suffix: String,
}

impl Client {
    pub fn new(host: &str, serial_suffix: String, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(&format!("https://{host}/"))
            .with_context(|| format!("invalid gateway host `{host}`"))?;
        let inner = HttpClient::builder()
            .timeout(timeout)
            .cookie_store(true)
            .danger_accept_invalid_certs(true) // self-signed
            .build()?;
        Ok(Self { inner, base_url, serial_suffix })
    }

    #[instrument(skip_all, fields(url = %self.base_url))]
    pub async fn login(&self) -> Result {
        info!("logging in…");
        let mut url = self.base_url.join("auth")?;
        url.set_query(Some("login"));
        self.inner
            .get(url)
            .basic_auth("ssm_owner", Some(&self.serial_suffix))
            .send()
            .await
            .context("failed to log in to the gateway")?
            .error_for_status()
            .context("the gateway rejected the login")?;
        Ok(())
    }

    #[instrument(skip_all, fields(url = %self.base_url))]
    pub async fn get_vars(&self) -> Result<Vars> {
        let mut url = self.base_url.join("vars")?;
        url.query_pairs_mut().append_pair("match", "/").append_pair("fmt", "obj");
        let vars: Vars = self
            .inner
            .get(url)
            .send()
            .await
            .context("failed to request the variables")?
            .error_for_status()?
            .json()
            .await
            .context("failed to deserialize the variables")?;
        info!(n_vars = vars.0.len(), "fetched");
        Ok(vars)
    }
}

/// Flat map of path-like variable names to scalar values.
#[must_use]
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vars(pub Map<String, Value>);

impl Vars {
    /// Read a numeric variable, treating a missing one as zero.
    fn number(&self, key: &str) -> Result<f64> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(0.0),
            Some(Value::Number(number)) => {
                number.as_f64().with_context(|| format!("`{key}` is out of range"))
            }
            Some(Value::String(string)) if string.trim().is_empty() => Ok(0.0),
            Some(Value::String(string)) => string
                .trim()
                .parse()
                .with_context(|| format!("`{key}` is not a number: `{string}`")),
            Some(value) => bail!("`{key}` is not a number: `{value}`"),
        }
    }

    fn energy(&self, key: &str) -> Result<KilowattHours> {
        self.number(key).map(KilowattHours)
    }

    fn power(&self, key: &str) -> Result<Kilowatts> {
        self.number(key).map(Kilowatts)
    }

    pub fn overview(&self, timestamp: Timestamp) -> Result<OverviewRecord> {
        Ok(OverviewRecord::builder()
            .timestamp(timestamp)
            .lifetime_production(self.energy("/sys/livedata/pv_en")?)
            .lifetime_consumption(self.energy("/sys/livedata/site_load_en")?)
            .lifetime_net(self.energy("/sys/livedata/net_en")?)
            .production(self.power("/sys/livedata/pv_p")?)
            .consumption(self.power("/sys/livedata/site_load_p")?)
            .net_power(self.power("/sys/livedata/net_p")?)
            .build())
    }

    /// Walk the inverter indices until the first missing serial number.
    pub fn inverters(&self, timestamp: Timestamp) -> Result<Vec<InverterRecord>> {
        let mut inverters = Vec::new();
        for index in 0_usize.. {
            let prefix = format!("/sys/devices/inverter/{index}");
            let Some(serial) = self.0.get(&format!("{prefix}/sn")) else {
                break;
            };
            let serial = match serial {
                Value::String(serial) => serial.clone(),
                other => other.to_string(),
            };
            let power = self.power(&format!("{prefix}/p3phsumKw"))?;
            inverters.push(
                InverterRecord::builder()
                    .timestamp(timestamp)
                    .serial(serial)
                    .state(if power.is_producing() { "working" } else { "idle" })
                    .power(power)
                    .lifetime_energy(self.energy(&format!("{prefix}/ltea3phsumKwh"))?)
                    .build(),
            );
        }
        Ok(inverters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // language=json
    const RESPONSE: &str = r#"{
        "/sys/info/sw_rev": "2025.09",
        "/sys/livedata/pv_en": "12345.678",
        "/sys/livedata/pv_p": "3.25",
        "/sys/livedata/site_load_en": 9876.5,
        "/sys/livedata/site_load_p": "1.5",
        "/sys/livedata/net_en": "-2469.178",
        "/sys/devices/inverter/0/sn": "E00122142080335",
        "/sys/devices/inverter/0/p3phsumKw": "0.265",
        "/sys/devices/inverter/0/ltea3phsumKwh": "2671.548",
        "/sys/devices/inverter/1/sn": "E00122142080336",
        "/sys/devices/inverter/1/p3phsumKw": "0",
        "/sys/devices/inverter/1/ltea3phsumKwh": "2660.1",
        "/sys/devices/inverter/3/sn": "E00122142080338"
    }"#;

    #[test]
    fn overview_ok() -> Result {
        let vars: Vars = serde_json::from_str(RESPONSE)?;
        let overview = vars.overview("2025-09-30 11:58:22".parse()?)?;
        assert_eq!(overview.lifetime_production, KilowattHours(12345.678));
        assert_eq!(overview.lifetime_consumption, KilowattHours(9876.5));
        assert_eq!(overview.lifetime_net, KilowattHours(-2469.178));
        assert_eq!(overview.production, Kilowatts(3.25));
        assert_eq!(overview.net_power, Kilowatts::ZERO, "missing reads as zero");
        Ok(())
    }

    #[test]
    fn inverters_stop_at_the_first_gap() -> Result {
        let vars: Vars = serde_json::from_str(RESPONSE)?;
        let inverters = vars.inverters("2025-09-30 11:58:22".parse()?)?;
        assert_eq!(inverters.len(), 2);
        assert_eq!(inverters[0].serial, "E00122142080335");
        assert_eq!(inverters[0].state, "working");
        assert_eq!(inverters[0].lifetime_energy, KilowattHours(2671.548));
        assert_eq!(inverters[1].state, "idle");
        Ok(())
    }

    #[test]
    fn garbage_value_is_an_error() -> Result {
        let vars: Vars = serde_json::from_str(r#"{ "/sys/livedata/pv_en": "lots" }"#)?;
        assert!(vars.overview("2025-09-30 11:58:22".parse()?).is_err());
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires the gateway on the local network"]
    async fn get_vars_ok() -> Result {
        let host = std::env::var("PVS6_HOST")?;
        let serial_suffix = std::env::var("PVS6_SERIAL_LAST5")?;
        let client = Client::new(&host, serial_suffix, Duration::from_secs(10))?;
        client.login().await?;
        let vars = client.get_vars().await?;
        assert!(!vars.inverters(Timestamp::now())?.is_empty());
        Ok(())
    }
}
