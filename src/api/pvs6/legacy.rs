//! Older `dl_cgi` protocol, still served on the installer LAN port.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::prelude::*;

pub struct Client {
    inner: reqwest::Client,
    url: Url,
}

impl Client {
    pub fn new(host: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(&format!("http://{host}/cgi-bin/dl_cgi?Command=DeviceList"))
            .with_context(|| format!("invalid gateway host `{host}`"))?;
        let inner = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { inner, url })
    }

    #[instrument(skip_all, fields(url = %self.url))]
    pub async fn get_device_list(&self) -> Result<DeviceList> {
        info!("querying…");
        let device_list: DeviceList = self
            .inner
            .get(self.url.clone())
            .send()
            .await
            .with_context(|| format!("failed to request the device list from `{}`", self.url))?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("failed to deserialize the response from `{}`", self.url))?;
        ensure!(
            device_list.result == "succeed",
            "the gateway returned `{}` instead of the device list",
            device_list.result,
        );
        info!(n_devices = device_list.devices.len(), "fetched");
        Ok(device_list)
    }
}

#[must_use]
#[derive(Deserialize)]
pub struct DeviceList {
    #[serde(default)]
    pub result: String,

    #[serde(default)]
    pub devices: Vec<Device>,
}

impl DeviceList {
    pub fn inverters(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().filter(|device| device.description.contains("Inverter"))
    }
}

#[must_use]
#[derive(Deserialize)]
pub struct Device {
    #[serde(rename = "DESCR", default)]
    pub description: String,

    #[serde(rename = "STATEDESCR", default = "Device::unknown_state")]
    pub state_description: String,
}

impl Device {
    fn unknown_state() -> String {
        "Unknown".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_list_ok() -> Result {
        // language=json
        let body = r#"{
            "devices": [
                {
                    "DETAIL": "detail",
                    "STATE": "working",
                    "STATEDESCR": "Working",
                    "SERIAL": "ZT01234567890",
                    "MODEL": "PV Supervisor PVS6",
                    "DESCR": "PV Supervisor ZT01234567890",
                    "DEVICE_TYPE": "PVS"
                },
                {
                    "STATE": "working",
                    "STATEDESCR": "Working",
                    "SERIAL": "E00122142080335",
                    "DESCR": "Inverter E00122142080335",
                    "DEVICE_TYPE": "Inverter",
                    "p_3phsum_kw": "0.265",
                    "ltea_3phsum_kwh": "2671.548"
                },
                {
                    "SERIAL": "E00122142080336",
                    "DESCR": "Inverter E00122142080336",
                    "DEVICE_TYPE": "Inverter"
                }
            ],
            "result": "succeed"
        }"#;
        let device_list: DeviceList = serde_json::from_str(body)?;
        assert_eq!(device_list.result, "succeed");
        let states: Vec<_> =
            device_list.inverters().map(|device| device.state_description.as_str()).collect();
        assert_eq!(states, ["Working", "Unknown"]);
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires the gateway on the local network"]
    async fn get_device_list_ok() -> Result {
        let host = std::env::var("PVS6_HOST")?;
        let device_list = Client::new(&host, Duration::from_secs(10))?.get_device_list().await?;
        assert!(device_list.inverters().next().is_some());
        Ok(())
    }
}
