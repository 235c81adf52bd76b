use clap::Parser;

use crate::{api::pvs6, prelude::*};

#[derive(Parser)]
pub struct GatewayArgs {
    /// Gateway address on the LAN.
    #[clap(long = "pvs6-host", env = "PVS6_HOST", default_value = "172.27.153.1")]
    pub host: String,

    #[clap(long = "pvs6-timeout", env = "PVS6_TIMEOUT", default_value = "10s")]
    pub timeout: humantime::Duration,
}

impl GatewayArgs {
    pub fn legacy_client(&self) -> Result<pvs6::legacy::Client> {
        pvs6::legacy::Client::new(&self.host, self.timeout.into())
    }
}
