use clap::Parser;

use crate::{cli::gateway::GatewayArgs, prelude::*, tables::build_device_status_table};

#[derive(Parser)]
pub struct StatusArgs {
    #[clap(flatten)]
    gateway: GatewayArgs,
}

impl StatusArgs {
    pub async fn run(self) -> Result {
        let device_list = self.gateway.legacy_client()?.get_device_list().await?;
        let n_inverters = device_list.inverters().count();
        if n_inverters == 0 {
            warn!("the gateway reported no inverters");
        }
        println!("{}", build_device_status_table(&device_list));
        info!(n_inverters, "total");
        Ok(())
    }
}
