use anyhow::Result;
use clap::Args;

use super::Context;
use crate::ui::Dashboard;

#[derive(Args)]
pub struct DashboardCommand {}

impl DashboardCommand {
    pub async fn execute(self, ctx: &Context) -> Result<()> {
        let client = ctx.connect()?;

        let mut dashboard = Dashboard::new(client).await?;
        let result = dashboard.run().await;
        dashboard.cleanup()?;

        result
    }
}
