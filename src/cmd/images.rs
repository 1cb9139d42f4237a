use clap::Parser;

use super::context::Ctx;

#[derive(Parser, Debug)]
#[command(version, about = "List the tagged images in the repository", long_about = None)]
pub struct Images {}

impl Images {
    pub async fn run(&self, ctx: &Ctx) -> anyhow::Result<()> {
        let images = ctx.service().images().await?;
        println!("{}", serde_json::to_string_pretty(&images)?);
        Ok(())
    }
}
