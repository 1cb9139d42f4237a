use clap::Parser;

use super::context::Ctx;

#[derive(Parser, Debug)]
#[command(version, about = "Move the release tag onto the image carrying a tag", long_about = None)]
pub struct Release {
    /// Tag currently on the image to release
    source_tag: String,
}

impl Release {
    pub async fn run(&self, ctx: &Ctx) -> anyhow::Result<()> {
        let service = ctx.service();
        service.release(&self.source_tag).await?;
        let images = service.images().await?;
        println!("{}", serde_json::to_string_pretty(&images)?);
        Ok(())
    }
}
