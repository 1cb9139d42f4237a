use clap::Parser;
use cmd::{context::Ctx, images::Images, release::Release, serve::Serve};
use release_tagger::config::DEFAULT_TARGET_TAG;

mod cmd;

#[derive(Parser, Debug)]
#[clap(version, about = "Inspect an ecr repository and move its release tag", long_about = None)]
struct Args {
    /// Repository uri, e.g. 000000000000.dkr.ecr.ap-northeast-1.amazonaws.com/repository1
    #[arg(short, long, env = "REPOSITORY_URI")]
    repository: String,
    /// Tag moved onto the released image
    #[arg(short, long, default_value = DEFAULT_TARGET_TAG)]
    tag: String,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Parser, Debug)]
enum Commands {
    Serve(Serve),
    Images(Images),
    Release(Release),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let ctx = Ctx::init(&args.repository, &args.tag).await?;

    match args.command {
        Commands::Serve(cmd) => cmd.run(&ctx).await?,
        Commands::Images(cmd) => cmd.run(&ctx).await?,
        Commands::Release(cmd) => cmd.run(&ctx).await?,
    }
    Ok(())
}
