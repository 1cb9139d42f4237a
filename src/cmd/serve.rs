use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;
use release_tagger::server;

use super::context::Ctx;

#[derive(Parser, Debug)]
#[command(version, about = "Serve the image list and release api over http", long_about = None)]
pub struct Serve {
    #[arg(short, long, default_value_t = 18080)]
    port: u16,
    #[arg(short, long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    bind: IpAddr,
}

impl Serve {
    pub async fn run(&self, ctx: &Ctx) -> anyhow::Result<()> {
        let addr = SocketAddr::new(self.bind, self.port);
        server::serve(ctx.service().clone(), addr).await?;
        Ok(())
    }
}
