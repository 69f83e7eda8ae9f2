//! Process configuration, read once at startup from flags or environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "lonaire")]
#[command(about = "LONAIRE catalog backend")]
pub struct Config {
    /// Document store connection string (memory://, sqlite://PATH, PATH.db)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Database name reported by the diagnostics endpoint
    #[arg(long, env = "DATABASE_NAME", default_value = "lonaire")]
    pub database_name: String,

    /// Address to listen on
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Configuration with every default and the given connection string.
    pub fn with_database_url(url: Option<&str>) -> Self {
        Self {
            database_url: url.map(str::to_owned),
            database_name: "lonaire".to_owned(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            verbose: false,
        }
    }
}
