mod auth;
mod config;
mod connection;
mod navigation;
mod session;
#[cfg(test)]
mod testing;

use config::Config;
use session::Session;
use std::{future::Future, io, net::SocketAddr, time::Duration};
use tokio::net::TcpListener;

/// Pause after a failed accept, e.g. when out of file descriptors.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

struct Server {
    listener: TcpListener,
    config: Config,
}

impl Server {
    pub async fn new(config: Config) -> Result<Self, io::Error> {
        let listener = TcpListener::bind(config.address).await?;
        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, io::Error> {
        self.listener.local_addr()
    }

    pub async fn run(self) {
        loop {
            let (stream, peer) = next_connection(|| self.listener.accept()).await;
            let session_id = rover::session::ID::new_v4();
            tracing::info!(id = %session_id, %peer, "Accepted connection");
            let session = Session::new(session_id, stream, self.config);
            tokio::spawn(async move {
                // the outcome is logged by the session itself
                let _ = session.run().await;
            });
        }
    }
}

/// Retries `accept` until it yields a connection, pausing after each failure.
async fn next_connection<S, F, Fut>(mut accept: F) -> (S, SocketAddr)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = io::Result<(S, SocketAddr)>>,
{
    loop {
        match accept().await {
            Ok(accepted) => return accepted,
            Err(err) => {
                tracing::warn!("Could not accept connection: {}", err);
                tokio::time::sleep(ACCEPT_BACKOFF).await;
            }
        }
    }
}

fn init_logging() {
    const LOG_ENV: &str = "RUST_LOG";
    use std::str::FromStr;
    use tracing::Level;
    use tracing_subscriber::EnvFilter;

    let filter = std::env::var(LOG_ENV)
        .map(|env| {
            EnvFilter::from_str(env.as_str())
                .unwrap_or_else(|err| panic!("invalid `{}` environment variable {}", LOG_ENV, err))
        })
        .unwrap_or_else(|_| EnvFilter::default().add_directive(Level::INFO.into()));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let config = Config::from_env()?;
    let server = Server::new(config).await?;
    tracing::info!(address = %server.local_addr()?, "Starting server");
    server.run().await;
    Ok(())
}
