use crate::{
    auth::{self, Identity},
    config::Config,
    connection::Connection,
    navigation::Robot,
};
use rover::{session::ID, ServerMessage};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("protocol: {0}")]
    Protocol(#[from] rover::Error),
    #[error("io: {0}")]
    IO(#[from] std::io::Error),
    #[error("IO has been closed")]
    Closed,
    #[error("no reply within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Connected,
    Authenticating,
    Locating,
    Navigating,
    Retrieving,
    Completed,
    Failed,
}

/// One robot, from the first byte it sends until the connection is closed.
#[derive(Debug)]
pub struct Session<S> {
    pub id: ID,
    connection: Connection<S>,
    config: Config,
    state: State,
    identity: Option<Identity>,
    robot: Robot,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(id: ID, stream: S, config: Config) -> Self {
        Self {
            id,
            connection: Connection::new(stream, &config),
            config,
            state: State::Connected,
            identity: None,
            robot: Robot::default(),
        }
    }

    /// Runs the whole exchange and closes the stream, whatever the outcome.
    /// Returns the secret message picked up at the origin.
    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub async fn run(mut self) -> Result<String, Error> {
        let result = self.exchange().await;
        match &result {
            Ok(secret) => {
                let name = self.identity.as_ref().map(|identity| identity.name.as_str());
                tracing::info!(?name, %secret, "Picked up the secret message");
            }
            Err(Error::Protocol(err)) => {
                tracing::warn!(state = ?self.state, "Protocol error: {}", err);
                if let Err(err) = self.connection.send(err.reply()).await {
                    tracing::debug!("Could not report the error: {}", err);
                }
            }
            Err(err) => tracing::warn!(state = ?self.state, "Connection failed: {}", err),
        }
        if result.is_err() {
            self.transition(State::Failed);
        }
        if let Err(err) = self.connection.shutdown().await {
            tracing::debug!("Could not close the connection: {}", err);
        }
        result
    }

    async fn exchange(&mut self) -> Result<String, Error> {
        self.transition(State::Authenticating);
        let identity = auth::login(&mut self.connection).await?;
        tracing::info!(name = %identity.name, "Robot logged in");
        self.identity = Some(identity);

        self.transition(State::Locating);
        self.robot.locate(&mut self.connection).await?;

        self.transition(State::Navigating);
        self.robot
            .to_origin(&mut self.connection, &self.config)
            .await?;

        self.transition(State::Retrieving);
        let secret = self.connection.request(ServerMessage::PickUp).await?;
        self.connection.send(ServerMessage::Logout).await?;
        self.transition(State::Completed);
        Ok(secret)
    }

    fn transition(&mut self, state: State) {
        tracing::debug!(from = ?self.state, to = ?state, "Session state changed");
        self.state = state;
    }
}
