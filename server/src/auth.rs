//! Login handshake: name, key id, then the challenge in both directions.

use crate::{connection::Connection, session::Error};
use rover::{
    frame,
    keys::{self, Challenge},
    message::limits,
    ServerMessage,
};
use tokio::io::{AsyncRead, AsyncWrite};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub challenge: Challenge,
}

#[tracing::instrument(skip(connection))]
pub async fn login<S>(connection: &mut Connection<S>) -> Result<Identity, Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let name = connection.read_raw(limits::USERNAME).await?;
    if name.len() >= limits::USERNAME - 1 {
        return Err(rover::Error::Syntax.into());
    }
    let name = frame::text(&name);

    let key_id = connection.request(ServerMessage::KeyRequest).await?;
    let key = keys::lookup(&key_id)?;
    let challenge = key.challenge(keys::hash(&name));
    tracing::debug!(%name, %key_id, ?challenge, "Sending server hash");

    let confirmation = connection
        .request(ServerMessage::Confirmation(challenge.server))
        .await?;
    if parse_confirmation(&confirmation)? != u32::from(challenge.client) {
        return Err(rover::Error::LoginFailed.into());
    }
    connection.send(ServerMessage::Ok).await?;
    Ok(Identity { name, challenge })
}

/// At most five decimal digits.
fn parse_confirmation(confirmation: &str) -> Result<u32, rover::Error> {
    if confirmation.is_empty()
        || confirmation.len() > 5
        || !confirmation.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(rover::Error::Syntax);
    }
    confirmation.parse().map_err(|_| rover::Error::Syntax)
}
