use crate::{config::Config, session::Error};
use bytes::BytesMut;
use rover::{
    frame,
    message::{limits, FULL_POWER, RECHARGING},
    ServerMessage,
};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// A client stream plus the bytes read from it that are not yet part of a
/// returned frame.
#[derive(Debug)]
pub struct Connection<S> {
    stream: S,
    buffer: BytesMut,
    read_timeout: Duration,
    recharge_timeout: Duration,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, config: &Config) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(1024),
            read_timeout: config.read_timeout,
            recharge_timeout: config.recharge_timeout,
        }
    }

    pub async fn send(&mut self, message: ServerMessage) -> Result<(), Error> {
        let mut buf = Vec::with_capacity(32);
        message.serialize(&mut buf);
        self.stream.write_all(&buf).await?;
        self.stream.flush().await?;
        tracing::trace!("Sent: {}", message);
        Ok(())
    }

    /// Sends `message` and waits for the client's reply to it.
    pub async fn request(&mut self, message: ServerMessage) -> Result<String, Error> {
        let limit = message.reply_limit().ok_or(rover::Error::Logic)?;
        self.send(message).await?;
        self.read_frame(limit).await
    }

    /// Reads the next frame of at most `limit` bytes, absorbing any recharge
    /// exchange in front of it.
    pub async fn read_frame(&mut self, limit: usize) -> Result<String, Error> {
        let frame = self.read_raw(limit).await?;
        Ok(frame::text(&frame))
    }

    /// [`Connection::read_frame`], without decoding the bytes as text.
    pub async fn read_raw(&mut self, limit: usize) -> Result<BytesMut, Error> {
        loop {
            match frame::decode_raw(&mut self.buffer, limit)? {
                Some(frame) if frame == RECHARGING => self.recharge().await?,
                Some(frame) if frame == FULL_POWER => {
                    tracing::debug!("Full power without recharging");
                    return Err(rover::Error::Logic.into());
                }
                Some(frame) => {
                    tracing::trace!("Received: {:?}", frame);
                    return Ok(frame);
                }
                None => self.fill(self.read_timeout).await?,
            }
        }
    }

    /// Waits for FULL POWER. Nothing else may arrive in the meantime.
    async fn recharge(&mut self) -> Result<(), Error> {
        tracing::debug!("Robot is recharging");
        loop {
            match frame::decode_raw(&mut self.buffer, limits::FULL_POWER) {
                Ok(Some(frame)) if frame == FULL_POWER => {
                    tracing::debug!("Robot is fully charged");
                    return Ok(());
                }
                Ok(Some(frame)) => {
                    tracing::debug!("Expected full power, received {:?}", frame);
                    return Err(rover::Error::Logic.into());
                }
                Err(_) => return Err(rover::Error::Logic.into()),
                Ok(None) => self.fill(self.recharge_timeout).await?,
            }
        }
    }

    async fn fill(&mut self, deadline: Duration) -> Result<(), Error> {
        let n = tokio::time::timeout(deadline, self.stream.read_buf(&mut self.buffer))
            .await
            .map_err(|_| Error::Timeout(deadline))??;
        if n == 0 {
            return Err(Error::Closed);
        }
        Ok(())
    }

    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        self.stream.shutdown().await
    }
}
