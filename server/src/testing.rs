//! A robot that plays the client side of the protocol, for tests.

use crate::navigation::Direction;
use bytes::BytesMut;
use rover::{frame, keys, Coordinates};
use std::collections::HashSet;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

fn turned_left(direction: Direction) -> Direction {
    match direction {
        Direction::Left => Direction::Down,
        Direction::Up => Direction::Left,
        Direction::Right => Direction::Up,
        Direction::Down => Direction::Right,
    }
}

fn turned_right(direction: Direction) -> Direction {
    match direction {
        Direction::Left => Direction::Up,
        Direction::Up => Direction::Right,
        Direction::Right => Direction::Down,
        Direction::Down => Direction::Left,
    }
}

fn ahead(position: Coordinates, direction: Direction) -> Coordinates {
    match direction {
        Direction::Left => Coordinates::new(position.x - 1, position.y),
        Direction::Up => Coordinates::new(position.x, position.y + 1),
        Direction::Right => Coordinates::new(position.x + 1, position.y),
        Direction::Down => Coordinates::new(position.x, position.y - 1),
    }
}

#[derive(Debug)]
struct Login {
    name: String,
    key_id: String,
    confirmation: Option<String>,
}

#[derive(Debug)]
pub struct Simulator {
    pub position: Coordinates,
    heading: Direction,
    obstacles: HashSet<Coordinates>,
    login: Option<Login>,
    secret: String,
    recharge_every: Option<usize>,
    replies: usize,
    /// Every message the server sent, terminator stripped.
    pub received: Vec<String>,
    pub bumps: usize,
    pub recharges: usize,
}

impl Simulator {
    pub fn new(position: Coordinates, heading: Direction) -> Self {
        Self {
            position,
            heading,
            obstacles: HashSet::new(),
            login: None,
            secret: String::from("Secret message"),
            recharge_every: None,
            replies: 0,
            received: Vec::new(),
            bumps: 0,
            recharges: 0,
        }
    }

    pub fn with_obstacles(mut self, obstacles: &[Coordinates]) -> Self {
        self.obstacles.extend(obstacles.iter().copied());
        self
    }

    /// Opens with a login as `name` using key `key_id`.
    pub fn with_login(mut self, name: &str, key_id: &str) -> Self {
        self.login = Some(Login {
            name: name.to_string(),
            key_id: key_id.to_string(),
            confirmation: None,
        });
        self
    }

    /// Answers the server hash with `confirmation` instead of the right one.
    pub fn with_confirmation(mut self, confirmation: &str) -> Self {
        if let Some(login) = &mut self.login {
            login.confirmation = Some(confirmation.to_string());
        }
        self
    }

    pub fn with_secret(mut self, secret: &str) -> Self {
        self.secret = secret.to_string();
        self
    }

    /// Sends RECHARGING and FULL POWER ahead of every `n`th reply.
    pub fn recharging_every(mut self, n: usize) -> Self {
        self.recharge_every = Some(n);
        self
    }

    /// Plays until the server closes the stream.
    pub async fn drive<S>(mut self, mut stream: S) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        if let Some(name) = self.login.as_ref().map(|login| login.name.clone()) {
            self.reply(&mut stream, &name).await;
        }

        let mut buffer = BytesMut::with_capacity(1024);
        loop {
            let message = loop {
                match frame::decode(&mut buffer, usize::MAX) {
                    Ok(Some(message)) => break message,
                    Ok(None) => match stream.read_buf(&mut buffer).await {
                        Ok(0) | Err(_) => return self,
                        Ok(_) => {}
                    },
                    Err(_) => unreachable!("no limit"),
                }
            };
            self.received.push(message.clone());
            if let Some(reply) = self.respond(&message) {
                self.reply(&mut stream, &reply).await;
            }
        }
    }

    fn respond(&mut self, message: &str) -> Option<String> {
        match message {
            "102 MOVE" => {
                let next = ahead(self.position, self.heading);
                if self.obstacles.contains(&next) {
                    self.bumps += 1;
                } else {
                    self.position = next;
                }
            }
            "103 TURN LEFT" => self.heading = turned_left(self.heading),
            "104 TURN RIGHT" => self.heading = turned_right(self.heading),
            "105 GET MESSAGE" => return Some(self.secret.clone()),
            "107 KEY REQUEST" => return self.login.as_ref().map(|login| login.key_id.clone()),
            server_hash if server_hash.bytes().all(|b| b.is_ascii_digit()) => {
                let login = self.login.as_ref()?;
                if let Some(confirmation) = &login.confirmation {
                    return Some(confirmation.clone());
                }
                let key = keys::lookup(&login.key_id).ok()?;
                let challenge = key.challenge(keys::hash(&login.name));
                return Some(challenge.client.to_string());
            }
            _ => return None,
        }
        Some(format!("OK {} {}", self.position.x, self.position.y))
    }

    async fn reply(&mut self, stream: &mut (impl AsyncWrite + Unpin), text: &str) {
        self.replies += 1;
        let mut buf = Vec::new();
        if let Some(n) = self.recharge_every {
            if self.replies % n == 0 {
                self.recharges += 1;
                frame::encode(rover::message::RECHARGING, &mut buf);
                frame::encode(rover::message::FULL_POWER, &mut buf);
            }
        }
        frame::encode(text, &mut buf);
        // the server may already be gone
        let _ = stream.write_all(&buf).await;
    }
}
