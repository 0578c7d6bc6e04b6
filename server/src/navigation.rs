//! Steering the robot to the origin.
//!
//! The robot only ever reports its position. Its heading is inferred from the
//! difference between two consecutive positions, so turns alone never change
//! what we believe the heading to be.

use crate::{config::Config, connection::Connection, session::Error};
use rover::{Coordinates, ServerMessage};
use tokio::io::{AsyncRead, AsyncWrite};

/// Clockwise order matters: see [`turns`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Up,
    Right,
    Down,
}

impl Direction {
    fn index(self) -> u8 {
        match self {
            Self::Left => 0,
            Self::Up => 1,
            Self::Right => 2,
            Self::Down => 3,
        }
    }

    /// Direction of travel between two positions. Horizontal movement wins.
    pub fn of_delta(from: Coordinates, to: Coordinates) -> Option<Self> {
        if to.x > from.x {
            Some(Self::Right)
        } else if to.x < from.x {
            Some(Self::Left)
        } else if to.y > from.y {
            Some(Self::Up)
        } else if to.y < from.y {
            Some(Self::Down)
        } else {
            None
        }
    }
}

/// Turn commands that align `heading` with `target`. An unknown heading is
/// taken as already aligned.
pub fn turns(heading: Option<Direction>, target: Direction) -> &'static [ServerMessage] {
    const NONE: &[ServerMessage] = &[];
    const RIGHT: &[ServerMessage] = &[ServerMessage::TurnRight];
    const LEFT: &[ServerMessage] = &[ServerMessage::TurnLeft];
    const ABOUT: &[ServerMessage] = &[ServerMessage::TurnLeft, ServerMessage::TurnLeft];

    let heading = match heading {
        Some(heading) => heading,
        None => return NONE,
    };
    match (target.index() + 4 - heading.index()) % 4 {
        0 => NONE,
        1 => RIGHT,
        2 => ABOUT,
        _ => LEFT,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

impl Axis {
    fn of(self, position: Coordinates) -> i32 {
        match self {
            Self::X => position.x,
            Self::Y => position.y,
        }
    }

    fn toward_origin(self, position: Coordinates) -> Option<Direction> {
        let (negative, positive) = match self {
            Self::X => (Direction::Right, Direction::Left),
            Self::Y => (Direction::Up, Direction::Down),
        };
        match self.of(position) {
            value if value < 0 => Some(negative),
            value if value > 0 => Some(positive),
            _ => None,
        }
    }
}

enum Approach {
    Arrived,
    Blocked,
}

/// What the server believes about the robot.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Robot {
    pub position: Option<Coordinates>,
    pub heading: Option<Direction>,
    /// Commands sent so far.
    commands: usize,
}

impl Robot {
    /// Records a reported position. The first report only sets the position.
    pub fn observe(&mut self, position: Coordinates) {
        if let Some(previous) = self.position.replace(position) {
            if let Some(direction) = Direction::of_delta(previous, position) {
                self.heading = Some(direction);
            }
        }
    }

    async fn command<S>(
        &mut self,
        connection: &mut Connection<S>,
        message: ServerMessage,
    ) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        self.commands += 1;
        let position = connection
            .request(message)
            .await?
            .parse::<Coordinates>()?;
        self.observe(position);
        tracing::debug!(%position, heading = ?self.heading, "{}", message);
        Ok(())
    }

    /// Two unconditional moves, enough to learn the heading unless blocked.
    pub async fn locate<S>(&mut self, connection: &mut Connection<S>) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        for _ in 0..2 {
            self.command(connection, ServerMessage::Move).await?;
        }
        Ok(())
    }

    /// Turns towards `direction` and moves once.
    pub async fn step<S>(
        &mut self,
        connection: &mut Connection<S>,
        direction: Direction,
    ) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        for turn in turns(self.heading, direction) {
            self.command(connection, *turn).await?;
        }
        self.command(connection, ServerMessage::Move).await
    }

    /// Drives the robot to [`Coordinates::ORIGIN`], first along x, then along y.
    ///
    /// Every obstacle is sidestepped and the whole approach starts over from
    /// wherever the robot ended up. More than `max_obstacles` detours, or
    /// running out of `max_commands`, is a logic error.
    pub async fn to_origin<S>(
        &mut self,
        connection: &mut Connection<S>,
        config: &Config,
    ) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut obstacles = 0;
        loop {
            match self.approach(connection, config.max_commands).await? {
                Approach::Arrived => return Ok(()),
                Approach::Blocked if obstacles >= config.max_obstacles => {
                    tracing::warn!(obstacles, "Too many obstacles");
                    return Err(rover::Error::Logic.into());
                }
                Approach::Blocked => {
                    obstacles += 1;
                    self.bypass(connection).await?;
                }
            }
        }
    }

    async fn approach<S>(
        &mut self,
        connection: &mut Connection<S>,
        max_commands: usize,
    ) -> Result<Approach, Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        for axis in [Axis::X, Axis::Y].iter().copied() {
            loop {
                let position = self.position.ok_or(rover::Error::Logic)?;
                let direction = match axis.toward_origin(position) {
                    Some(direction) => direction,
                    None => break,
                };
                if self.commands >= max_commands {
                    tracing::warn!(commands = self.commands, %position, "Not getting any closer");
                    return Err(rover::Error::Logic.into());
                }
                let before = axis.of(position);
                let heading = self.heading;
                self.step(connection, direction).await?;

                let after = self.position.ok_or(rover::Error::Logic)?;
                if axis.of(after) == before {
                    self.heading = heading;
                    tracing::info!(position = %after, ?direction, "Bumped into an obstacle");
                    return Ok(Approach::Blocked);
                }
            }
        }
        Ok(Approach::Arrived)
    }

    /// One step sideways and one step forward.
    async fn bypass<S>(&mut self, connection: &mut Connection<S>) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        for message in [
            ServerMessage::TurnLeft,
            ServerMessage::Move,
            ServerMessage::TurnRight,
            ServerMessage::Move,
        ]
        .iter()
        .copied()
        {
            self.command(connection, message).await?;
        }
        tracing::info!(position = ?self.position, "Went around an obstacle");
        Ok(())
    }
}
