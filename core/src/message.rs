use crate::{frame, Error};
use bytes::BufMut;
use std::{borrow::Cow, fmt, str::FromStr};

/// Reply size limits, terminator included.
pub mod limits {
    pub const USERNAME: usize = 20;
    pub const KEY_ID: usize = 5;
    pub const CONFIRMATION: usize = 7;
    pub const OK: usize = 12;
    pub const MESSAGE: usize = 100;
    pub const FULL_POWER: usize = 12;
}

/// Client notifications that may show up in place of any reply.
pub const RECHARGING: &str = "RECHARGING";
pub const FULL_POWER: &str = "FULL POWER";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerMessage {
    Move,
    TurnLeft,
    TurnRight,
    PickUp,
    Logout,
    KeyRequest,
    /// Server half of the login challenge.
    Confirmation(u16),
    Ok,
    LoginFailed,
    SyntaxError,
    LogicError,
    KeyOutOfRange,
}

impl ServerMessage {
    pub fn text(&self) -> Cow<'static, str> {
        let text = match self {
            Self::Move => "102 MOVE",
            Self::TurnLeft => "103 TURN LEFT",
            Self::TurnRight => "104 TURN RIGHT",
            Self::PickUp => "105 GET MESSAGE",
            Self::Logout => "106 LOGOUT",
            Self::KeyRequest => "107 KEY REQUEST",
            Self::Confirmation(hash) => return Cow::Owned(hash.to_string()),
            Self::Ok => "200 OK",
            Self::LoginFailed => "300 LOGIN FAILED",
            Self::SyntaxError => "301 SYNTAX ERROR",
            Self::LogicError => "302 LOGIC ERROR",
            Self::KeyOutOfRange => "303 KEY OUT OF RANGE",
        };
        Cow::Borrowed(text)
    }

    /// Longest reply the client may send back, if one is expected.
    pub fn reply_limit(&self) -> Option<usize> {
        match self {
            Self::Move | Self::TurnLeft | Self::TurnRight => Some(limits::OK),
            Self::PickUp => Some(limits::MESSAGE),
            Self::KeyRequest => Some(limits::KEY_ID),
            Self::Confirmation(_) => Some(limits::CONFIRMATION),
            _ => None,
        }
    }

    pub fn serialize(&self, buf: impl BufMut) {
        frame::encode(&self.text(), buf)
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Coordinates {
    pub x: i32,
    pub y: i32,
}

impl Coordinates {
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.x, self.y)
    }
}

/// Parses an `OK <x> <y>` reply.
impl FromStr for Coordinates {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(' ');
        let (ok, x, y) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(ok), Some(x), Some(y), None) => (ok, x, y),
            _ => return Err(Error::Syntax),
        };
        if ok != "OK" {
            return Err(Error::Syntax);
        }
        let x = x.parse().map_err(|_| Error::Syntax)?;
        let y = y.parse().map_err(|_| Error::Syntax)?;
        Ok(Self { x, y })
    }
}
