use crate::ServerMessage;

/// Protocol-level failures. Every variant is reported to the client before the
/// connection is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("syntax error")]
    Syntax,
    #[error("login failed")]
    LoginFailed,
    #[error("logic error")]
    Logic,
    #[error("key out of range")]
    KeyOutOfRange,
}

impl Error {
    pub fn reply(&self) -> ServerMessage {
        match self {
            Self::Syntax => ServerMessage::SyntaxError,
            Self::LoginFailed => ServerMessage::LoginFailed,
            Self::Logic => ServerMessage::LogicError,
            Self::KeyOutOfRange => ServerMessage::KeyOutOfRange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies() {
        assert_eq!(Error::Syntax.reply().text(), "301 SYNTAX ERROR");
        assert_eq!(Error::LoginFailed.reply().text(), "300 LOGIN FAILED");
        assert_eq!(Error::Logic.reply().text(), "302 LOGIC ERROR");
        assert_eq!(Error::KeyOutOfRange.reply().text(), "303 KEY OUT OF RANGE");
    }
}
