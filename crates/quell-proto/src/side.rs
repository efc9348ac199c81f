//! Endpoint roles.

/// Which end of a connection this endpoint is.
///
/// Fixed for the lifetime of the endpoint. Selects which directional
/// secret backs the sealer and which backs the opener, exactly once at
/// construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The endpoint that initiates the connection.
    Client,
    /// The endpoint that accepts the connection.
    Server,
}

impl Side {
    /// The peer's side.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Client => Self::Server,
            Self::Server => Self::Client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_flips() {
        assert_eq!(Side::Client.opposite(), Side::Server);
        assert_eq!(Side::Server.opposite(), Side::Client);
    }

    #[test]
    fn opposite_is_involution() {
        for side in [Side::Client, Side::Server] {
            assert_eq!(side.opposite().opposite(), side);
        }
    }
}
