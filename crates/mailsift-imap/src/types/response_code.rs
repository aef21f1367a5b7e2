//! Bracketed response codes (`[UIDVALIDITY 42]` and friends).

use super::{Flag, SeqNum, Uid, UidValidity};

/// Response code carried by a status response.
///
/// Only the codes a SELECT/EXAMINE session needs are modelled; everything
/// else is kept as its raw name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    /// `ALERT`
    Alert,
    /// `PERMANENTFLAGS (...)`
    PermanentFlags(Vec<Flag>),
    /// `READ-ONLY`
    ReadOnly,
    /// `READ-WRITE`
    ReadWrite,
    /// `TRYCREATE`
    TryCreate,
    /// `UIDNEXT n`
    UidNext(Uid),
    /// `UIDVALIDITY n`
    UidValidity(UidValidity),
    /// `UNSEEN n`
    Unseen(SeqNum),
    /// Any other code, by name.
    Unknown(String),
}

impl ResponseCode {
    /// Maps a code name that carries no arguments.
    #[must_use]
    pub fn from_atom(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "ALERT" => Self::Alert,
            "READ-ONLY" => Self::ReadOnly,
            "READ-WRITE" => Self::ReadWrite,
            "TRYCREATE" => Self::TryCreate,
            _ => Self::Unknown(name.to_string()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn atom_codes() {
        assert_eq!(ResponseCode::from_atom("read-only"), ResponseCode::ReadOnly);
        assert_eq!(ResponseCode::from_atom("ALERT"), ResponseCode::Alert);
        assert_eq!(
            ResponseCode::from_atom("CAPABILITY"),
            ResponseCode::Unknown("CAPABILITY".to_string())
        );
    }

    #[test]
    fn numeric_code_holds_value() {
        let code = ResponseCode::UidValidity(UidValidity::new(3_857_529_045).unwrap());
        match code {
            ResponseCode::UidValidity(v) => assert_eq!(v.get(), 3_857_529_045),
            other => panic!("unexpected {other:?}"),
        }
    }
}
