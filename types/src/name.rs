//! Account names and permission levels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::NameError;

/// An account identity on the host ledger (dapp, oracle, payer, contract).
///
/// Names follow the host's base32 alphabet: 1 to 12 characters drawn from
/// `a-z`, `1-5` and `.`, never ending in a dot.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Name(String);

impl Name {
    pub const MAX_LEN: usize = 12;

    /// Parse and validate a name.
    pub fn parse(raw: impl Into<String>) -> Result<Self, NameError> {
        let s = raw.into();
        if s.is_empty() || s.len() > Self::MAX_LEN {
            return Err(NameError::InvalidLength { len: s.len() });
        }
        if let Some(ch) = s.chars().find(|c| !Self::is_name_char(*c)) {
            return Err(NameError::InvalidCharacter { name: s, ch });
        }
        if s.ends_with('.') {
            return Err(NameError::TrailingDot(s));
        }
        Ok(Self(s))
    }

    fn is_name_char(c: char) -> bool {
        c.is_ascii_lowercase() || ('1'..='5').contains(&c) || c == '.'
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `active` permission of this account.
    pub fn active(&self) -> PermissionLevel {
        PermissionLevel {
            actor: self.clone(),
            permission: Name(PermissionLevel::ACTIVE.to_string()),
        }
    }

    /// A named permission of this account.
    pub fn permission(&self, permission: &str) -> Result<PermissionLevel, NameError> {
        Ok(PermissionLevel {
            actor: self.clone(),
            permission: Name::parse(permission)?,
        })
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Name {
    type Err = NameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Name {
    type Error = NameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Name> for String {
    fn from(name: Name) -> Self {
        name.0
    }
}

/// An `actor@permission` pair presented as authorization for an action.
///
/// Serialized as its `actor@permission` text.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PermissionLevel {
    pub actor: Name,
    pub permission: Name,
}

impl PermissionLevel {
    pub const ACTIVE: &'static str = "active";
    pub const OWNER: &'static str = "owner";

    pub fn new(actor: Name, permission: Name) -> Self {
        Self { actor, permission }
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.actor, self.permission)
    }
}

impl FromStr for PermissionLevel {
    type Err = NameError;

    /// Parses `actor@permission`; a bare `actor` means `actor@active`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('@') {
            Some((actor, permission)) => Ok(Self {
                actor: actor.parse()?,
                permission: permission.parse()?,
            }),
            None if !s.is_empty() => Ok(s.parse::<Name>()?.active()),
            None => Err(NameError::InvalidPermissionLevel(s.to_string())),
        }
    }
}

impl TryFrom<String> for PermissionLevel {
    type Error = NameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<PermissionLevel> for String {
    fn from(level: PermissionLevel) -> Self {
        level.to_string()
    }
}
