//! Physical table resource and validated guest scalars.

use super::{TableId, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A physical table on the pub floor.
///
/// Room ownership and floor-plan geometry live with the layout collaborator;
/// the scheduling engine needs only identity and seating capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    id: TableId,
    name: String,
    capacity: u16,
}

impl Table {
    /// Creates a table with a display name and seating capacity.
    #[must_use]
    pub fn new(id: TableId, name: impl Into<String>, capacity: u16) -> Self {
        Self {
            id,
            name: name.into(),
            capacity,
        }
    }

    /// Returns the table identifier.
    #[must_use]
    pub const fn id(&self) -> TableId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the seating capacity.
    #[must_use]
    pub const fn capacity(&self) -> u16 {
        self.capacity
    }

    /// Checks that a party fits this table.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::PartyExceedsCapacity`] when the party is
    /// larger than the seating capacity.
    pub const fn admit(&self, party_size: PartySize) -> Result<(), ValidationError> {
        if party_size.value() > self.capacity {
            return Err(ValidationError::PartyExceedsCapacity {
                party_size: party_size.value(),
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

/// Number of guests in a booking, always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartySize(u16);

impl PartySize {
    /// Creates a validated party size.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyParty`] when the value is zero.
    pub const fn new(value: u16) -> Result<Self, ValidationError> {
        if value == 0 {
            return Err(ValidationError::EmptyParty);
        }
        Ok(Self(value))
    }

    /// Returns the underlying count.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for PartySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trimmed, non-empty guest name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestName(String);

impl GuestName {
    /// Creates a validated guest name.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyGuestName`] when the value is empty
    /// after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyGuestName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the guest name as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for GuestName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for GuestName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
