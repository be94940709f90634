use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = crate::error::DayflowError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| crate::error::DayflowError::InvalidId(s.to_string()))
            }
        }
    };
}

entity_id!(
    /// Identifies the user who owns an entity; every query is scoped by it
    OwnerId
);
entity_id!(
    /// Unique identifier for a habit
    HabitId
);
entity_id!(
    /// Unique identifier for a kanban board
    BoardId
);
entity_id!(
    /// Unique identifier for a column within a board
    ColumnId
);
entity_id!(
    /// Unique identifier for a card within a column
    CardId
);
