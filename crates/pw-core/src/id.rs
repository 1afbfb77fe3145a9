use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! short_uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random ID.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", &self.0.to_string()[..8])
            }
        }
    };
}

short_uuid_id!(
    /// Identity of an event.
    EventId
);

short_uuid_id!(
    /// Identity of a property. Payload stamps are keyed by this.
    PropertyId
);

short_uuid_id!(
    /// Identity of a game object in a context roster.
    GameObjectId
);
