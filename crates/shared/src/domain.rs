use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(TicketId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Dean,
    Faculty,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Dean => "dean",
            Role::Faculty => "faculty",
            Role::Student => "student",
        }
    }

    pub fn is_staff(self) -> bool {
        matches!(self, Role::Dean | Role::Faculty)
    }

    /// Status changes on tickets.
    pub fn can_manage_tickets(self) -> bool {
        self.is_staff()
    }

    /// Priority changes and assignment.
    pub fn can_triage_tickets(self) -> bool {
        self == Role::Dean
    }

    pub fn can_manage_faculty(self) -> bool {
        self == Role::Dean
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    #[default]
    Pending,
    Processing,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Academic,
    Facility,
    Administrative,
    Technical,
    #[serde(other)]
    Other,
}

macro_rules! str_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "unknown {} '{other}'",
                        stringify!($name).to_ascii_lowercase()
                    )),
                }
            }
        }
    };
}

str_enum!(Priority {
    Low => "low",
    Medium => "medium",
    High => "high",
});

str_enum!(TicketStatus {
    Pending => "pending",
    Processing => "processing",
    Resolved => "resolved",
});

str_enum!(Category {
    Academic => "academic",
    Facility => "facility",
    Administrative => "administrative",
    Technical => "technical",
    Other => "other",
});
