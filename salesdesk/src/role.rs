use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of role tokens stored in `user_roles.role`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "manager")]
    Manager,
    #[serde(rename = "tl")]
    TeamLeader,
    #[serde(rename = "de")]
    DistributionExecutive,
    #[serde(rename = "dsr")]
    #[default]
    DirectSalesRep,
}

/// Display data for one role: the token, its label and the badge classes the
/// admin UI renders it with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleStyle {
    pub role: Role,
    pub token: &'static str,
    pub label: &'static str,
    pub badge: &'static str,
    /// Whether the role editor offers this role.
    pub editable: bool,
}

const ROLE_STYLES: [RoleStyle; 5] = [
    RoleStyle {
        role: Role::Admin,
        token: "admin",
        label: "Admin",
        badge: "bg-red/10 text-red",
        editable: true,
    },
    RoleStyle {
        role: Role::Manager,
        token: "manager",
        label: "Manager",
        badge: "bg-blue/10 text-blue",
        editable: true,
    },
    RoleStyle {
        role: Role::TeamLeader,
        token: "tl",
        label: "Team Leader",
        badge: "bg-green/10 text-green",
        editable: true,
    },
    RoleStyle {
        role: Role::DistributionExecutive,
        token: "de",
        label: "Distribution Executive",
        badge: "bg-purple/10 text-purple",
        editable: false,
    },
    RoleStyle {
        role: Role::DirectSalesRep,
        token: "dsr",
        label: "Direct Sales Rep",
        badge: "bg-orange/10 text-orange",
        editable: true,
    },
];

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Manager,
        Role::TeamLeader,
        Role::DistributionExecutive,
        Role::DirectSalesRep,
    ];

    pub fn style(self) -> &'static RoleStyle {
        match self {
            Role::Admin => &ROLE_STYLES[0],
            Role::Manager => &ROLE_STYLES[1],
            Role::TeamLeader => &ROLE_STYLES[2],
            Role::DistributionExecutive => &ROLE_STYLES[3],
            Role::DirectSalesRep => &ROLE_STYLES[4],
        }
    }

    pub fn as_token(self) -> &'static str {
        self.style().token
    }

    pub fn label(self) -> &'static str {
        self.style().label
    }

    pub fn badge(self) -> &'static str {
        self.style().badge
    }

    pub fn is_editable(self) -> bool {
        self.style().editable
    }

    /// Roles the editor offers, in display order.
    pub fn editable() -> impl Iterator<Item = Role> {
        Self::ALL.into_iter().filter(|r| r.is_editable())
    }

    /// Parse a stored token, falling back to [`Role::DirectSalesRep`] for
    /// missing or unknown values.
    pub fn from_stored(token: Option<&str>) -> Role {
        token
            .and_then(|t| t.parse().ok())
            .unwrap_or_default()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role token '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ROLE_STYLES
            .iter()
            .find(|style| style.token == s)
            .map(|style| style.role)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Serialized form of a role for API responses: token plus display data.
#[derive(Debug, Clone, Serialize)]
pub struct RoleBadge {
    pub role: Role,
    pub label: &'static str,
    pub badge: &'static str,
}

impl From<Role> for RoleBadge {
    fn from(role: Role) -> Self {
        Self {
            role,
            label: role.label(),
            badge: role.badge(),
        }
    }
}
