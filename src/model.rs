use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(CompanyId);
string_id!(StakeholderId);
string_id!(RelationshipId);
string_id!(MapId);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Seniority {
    CLevel,
    Vp,
    Director,
    Manager,
    Ic,
}

impl Seniority {
    pub const ALL: [Seniority; 5] = [
        Seniority::CLevel,
        Seniority::Vp,
        Seniority::Director,
        Seniority::Manager,
        Seniority::Ic,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::CLevel => "C_LEVEL",
            Self::Vp => "VP",
            Self::Director => "DIRECTOR",
            Self::Manager => "MANAGER",
            Self::Ic => "IC",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Ally,
    Neutral,
    Opponent,
    Unknown,
}

impl Sentiment {
    pub const ALL: [Sentiment; 4] = [
        Sentiment::Ally,
        Sentiment::Neutral,
        Sentiment::Opponent,
        Sentiment::Unknown,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Ally => "ALLY",
            Self::Neutral => "NEUTRAL",
            Self::Opponent => "OPPONENT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    ReportsTo,
    PeerOf,
    Influences,
    CollaboratesWith,
    Advises,
    Blocks,
    Sponsors,
    GatekeeperFor,
}

impl RelationKind {
    pub const ALL: [RelationKind; 8] = [
        RelationKind::ReportsTo,
        RelationKind::PeerOf,
        RelationKind::Influences,
        RelationKind::CollaboratesWith,
        RelationKind::Advises,
        RelationKind::Blocks,
        RelationKind::Sponsors,
        RelationKind::GatekeeperFor,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::ReportsTo => "REPORTS_TO",
            Self::PeerOf => "PEER_OF",
            Self::Influences => "INFLUENCES",
            Self::CollaboratesWith => "COLLABORATES_WITH",
            Self::Advises => "ADVISES",
            Self::Blocks => "BLOCKS",
            Self::Sponsors => "SPONSORS",
            Self::GatekeeperFor => "GATEKEEPER_FOR",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Directionality {
    #[default]
    Directional,
    Bidirectional,
}

impl Directionality {
    pub fn label(self) -> &'static str {
        match self {
            Self::Directional => "directional",
            Self::Bidirectional => "bidirectional",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StakeholderStatus {
    #[default]
    Active,
    Archived,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Stakeholder {
    pub id: StakeholderId,
    pub name: String,
    pub company_id: CompanyId,
    /// Joined from the company row by the store; not persisted on the row.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub company_name: String,
    #[serde(default)]
    pub seniority: Option<Seniority>,
    pub sentiment: Sentiment,
    /// Influence score 1..=5 when set.
    #[serde(default)]
    pub influence: Option<u8>,
    #[serde(default)]
    pub status: StakeholderStatus,
}

pub const DEFAULT_STRENGTH: u8 = 3;

fn default_strength() -> u8 {
    DEFAULT_STRENGTH
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub from: StakeholderId,
    pub to: StakeholderId,
    pub kind: RelationKind,
    /// Strength 1..=5, default 3.
    #[serde(default = "default_strength")]
    pub strength: u8,
    #[serde(default)]
    pub directionality: Directionality,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Persisted 2D position of one stakeholder within one map. At most one
/// entry exists per (map, stakeholder) pair; writes are upserts on it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub map_id: MapId,
    pub stakeholder_id: StakeholderId,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub zoom: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapRecord {
    pub id: MapId,
    pub name: String,
}

/// The joined read view the page controller works from: active stakeholders
/// with company names filled in, plus relationships and the layout entries
/// of one map. The store remains the source of truth.
#[derive(Clone, Debug)]
pub struct Dataset {
    pub map: MapRecord,
    pub companies: Vec<Company>,
    pub stakeholders: Vec<Stakeholder>,
    pub relationships: Vec<Relationship>,
    pub layouts: Vec<LayoutEntry>,
}

impl Dataset {
    pub fn stakeholder(&self, id: &StakeholderId) -> Option<&Stakeholder> {
        self.stakeholders.iter().find(|s| &s.id == id)
    }

    pub fn relationship(&self, id: &RelationshipId) -> Option<&Relationship> {
        self.relationships.iter().find(|r| &r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enums_serialize_to_wire_labels() {
        for kind in RelationKind::ALL {
            let encoded = serde_json::to_string(&kind).unwrap();
            assert_eq!(encoded, format!("\"{}\"", kind.label()));
        }
        for sentiment in Sentiment::ALL {
            let encoded = serde_json::to_string(&sentiment).unwrap();
            assert_eq!(encoded, format!("\"{}\"", sentiment.label()));
        }
        for seniority in Seniority::ALL {
            let encoded = serde_json::to_string(&seniority).unwrap();
            assert_eq!(encoded, format!("\"{}\"", seniority.label()));
        }
    }

    #[test]
    fn relationship_strength_defaults_to_three() {
        let decoded: Relationship = serde_json::from_str(
            r#"{"id":"r1","from":"s1","to":"s2","kind":"PEER_OF"}"#,
        )
        .unwrap();
        assert_eq!(decoded.strength, DEFAULT_STRENGTH);
        assert_eq!(decoded.directionality, Directionality::Directional);
        assert!(decoded.notes.is_none());
    }
}
