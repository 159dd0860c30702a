use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The five battle attributes every card carries.
///
/// Serialized as the lowercase column keys the card catalog uses
/// (`car`, `cul`, `tet`, `fis`, `per`).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Car,
    Cul,
    Tet,
    Fis,
    Per,
}

impl Attribute {
    /// All attributes, in catalog column order.
    pub const ALL: [Attribute; 5] = [
        Attribute::Car,
        Attribute::Cul,
        Attribute::Tet,
        Attribute::Fis,
        Attribute::Per,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Car => "car",
            Attribute::Cul => "cul",
            Attribute::Tet => "tet",
            Attribute::Fis => "fis",
            Attribute::Per => "per",
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "car" => Ok(Attribute::Car),
            "cul" => Ok(Attribute::Cul),
            "tet" => Ok(Attribute::Tet),
            "fis" => Ok(Attribute::Fis),
            "per" => Ok(Attribute::Per),
            other => Err(format!("unknown attribute: {other}")),
        }
    }
}

/// One catalog card. Seeded once, never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: Uuid,
    pub name: String,
    pub car: i32,
    pub cul: i32,
    pub tet: i32,
    pub fis: i32,
    pub per: i32,
}

impl Card {
    /// The card's printed value for one attribute.
    pub fn value(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Car => self.car,
            Attribute::Cul => self.cul,
            Attribute::Tet => self.tet,
            Attribute::Fis => self.fis,
            Attribute::Per => self.per,
        }
    }

    /// Sum of all five attribute values, used to break value ties.
    pub fn total_stats(&self) -> i32 {
        Attribute::ALL.iter().map(|a| self.value(*a)).sum()
    }
}
