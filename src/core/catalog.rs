//! Reference catalog of units, thematic axes, learning objectives and skills.
//!
//! The catalog is curricular reference data owned by the surrounding
//! application. The core only reads it to name and group analysis categories.

use serde::{Deserialize, Serialize};

use super::types::{CognitiveSkill, LearningObjective, ThematicAxis, Unit};
use crate::errors::Result;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub axes: Vec<ThematicAxis>,
    #[serde(default)]
    pub objectives: Vec<LearningObjective>,
    #[serde(default)]
    pub skills: Vec<CognitiveSkill>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn axis(&self, id: &str) -> Option<&ThematicAxis> {
        self.axes.iter().find(|a| a.id == id)
    }

    pub fn objective(&self, id: &str) -> Option<&LearningObjective> {
        self.objectives.iter().find(|o| o.id == id)
    }

    pub fn skill(&self, id: &str) -> Option<&CognitiveSkill> {
        self.skills.iter().find(|s| s.id == id)
    }

    pub fn objectives_in_unit<'a>(
        &'a self,
        unit_id: &'a str,
    ) -> impl Iterator<Item = &'a LearningObjective> + 'a {
        self.objectives.iter().filter(move |o| o.unit_id == unit_id)
    }

    /// Short unit label used inside objective names, "Unidad 2" becomes "U2".
    pub fn unit_short_name(&self, unit_id: &str) -> String {
        self.unit(unit_id)
            .map(|u| u.name.replacen("Unidad ", "U", 1))
            .unwrap_or_else(|| "Unknown unit".to_string())
    }
}

/// Numeric part of an objective code ("OA12" is 12); codes without digits sort last.
pub fn objective_code_number(code: &str) -> u32 {
    code.chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .unwrap_or(999)
}

/// Case- and accent-insensitive sort key for Spanish catalog names.
///
/// "Álgebra" sorts with the A's and "ñandú" right after "nandu".
pub fn collation_key(name: &str) -> String {
    name.chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            'ç' => 'c',
            other => other,
        })
        .collect()
}
