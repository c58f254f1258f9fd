//! Completeness predicates for the blueprint editor sections.
//!
//! Each section is only considered complete when every earlier section is,
//! mirroring the order in which the editor unlocks them.

use serde::Serialize;

use super::{Blueprint, BlueprintStatus};

/// Snapshot of every completeness predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Completeness {
    pub general: bool,
    pub objectives: bool,
    pub skills: bool,
    pub matrix: bool,
    pub keys: bool,
}

impl Completeness {
    pub fn is_complete(&self) -> bool {
        self.general && self.objectives && self.skills && self.matrix && self.keys
    }
}

impl Blueprint {
    pub fn is_general_complete(&self) -> bool {
        !self.name.trim().is_empty() && self.question_count > 0
    }

    pub fn is_objectives_complete(&self) -> bool {
        self.is_general_complete() && !self.objectives.is_empty()
    }

    pub fn is_skills_complete(&self) -> bool {
        self.is_objectives_complete() && !self.skills.is_empty()
    }

    /// Every question in range has an assignment.
    pub fn is_matrix_complete(&self) -> bool {
        let assigned = self.assigned_count();
        self.is_skills_complete() && assigned > 0 && assigned == self.question_count as usize
    }

    /// Every question that needs a key has one.
    ///
    /// Questions no block claims are treated as needing a key.
    pub fn is_keys_complete(&self) -> bool {
        if !self.is_matrix_complete() {
            return false;
        }
        let types = self.question_types();
        (1..=self.question_count).all(|question| {
            let requires_key = types
                .get(&question)
                .map_or(true, |t| t.requires_key());
            !requires_key || self.key(question).is_some_and(|k| k.has_key())
        })
    }

    pub fn completeness(&self) -> Completeness {
        Completeness {
            general: self.is_general_complete(),
            objectives: self.is_objectives_complete(),
            skills: self.is_skills_complete(),
            matrix: self.is_matrix_complete(),
            keys: self.is_keys_complete(),
        }
    }

    /// `Complete` iff every section is complete.
    pub fn derived_status(&self) -> BlueprintStatus {
        if self.completeness().is_complete() {
            BlueprintStatus::Complete
        } else {
            BlueprintStatus::Draft
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blueprint::BlueprintEdit;
    use crate::core::{QuestionBlock, QuestionType};

    fn assigned(n: u32) -> Blueprint {
        let mut bp = Blueprint::new("e1", "Prueba", n);
        bp.objectives.insert("oa1".into());
        bp.skills.insert("h1".into());
        (1..=n).fold(bp, |bp, q| {
            bp.apply(BlueprintEdit::AssignQuestion {
                question: q,
                objective_id: "oa1".into(),
                skill_id: "h1".into(),
            })
            .unwrap()
        })
    }

    #[test]
    fn test_empty_blueprint_is_draft() {
        let bp = Blueprint::new("e1", "", 0);
        assert_eq!(
            bp.completeness(),
            Completeness {
                general: false,
                objectives: false,
                skills: false,
                matrix: false,
                keys: false,
            }
        );
        assert_eq!(bp.derived_status(), BlueprintStatus::Draft);
    }

    #[test]
    fn test_matrix_requires_every_question() {
        let bp = assigned(3)
            .apply(BlueprintEdit::UnassignQuestion(2))
            .unwrap();
        assert!(bp.is_skills_complete());
        assert!(!bp.is_matrix_complete());
    }

    #[test]
    fn test_open_response_needs_no_key() {
        let bp = assigned(2)
            .apply(BlueprintEdit::AddBlock(QuestionBlock::new(
                "b1",
                QuestionType::OpenResponse,
                "2",
                2.0,
            )))
            .unwrap();
        assert!(!bp.is_keys_complete());

        let bp = bp
            .apply(BlueprintEdit::UpdateKey {
                question: 1,
                key: "C".into(),
                points: None,
            })
            .unwrap();
        assert!(bp.is_keys_complete());
        assert_eq!(bp.derived_status(), BlueprintStatus::Complete);
    }

    #[test]
    fn test_later_sections_gate_on_earlier_ones() {
        let mut bp = assigned(1)
            .apply(BlueprintEdit::UpdateKey {
                question: 1,
                key: "A".into(),
                points: None,
            })
            .unwrap();
        assert!(bp.is_keys_complete());

        bp.name = "  ".into();
        assert!(!bp.is_general_complete());
        assert!(!bp.is_keys_complete());
    }
}
