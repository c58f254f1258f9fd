//! Closed set of blueprint edits and the pure transition function.

use im::OrdSet;

use super::merge::{merge_analyzed, AnalyzedBlueprint};
use super::{Blueprint, BlueprintStatus, Selection};
use crate::config::is_valid_authored_threshold;
use crate::core::{AnswerKey, Catalog, QuestionAssignment, QuestionBlock, QuestionNumber};
use crate::errors::{Error, Result};

/// One edit made by the blueprint editor.
#[derive(Debug, Clone, PartialEq)]
pub enum BlueprintEdit {
    SetName(String),
    /// Resize the evaluation; the answer key array follows
    SetQuestionCount(u32),
    SetPassThreshold(f64),
    SetStatus(BlueprintStatus),
    ToggleObjective {
        id: String,
        confirm_cascade: bool,
    },
    ToggleSkill {
        id: String,
        confirm_cascade: bool,
    },
    /// Select or deselect several objectives at once
    SetObjectives {
        ids: Vec<String>,
        selected: bool,
        confirm_cascade: bool,
    },
    /// Select or deselect several skills at once
    SetSkills {
        ids: Vec<String>,
        selected: bool,
        confirm_cascade: bool,
    },
    AssignQuestion {
        question: QuestionNumber,
        objective_id: String,
        skill_id: String,
    },
    UnassignQuestion(QuestionNumber),
    /// Append a block; an empty id is replaced by a fresh one
    AddBlock(QuestionBlock),
    UpdateBlock(QuestionBlock),
    DeleteBlock(String),
    UpdateKey {
        question: QuestionNumber,
        key: String,
        points: Option<f64>,
    },
    MergeAnalyzed(AnalyzedBlueprint),
}

impl BlueprintEdit {
    /// Select or deselect every objective of one curricular unit.
    pub fn select_unit(
        catalog: &Catalog,
        unit_id: &str,
        selected: bool,
        confirm_cascade: bool,
    ) -> Self {
        Self::SetObjectives {
            ids: catalog
                .objectives_in_unit(unit_id)
                .map(|o| o.id.clone())
                .collect(),
            selected,
            confirm_cascade,
        }
    }

    /// Select or deselect every skill in the catalog.
    pub fn select_all_skills(catalog: &Catalog, selected: bool, confirm_cascade: bool) -> Self {
        Self::SetSkills {
            ids: catalog.skills.iter().map(|s| s.id.clone()).collect(),
            selected,
            confirm_cascade,
        }
    }
}

impl Blueprint {
    /// Apply an edit, producing the next snapshot.
    ///
    /// A rejected edit returns an error and no partial state: removing a
    /// selection that still has assignments requires `confirm_cascade`, and
    /// block edits must name an existing block.
    pub fn apply(&self, edit: BlueprintEdit) -> Result<Blueprint> {
        match edit {
            BlueprintEdit::SetName(name) => Ok(Blueprint {
                name,
                ..self.clone()
            }),
            BlueprintEdit::SetQuestionCount(count) => Ok(self.resize(count)),
            BlueprintEdit::SetPassThreshold(percent) => self.set_pass_threshold(percent),
            BlueprintEdit::SetStatus(status) => Ok(Blueprint {
                status,
                ..self.clone()
            }),
            BlueprintEdit::ToggleObjective {
                id,
                confirm_cascade,
            } => self.toggle(Selection::Objectives, id, confirm_cascade),
            BlueprintEdit::ToggleSkill {
                id,
                confirm_cascade,
            } => self.toggle(Selection::Skills, id, confirm_cascade),
            BlueprintEdit::SetObjectives {
                ids,
                selected,
                confirm_cascade,
            } => self.set_selection(Selection::Objectives, &ids, selected, confirm_cascade),
            BlueprintEdit::SetSkills {
                ids,
                selected,
                confirm_cascade,
            } => self.set_selection(Selection::Skills, &ids, selected, confirm_cascade),
            BlueprintEdit::AssignQuestion {
                question,
                objective_id,
                skill_id,
            } => Ok(Blueprint {
                assignments: self
                    .assignments
                    .update(question, QuestionAssignment::new(objective_id, skill_id)),
                ..self.clone()
            }),
            BlueprintEdit::UnassignQuestion(question) => Ok(Blueprint {
                assignments: self.assignments.without(&question),
                ..self.clone()
            }),
            BlueprintEdit::AddBlock(block) => Ok(self.add_block(block)),
            BlueprintEdit::UpdateBlock(block) => self.update_block(block),
            BlueprintEdit::DeleteBlock(id) => self.delete_block(&id),
            BlueprintEdit::UpdateKey {
                question,
                key,
                points,
            } => Ok(self.update_key(question, key, points)),
            BlueprintEdit::MergeAnalyzed(payload) => Ok(merge_analyzed(self, payload)),
        }
    }

    /// Apply edits in order, stopping at the first rejected one.
    pub fn apply_all<I>(&self, edits: I) -> Result<Blueprint>
    where
        I: IntoIterator<Item = BlueprintEdit>,
    {
        edits
            .into_iter()
            .try_fold(self.clone(), |blueprint, edit| blueprint.apply(edit))
    }

    fn resize(&self, count: u32) -> Blueprint {
        let block_points = self.block_points();
        let keys = (1..=count)
            .map(|question| {
                self.key(question)
                    .cloned()
                    .unwrap_or_else(|| AnswerKey {
                        points: block_points.get(&question).copied().unwrap_or(1.0),
                        ..AnswerKey::blank(question)
                    })
            })
            .collect();

        Blueprint {
            question_count: count,
            keys,
            ..self.clone()
        }
    }

    fn set_pass_threshold(&self, percent: f64) -> Result<Blueprint> {
        if !is_valid_authored_threshold(percent) {
            return Err(Error::validation(format!(
                "Passing threshold must be between 1 and 99 percent, got {}",
                percent
            )));
        }
        Ok(Blueprint {
            pass_threshold_percent: percent,
            ..self.clone()
        })
    }

    fn toggle(&self, selection: Selection, id: String, confirm_cascade: bool) -> Result<Blueprint> {
        let removing = self.is_selected(selection, &id);
        self.set_selection(selection, &[id], !removing, confirm_cascade)
    }

    fn set_selection(
        &self,
        selection: Selection,
        ids: &[String],
        selected: bool,
        confirm_cascade: bool,
    ) -> Result<Blueprint> {
        let current = match selection {
            Selection::Objectives => &self.objectives,
            Selection::Skills => &self.skills,
        };

        if selected {
            let updated: OrdSet<String> = current.clone().union(ids.iter().cloned().collect());
            return Ok(self.with_selection(selection, updated));
        }

        let affected: Vec<QuestionNumber> = ids
            .iter()
            .flat_map(|id| self.dependent_assignments(selection, id))
            .collect::<std::collections::BTreeSet<_>>()
            .into_iter()
            .collect();

        if !affected.is_empty() && !confirm_cascade {
            return Err(Error::CascadeNotConfirmed {
                id: ids.join(", "),
                questions: affected,
            });
        }

        let updated = ids
            .iter()
            .fold(current.clone(), |set, id| set.without(id.as_str()));
        let assignments = affected
            .iter()
            .fold(self.assignments.clone(), |map, q| map.without(q));

        if !affected.is_empty() {
            log::debug!(
                "Removing {:?} unassigned {} question(s)",
                ids,
                affected.len()
            );
        }

        Ok(Blueprint {
            assignments,
            ..self.with_selection(selection, updated)
        })
    }

    fn with_selection(&self, selection: Selection, set: OrdSet<String>) -> Blueprint {
        match selection {
            Selection::Objectives => Blueprint {
                objectives: set,
                ..self.clone()
            },
            Selection::Skills => Blueprint {
                skills: set,
                ..self.clone()
            },
        }
    }

    fn add_block(&self, block: QuestionBlock) -> Blueprint {
        let block = if block.id.trim().is_empty() {
            QuestionBlock {
                id: self.next_block_id(),
                ..block
            }
        } else {
            block
        };

        let mut blocks = self.blocks.clone();
        blocks.push_back(block.clone());
        Blueprint {
            blocks,
            keys: propagate_points(&self.keys, &block),
            ..self.clone()
        }
    }

    fn update_block(&self, block: QuestionBlock) -> Result<Blueprint> {
        if self.block(&block.id).is_none() {
            return Err(Error::UnknownBlock(block.id));
        }

        let blocks = self
            .blocks
            .iter()
            .map(|b| if b.id == block.id { block.clone() } else { b.clone() })
            .collect();

        Ok(Blueprint {
            blocks,
            keys: propagate_points(&self.keys, &block),
            ..self.clone()
        })
    }

    fn delete_block(&self, id: &str) -> Result<Blueprint> {
        if self.block(id).is_none() {
            return Err(Error::UnknownBlock(id.to_string()));
        }
        Ok(Blueprint {
            blocks: self.blocks.iter().filter(|b| b.id != id).cloned().collect(),
            ..self.clone()
        })
    }

    fn update_key(&self, question: QuestionNumber, key: String, points: Option<f64>) -> Blueprint {
        let keys = self
            .keys
            .iter()
            .map(|k| {
                if k.question == question {
                    AnswerKey {
                        question,
                        key: key.trim().to_string(),
                        points: points.unwrap_or(k.points),
                    }
                } else {
                    k.clone()
                }
            })
            .collect();

        Blueprint {
            keys,
            ..self.clone()
        }
    }
}

/// Copy a block's point value onto every key entry it claims.
fn propagate_points(keys: &im::Vector<AnswerKey>, block: &QuestionBlock) -> im::Vector<AnswerKey> {
    let questions = block.questions();
    keys.iter()
        .map(|k| {
            if questions.contains(&k.question) {
                AnswerKey {
                    points: block.points_per_question,
                    ..k.clone()
                }
            } else {
                k.clone()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::QuestionType;
    use pretty_assertions::assert_eq;

    fn base() -> Blueprint {
        Blueprint::new("e1", "Prueba", 4)
            .apply_all(vec![
                BlueprintEdit::ToggleObjective {
                    id: "oa1".into(),
                    confirm_cascade: false,
                },
                BlueprintEdit::ToggleObjective {
                    id: "oa2".into(),
                    confirm_cascade: false,
                },
                BlueprintEdit::ToggleSkill {
                    id: "h1".into(),
                    confirm_cascade: false,
                },
                BlueprintEdit::AssignQuestion {
                    question: 1,
                    objective_id: "oa1".into(),
                    skill_id: "h1".into(),
                },
                BlueprintEdit::AssignQuestion {
                    question: 2,
                    objective_id: "oa1".into(),
                    skill_id: "h1".into(),
                },
                BlueprintEdit::AssignQuestion {
                    question: 3,
                    objective_id: "oa2".into(),
                    skill_id: "h1".into(),
                },
            ])
            .unwrap()
    }

    #[test]
    fn test_assign_overwrites_and_unassign_removes() {
        let bp = base()
            .apply(BlueprintEdit::AssignQuestion {
                question: 1,
                objective_id: "oa2".into(),
                skill_id: "h1".into(),
            })
            .unwrap();
        assert_eq!(bp.assignment(1).unwrap().objective_id, "oa2");

        let bp = bp.apply(BlueprintEdit::UnassignQuestion(1)).unwrap();
        assert!(bp.assignment(1).is_none());
        assert_eq!(bp.assigned_count(), 2);
    }

    #[test]
    fn test_edits_leave_previous_snapshot_untouched() {
        let before = base();
        let after = before.apply(BlueprintEdit::UnassignQuestion(2)).unwrap();
        assert!(before.assignment(2).is_some());
        assert!(after.assignment(2).is_none());
    }

    #[test]
    fn test_removing_objective_requires_confirmation() {
        let before = base();
        let err = before
            .apply(BlueprintEdit::ToggleObjective {
                id: "oa1".into(),
                confirm_cascade: false,
            })
            .unwrap_err();

        match err {
            Error::CascadeNotConfirmed { id, questions } => {
                assert_eq!(id, "oa1");
                assert_eq!(questions, vec![1, 2]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(before.objectives.contains("oa1"));
    }

    #[test]
    fn test_confirmed_removal_cascades() {
        let bp = base()
            .apply(BlueprintEdit::ToggleObjective {
                id: "oa1".into(),
                confirm_cascade: true,
            })
            .unwrap();
        assert!(!bp.objectives.contains("oa1"));
        assert_eq!(bp.assignments.keys().copied().collect::<Vec<_>>(), vec![3]);
    }

    #[test]
    fn test_removing_unused_selection_needs_no_confirmation() {
        let bp = base()
            .apply(BlueprintEdit::ToggleSkill {
                id: "h9".into(),
                confirm_cascade: false,
            })
            .unwrap()
            .apply(BlueprintEdit::ToggleSkill {
                id: "h9".into(),
                confirm_cascade: false,
            })
            .unwrap();
        assert!(!bp.skills.contains("h9"));
        assert_eq!(bp.assigned_count(), 3);
    }

    #[test]
    fn test_skill_removal_cascades_all_dependents() {
        let bp = base()
            .apply(BlueprintEdit::ToggleSkill {
                id: "h1".into(),
                confirm_cascade: true,
            })
            .unwrap();
        assert!(bp.assignments.is_empty());
    }

    #[test]
    fn test_select_unit_adds_and_removes_with_cascade() {
        let catalog = Catalog::from_json(
            r#"{"objectives": [
                {"id": "oa1", "code": "OA1", "description": "", "unitId": "u1", "axisId": "e1"},
                {"id": "oa3", "code": "OA3", "description": "", "unitId": "u1", "axisId": "e1"},
                {"id": "oa2", "code": "OA2", "description": "", "unitId": "u2", "axisId": "e1"}
            ]}"#,
        )
        .unwrap();

        let bp = base()
            .apply(BlueprintEdit::select_unit(&catalog, "u1", true, false))
            .unwrap();
        assert!(bp.objectives.contains("oa3"));

        assert!(bp
            .apply(BlueprintEdit::select_unit(&catalog, "u1", false, false))
            .is_err());

        let bp = bp
            .apply(BlueprintEdit::select_unit(&catalog, "u1", false, true))
            .unwrap();
        assert_eq!(bp.objectives.iter().cloned().collect::<Vec<_>>(), vec!["oa2"]);
        assert_eq!(bp.assigned_count(), 1);
    }

    #[test]
    fn test_update_block_propagates_points_only() {
        let bp = base()
            .apply(BlueprintEdit::AddBlock(QuestionBlock::empty("")))
            .unwrap();
        let id = bp.blocks[0].id.clone();
        assert_eq!(id, "block-1");

        let bp = bp
            .apply(BlueprintEdit::UpdateBlock(QuestionBlock::new(
                id,
                QuestionType::MultipleChoice4,
                "2-3",
                2.5,
            )))
            .unwrap();

        let points: Vec<f64> = bp.keys.iter().map(|k| k.points).collect();
        assert_eq!(points, vec![1.0, 2.5, 2.5, 1.0]);
        assert_eq!(bp.assigned_count(), 3);
    }

    #[test]
    fn test_unknown_block_is_rejected() {
        let bp = base();
        assert!(matches!(
            bp.apply(BlueprintEdit::DeleteBlock("nope".into())),
            Err(Error::UnknownBlock(_))
        ));
        assert!(matches!(
            bp.apply(BlueprintEdit::UpdateBlock(QuestionBlock::empty("nope"))),
            Err(Error::UnknownBlock(_))
        ));
    }

    #[test]
    fn test_delete_block_keeps_keys() {
        let bp = base()
            .apply(BlueprintEdit::AddBlock(QuestionBlock::new(
                "b1",
                QuestionType::TrueFalse,
                "1-4",
                3.0,
            )))
            .unwrap()
            .apply(BlueprintEdit::DeleteBlock("b1".into()))
            .unwrap();
        assert!(bp.blocks.is_empty());
        assert_eq!(bp.key(4).unwrap().points, 3.0);
    }

    #[test]
    fn test_resize_keeps_existing_and_synthesizes_new_keys() {
        let bp = base()
            .apply(BlueprintEdit::UpdateKey {
                question: 2,
                key: " b ".into(),
                points: Some(2.0),
            })
            .unwrap()
            .apply(BlueprintEdit::AddBlock(QuestionBlock::new(
                "b1",
                QuestionType::MultipleChoice4,
                "5-6",
                3.0,
            )))
            .unwrap()
            .apply(BlueprintEdit::SetQuestionCount(6))
            .unwrap();

        assert_eq!(bp.keys.len(), 6);
        assert_eq!(bp.key(2).unwrap().key, "b");
        assert_eq!(bp.key(2).unwrap().points, 2.0);
        assert_eq!(bp.key(6).unwrap().points, 3.0);

        let shrunk = bp.apply(BlueprintEdit::SetQuestionCount(1)).unwrap();
        assert_eq!(shrunk.keys.len(), 1);
        assert_eq!(shrunk.question_count, 1);
    }

    #[test]
    fn test_resize_matches_keys_by_question_number() {
        let mut bp = Blueprint::new("e", "Desordenada", 3);
        bp.keys = vec![
            AnswerKey::new(3, "C", 3.0),
            AnswerKey::new(1, "A", 1.0),
            AnswerKey::new(2, "B", 2.0),
        ]
        .into_iter()
        .collect();

        let grown = bp.apply(BlueprintEdit::SetQuestionCount(4)).unwrap();
        let keys: Vec<(QuestionNumber, &str, f64)> = grown
            .keys
            .iter()
            .map(|k| (k.question, k.key.as_str(), k.points))
            .collect();
        assert_eq!(
            keys,
            vec![(1, "A", 1.0), (2, "B", 2.0), (3, "C", 3.0), (4, "", 1.0)]
        );

        bp.keys = vec![AnswerKey::new(2, "B", 2.0)].into_iter().collect();
        let shrunk = bp.apply(BlueprintEdit::SetQuestionCount(2)).unwrap();
        assert_eq!(shrunk.key(1).unwrap().key, "");
        assert_eq!(shrunk.key(2).unwrap().key, "B");
    }

    #[test]
    fn test_pass_threshold_bounds() {
        let bp = base();
        assert!(bp.apply(BlueprintEdit::SetPassThreshold(0.0)).is_err());
        assert!(bp.apply(BlueprintEdit::SetPassThreshold(100.0)).is_err());
        let bp = bp.apply(BlueprintEdit::SetPassThreshold(70.0)).unwrap();
        assert_eq!(bp.pass_threshold_percent, 70.0);
    }
}
