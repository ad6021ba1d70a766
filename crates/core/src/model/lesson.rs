use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::model::ids::{LessonId, TaskId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// A task whose `taskType` is known but whose `taskData` does not match it.
#[derive(Debug, Error)]
#[error("task {id}: invalid {task_type} payload: {source}")]
pub struct TaskDecodeError {
    pub id: TaskId,
    pub task_type: String,
    #[source]
    pub source: serde_json::Error,
}

//
// ─── PAYLOADS ──────────────────────────────────────────────────────────────────
//

/// A word or phrase together with its translation in the learner's origin language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordExpression {
    pub expression: String,
    pub origin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// Payload of both translate-word multiple-choice variants.
///
/// The server sends this shape in snake case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleChoiceData {
    pub question_word: WordExpression,
    #[serde(default)]
    pub distractors: Vec<WordExpression>,
}

impl MultipleChoiceData {
    /// The correct answer first, then the distractors. Shuffling is up to the caller.
    #[must_use]
    pub fn options(&self) -> Vec<&WordExpression> {
        std::iter::once(&self.question_word)
            .chain(self.distractors.iter())
            .collect()
    }

    #[must_use]
    pub fn is_correct(&self, choice: &WordExpression) -> bool {
        *choice == self.question_word
    }
}

/// Shuffled words to be ordered into a sentence. The correct order stays on the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceBuildingData {
    pub prompt: String,
    #[serde(default)]
    pub words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingPairsData {
    #[serde(default)]
    pub left_items: Vec<WordExpression>,
    #[serde(default)]
    pub right_items: Vec<WordExpression>,
}

//
// ─── TASK ──────────────────────────────────────────────────────────────────────
//

const TRANSLATE_WORD_TO_MC: &str = "TRANSLATE_WORD_TO_MC";
const TRANSLATE_WORD_FROM_MC: &str = "TRANSLATE_WORD_FROM_MC";
const SENTENCE_BUILDING: &str = "SENTENCE_BUILDING";
const MATCHING_PAIRS: &str = "MATCHING_PAIRS";

/// Exercise variant together with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskKind {
    /// Pick the translation of a source word.
    TranslateWordTo(MultipleChoiceData),
    /// Pick the source word for a translated word.
    TranslateWordFrom(MultipleChoiceData),
    SentenceBuilding(SentenceBuildingData),
    MatchingPairs(MatchingPairsData),
    /// A variant this client does not know yet; kept verbatim.
    Unknown { task_type: String, data: Value },
}

impl TaskKind {
    /// Wire tag of the variant (`taskType`).
    #[must_use]
    pub fn type_tag(&self) -> &str {
        match self {
            TaskKind::TranslateWordTo(_) => TRANSLATE_WORD_TO_MC,
            TaskKind::TranslateWordFrom(_) => TRANSLATE_WORD_FROM_MC,
            TaskKind::SentenceBuilding(_) => SENTENCE_BUILDING,
            TaskKind::MatchingPairs(_) => MATCHING_PAIRS,
            TaskKind::Unknown { task_type, .. } => task_type,
        }
    }

    #[must_use]
    pub fn multiple_choice(&self) -> Option<&MultipleChoiceData> {
        match self {
            TaskKind::TranslateWordTo(data) | TaskKind::TranslateWordFrom(data) => Some(data),
            _ => None,
        }
    }
}

/// One exercise of a lesson. Immutable once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTask", into = "RawTask")]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTask {
    id: TaskId,
    task_type: String,
    #[serde(default)]
    task_data: Value,
}

impl TryFrom<RawTask> for Task {
    type Error = TaskDecodeError;

    fn try_from(raw: RawTask) -> Result<Self, Self::Error> {
        let RawTask {
            id,
            task_type,
            task_data,
        } = raw;
        let decode_err = |source| TaskDecodeError {
            id,
            task_type: task_type.clone(),
            source,
        };

        let kind = match task_type.as_str() {
            TRANSLATE_WORD_TO_MC => {
                TaskKind::TranslateWordTo(serde_json::from_value(task_data).map_err(decode_err)?)
            }
            TRANSLATE_WORD_FROM_MC => {
                TaskKind::TranslateWordFrom(serde_json::from_value(task_data).map_err(decode_err)?)
            }
            SENTENCE_BUILDING => {
                TaskKind::SentenceBuilding(serde_json::from_value(task_data).map_err(decode_err)?)
            }
            MATCHING_PAIRS => {
                TaskKind::MatchingPairs(serde_json::from_value(task_data).map_err(decode_err)?)
            }
            _ => TaskKind::Unknown {
                task_type: task_type.clone(),
                data: task_data,
            },
        };

        Ok(Task { id, kind })
    }
}

impl From<Task> for RawTask {
    fn from(task: Task) -> Self {
        let task_type = task.kind.type_tag().to_string();
        // Serializing plain data structs into a `Value` cannot fail.
        let task_data = match task.kind {
            TaskKind::TranslateWordTo(data) | TaskKind::TranslateWordFrom(data) => {
                serde_json::to_value(data).unwrap_or(Value::Null)
            }
            TaskKind::SentenceBuilding(data) => serde_json::to_value(data).unwrap_or(Value::Null),
            TaskKind::MatchingPairs(data) => serde_json::to_value(data).unwrap_or(Value::Null),
            TaskKind::Unknown { data, .. } => data,
        };
        RawTask {
            id: task.id,
            task_type,
            task_data,
        }
    }
}

//
// ─── LESSON METADATA ───────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub title: String,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonSectionSummary {
    pub title: String,
}

/// Lesson metadata returned by `GET /lessons/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDetails {
    pub identifier: LessonId,
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    pub order_index: u32,
    #[serde(default)]
    pub completed: bool,
    pub section: LessonSectionSummary,
    #[serde(default)]
    pub topics: Vec<Topic>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn word(expression: &str, origin: &str) -> Value {
        json!({ "expression": expression, "origin": origin })
    }

    #[test]
    fn decodes_multiple_choice_task() {
        let raw = json!({
            "id": 4,
            "taskType": "TRANSLATE_WORD_TO_MC",
            "taskData": {
                "question_word": { "expression": "Apfel", "origin": "apple", "emoji": "🍎" },
                "distractors": [word("Birne", "pear"), word("Brot", "bread")]
            }
        });
        let task: Task = serde_json::from_value(raw).unwrap();
        assert_eq!(task.id, TaskId::new(4));
        let data = task.kind.multiple_choice().unwrap();
        assert_eq!(data.options().len(), 3);
        assert_eq!(data.question_word.emoji.as_deref(), Some("🍎"));
        assert!(data.is_correct(data.options()[0]));
        assert!(!data.is_correct(data.options()[1]));
    }

    #[test]
    fn decodes_sentence_and_matching_tasks() {
        let sentence: Task = serde_json::from_value(json!({
            "id": 1,
            "taskType": "SENTENCE_BUILDING",
            "taskData": { "prompt": "The boy eats", "words": ["isst", "Der", "Junge"] }
        }))
        .unwrap();
        assert!(matches!(sentence.kind, TaskKind::SentenceBuilding(ref d) if d.words.len() == 3));

        let pairs: Task = serde_json::from_value(json!({
            "id": 2,
            "taskType": "MATCHING_PAIRS",
            "taskData": { "leftItems": [word("ja", "yes")], "rightItems": [word("nein", "no")] }
        }))
        .unwrap();
        assert!(matches!(pairs.kind, TaskKind::MatchingPairs(ref d) if d.left_items.len() == 1));
    }

    #[test]
    fn keeps_unknown_task_types() {
        let task: Task = serde_json::from_value(json!({
            "id": 9,
            "taskType": "LISTENING",
            "taskData": { "clip": "x.mp3" }
        }))
        .unwrap();
        match &task.kind {
            TaskKind::Unknown { task_type, data } => {
                assert_eq!(task_type, "LISTENING");
                assert_eq!(data["clip"], "x.mp3");
            }
            other => panic!("unexpected kind: {other:?}"),
        }
        let back = serde_json::to_value(&task).unwrap();
        assert_eq!(back["taskType"], "LISTENING");
    }

    #[test]
    fn rejects_known_type_with_wrong_payload() {
        let result: Result<Task, _> = serde_json::from_value(json!({
            "id": 3,
            "taskType": "SENTENCE_BUILDING",
            "taskData": { "words": "not-a-list" }
        }));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("SENTENCE_BUILDING"), "{err}");
    }

    #[test]
    fn lesson_details_reads_wire_format() {
        let details: LessonDetails = serde_json::from_value(json!({
            "identifier": "l-1",
            "title": "Greetings",
            "subtitle": "Say hello",
            "orderIndex": 0,
            "completed": false,
            "section": { "title": "Basics" },
            "topics": [{ "title": "Hello", "level": "A1" }]
        }))
        .unwrap();
        assert_eq!(details.identifier, LessonId::new("l-1"));
        assert_eq!(details.topics[0].level, "A1");
    }
}
