use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Payload for creating or replacing a task.
///
/// Omitted optional fields take their defaults, so an update without `description`
/// clears it and an update without `completed` resets it to `false`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task. At most 50 characters.
    #[validate(length(max = 50))]
    pub title: String,

    /// An optional description. At most 200 characters.
    #[validate(length(max = 200))]
    #[serde(default)]
    pub description: Option<String>,

    /// Whether the task is done. Defaults to `false`.
    #[serde(default)]
    pub completed: bool,
}

/// A task row as stored in the `tasks` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TaskRecord {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub user_id: i64,
}

/// A task as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub user_id: i64,
}

/// The values needed to insert a task; the id is assigned by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub user_id: i64,
}

/// Pagination parameters for listing tasks.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Number of tasks to skip.
    #[serde(default)]
    pub skip: i64,
    /// Maximum number of tasks to return.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

impl NewTask {
    /// Creates the insert values for a task owned by `user_id`.
    pub fn new(input: TaskInput, user_id: i64) -> Self {
        Self {
            title: input.title,
            description: input.description,
            completed: input.completed,
            user_id,
        }
    }
}

impl TaskRecord {
    /// Overwrites every user-editable field with the values from `input`.
    /// `id` and `user_id` never change.
    pub fn apply(&mut self, input: TaskInput) {
        self.title = input.title;
        self.description = input.description;
        self.completed = input.completed;
    }
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
            completed: record.completed,
            user_id: record.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TaskRecord {
        TaskRecord {
            id: 7,
            title: "Buy milk".to_string(),
            description: Some("2%".to_string()),
            completed: false,
            user_id: 1,
        }
    }

    #[test]
    fn test_new_task_takes_owner() {
        let input = TaskInput {
            title: "Test Task".to_string(),
            description: Some("Test Description".to_string()),
            completed: true,
        };

        let task = NewTask::new(input, 3);
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.description.as_deref(), Some("Test Description"));
        assert!(task.completed);
        assert_eq!(task.user_id, 3);
    }

    #[test]
    fn test_task_input_validation() {
        let valid = TaskInput {
            title: "a".repeat(50),
            description: Some("b".repeat(200)),
            completed: false,
        };
        assert!(valid.validate().is_ok());

        let long_title = TaskInput {
            title: "a".repeat(51),
            description: None,
            completed: false,
        };
        assert!(long_title.validate().is_err());

        let long_description = TaskInput {
            title: "Valid".to_string(),
            description: Some("b".repeat(201)),
            completed: false,
        };
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_task_input_length_counts_characters() {
        // 50 multi-byte characters are still within the limit.
        let input = TaskInput {
            title: "молоко".repeat(8) + "ок",
            description: None,
            completed: false,
        };
        assert_eq!(input.title.chars().count(), 50);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_task_input_defaults() {
        let input: TaskInput = serde_json::from_str(r#"{"title": "Buy milk"}"#).unwrap();
        assert_eq!(input.description, None);
        assert!(!input.completed);

        let missing_title = serde_json::from_str::<TaskInput>(r#"{"completed": true}"#);
        assert!(missing_title.is_err());
    }

    #[test]
    fn test_apply_replaces_editable_fields() {
        let mut task = record();
        task.apply(TaskInput {
            title: "Buy bread".to_string(),
            description: None,
            completed: true,
        });

        assert_eq!(task.id, 7);
        assert_eq!(task.user_id, 1);
        assert_eq!(task.title, "Buy bread");
        assert_eq!(task.description, None);
        assert!(task.completed);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let input = TaskInput {
            title: "Buy milk".to_string(),
            description: Some("2%".to_string()),
            completed: true,
        };

        let mut once = record();
        once.apply(input.clone());
        let mut twice = once.clone();
        twice.apply(input);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_record_to_wire_mapping() {
        let task = Task::from(record());
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": 7,
                "title": "Buy milk",
                "description": "2%",
                "completed": false,
                "user_id": 1
            })
        );
    }

    #[test]
    fn test_task_query_defaults() {
        let query: TaskQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, 100);
    }
}
