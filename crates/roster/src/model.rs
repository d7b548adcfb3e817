use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};

/// Joins several values into one export cell. Distinct from comma so joined
/// cells survive CSV.
pub const CELL_JOIN: &str = " | ";

/// Per-post slice of a participant row. Cells are string-typed the way the
/// export surface wants them: `"0"`/`"1"` flags, joined tag/text lists,
/// empty when nothing was observed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostActivity {
    pub reacted: String,
    pub reactions: String,
    pub commented: String,
    pub comment_texts: String,
    pub shared: String,
    pub reported_misinfo: String,
}

impl Default for PostActivity {
    fn default() -> Self {
        Self {
            reacted: "0".to_string(),
            reactions: String::new(),
            commented: "0".to_string(),
            comment_texts: String::new(),
            shared: "0".to_string(),
            reported_misinfo: "0".to_string(),
        }
    }
}

impl PostActivity {
    fn values(&self) -> [&str; 6] {
        [
            &self.reacted,
            &self.reactions,
            &self.commented,
            &self.comment_texts,
            &self.shared,
            &self.reported_misinfo,
        ]
    }

    fn column_suffixes() -> [&'static str; 6] {
        [
            "reacted",
            "reactions",
            "commented",
            "comment_texts",
            "shared",
            "reported_misinfo",
        ]
    }
}

/// One denormalized record per completed session.
///
/// Timing cells are strings and stay empty when an anchor event never
/// occurred. `posts` follows catalog order; the flat projection addresses
/// them as `p1_`, `p2_`, ...
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRow {
    pub session_id: String,
    pub participant_id: String,
    pub entered_at: String,
    pub submitted_at: String,
    pub ms_enter_to_submit: String,
    pub ms_enter_to_last_interaction: String,
    pub posts: Vec<PostActivity>,
}

impl ParticipantRow {
    pub fn base_columns() -> [&'static str; 6] {
        [
            "session_id",
            "participant_id",
            "entered_at",
            "submitted_at",
            "ms_enter_to_submit",
            "ms_enter_to_last_interaction",
        ]
    }

    /// Flat column names for a roster covering `post_count` posts.
    pub fn flat_columns(post_count: usize) -> Vec<String> {
        let mut columns: Vec<String> = Self::base_columns()
            .iter()
            .map(|name| (*name).to_string())
            .collect();
        for index in 0..post_count {
            for suffix in PostActivity::column_suffixes() {
                columns.push(format!("p{}_{}", index + 1, suffix));
            }
        }
        columns
    }

    /// Flat cell values aligned with `flat_columns(post_count)`; rows with
    /// fewer posts are padded with untouched activity.
    pub fn flat_values(&self, post_count: usize) -> Vec<String> {
        let mut values = vec![
            self.session_id.clone(),
            self.participant_id.clone(),
            self.entered_at.clone(),
            self.submitted_at.clone(),
            self.ms_enter_to_submit.clone(),
            self.ms_enter_to_last_interaction.clone(),
        ];
        let blank = PostActivity::default();
        for index in 0..post_count {
            let activity = self.posts.get(index).unwrap_or(&blank);
            values.extend(activity.values().iter().map(|cell| (*cell).to_string()));
        }
        values
    }

    /// The row as one flat JSON object, the shape the remote collector and
    /// the structured export consume.
    pub fn to_flat_json(&self) -> JsonValue {
        let columns = Self::flat_columns(self.posts.len());
        let values = self.flat_values(self.posts.len());
        let mut map = JsonMap::with_capacity(columns.len());
        for (column, value) in columns.into_iter().zip(values) {
            map.insert(column, JsonValue::String(value));
        }
        JsonValue::Object(map)
    }
}
