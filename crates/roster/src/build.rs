use feedlab_core_types::{ParticipantId, PostCatalog, PostId, SessionId};
use feedlab_event_log::{actions, EventRecord};

use crate::model::{ParticipantRow, PostActivity, CELL_JOIN};

/// Reduces a session's event log plus the post catalog into one participant
/// row.
///
/// Pure over its inputs. Missing timing anchors leave the corresponding
/// cells empty; the build itself never fails.
///
/// When several `participant_id_entered` or `feed_submit` events exist
/// (retried submission), the first occurrence of each anchors the timing and
/// the interaction-cutoff window, so a row's semantics stay stable across
/// accidental double-submits.
pub fn build_row(
    session: &SessionId,
    participant: Option<&ParticipantId>,
    events: &[EventRecord],
    catalog: &PostCatalog,
) -> ParticipantRow {
    let entered = events
        .iter()
        .find(|ev| ev.action == actions::PARTICIPANT_ID_ENTERED);
    let submit_index = events
        .iter()
        .position(|ev| ev.action == actions::FEED_SUBMIT);
    let submitted = submit_index.map(|index| &events[index]);

    let ms_enter_to_submit = match (entered, submitted) {
        (Some(enter), Some(submit)) => {
            submit.elapsed_ms.saturating_sub(enter.elapsed_ms).to_string()
        }
        _ => String::new(),
    };

    // Last event strictly before the first submit that is neither scroll
    // noise nor the submit itself: the final meaningful interaction.
    let last_meaningful = submit_index.and_then(|index| {
        events[..index]
            .iter()
            .rev()
            .find(|ev| ev.action != actions::SCROLL && ev.action != actions::FEED_SUBMIT)
    });
    let ms_enter_to_last_interaction = match (entered, last_meaningful) {
        (Some(enter), Some(last)) => {
            last.elapsed_ms.saturating_sub(enter.elapsed_ms).to_string()
        }
        _ => String::new(),
    };

    let posts = catalog
        .iter()
        .map(|post| fold_post(post, events))
        .collect();

    ParticipantRow {
        session_id: session.0.clone(),
        participant_id: participant.map(|p| p.0.clone()).unwrap_or_default(),
        entered_at: entered.map(|ev| ev.ts_wall.to_rfc3339()).unwrap_or_default(),
        submitted_at: submitted
            .map(|ev| ev.ts_wall.to_rfc3339())
            .unwrap_or_default(),
        ms_enter_to_submit,
        ms_enter_to_last_interaction,
        posts,
    }
}

fn fold_post(post: &PostId, events: &[EventRecord]) -> PostActivity {
    let mut activity = PostActivity::default();
    let mut reactions: Vec<String> = Vec::new();
    let mut comments: Vec<String> = Vec::new();

    for event in events.iter().filter(|ev| ev.post_id() == Some(post)) {
        match event.action.as_str() {
            actions::REACT_PICK => {
                activity.reacted = "1".to_string();
                if let Some(tag) = &event.meta.reaction {
                    if !reactions.contains(tag) {
                        reactions.push(tag.clone());
                    }
                }
            }
            actions::COMMENT_SUBMIT => {
                activity.commented = "1".to_string();
                if let Some(text) = &event.meta.text {
                    if !text.is_empty() {
                        comments.push(text.clone());
                    }
                }
            }
            actions::SHARE => {
                activity.shared = "1".to_string();
            }
            actions::REPORT_MISINFORMATION_CLICK => {
                activity.reported_misinfo = "1".to_string();
            }
            _ => {}
        }
    }

    activity.reactions = reactions.join(CELL_JOIN);
    activity.comment_texts = comments.join(CELL_JOIN);
    activity
}
