//! Action vocabulary for recorded events.
//!
//! The vocabulary is open: any non-empty tag is accepted by the recorder.
//! These constants cover the actions the pipeline itself emits or inspects.

pub const SESSION_START: &str = "session_start";
pub const SESSION_END: &str = "session_end";

pub const SCROLL: &str = "scroll";
pub const VIEW_START: &str = "view_start";
pub const VIEW_END: &str = "view_end";

pub const REACT_PICK: &str = "react_pick";
pub const REACT_CLEAR: &str = "react_clear";
pub const SHARE: &str = "share";
pub const COMMENT_OPEN: &str = "comment_open";
pub const COMMENT_SUBMIT: &str = "comment_submit";
pub const COMMENT_CANCEL: &str = "comment_cancel";
pub const EXPAND_TEXT: &str = "expand_text";
pub const LINK_CLICK: &str = "link_click";
pub const IMAGE_OPEN: &str = "image_open";
pub const REPORT_MISINFORMATION_CLICK: &str = "report_misinformation_click";

pub const PARTICIPANT_ID_ENTERED: &str = "participant_id_entered";
pub const FEED_SUBMIT: &str = "feed_submit";
