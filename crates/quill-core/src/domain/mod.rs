//! Domain entities - the core business objects.

mod assist;
mod category;
mod content;
mod post;
mod reading;
mod slug;
mod user;

pub use assist::{
    AssistMode, AssistRequest, EXPLICIT_CONTEXT_CHARS, Insertion, SUGGESTION_CONTEXT_CHARS,
    strip_markup, tail_chars,
};
pub use category::CATEGORIES;
pub use content::{ContentNode, Mark};
pub use post::{DEFAULT_COLOR, Post, PostFields, PostStatus};
pub use reading::{WORDS_PER_MINUTE, count_words, extract_text, read_time_label};
pub use slug::generate_slug;
pub use user::{AccessPolicy, Role, User};
