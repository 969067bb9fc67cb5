pub mod gemini;
pub mod traits;
pub mod util;

pub use gemini::Gemini;
pub use traits::JsonCompletion;
pub use util::{extract_json, truncate_to_char_boundary};
