pub mod loaders;
pub mod note;
pub mod outcome;
pub mod question;

pub use loaders::{load_all_note_sets, load_note_set};
pub use note::{Note, NoteForPrompt, NoteSet};
pub use outcome::{QuestionResult, QuizResult};
pub use question::{QuestionType, QuizQuestion, RawQuestion};
