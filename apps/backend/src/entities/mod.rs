pub mod bingo_cards;
pub mod choices;
pub mod correct_answers;
pub mod questions;
pub mod user_answers;
pub mod users;

pub use bingo_cards::Entity as BingoCards;
pub use bingo_cards::Model as BingoCard;
pub use choices::Entity as Choices;
pub use choices::Model as ChoiceRow;
pub use correct_answers::Entity as CorrectAnswers;
pub use questions::Entity as Questions;
pub use questions::Model as QuestionRow;
pub use user_answers::Entity as UserAnswers;
pub use user_answers::Model as UserAnswer;
pub use users::Entity as Users;
pub use users::Model as User;
