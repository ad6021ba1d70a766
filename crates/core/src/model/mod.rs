pub mod curriculum;
mod ids;
mod lesson;
mod user;

pub use curriculum::{
    CourseDetails, CourseSummary, Language, LessonSummary, SectionSummary, rounded_percent,
};
pub use ids::{CourseId, LessonId, ParseIdError, TaskId, UserId};
pub use lesson::{
    LessonDetails, LessonSectionSummary, MatchingPairsData, MultipleChoiceData,
    SentenceBuildingData, Task, TaskDecodeError, TaskKind, Topic, WordExpression,
};
pub use user::{AuthResponse, LoginRequest, RegisterRequest, User, UserPatch};
