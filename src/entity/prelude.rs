//! 预导入模块，方便使用

pub use super::grades::{ActiveModel as GradeActiveModel, Entity as Grades, Model as GradeModel};
pub use super::journal_students::{
    ActiveModel as JournalStudentActiveModel, Entity as JournalStudents,
    Model as JournalStudentModel,
};
pub use super::journals::{
    ActiveModel as JournalActiveModel, Entity as Journals, Model as JournalModel,
};
pub use super::lessons::{ActiveModel as LessonActiveModel, Entity as Lessons, Model as LessonModel};
pub use super::marks::{ActiveModel as MarkActiveModel, Entity as Marks, Model as MarkModel};
pub use super::subjects::{
    ActiveModel as SubjectActiveModel, Entity as Subjects, Model as SubjectModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
pub use super::thread_logs::{
    ActiveModel as ThreadLogActiveModel, Entity as ThreadLogs, Model as ThreadLogModel,
};
pub use super::thread_members::{
    ActiveModel as ThreadMemberActiveModel, Entity as ThreadMembers, Model as ThreadMemberModel,
};
pub use super::threads::{ActiveModel as ThreadActiveModel, Entity as Threads, Model as ThreadModel};
pub use super::years::{ActiveModel as YearActiveModel, Entity as Years, Model as YearModel};
