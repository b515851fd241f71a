use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Status).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string().null())
                    .col(ColumnDef::new(Users::LastLogin).big_integer().null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建科目表
        manager
            .create_table(
                Table::create()
                    .table(Subjects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subjects::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subjects::Name).string().not_null())
                    .col(ColumnDef::new(Subjects::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建成绩等级表
        manager
            .create_table(
                Table::create()
                    .table(Grades::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Grades::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Grades::Identifier).string().not_null())
                    .col(ColumnDef::new(Grades::Value).integer().not_null())
                    .col(ColumnDef::new(Grades::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Grades::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建日志（journal）表
        manager
            .create_table(
                Table::create()
                    .table(Journals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Journals::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Journals::Name).string().not_null())
                    .col(ColumnDef::new(Journals::TeacherId).big_integer().not_null())
                    .col(ColumnDef::new(Journals::SubjectId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Journals::Archived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Journals::LastUpdated)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Journals::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Journals::Table, Journals::TeacherId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Journals::Table, Journals::SubjectId)
                            .to(Subjects::Table, Subjects::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建日志学生关联表
        manager
            .create_table(
                Table::create()
                    .table(JournalStudents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JournalStudents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(JournalStudents::JournalId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JournalStudents::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(JournalStudents::JoinedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(JournalStudents::Table, JournalStudents::JournalId)
                            .to(Journals::Table, Journals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(JournalStudents::Table, JournalStudents::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建课时表
        manager
            .create_table(
                Table::create()
                    .table(Lessons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Lessons::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Lessons::JournalId).big_integer().not_null())
                    .col(ColumnDef::new(Lessons::LessonDate).string().not_null())
                    .col(ColumnDef::new(Lessons::Course).integer().not_null())
                    .col(ColumnDef::new(Lessons::Description).text().null())
                    .col(ColumnDef::new(Lessons::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Lessons::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Lessons::Table, Lessons::JournalId)
                            .to(Journals::Table, Journals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建评分记录（mark）表
        manager
            .create_table(
                Table::create()
                    .table(Marks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Marks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Marks::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Marks::LessonId).big_integer().null())
                    .col(ColumnDef::new(Marks::Course).integer().null())
                    .col(ColumnDef::new(Marks::JournalId).big_integer().not_null())
                    .col(ColumnDef::new(Marks::GradeId).big_integer().null())
                    .col(ColumnDef::new(Marks::Comment).text().null())
                    .col(ColumnDef::new(Marks::MarkType).string().not_null())
                    .col(ColumnDef::new(Marks::TeacherId).big_integer().not_null())
                    .col(ColumnDef::new(Marks::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Marks::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Marks::Table, Marks::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Marks::Table, Marks::LessonId)
                            .to(Lessons::Table, Lessons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Marks::Table, Marks::JournalId)
                            .to(Journals::Table, Journals::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Marks::Table, Marks::GradeId)
                            .to(Grades::Table, Grades::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_role")
                    .table(Users::Table)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_journals_teacher_id")
                    .table(Journals::Table)
                    .col(Journals::TeacherId)
                    .to_owned(),
            )
            .await?;

        // 同一学生在同一日志中只能出现一次
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_journal_students_unique")
                    .table(JournalStudents::Table)
                    .col(JournalStudents::JournalId)
                    .col(JournalStudents::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_lessons_journal_course")
                    .table(Lessons::Table)
                    .col(Lessons::JournalId)
                    .col(Lessons::Course)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_marks_lesson_id")
                    .table(Marks::Table)
                    .col(Marks::LessonId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_marks_journal_type")
                    .table(Marks::Table)
                    .col(Marks::JournalId)
                    .col(Marks::MarkType)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_marks_user_id")
                    .table(Marks::Table)
                    .col(Marks::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(Marks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Lessons::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JournalStudents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Journals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Grades::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Subjects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    Status,
    DisplayName,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Subjects {
    #[sea_orm(iden = "subjects")]
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Grades {
    #[sea_orm(iden = "grades")]
    Table,
    Id,
    Identifier,
    Value,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Journals {
    #[sea_orm(iden = "journals")]
    Table,
    Id,
    Name,
    TeacherId,
    SubjectId,
    Archived,
    LastUpdated,
    CreatedAt,
}

#[derive(DeriveIden)]
enum JournalStudents {
    #[sea_orm(iden = "journal_students")]
    Table,
    Id,
    JournalId,
    UserId,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Lessons {
    #[sea_orm(iden = "lessons")]
    Table,
    Id,
    JournalId,
    LessonDate,
    Course,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Marks {
    #[sea_orm(iden = "marks")]
    Table,
    Id,
    UserId,
    LessonId,
    Course,
    JournalId,
    GradeId,
    Comment,
    MarkType,
    TeacherId,
    CreatedAt,
    UpdatedAt,
}
