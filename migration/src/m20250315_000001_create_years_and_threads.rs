use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== 学年表 ====================
        manager
            .create_table(
                Table::create()
                    .table(Years::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Years::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Years::DisplayName).string().not_null())
                    .col(ColumnDef::new(Years::Courses).integer().not_null())
                    .col(
                        ColumnDef::new(Years::Current)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Years::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 日志归属的学年，旧数据允许为空
        manager
            .alter_table(
                Table::alter()
                    .table(Journals::Table)
                    .add_column(ColumnDef::new(Journals::YearId).big_integer().null())
                    .to_owned(),
            )
            .await?;

        // ==================== 消息会话表 ====================
        manager
            .create_table(
                Table::create()
                    .table(Threads::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Threads::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Threads::AuthorId).big_integer().not_null())
                    .col(ColumnDef::new(Threads::Title).string().not_null())
                    .col(ColumnDef::new(Threads::Body).text().not_null())
                    .col(
                        ColumnDef::new(Threads::Locked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Threads::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Threads::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Threads::Table, Threads::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ThreadMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ThreadMembers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ThreadMembers::ThreadId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ThreadMembers::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(ThreadMembers::JoinedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ThreadMembers::Table, ThreadMembers::ThreadId)
                            .to(Threads::Table, Threads::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ThreadMembers::Table, ThreadMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== 会话操作日志表 ====================
        manager
            .create_table(
                Table::create()
                    .table(ThreadLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ThreadLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ThreadLogs::ThreadId).big_integer().not_null())
                    .col(ColumnDef::new(ThreadLogs::Action).string().not_null())
                    .col(ColumnDef::new(ThreadLogs::Targets).text().not_null())
                    .col(ColumnDef::new(ThreadLogs::ByUser).big_integer().not_null())
                    .col(ColumnDef::new(ThreadLogs::At).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(ThreadLogs::Table, ThreadLogs::ThreadId)
                            .to(Threads::Table, Threads::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_journals_year_id")
                    .table(Journals::Table)
                    .col(Journals::YearId)
                    .to_owned(),
            )
            .await?;

        // 同一用户在同一会话中只能出现一次
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_thread_members_unique")
                    .table(ThreadMembers::Table)
                    .col(ThreadMembers::ThreadId)
                    .col(ThreadMembers::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_thread_logs_thread_id")
                    .table(ThreadLogs::Table)
                    .col(ThreadLogs::ThreadId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ThreadLogs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ThreadMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Threads::Table).to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_journals_year_id")
                    .table(Journals::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Journals::Table)
                    .drop_column(Journals::YearId)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Years::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Journals {
    #[sea_orm(iden = "journals")]
    Table,
    YearId,
}

#[derive(DeriveIden)]
enum Years {
    #[sea_orm(iden = "years")]
    Table,
    Id,
    DisplayName,
    Courses,
    Current,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Threads {
    #[sea_orm(iden = "threads")]
    Table,
    Id,
    AuthorId,
    Title,
    Body,
    Locked,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ThreadMembers {
    #[sea_orm(iden = "thread_members")]
    Table,
    Id,
    ThreadId,
    UserId,
    JoinedAt,
}

#[derive(DeriveIden)]
enum ThreadLogs {
    #[sea_orm(iden = "thread_logs")]
    Table,
    Id,
    ThreadId,
    Action,
    Targets,
    ByUser,
    At,
}
