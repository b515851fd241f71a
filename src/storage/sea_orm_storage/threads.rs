//! 消息会话存储操作

use std::collections::HashSet;

use super::{SeaOrmStorage, finish_txn};
use crate::entity::thread_logs::{
    ActiveModel as ThreadLogActiveModel, Column as ThreadLogColumn, Entity as ThreadLogs,
};
use crate::entity::thread_members::{
    ActiveModel as ThreadMemberActiveModel, Column as ThreadMemberColumn, Entity as ThreadMembers,
};
use crate::entity::threads::{ActiveModel, Column, Entity as Threads};
use crate::errors::{Result, SchoolSystemError};
use crate::models::threads::entities::{Thread, ThreadAction, ThreadLog};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, sea_query::Expr,
};

async fn member_ids_in(txn: &DatabaseTransaction, thread_id: i64) -> Result<HashSet<i64>> {
    let ids = ThreadMembers::find()
        .select_only()
        .column(ThreadMemberColumn::UserId)
        .filter(ThreadMemberColumn::ThreadId.eq(thread_id))
        .into_tuple::<i64>()
        .all(txn)
        .await
        .map_err(|e| SchoolSystemError::transaction(format!("查询会话成员失败: {e}")))?;
    Ok(ids.into_iter().collect())
}

async fn insert_members(
    txn: &DatabaseTransaction,
    thread_id: i64,
    user_ids: &[i64],
    now: i64,
) -> Result<()> {
    if user_ids.is_empty() {
        return Ok(());
    }
    let models: Vec<ThreadMemberActiveModel> = user_ids
        .iter()
        .map(|&user_id| ThreadMemberActiveModel {
            thread_id: Set(thread_id),
            user_id: Set(user_id),
            joined_at: Set(now),
            ..Default::default()
        })
        .collect();
    ThreadMembers::insert_many(models)
        .exec(txn)
        .await
        .map_err(|e| SchoolSystemError::transaction(format!("添加会话成员失败: {e}")))?;
    Ok(())
}

async fn write_log(
    txn: &DatabaseTransaction,
    thread_id: i64,
    action: ThreadAction,
    targets: &[i64],
    by_user: i64,
    now: i64,
) -> Result<()> {
    let targets = serde_json::to_string(targets)
        .map_err(|e| SchoolSystemError::transaction(format!("序列化会话日志失败: {e}")))?;
    ThreadLogActiveModel {
        thread_id: Set(thread_id),
        action: Set(action.as_str().to_string()),
        targets: Set(targets),
        by_user: Set(by_user),
        at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await
    .map_err(|e| SchoolSystemError::transaction(format!("写入会话日志失败: {e}")))?;

    Threads::update_many()
        .col_expr(Column::UpdatedAt, Expr::value(now))
        .filter(Column::Id.eq(thread_id))
        .exec(txn)
        .await
        .map_err(|e| SchoolSystemError::transaction(format!("更新会话时间失败: {e}")))?;
    Ok(())
}

impl SeaOrmStorage {
    /// 创建会话，作者自动成为成员
    pub async fn create_thread_impl(
        &self,
        author_id: i64,
        title: &str,
        body: &str,
        member_ids: &[i64],
    ) -> Result<Thread> {
        let now = chrono::Utc::now().timestamp();
        let mut seen = HashSet::new();
        let members: Vec<i64> = std::iter::once(author_id)
            .chain(member_ids.iter().copied())
            .filter(|id| seen.insert(*id))
            .collect();

        let txn = self.begin_txn().await?;
        let result = async {
            let thread = ActiveModel {
                author_id: Set(author_id),
                title: Set(title.trim().to_string()),
                body: Set(body.trim().to_string()),
                locked: Set(false),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&txn)
            .await
            .map_err(|e| SchoolSystemError::transaction(format!("创建会话失败: {e}")))?;
            insert_members(&txn, thread.id, &members, now).await?;
            Ok::<_, SchoolSystemError>(thread)
        }
        .await;

        Ok(finish_txn(txn, result, "thread creation").await?.into_thread())
    }

    pub async fn get_thread_by_id_impl(&self, id: i64) -> Result<Option<Thread>> {
        let result = Threads::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询会话失败: {e}")))?;

        Ok(result.map(|m| m.into_thread()))
    }

    /// 用户参与的会话，最近更新的在前
    pub async fn list_threads_for_user_impl(&self, user_id: i64) -> Result<Vec<Thread>> {
        let thread_ids: Vec<i64> = ThreadMembers::find()
            .select_only()
            .column(ThreadMemberColumn::ThreadId)
            .filter(ThreadMemberColumn::UserId.eq(user_id))
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询用户会话失败: {e}")))?;
        if thread_ids.is_empty() {
            return Ok(Vec::new());
        }

        let threads = Threads::find()
            .filter(Column::Id.is_in(thread_ids))
            .order_by_desc(Column::UpdatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询会话列表失败: {e}")))?;

        Ok(threads.into_iter().map(|m| m.into_thread()).collect())
    }

    pub async fn get_thread_member_ids_impl(&self, thread_id: i64) -> Result<Vec<i64>> {
        ThreadMembers::find()
            .select_only()
            .column(ThreadMemberColumn::UserId)
            .filter(ThreadMemberColumn::ThreadId.eq(thread_id))
            .order_by_asc(ThreadMemberColumn::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询会话成员失败: {e}")))
    }

    pub async fn list_thread_logs_impl(&self, thread_id: i64) -> Result<Vec<ThreadLog>> {
        let logs = ThreadLogs::find()
            .filter(ThreadLogColumn::ThreadId.eq(thread_id))
            .order_by_asc(ThreadLogColumn::At)
            .order_by_asc(ThreadLogColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询会话日志失败: {e}")))?;

        Ok(logs.into_iter().map(|m| m.into_log()).collect())
    }

    /// 删除会话（成员与日志级联删除）
    pub async fn delete_thread_impl(&self, id: i64) -> Result<bool> {
        let result = Threads::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("删除会话失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 切换锁定状态并记录操作；状态未变化时返回 false 且不写日志
    pub async fn set_thread_locked_impl(&self, id: i64, locked: bool, by_user: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.begin_txn().await?;

        let result = async {
            let changed = Threads::update_many()
                .col_expr(Column::Locked, Expr::value(locked))
                .filter(Column::Id.eq(id))
                .filter(Column::Locked.eq(!locked))
                .exec(&txn)
                .await
                .map_err(|e| SchoolSystemError::transaction(format!("更新会话锁定状态失败: {e}")))?;
            if changed.rows_affected == 0 {
                return Ok::<_, SchoolSystemError>(false);
            }

            let action = if locked {
                ThreadAction::Locked
            } else {
                ThreadAction::Unlocked
            };
            write_log(&txn, id, action, &[], by_user, now).await?;
            Ok(true)
        }
        .await;

        finish_txn(txn, result, "thread lock").await
    }

    /// 添加成员，已在会话中的用户跳过；返回实际新增的用户
    pub async fn add_thread_members_impl(
        &self,
        thread_id: i64,
        user_ids: &[i64],
        by_user: i64,
    ) -> Result<Vec<i64>> {
        let now = chrono::Utc::now().timestamp();
        let txn = self.begin_txn().await?;

        let result = async {
            let mut existing = member_ids_in(&txn, thread_id).await?;
            let added: Vec<i64> = user_ids
                .iter()
                .copied()
                .filter(|id| existing.insert(*id))
                .collect();
            if added.is_empty() {
                return Ok::<_, SchoolSystemError>(added);
            }

            insert_members(&txn, thread_id, &added, now).await?;
            write_log(&txn, thread_id, ThreadAction::AddedUser, &added, by_user, now).await?;
            Ok(added)
        }
        .await;

        finish_txn(txn, result, "thread member addition").await
    }
}
