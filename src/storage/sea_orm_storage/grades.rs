//! 成绩等级存储操作

use super::SeaOrmStorage;
use crate::entity::grades::{ActiveModel, Column, Entity as Grades};
use crate::errors::{Result, SchoolSystemError};
use crate::models::grades::{
    entities::Grade,
    requests::{CreateGradeRequest, UpdateGradeRequest},
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, QuerySelect, Set};

impl SeaOrmStorage {
    /// 列出全部成绩等级，按数值排序
    pub async fn list_grades_impl(&self) -> Result<Vec<Grade>> {
        let grades = Grades::find()
            .order_by_asc(Column::Value)
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询成绩等级失败: {e}")))?;

        Ok(grades.into_iter().map(|m| m.into_grade()).collect())
    }

    /// 通过 ID 获取成绩等级
    pub async fn get_grade_by_id_impl(&self, grade_id: i64) -> Result<Option<Grade>> {
        let result = Grades::find_by_id(grade_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询成绩等级失败: {e}")))?;

        Ok(result.map(|m| m.into_grade()))
    }

    /// 全部成绩等级 ID，用于批量校验
    pub async fn get_all_grade_ids_impl(&self) -> Result<Vec<i64>> {
        Grades::find()
            .select_only()
            .column(Column::Id)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("查询成绩等级 ID 失败: {e}")))
    }

    /// 创建成绩等级
    pub async fn create_grade_impl(&self, req: CreateGradeRequest) -> Result<Grade> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            identifier: Set(req.identifier),
            value: Set(req.value),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("创建成绩等级失败: {e}")))?;

        Ok(result.into_grade())
    }

    /// 更新成绩等级
    pub async fn update_grade_impl(
        &self,
        grade_id: i64,
        update: UpdateGradeRequest,
    ) -> Result<Option<Grade>> {
        // 先检查是否存在
        let existing = self.get_grade_by_id_impl(grade_id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(grade_id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(identifier) = update.identifier {
            model.identifier = Set(identifier);
        }

        if let Some(value) = update.value {
            model.value = Set(value);
        }

        model
            .update(&self.db)
            .await
            .map_err(|e| SchoolSystemError::database_operation(format!("更新成绩等级失败: {e}")))?;

        self.get_grade_by_id_impl(grade_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::memory_storage;
    use crate::models::grades::requests::{CreateGradeRequest, UpdateGradeRequest};

    #[tokio::test]
    async fn test_grade_lifecycle() {
        let storage = memory_storage().await;
        let five = storage
            .create_grade_impl(CreateGradeRequest {
                identifier: "5".into(),
                value: 5,
            })
            .await
            .unwrap();
        let two = storage
            .create_grade_impl(CreateGradeRequest {
                identifier: "2".into(),
                value: 2,
            })
            .await
            .unwrap();

        let listed = storage.list_grades_impl().await.unwrap();
        assert_eq!(
            listed.iter().map(|g| g.id).collect::<Vec<_>>(),
            vec![two.id, five.id]
        );

        let mut ids = storage.get_all_grade_ids_impl().await.unwrap();
        ids.sort();
        assert_eq!(ids, vec![five.id, two.id]);

        let updated = storage
            .update_grade_impl(
                five.id,
                UpdateGradeRequest {
                    identifier: Some("excellent".into()),
                    value: None,
                },
            )
            .await
            .unwrap()
            .expect("grade exists");
        assert_eq!(updated.identifier, "excellent");
        assert_eq!(updated.value, 5);

        assert!(
            storage
                .update_grade_impl(
                    999,
                    UpdateGradeRequest {
                        identifier: None,
                        value: Some(1)
                    }
                )
                .await
                .unwrap()
                .is_none()
        );
    }
}
