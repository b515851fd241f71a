pub mod create;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::years::requests::{CreateYearRequest, YearListParams};
use crate::storage::Storage;

pub struct YearService {
    storage: Option<Arc<dyn Storage>>,
}

impl YearService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub fn with_storage(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage: Some(storage),
        }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::resolve_storage(&self.storage, request)
    }

    // 全部学年，管理员可附带日志统计
    pub async fn list_years(
        &self,
        params: YearListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        list::list_years(self, params, request).await
    }

    // 新学年（管理员）
    pub async fn create_year(
        &self,
        year_data: CreateYearRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_year(self, year_data, request).await
    }
}
