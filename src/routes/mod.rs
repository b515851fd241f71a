pub mod grades;

pub mod journals;

pub mod lessons;

pub mod marks;

pub mod students;

pub mod subjects;

pub mod threads;

pub mod users;

pub mod years;

pub use grades::configure_grades_routes;
pub use journals::{configure_journals_routes, configure_teachers_routes};
pub use lessons::configure_lessons_routes;
pub use marks::configure_marks_routes;
pub use students::configure_students_routes;
pub use subjects::configure_subjects_routes;
pub use threads::configure_threads_routes;
pub use users::configure_user_routes;
pub use years::configure_years_routes;

use actix_web::web;

/// 注册全部 API 路由
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_user_routes)
        .configure(configure_grades_routes)
        .configure(configure_subjects_routes)
        .configure(configure_years_routes)
        // 日志、学生名单与课时
        .configure(configure_journals_routes)
        .configure(configure_teachers_routes)
        // 课时与批量评分
        .configure(configure_lessons_routes)
        .configure(configure_marks_routes)
        // 学生本人的日志、评分与学年
        .configure(configure_students_routes)
        .configure(configure_threads_routes);
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};

    use super::*;

    #[actix_web::test]
    async fn test_api_routes_require_login() {
        let app = test::init_service(App::new().configure(configure_api)).await;

        for uri in [
            "/api/v1/years",
            "/api/v1/threads",
            "/api/v1/threads/3",
            "/api/v1/students/5/journals",
            "/api/v1/students/5/years",
            "/api/v1/students/5/journals/2/lessons?course=1",
            "/api/v1/journals/2/marks?mark_type=course_grade",
        ] {
            let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }

        let resp = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/v1/nowhere").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
