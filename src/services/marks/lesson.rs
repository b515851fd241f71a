use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashSet;
use tracing::{debug, info};

use super::MarkService;
use super::reconcile::{LessonContext, index_flag_marks, plan_lesson_marks};
use crate::models::marks::{
    requests::LessonMarksEntry,
    responses::{StudentMarks, StudentMarksResponse},
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::journals::load_managed_journal;
use crate::services::lessons::load_lesson;
use crate::services::{current_user, internal_error};

/// 按请求一次性校验并写入课时下的全部评分变更
pub async fn set_marks_for_lesson(
    service: &MarkService,
    lesson_id: i64,
    entries: Vec<LessonMarksEntry>,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let lesson = match load_lesson(&storage, lesson_id).await {
        Ok(lesson) => lesson,
        Err(resp) => return Ok(resp),
    };
    // 权限检查在任何校验之前
    let journal = match load_managed_journal(&storage, lesson.journal_id, &user).await {
        Ok(journal) => journal,
        Err(resp) => return Ok(resp),
    };

    let refs = match storage.get_mark_refs_for_lesson(lesson.id).await {
        Ok(refs) => refs,
        Err(e) => return Ok(internal_error("Failed to load lesson marks", e)),
    };
    let student_ids = match storage.get_student_ids_for_journal(journal.id).await {
        Ok(ids) => ids,
        Err(e) => return Ok(internal_error("Failed to load journal students", e)),
    };
    let grade_ids = match storage.get_all_grade_ids().await {
        Ok(ids) => ids,
        Err(e) => return Ok(internal_error("Failed to load grades", e)),
    };

    let ctx = LessonContext {
        lesson_id: lesson.id,
        journal_id: journal.id,
        course: lesson.course,
        teacher_id: user.id,
        now: chrono::Utc::now().timestamp(),
        mark_ids: refs.mark_ids.into_iter().collect(),
        flag_marks: index_flag_marks(refs.flag_marks),
        student_ids: student_ids.into_iter().collect::<HashSet<_>>(),
        grade_ids: grade_ids.into_iter().collect::<HashSet<_>>(),
    };

    let batch = match plan_lesson_marks(&ctx, &entries) {
        Ok(batch) => batch,
        Err(errors) => {
            info!(
                "Rejected mark batch for lesson {}: {} invalid item(s)",
                lesson.id,
                errors.len()
            );
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error(
                ErrorCode::ValidationFailed,
                errors,
                "Validation failed",
            )));
        }
    };

    debug!(
        "Lesson {} batch: {} insert(s), {} update(s), {} delete(s), {} flag delete(s)",
        lesson.id,
        batch.inserts.len(),
        batch.updates.len(),
        batch.delete_ids.len(),
        batch.delete_by_student_type.len()
    );

    if !batch.is_empty()
        && let Err(e) = storage.apply_mark_batch(lesson.id, batch).await
    {
        return Ok(internal_error("Failed to save marks", e));
    }

    Ok(HttpResponse::Created().json(ApiResponse::success_empty("Marks saved")))
}

pub async fn get_marks_for_lesson(
    service: &MarkService,
    lesson_id: i64,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request)?;

    let lesson = match load_lesson(&storage, lesson_id).await {
        Ok(lesson) => lesson,
        Err(resp) => return Ok(resp),
    };
    let journal = match load_managed_journal(&storage, lesson.journal_id, &user).await {
        Ok(journal) => journal,
        Err(resp) => return Ok(resp),
    };

    let students = match storage.list_journal_students(journal.id).await {
        Ok(students) => students,
        Err(e) => return Ok(internal_error("Failed to load journal students", e)),
    };
    let marks = match storage.list_marks_for_lesson(lesson.id).await {
        Ok(marks) => marks,
        Err(e) => return Ok(internal_error("Failed to load lesson marks", e)),
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        StudentMarksResponse {
            students: StudentMarks::group(students, marks),
        },
        "Lesson marks retrieved successfully",
    )))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;

    use super::*;
    use crate::models::marks::entities::MarkType;
    use crate::models::marks::requests::LessonMarkEdit;
    use crate::services::test_support::{anonymous_request, body_json, request_as};
    use crate::storage::sea_orm_storage::test_support::{SeededLesson, seeded_lesson};

    fn entry(student_id: i64) -> LessonMarksEntry {
        LessonMarksEntry {
            student_id,
            absent: None,
            late: None,
            not_done: None,
            marks: Vec::new(),
        }
    }

    fn grade_edit(grade: i64) -> LessonMarkEdit {
        LessonMarkEdit {
            grade: Some(grade),
            mark_type: "common_grade".into(),
            ..Default::default()
        }
    }

    async fn submit(
        seed: &SeededLesson,
        as_user: &crate::models::users::entities::User,
        entries: Vec<LessonMarksEntry>,
    ) -> HttpResponse {
        MarkService::with_storage(seed.storage.clone())
            .set_marks_for_lesson(seed.lesson_id, entries, &request_as(as_user))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_late_and_grade_are_inserted() {
        let seed = seeded_lesson().await;
        let student = seed.students[0].id;

        let mut e = entry(student);
        e.late = Some(true);
        e.marks.push(grade_edit(seed.grade_ids[0]));

        let resp = submit(&seed, &seed.teacher.clone(), vec![e]).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let marks = seed.storage.list_marks_for_lesson(seed.lesson_id).await.unwrap();
        assert_eq!(marks.len(), 2);
        assert!(marks.iter().any(|m| m.mark_type == MarkType::Late));
        let grade = marks
            .iter()
            .find(|m| m.mark_type == MarkType::LessonGrade)
            .unwrap();
        assert_eq!(grade.grade_id, Some(seed.grade_ids[0]));
        assert_eq!(grade.teacher_id, seed.teacher.id);
        assert_eq!(grade.course, Some(1));
    }

    #[tokio::test]
    async fn test_absent_on_then_off_leaves_nothing() {
        let seed = seeded_lesson().await;
        let teacher = seed.teacher.clone();
        let student = seed.students[1].id;

        let mut on = entry(student);
        on.absent = Some(true);
        assert_eq!(submit(&seed, &teacher, vec![on.clone()]).await.status(), StatusCode::CREATED);
        // 重复提交不会产生第二条
        assert_eq!(submit(&seed, &teacher, vec![on]).await.status(), StatusCode::CREATED);
        assert_eq!(
            seed.storage.list_marks_for_lesson(seed.lesson_id).await.unwrap().len(),
            1
        );

        let mut off = entry(student);
        off.absent = Some(false);
        assert_eq!(submit(&seed, &teacher, vec![off.clone()]).await.status(), StatusCode::CREATED);
        assert!(seed.storage.list_marks_for_lesson(seed.lesson_id).await.unwrap().is_empty());

        // 没有缺勤记录时取消缺勤也是成功的
        assert_eq!(submit(&seed, &teacher, vec![off]).await.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_absent_kept_when_old_absent_removed_in_same_batch() {
        let seed = seeded_lesson().await;
        let teacher = seed.teacher.clone();
        let student = seed.students[0].id;

        let mut on = entry(student);
        on.absent = Some(true);
        submit(&seed, &teacher, vec![on]).await;
        let old = seed.storage.list_marks_for_lesson(seed.lesson_id).await.unwrap();
        assert_eq!(old.len(), 1);

        let mut again = entry(student);
        again.absent = Some(true);
        again.marks.push(LessonMarkEdit {
            id: Some(old[0].id),
            remove: true,
            ..Default::default()
        });
        assert_eq!(submit(&seed, &teacher, vec![again]).await.status(), StatusCode::CREATED);

        let marks = seed.storage.list_marks_for_lesson(seed.lesson_id).await.unwrap();
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].mark_type, MarkType::Absent);
        assert_ne!(marks[0].id, old[0].id);
    }

    #[tokio::test]
    async fn test_invalid_items_write_nothing() {
        let seed = seeded_lesson().await;
        let student = seed.students[0].id;

        let mut good = entry(student);
        good.late = Some(true);
        let mut bad = entry(seed.outsider.id);
        bad.absent = Some(true);
        let mut bad_grade = entry(student);
        bad_grade.marks.push(grade_edit(9999));

        let resp = submit(&seed, &seed.teacher.clone(), vec![good, bad, bad_grade]).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = body_json(resp);
        assert_eq!(body["code"], ErrorCode::ValidationFailed as i32);
        let errors = body["data"].as_array().unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["field"], "[1].student_id");
        assert_eq!(errors[1]["field"], "[2].marks[0].grade");

        assert!(seed.storage.list_marks_for_lesson(seed.lesson_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_remove_by_id() {
        let seed = seeded_lesson().await;
        let teacher = seed.teacher.clone();
        let student = seed.students[0].id;

        let mut first = entry(student);
        first.marks.push(grade_edit(seed.grade_ids[0]));
        first.marks.push(LessonMarkEdit {
            mark_type: "notice_good".into(),
            comment: Some("Helped a classmate".into()),
            ..Default::default()
        });
        submit(&seed, &teacher, vec![first]).await;

        let marks = seed.storage.list_marks_for_lesson(seed.lesson_id).await.unwrap();
        let grade_mark = marks.iter().find(|m| m.mark_type == MarkType::LessonGrade).unwrap();
        let notice = marks.iter().find(|m| m.mark_type == MarkType::NoticeGood).unwrap();

        let mut second = entry(student);
        second.marks.push(LessonMarkEdit {
            id: Some(grade_mark.id),
            ..grade_edit(seed.grade_ids[1])
        });
        second.marks.push(LessonMarkEdit {
            id: Some(notice.id),
            remove: true,
            ..Default::default()
        });
        assert_eq!(submit(&seed, &teacher, vec![second]).await.status(), StatusCode::CREATED);

        let marks = seed.storage.list_marks_for_lesson(seed.lesson_id).await.unwrap();
        assert_eq!(marks.len(), 1);
        assert_eq!(marks[0].id, grade_mark.id);
        assert_eq!(marks[0].grade_id, Some(seed.grade_ids[1]));
    }

    #[tokio::test]
    async fn test_foreign_teacher_is_forbidden_before_validation() {
        let seed = seeded_lesson().await;
        let other = crate::storage::sea_orm_storage::test_support::seed_user(
            &seed.storage,
            "teacher02",
            crate::models::users::entities::UserRole::Teacher,
        )
        .await;

        // 即使请求本身无效，也应先返回 403
        let resp = submit(&seed, &other, vec![entry(seed.outsider.id)]).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = submit(&seed, &seed.admin.clone(), vec![entry(seed.students[0].id)]).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_missing_lesson_and_anonymous() {
        let seed = seeded_lesson().await;
        let service = MarkService::with_storage(seed.storage.clone());

        let resp = service
            .set_marks_for_lesson(424242, vec![], &request_as(&seed.teacher))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = service
            .set_marks_for_lesson(seed.lesson_id, vec![], &anonymous_request())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_batch_does_not_touch_journal() {
        let seed = seeded_lesson().await;
        let before = seed
            .storage
            .get_journal_by_id(seed.journal_id)
            .await
            .unwrap()
            .unwrap()
            .last_updated;

        let mut e = entry(seed.students[0].id);
        e.not_done = Some(true);
        submit(&seed, &seed.teacher.clone(), vec![e]).await;

        let after = seed
            .storage
            .get_journal_by_id(seed.journal_id)
            .await
            .unwrap()
            .unwrap()
            .last_updated;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_lesson_marks_grouped_by_student() {
        let seed = seeded_lesson().await;
        let mut e = entry(seed.students[1].id);
        e.late = Some(true);
        submit(&seed, &seed.teacher.clone(), vec![e]).await;

        let resp = MarkService::with_storage(seed.storage.clone())
            .get_marks_for_lesson(seed.lesson_id, &request_as(&seed.teacher))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp);
        let students = body["data"]["students"].as_array().unwrap();
        assert_eq!(students.len(), 2);
        let with_mark = students
            .iter()
            .find(|s| s["student"]["id"] == seed.students[1].id)
            .unwrap();
        assert_eq!(with_mark["marks"][0]["type"], "late");
    }
}
