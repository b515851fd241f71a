//! 课时批量评分的校验与拆分
//!
//! 这里不做任何 IO：调用方预先查出课时下的评分、日志学生和全部成绩等级，
//! 本模块只负责把请求拆成插入、更新、按 ID 删除和按 (学生, 类型) 删除四组操作。
//! 任意一条有误时返回全部错误，不产生任何写操作。

use std::collections::{HashMap, HashSet};

use crate::models::marks::{
    batch::{FlagMarkRef, MarkBatch, MarkDraft, MarkUpdate},
    entities::MarkType,
    requests::{FieldError, LessonMarkEdit, LessonMarkPayload, LessonMarksEntry, NoticeTone},
};

/// 一次批量请求所需的全部已知状态
#[derive(Debug, Clone, Default)]
pub struct LessonContext {
    pub lesson_id: i64,
    pub journal_id: i64,
    pub course: i32,
    pub teacher_id: i64,
    pub now: i64,
    pub mark_ids: HashSet<i64>,
    /// (student_id, type) -> 已有标记的 ID
    pub flag_marks: HashMap<(i64, MarkType), Vec<i64>>,
    pub student_ids: HashSet<i64>,
    pub grade_ids: HashSet<i64>,
}

/// 按 (学生, 类型) 归并已有的考勤/完成度标记
pub fn index_flag_marks(
    refs: impl IntoIterator<Item = FlagMarkRef>,
) -> HashMap<(i64, MarkType), Vec<i64>> {
    refs.into_iter().fold(HashMap::new(), |mut index, flag| {
        index
            .entry((flag.student_id, flag.mark_type))
            .or_default()
            .push(flag.id);
        index
    })
}

impl LessonContext {
    /// 在本批次中既没有被删除、也没有被改成其他类型的已有标记
    fn keeps_flag(&self, key: &(i64, MarkType), retired: &HashSet<i64>) -> bool {
        self.flag_marks
            .get(key)
            .is_some_and(|ids| ids.iter().any(|id| !retired.contains(id)))
    }

    fn draft(&self, student_id: i64, mark_type: MarkType) -> MarkDraft {
        MarkDraft {
            user_id: student_id,
            lesson_id: Some(self.lesson_id),
            course: Some(self.course),
            journal_id: self.journal_id,
            grade_id: None,
            comment: None,
            mark_type,
            teacher_id: self.teacher_id,
            created_at: self.now,
        }
    }
}

pub fn plan_lesson_marks(
    ctx: &LessonContext,
    entries: &[LessonMarksEntry],
) -> Result<MarkBatch, Vec<FieldError>> {
    let mut batch = MarkBatch::default();
    let mut errors = Vec::new();
    // 本次请求中已安排插入的标记，避免同一学生重复出现时插入两条
    let mut staged_flags: HashSet<(i64, MarkType)> = HashSet::new();
    // (inserts 中的位置, key)，全部编辑规划完之后再与已有标记去重
    let mut flag_inserts: Vec<(usize, (i64, MarkType))> = Vec::new();

    for (ei, entry) in entries.iter().enumerate() {
        let student_id = entry.student_id;
        if student_id < 1 {
            continue;
        }
        if !ctx.student_ids.contains(&student_id) {
            errors.push(FieldError::new(
                format!("[{ei}].student_id"),
                format!("user not in journal: {student_id}"),
            ));
            continue;
        }

        for (flag, mark_type) in [
            (entry.absent, MarkType::Absent),
            (entry.late, MarkType::Late),
            (entry.not_done, MarkType::NotDone),
        ] {
            match flag {
                Some(true) => {
                    let key = (student_id, mark_type);
                    if staged_flags.insert(key) {
                        flag_inserts.push((batch.inserts.len(), key));
                        batch.inserts.push(ctx.draft(student_id, mark_type));
                    }
                }
                Some(false) => batch.delete_by_student_type.push((student_id, mark_type)),
                None => {}
            }
        }

        for (mi, edit) in entry.marks.iter().enumerate() {
            let path = format!("[{ei}].marks[{mi}]");
            let kind = match parse_edit_type(&edit.mark_type) {
                Some(kind) => Some(kind),
                None if edit.remove => None,
                None => {
                    errors.push(FieldError::new(
                        format!("{path}.type"),
                        format!("no such mark type: '{}'", edit.mark_type),
                    ));
                    continue;
                }
            };

            match edit.id {
                Some(id) => {
                    if !ctx.mark_ids.contains(&id) {
                        errors.push(FieldError::new(
                            format!("{path}.mark_id"),
                            format!("no such mark in lesson: {id}"),
                        ));
                        continue;
                    }
                    if edit.remove {
                        if !batch.delete_ids.contains(&id) {
                            batch.delete_ids.push(id);
                        }
                        continue;
                    }
                    let Some(kind) = kind else { continue };
                    match build_payload(ctx, kind, edit) {
                        Ok(payload) => batch.updates.push(MarkUpdate {
                            id,
                            mark_type: payload.mark_type(),
                            grade_id: payload.grade_id(),
                            comment: payload.comment().map(str::to_string),
                            teacher_id: ctx.teacher_id,
                            updated_at: ctx.now,
                        }),
                        Err(e) => errors.push(e.at(&path)),
                    }
                }
                None => {
                    // 删除一条尚不存在的评分，直接忽略
                    if edit.remove {
                        continue;
                    }
                    let Some(kind) = kind else { continue };
                    match build_payload(ctx, kind, edit) {
                        Ok(payload) => {
                            let mut draft = ctx.draft(student_id, payload.mark_type());
                            draft.grade_id = payload.grade_id();
                            draft.comment = payload.comment().map(str::to_string);
                            batch.inserts.push(draft);
                        }
                        Err(e) => errors.push(e.at(&path)),
                    }
                }
            }
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    drop_redundant_flags(ctx, &mut batch, flag_inserts);
    Ok(batch)
}

/// 学生已有且在本批次后仍保留的标记不再重复插入。
/// 同一批次里按 ID 删除或改写了该标记时，插入照常进行。
fn drop_redundant_flags(
    ctx: &LessonContext,
    batch: &mut MarkBatch,
    flag_inserts: Vec<(usize, (i64, MarkType))>,
) {
    let retired: HashSet<i64> = batch
        .delete_ids
        .iter()
        .copied()
        .chain(batch.updates.iter().map(|u| u.id))
        .collect();

    let redundant: HashSet<usize> = flag_inserts
        .into_iter()
        .filter(|(_, key)| ctx.keeps_flag(key, &retired))
        .map(|(pos, _)| pos)
        .collect();

    if redundant.is_empty() {
        return;
    }
    let mut pos = 0;
    batch.inserts.retain(|_| {
        let keep = !redundant.contains(&pos);
        pos += 1;
        keep
    });
}

/// 批量接口允许的编辑类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditKind {
    Grade,
    Notice(NoticeTone),
}

fn parse_edit_type(raw: &str) -> Option<EditKind> {
    match raw {
        MarkType::COMMON_GRADE => Some(EditKind::Grade),
        MarkType::NOTICE_GOOD => Some(EditKind::Notice(NoticeTone::Good)),
        MarkType::NOTICE_NEUTRAL => Some(EditKind::Notice(NoticeTone::Neutral)),
        MarkType::NOTICE_BAD => Some(EditKind::Notice(NoticeTone::Bad)),
        _ => None,
    }
}

struct PayloadError {
    field: &'static str,
    message: String,
}

impl PayloadError {
    fn at(self, path: &str) -> FieldError {
        FieldError::new(format!("{path}.{}", self.field), self.message)
    }
}

fn build_payload(
    ctx: &LessonContext,
    kind: EditKind,
    edit: &LessonMarkEdit,
) -> Result<LessonMarkPayload, PayloadError> {
    let comment = edit
        .comment
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);
    match kind {
        EditKind::Grade => {
            let grade_id = edit.grade.filter(|g| *g != 0).ok_or(PayloadError {
                field: "grade",
                message: "must be provided".to_string(),
            })?;
            if !ctx.grade_ids.contains(&grade_id) {
                return Err(PayloadError {
                    field: "grade",
                    message: format!("invalid grade ID: {grade_id}"),
                });
            }
            Ok(LessonMarkPayload::Grade { grade_id, comment })
        }
        EditKind::Notice(tone) => {
            let comment = comment.ok_or(PayloadError {
                field: "comment",
                message: "must be provided and not empty".to_string(),
            })?;
            Ok(LessonMarkPayload::Notice { tone, comment })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> LessonContext {
        LessonContext {
            lesson_id: 10,
            journal_id: 2,
            course: 1,
            teacher_id: 7,
            now: 1_700_000_000,
            mark_ids: [42, 43, 44].into_iter().collect(),
            // 44 是学生 6 的缺勤标记
            flag_marks: index_flag_marks([FlagMarkRef {
                id: 44,
                student_id: 6,
                mark_type: MarkType::Absent,
            }]),
            student_ids: [5, 6].into_iter().collect(),
            grade_ids: [1, 2, 3].into_iter().collect(),
        }
    }

    fn entry(json: &str) -> Vec<LessonMarksEntry> {
        serde_json::from_str(json).expect("valid batch json")
    }

    #[test]
    fn test_late_and_common_grade_become_two_inserts() {
        let batch = plan_lesson_marks(
            &ctx(),
            &entry(r#"[{"student_id":5,"late":true,"marks":[{"type":"common_grade","grade":3}]}]"#),
        )
        .expect("valid batch");

        assert_eq!(batch.inserts.len(), 2);
        assert_eq!(batch.inserts[0].mark_type, MarkType::Late);
        assert_eq!(batch.inserts[0].grade_id, None);
        assert_eq!(batch.inserts[1].mark_type, MarkType::LessonGrade);
        assert_eq!(batch.inserts[1].grade_id, Some(3));
        for draft in &batch.inserts {
            assert_eq!(draft.user_id, 5);
            assert_eq!(draft.lesson_id, Some(10));
            assert_eq!(draft.journal_id, 2);
            assert_eq!(draft.course, Some(1));
            assert_eq!(draft.teacher_id, 7);
        }
        assert!(batch.updates.is_empty());
        assert!(batch.delete_ids.is_empty());
        assert!(batch.delete_by_student_type.is_empty());
    }

    #[test]
    fn test_remove_by_id_is_single_delete() {
        let batch = plan_lesson_marks(
            &ctx(),
            &entry(r#"[{"student_id":5,"marks":[{"id":42,"remove":true}]}]"#),
        )
        .expect("valid batch");

        assert_eq!(
            batch,
            MarkBatch {
                delete_ids: vec![42],
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_remove_without_id_is_ignored() {
        let batch = plan_lesson_marks(
            &ctx(),
            &entry(r#"[{"student_id":5,"marks":[{"type":"notice_bad","remove":true}]}]"#),
        )
        .expect("valid batch");
        assert!(batch.is_empty());
    }

    #[test]
    fn test_flag_false_stages_pair_delete() {
        let batch =
            plan_lesson_marks(&ctx(), &entry(r#"[{"student_id":5,"absent":false}]"#)).unwrap();
        assert_eq!(batch.delete_by_student_type, vec![(5, MarkType::Absent)]);
        assert!(batch.inserts.is_empty());
    }

    #[test]
    fn test_flag_true_is_idempotent() {
        // 学生 6 已有缺勤标记
        let batch =
            plan_lesson_marks(&ctx(), &entry(r#"[{"student_id":6,"absent":true}]"#)).unwrap();
        assert!(batch.is_empty());

        let batch = plan_lesson_marks(
            &ctx(),
            &entry(r#"[{"student_id":5,"not_done":true},{"student_id":5,"not_done":true}]"#),
        )
        .unwrap();
        assert_eq!(batch.inserts.len(), 1);
    }

    #[test]
    fn test_flag_reinserted_when_existing_one_removed_by_id() {
        let batch = plan_lesson_marks(
            &ctx(),
            &entry(r#"[{"student_id":6,"absent":true,"marks":[{"id":44,"remove":true}]}]"#),
        )
        .unwrap();

        assert_eq!(batch.delete_ids, vec![44]);
        assert_eq!(batch.inserts.len(), 1);
        assert_eq!(batch.inserts[0].user_id, 6);
        assert_eq!(batch.inserts[0].mark_type, MarkType::Absent);
    }

    #[test]
    fn test_flag_reinserted_when_existing_one_retyped() {
        let batch = plan_lesson_marks(
            &ctx(),
            &entry(
                r#"[{"student_id":6,"absent":true,"marks":[{"id":44,"type":"notice_neutral","comment":"arrived with a note"}]}]"#,
            ),
        )
        .unwrap();

        assert_eq!(batch.updates.len(), 1);
        assert_eq!(batch.updates[0].mark_type, MarkType::NoticeNeutral);
        assert_eq!(batch.inserts.len(), 1);
        assert_eq!(batch.inserts[0].mark_type, MarkType::Absent);
    }

    #[test]
    fn test_blank_notice_comment_rejected() {
        let errors = plan_lesson_marks(
            &ctx(),
            &entry(r#"[{"student_id":5,"marks":[{"type":"notice_good","comment":"   "}]}]"#),
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "[0].marks[0].comment");

        let batch = plan_lesson_marks(
            &ctx(),
            &entry(r#"[{"student_id":5,"marks":[{"type":"notice_good","comment":"  well done "}]}]"#),
        )
        .unwrap();
        assert_eq!(batch.inserts[0].comment.as_deref(), Some("well done"));
    }

    #[test]
    fn test_update_existing_mark() {
        let batch = plan_lesson_marks(
            &ctx(),
            &entry(
                r#"[{"student_id":5,"marks":[{"id":43,"type":"notice_good","comment":"helped a classmate"}]}]"#,
            ),
        )
        .unwrap();

        assert_eq!(
            batch.updates,
            vec![MarkUpdate {
                id: 43,
                grade_id: None,
                comment: Some("helped a classmate".into()),
                mark_type: MarkType::NoticeGood,
                teacher_id: 7,
                updated_at: 1_700_000_000,
            }]
        );
    }

    #[test]
    fn test_errors_collected_in_input_order() {
        let result = plan_lesson_marks(
            &ctx(),
            &entry(
                r#"[
                    {"student_id":99,"absent":true},
                    {"student_id":5,"late":true,"marks":[
                        {"type":"excellent"},
                        {"id":1000,"type":"common_grade","grade":1},
                        {"type":"common_grade"},
                        {"type":"common_grade","grade":77},
                        {"type":"notice_neutral","comment":""}
                    ]}
                ]"#,
            ),
        );

        let errors = result.expect_err("batch must be rejected");
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "[0].student_id",
                "[1].marks[0].type",
                "[1].marks[1].mark_id",
                "[1].marks[2].grade",
                "[1].marks[3].grade",
                "[1].marks[4].comment",
            ]
        );
    }

    #[test]
    fn test_invalid_student_skips_whole_entry() {
        let errors = plan_lesson_marks(
            &ctx(),
            &entry(r#"[{"student_id":99,"marks":[{"type":"bogus"}]}]"#),
        )
        .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("99"));
    }

    #[test]
    fn test_non_positive_student_ids_are_skipped() {
        let batch = plan_lesson_marks(
            &ctx(),
            &entry(r#"[{"student_id":0,"absent":true},{"student_id":-4,"late":false}]"#),
        )
        .unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_remove_with_unknown_type_and_known_id() {
        let batch = plan_lesson_marks(
            &ctx(),
            &entry(r#"[{"student_id":5,"marks":[{"id":43,"type":"absent","remove":true}]}]"#),
        )
        .unwrap();
        assert_eq!(batch.delete_ids, vec![43]);
    }

    #[test]
    fn test_zero_grade_and_empty_comment_normalized() {
        let errors = plan_lesson_marks(
            &ctx(),
            &entry(r#"[{"student_id":5,"marks":[{"type":"common_grade","grade":0}]}]"#),
        )
        .unwrap_err();
        assert_eq!(errors[0].message, "must be provided");

        let batch = plan_lesson_marks(
            &ctx(),
            &entry(r#"[{"student_id":5,"marks":[{"type":"common_grade","grade":2,"comment":""}]}]"#),
        )
        .unwrap();
        assert_eq!(batch.inserts[0].comment, None);
    }
}
