mod common;

use common::{
    FlakyRemote, admin, draft, harness, harness_with_broken_disk, instructor, learner, lesson_id,
    mp4, pdf, png, seed_course,
};
use course_pipeline::error::CoreError;
use course_pipeline::module::course::crud::{
    self, MATERIALS_MODULE_TITLE, add_lesson_resources, add_lesson_video, apply_edit,
    create_course, delete_course, list_course_audit, remove_lesson_video, update_lesson_video,
};
use course_pipeline::module::course::schema::{AuditAction, CourseFieldEdits, CourseMediaFiles};
use course_pipeline::service::storage_service::StorageType;
use serde_json::Value;
use std::sync::Arc;

fn price_edit(price: i64) -> CourseFieldEdits {
    CourseFieldEdits {
        price: Some(price),
        ..CourseFieldEdits::default()
    }
}

#[tokio::test]
async fn create_writes_a_created_entry() {
    let h = harness();
    let owner = instructor("inst-1");
    let outcome = create_course(
        &h.state,
        &owner,
        draft("Rust 101", 5000),
        CourseMediaFiles {
            thumbnail: Some(png("cover.png")),
            ..CourseMediaFiles::default()
        },
        Some("launch".to_string()),
    )
    .await
    .expect("create");

    assert_eq!(outcome.course.owner_id, "inst-1");
    assert_eq!(
        outcome.course.thumbnail.as_ref().map(|t| t.storage_type),
        Some(StorageType::Local)
    );
    let entry = outcome.audit_entry.expect("audit entry");
    assert_eq!(entry.action, AuditAction::Created);
    assert_eq!(entry.reason.as_deref(), Some("launch"));
    assert!(entry.changed_fields.contains(&"thumbnail".to_string()));
    assert_eq!(
        entry.changed_fields,
        entry.changes.after.keys().cloned().collect::<Vec<_>>()
    );
}

#[tokio::test]
async fn learners_cannot_create_courses() {
    let h = harness();
    let err = create_course(
        &h.state,
        &learner("u-1"),
        draft("Rust 101", 5000),
        CourseMediaFiles::default(),
        None,
    )
    .await
    .expect_err("learner");
    assert!(matches!(err, CoreError::Forbidden(_)));
}

#[tokio::test]
async fn create_is_strict_about_media_failures() {
    let h = harness_with_broken_disk(None);
    let err = create_course(
        &h.state,
        &instructor("inst-1"),
        draft("Rust 101", 5000),
        CourseMediaFiles {
            thumbnail: Some(png("cover.png")),
            ..CourseMediaFiles::default()
        },
        None,
    )
    .await
    .expect_err("strict create");
    assert!(matches!(err, CoreError::StorageFatal(_)));
}

#[tokio::test]
async fn repeating_an_edit_produces_no_second_entry() {
    let h = harness();
    let owner = instructor("inst-1");
    let course = seed_course(&h, &owner, 4000).await;
    let edits = CourseFieldEdits {
        title: Some("Rust 201".to_string()),
        price: Some(5000),
        category: Some("systems".to_string()),
        ..CourseFieldEdits::default()
    };

    let first = apply_edit(&h.state, &owner, &course.id, edits.clone(), CourseMediaFiles::default(), None)
        .await
        .expect("first edit");
    let entry = first.audit_entry.expect("first edit is audited");
    assert_eq!(entry.action, AuditAction::Updated);
    assert_eq!(entry.changed_fields, vec!["category", "price", "title"]);
    assert_eq!(entry.changes.before["price"], Value::from(4000));
    assert_eq!(entry.changes.after["price"], Value::from(5000));

    let second = apply_edit(&h.state, &owner, &course.id, edits, CourseMediaFiles::default(), None)
        .await
        .expect("second edit");
    assert!(second.audit_entry.is_none());
    assert_eq!(second.course.updated_at, first.course.updated_at);

    let history = list_course_audit(&h.state, &owner, &course.id).await.expect("history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, AuditAction::Updated);
    assert_eq!(history[1].action, AuditAction::Created);
}

#[tokio::test]
async fn empty_string_clears_optional_fields() {
    let h = harness();
    let owner = instructor("inst-1");
    let course = seed_course(&h, &owner, 4000).await;

    let outcome = apply_edit(
        &h.state,
        &owner,
        &course.id,
        CourseFieldEdits {
            level: Some("  ".to_string()),
            ..CourseFieldEdits::default()
        },
        CourseMediaFiles::default(),
        None,
    )
    .await
    .expect("edit");
    assert_eq!(outcome.course.level, None);
    let entry = outcome.audit_entry.expect("audited");
    assert_eq!(entry.changes.before["level"], Value::from("beginner"));
    assert_eq!(entry.changes.after["level"], Value::Null);
}

#[tokio::test]
async fn publish_toggles_get_their_own_actions() {
    let h = harness();
    let owner = instructor("inst-1");
    let course = seed_course(&h, &owner, 4000).await;

    let publish = CourseFieldEdits {
        published: Some(true),
        ..CourseFieldEdits::default()
    };
    let published = apply_edit(&h.state, &owner, &course.id, publish, CourseMediaFiles::default(), None)
        .await
        .expect("publish");
    assert_eq!(published.audit_entry.map(|e| e.action), Some(AuditAction::Published));

    let unpublish_and_reprice = CourseFieldEdits {
        published: Some(false),
        price: Some(4500),
        ..CourseFieldEdits::default()
    };
    let mixed = apply_edit(
        &h.state,
        &owner,
        &course.id,
        unpublish_and_reprice,
        CourseMediaFiles::default(),
        None,
    )
    .await
    .expect("mixed edit");
    assert_eq!(mixed.audit_entry.map(|e| e.action), Some(AuditAction::Updated));

    let republish = CourseFieldEdits {
        published: Some(true),
        ..CourseFieldEdits::default()
    };
    apply_edit(&h.state, &owner, &course.id, republish, CourseMediaFiles::default(), None)
        .await
        .expect("republish");
    let off = CourseFieldEdits {
        published: Some(false),
        ..CourseFieldEdits::default()
    };
    let unpublished = apply_edit(&h.state, &owner, &course.id, off, CourseMediaFiles::default(), None)
        .await
        .expect("unpublish");
    assert_eq!(unpublished.audit_entry.map(|e| e.action), Some(AuditAction::Unpublished));
}

#[tokio::test]
async fn invalid_intro_link_is_rejected_before_persistence() {
    let h = harness();
    let owner = instructor("inst-1");
    let course = seed_course(&h, &owner, 4000).await;

    let edits = CourseFieldEdits {
        title: Some("Renamed".to_string()),
        intro_video_link: Some("https://example.com/random".to_string()),
        ..CourseFieldEdits::default()
    };
    let err = apply_edit(&h.state, &owner, &course.id, edits, CourseMediaFiles::default(), None)
        .await
        .expect_err("bad link");
    assert!(matches!(err, CoreError::Validation(_)));

    let stored = h.state.store.get_course(&course.id).await.expect("course");
    assert_eq!(stored.title, "Rust 101");
    assert_eq!(list_course_audit(&h.state, &owner, &course.id).await.expect("history").len(), 1);
}

#[tokio::test]
async fn valid_intro_link_is_applied() {
    let h = harness();
    let owner = instructor("inst-1");
    let course = seed_course(&h, &owner, 4000).await;

    let edits = CourseFieldEdits {
        intro_video_link: Some("https://vimeo.com/123456".to_string()),
        ..CourseFieldEdits::default()
    };
    let outcome = apply_edit(&h.state, &owner, &course.id, edits, CourseMediaFiles::default(), None)
        .await
        .expect("edit");
    assert_eq!(outcome.course.intro_video_link.as_deref(), Some("https://vimeo.com/123456"));
    assert!(outcome.warnings.is_empty());
}

#[tokio::test]
async fn duplicate_intro_link_is_a_warning_not_an_error() {
    let h = harness();
    let owner = instructor("inst-1");
    let course = seed_course(&h, &owner, 4000).await;

    let edits = CourseFieldEdits {
        intro_video_link: Some("https://youtu.be/ownership01".to_string()),
        ..CourseFieldEdits::default()
    };
    let outcome = apply_edit(&h.state, &owner, &course.id, edits, CourseMediaFiles::default(), None)
        .await
        .expect("duplicate tolerated");
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.audit_entry.is_some());
}

#[tokio::test]
async fn strangers_are_rejected_before_any_work() {
    let h = harness();
    let owner = instructor("inst-1");
    let course = seed_course(&h, &owner, 4000).await;

    let err = apply_edit(
        &h.state,
        &instructor("inst-2"),
        &course.id,
        price_edit(1),
        CourseMediaFiles {
            thumbnail: Some(png("cover.png")),
            ..CourseMediaFiles::default()
        },
        None,
    )
    .await
    .expect_err("stranger");
    assert!(matches!(err, CoreError::Unauthorized(_)));
    assert!(
        std::fs::read_dir(h.upload_dir.path())
            .expect("upload root")
            .next()
            .is_none(),
        "nothing may be uploaded for an unauthorized caller"
    );

    let by_admin = apply_edit(&h.state, &admin(), &course.id, price_edit(1), CourseMediaFiles::default(), None)
        .await
        .expect("admin may edit");
    assert_eq!(by_admin.audit_entry.map(|e| e.admin), Some("admin-1".to_string()));
}

#[tokio::test]
async fn update_skips_failed_media_but_keeps_text_edits() {
    let h = harness_with_broken_disk(None);
    let owner = instructor("inst-1");
    let course = seed_course(&h, &owner, 4000).await;

    let outcome = apply_edit(
        &h.state,
        &owner,
        &course.id,
        price_edit(5000),
        CourseMediaFiles {
            thumbnail: Some(png("cover.png")),
            intro_video: Some(mp4("intro.mp4")),
            materials: vec![pdf("a.pdf")],
        },
        None,
    )
    .await
    .expect("lenient update");

    assert_eq!(outcome.course.price, 5000);
    assert!(outcome.course.thumbnail.is_none());
    assert!(outcome.course.intro_video.is_none());
    assert_eq!(outcome.warnings.len(), 3);
    let entry = outcome.audit_entry.expect("audited");
    assert_eq!(entry.changed_fields, vec!["price"]);
}

#[tokio::test]
async fn update_still_validates_media_kinds() {
    let h = harness();
    let owner = instructor("inst-1");
    let course = seed_course(&h, &owner, 4000).await;

    let err = apply_edit(
        &h.state,
        &owner,
        &course.id,
        price_edit(5000),
        CourseMediaFiles {
            materials: vec![png("not-a-pdf.png")],
            ..CourseMediaFiles::default()
        },
        None,
    )
    .await
    .expect_err("png is not a material");
    assert!(matches!(err, CoreError::Validation(_)));
    let stored = h.state.store.get_course(&course.id).await.expect("course");
    assert_eq!(stored.price, 4000);
}

#[tokio::test]
async fn materials_live_in_one_well_known_lesson_in_input_order() {
    let h = harness();
    let owner = instructor("inst-1");
    let course = seed_course(&h, &owner, 4000).await;

    let first = apply_edit(
        &h.state,
        &owner,
        &course.id,
        CourseFieldEdits::default(),
        CourseMediaFiles {
            materials: vec![pdf("one.pdf"), pdf("two.pdf"), pdf("three.pdf")],
            ..CourseMediaFiles::default()
        },
        None,
    )
    .await
    .expect("materials");

    let materials: Vec<_> = first
        .course
        .modules
        .iter()
        .filter(|m| m.title == MATERIALS_MODULE_TITLE)
        .collect();
    assert_eq!(materials.len(), 1);
    assert_eq!(materials[0].lessons.len(), 1);
    let names: Vec<_> = materials[0].lessons[0]
        .resources
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, ["one.pdf", "two.pdf", "three.pdf"]);
    let lesson_before = materials[0].lessons[0].id.clone();
    let old_ids: Vec<_> = materials[0].lessons[0]
        .resources
        .iter()
        .map(|r| r.id.clone())
        .collect();

    let second = apply_edit(
        &h.state,
        &owner,
        &course.id,
        CourseFieldEdits::default(),
        CourseMediaFiles {
            materials: vec![pdf("replacement.pdf")],
            ..CourseMediaFiles::default()
        },
        None,
    )
    .await
    .expect("replace materials");
    let module = second
        .course
        .modules
        .iter()
        .find(|m| m.title == MATERIALS_MODULE_TITLE)
        .expect("materials module");
    assert_eq!(second.course.modules.iter().filter(|m| m.title == MATERIALS_MODULE_TITLE).count(), 1);
    assert_eq!(module.lessons[0].id, lesson_before);
    assert_eq!(module.lessons[0].resources.len(), 1);
    assert_eq!(module.lessons[0].resources[0].name, "replacement.pdf");
    for id in old_ids {
        assert!(!h.upload_path(&id).exists(), "replaced material {id} is removed");
    }
}

#[tokio::test]
async fn lesson_video_lifecycle_is_audited() {
    let h = harness();
    let owner = instructor("inst-1");
    let course = seed_course(&h, &owner, 4000).await;
    let borrowing = lesson_id(&course, "Borrowing");
    let ownership = lesson_id(&course, "Ownership");

    let err = add_lesson_video(&h.state, &owner, &course.id, &borrowing, "https://example.com/random", None)
        .await
        .expect_err("invalid");
    assert!(matches!(err, CoreError::Validation(_)));

    let err = add_lesson_video(&h.state, &owner, &course.id, &borrowing, "https://youtu.be/ownership01", None)
        .await
        .expect_err("duplicate");
    assert!(matches!(err, CoreError::Validation(_)));

    let err = add_lesson_video(&h.state, &owner, &course.id, &ownership, "https://vimeo.com/1", None)
        .await
        .expect_err("already linked");
    assert!(matches!(err, CoreError::Conflict(_)));

    let added = add_lesson_video(&h.state, &owner, &course.id, &borrowing, "https://vimeo.com/123456", None)
        .await
        .expect("add");
    assert_eq!(added.audit_entry.as_ref().map(|e| e.action), Some(AuditAction::VideoAdded));

    let updated = update_lesson_video(
        &h.state,
        &owner,
        &course.id,
        &borrowing,
        "https://www.dailymotion.com/video/x8abc12",
        None,
    )
    .await
    .expect("update");
    assert_eq!(updated.audit_entry.as_ref().map(|e| e.action), Some(AuditAction::VideoUpdated));

    let unchanged = update_lesson_video(
        &h.state,
        &owner,
        &course.id,
        &borrowing,
        "https://www.dailymotion.com/video/x8abc12",
        None,
    )
    .await
    .expect("same link");
    assert!(unchanged.audit_entry.is_none());

    let removed = remove_lesson_video(&h.state, &owner, &course.id, &borrowing, None)
        .await
        .expect("remove");
    let entry = removed.audit_entry.expect("audited");
    assert_eq!(entry.action, AuditAction::VideoRemoved);
    assert_eq!(entry.changed_fields, vec![format!("lessons/{borrowing}/video_link")]);

    let again = remove_lesson_video(&h.state, &owner, &course.id, &borrowing, None)
        .await
        .expect("idempotent remove");
    assert!(again.audit_entry.is_none());
}

#[tokio::test]
async fn lesson_resources_go_through_the_blob_store() {
    let remote = Arc::new(FlakyRemote::healthy());
    let h = common::harness_with_remote(remote);
    let owner = instructor("inst-1");
    let course = seed_course(&h, &owner, 4000).await;
    let lesson = lesson_id(&course, "Ownership");

    let outcome = add_lesson_resources(
        &h.state,
        &owner,
        &course.id,
        &lesson,
        vec![pdf("slides.pdf"), pdf("notes.pdf")],
        None,
    )
    .await
    .expect("resources");
    let stored = outcome
        .course
        .modules
        .iter()
        .flat_map(|m| m.lessons.iter())
        .find(|l| l.id == lesson)
        .expect("lesson");
    assert_eq!(stored.resources.len(), 2);
    assert!(stored.resources.iter().all(|r| r.storage_type == StorageType::Remote));
    let entry = outcome.audit_entry.expect("audited");
    assert_eq!(entry.action, AuditAction::Updated);
    assert_eq!(entry.changed_fields, vec![format!("lessons/{lesson}/resources")]);
}

#[tokio::test]
async fn lesson_resources_are_strict() {
    let h = harness_with_broken_disk(None);
    let owner = instructor("inst-1");
    let course = seed_course(&h, &owner, 4000).await;
    let lesson = lesson_id(&course, "Ownership");

    let err = add_lesson_resources(&h.state, &owner, &course.id, &lesson, vec![pdf("slides.pdf")], None)
        .await
        .expect_err("strict");
    assert!(matches!(err, CoreError::StorageFatal(_)));
}

#[tokio::test]
async fn deleting_a_course_removes_blobs_and_keeps_history() {
    let h = harness();
    let owner = instructor("inst-1");
    let created = create_course(
        &h.state,
        &owner,
        draft("Rust 101", 4000),
        CourseMediaFiles {
            thumbnail: Some(png("cover.png")),
            ..CourseMediaFiles::default()
        },
        None,
    )
    .await
    .expect("create");
    let thumbnail = created.course.thumbnail.clone().expect("thumbnail");
    assert!(h.upload_path(&thumbnail.id).exists());

    let err = delete_course(&h.state, &instructor("inst-2"), &created.course.id, None)
        .await
        .expect_err("stranger");
    assert!(matches!(err, CoreError::Unauthorized(_)));

    let entry = delete_course(&h.state, &owner, &created.course.id, Some("retired".to_string()))
        .await
        .expect("delete")
        .expect("audited");
    assert_eq!(entry.action, AuditAction::Deleted);
    assert_eq!(entry.changes.after["deleted"], Value::Bool(true));
    assert!(!h.upload_path(&thumbnail.id).exists());
    assert!(matches!(
        h.state.store.get_course(&created.course.id).await,
        Err(course_pipeline::store::StoreError::NotFound(_))
    ));

    let err = list_course_audit(&h.state, &owner, &created.course.id)
        .await
        .expect_err("history of deleted course is admin-only");
    assert!(matches!(err, CoreError::Forbidden(_)));
    let history = crud::list_course_audit(&h.state, &admin(), &created.course.id)
        .await
        .expect("admin history");
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].action, AuditAction::Deleted);
}
