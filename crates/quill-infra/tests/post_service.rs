//! Post use cases against the in-memory repository.

use std::sync::Arc;

use quill_core::DomainError;
use quill_core::domain::{ContentNode, PostFields, PostStatus, Role};
use quill_core::ports::PostRepository;
use quill_core::services::{Actor, PostService};
use quill_infra::InMemoryPostRepository;
use uuid::Uuid;

fn setup() -> (PostService, Arc<InMemoryPostRepository>) {
    let repo = Arc::new(InMemoryPostRepository::new());
    (PostService::new(repo.clone()), repo)
}

fn author() -> Actor {
    Actor {
        user_id: Uuid::new_v4(),
        role: Role::Author,
    }
}

fn fields(title: &str, slug: &str, status: PostStatus) -> PostFields {
    PostFields {
        title: title.to_string(),
        slug: slug.to_string(),
        status,
        ..PostFields::default()
    }
}

#[tokio::test]
async fn create_requires_title_and_slug() {
    let (service, _) = setup();
    let err = service
        .create(&author(), fields("  ", "slug", PostStatus::Draft))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn duplicate_slug_is_rejected_without_touching_either_post() {
    let (service, repo) = setup();
    let writer = author();
    let first = service
        .create(&writer, fields("First", "shared", PostStatus::Draft))
        .await
        .unwrap();
    let second = service
        .create(&writer, fields("Second", "second", PostStatus::Draft))
        .await
        .unwrap();

    let err = service
        .create(&writer, fields("Third", "shared", PostStatus::Draft))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SlugExists(ref s) if s == "shared"));

    let err = service
        .update(&writer, second.id, fields("Second edited", "shared", PostStatus::Draft))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SlugExists(_)));

    let stored = repo.find_by_id_or_slug("second").await.unwrap().unwrap();
    assert_eq!(stored.title, "Second");
    let stored = repo.find_by_id_or_slug("shared").await.unwrap().unwrap();
    assert_eq!(stored.id, first.id);
}

#[tokio::test]
async fn keeping_own_slug_is_not_a_conflict() {
    let (service, _) = setup();
    let writer = author();
    let post = service
        .create(&writer, fields("Mine", "mine", PostStatus::Draft))
        .await
        .unwrap();

    let updated = service
        .update(&writer, post.id, fields("Mine, revised", "mine", PostStatus::Draft))
        .await
        .unwrap();
    assert_eq!(updated.title, "Mine, revised");
}

#[tokio::test]
async fn published_at_tracks_status_through_updates() {
    let (service, _) = setup();
    let writer = author();
    let post = service
        .create(&writer, fields("Launch", "launch", PostStatus::Draft))
        .await
        .unwrap();
    assert!(post.published_at.is_none());

    let published = service
        .update(&writer, post.id, fields("Launch", "launch", PostStatus::Published))
        .await
        .unwrap();
    let stamp = published.published_at.unwrap();

    let edited = service
        .update(&writer, post.id, fields("Launch!", "launch", PostStatus::Published))
        .await
        .unwrap();
    assert_eq!(edited.published_at, Some(stamp));

    let archived = service
        .update(&writer, post.id, fields("Launch!", "launch", PostStatus::Archived))
        .await
        .unwrap();
    assert!(archived.published_at.is_none());
}

#[tokio::test]
async fn authors_cannot_touch_other_posts_but_admins_can() {
    let (service, _) = setup();
    let owner = author();
    let post = service
        .create(&owner, fields("Owned", "owned", PostStatus::Draft))
        .await
        .unwrap();

    let stranger = author();
    let err = service
        .update(&stranger, post.id, fields("Hijack", "owned", PostStatus::Draft))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden { .. }));
    assert!(matches!(
        service.delete(&stranger, post.id).await,
        Err(DomainError::Forbidden { .. })
    ));

    let admin = Actor {
        user_id: Uuid::new_v4(),
        role: Role::Admin,
    };
    let updated = service
        .update(&admin, post.id, fields("Edited by admin", "owned", PostStatus::Draft))
        .await
        .unwrap();
    assert_eq!(updated.author_id, owner.user_id);

    service.delete(&admin, post.id).await.unwrap();
    assert!(matches!(
        service.delete(&admin, post.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn anonymous_readers_only_see_published_posts() {
    let (service, _) = setup();
    let writer = author();
    let draft = service
        .create(&writer, fields("Draft", "draft", PostStatus::Draft))
        .await
        .unwrap();
    service
        .create(&writer, fields("Live", "live", PostStatus::Published))
        .await
        .unwrap();

    let public = service.list(None, Some(PostStatus::Draft), true).await.unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].slug, "live");

    assert!(matches!(
        service.get("draft", None).await,
        Err(DomainError::NotFound { .. })
    ));
    assert_eq!(service.get("draft", Some(&writer)).await.unwrap().id, draft.id);
    assert!(service.get("live", None).await.is_ok());

    let everything = service.list(Some(&writer), None, true).await.unwrap();
    assert_eq!(everything.len(), 2);
    let drafts = service
        .list(Some(&writer), Some(PostStatus::Draft), false)
        .await
        .unwrap();
    assert_eq!(drafts.len(), 1);
}

#[tokio::test]
async fn read_time_is_derived_when_missing() {
    let (service, _) = setup();
    let words = vec!["word"; 450].join(" ");
    let mut input = fields("Long read", "long-read", PostStatus::Draft);
    input.content = ContentNode::doc(vec![ContentNode::paragraph(vec![ContentNode::text(words)])]);
    input.read_time = String::new();

    let post = service.create(&author(), input).await.unwrap();
    assert_eq!(post.read_time, "3m");
}
