use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tower::ServiceExt;
use uuid::Uuid;

use journal::application::blog::{BlogError, BlogService};
use journal::application::repos::{CreatePostParams, PostsRepo, RepoError};
use journal::domain::entities::PostRecord;
use journal::domain::pages::{ABOUT_CONTENT, CONTACT_CONTENT, HOME_STARTING_CONTENT};
use journal::infra::http::{HttpState, build_router};
use journal::presentation::views::LayoutChrome;

#[derive(Default)]
struct InMemoryPostsRepo {
    posts: Mutex<Vec<PostRecord>>,
}

#[async_trait]
impl PostsRepo for InMemoryPostsRepo {
    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError> {
        Ok(self.posts.lock().await.clone())
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        Ok(self
            .posts
            .lock()
            .await
            .iter()
            .find(|post| post.id == id)
            .cloned())
    }

    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let record = PostRecord {
            id: Uuid::new_v4(),
            title: params.title,
            content: params.content,
            created_at: OffsetDateTime::now_utc(),
        };
        self.posts.lock().await.push(record.clone());
        Ok(record)
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        Ok(())
    }
}

struct UnreachableStore;

#[async_trait]
impl PostsRepo for UnreachableStore {
    async fn list_posts(&self) -> Result<Vec<PostRecord>, RepoError> {
        Err(RepoError::Timeout)
    }

    async fn find_post(&self, _id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        Err(RepoError::Timeout)
    }

    async fn create_post(&self, _params: CreatePostParams) -> Result<PostRecord, RepoError> {
        Err(RepoError::from_persistence("connection refused"))
    }

    async fn health_check(&self) -> Result<(), RepoError> {
        Err(RepoError::from_persistence("connection refused"))
    }
}

struct Harness {
    router: Router,
    repo: Arc<InMemoryPostsRepo>,
    _public: tempfile::TempDir,
}

fn router_for(repo: Arc<dyn PostsRepo>, public: &tempfile::TempDir) -> Router {
    let state = HttpState {
        blog: Arc::new(BlogService::new(repo)),
        chrome: LayoutChrome::new("Daily Journal"),
    };
    build_router(state, public.path())
}

fn harness() -> Harness {
    let public = tempfile::tempdir().expect("tempdir");
    let repo = Arc::new(InMemoryPostsRepo::default());
    let router = router_for(repo.clone(), &public);
    Harness {
        router,
        repo,
        _public: public,
    }
}

async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
        .await
        .expect("router response");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

async fn compose(router: &Router, form: &str) -> axum::response::Response {
    router
        .clone()
        .oneshot(
            Request::post("/compose")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .expect("request"),
        )
        .await
        .expect("router response")
}

#[tokio::test]
async fn compose_redirects_home_and_lists_the_post() {
    let h = harness();

    let response = compose(&h.router, "postTitle=T&postBody=C").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/")
    );

    let stored = h.repo.posts.lock().await.clone();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "T");
    assert_eq!(stored[0].content, "C");

    let (status, html) = get(&h.router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(HOME_STARTING_CONTENT));
    assert!(html.contains(&format!("href=\"/posts/{}\"", stored[0].id)));
    assert!(html.contains("Read More"));
}

#[tokio::test]
async fn home_lists_every_post_in_insertion_order_and_is_stable() {
    let h = harness();
    for n in 1..=3 {
        let response = compose(&h.router, &format!("postTitle=Entry+{n}&postBody=body+{n}")).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    let (_, first) = get(&h.router, "/").await;
    let (_, second) = get(&h.router, "/").await;
    assert_eq!(first, second);

    assert_eq!(first.matches("Read More").count(), 3);
    let positions: Vec<usize> = (1..=3)
        .map(|n| first.find(&format!("Entry {n}")).expect("post listed"))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn listing_returns_exactly_the_created_posts_in_order() {
    let service = BlogService::new(Arc::new(InMemoryPostsRepo::default()));
    let titles: Vec<String> = (1..=5).map(|n| format!("Entry {n}")).collect();
    for title in &titles {
        service
            .create_post(Some(title.clone()), Some("body".into()))
            .await
            .expect("post created");
    }

    let home = service.list_posts().await.expect("listed");
    assert_eq!(home.posts.len(), titles.len());
    let listed: Vec<String> = home.posts.iter().map(|card| card.title.clone()).collect();
    assert_eq!(listed, titles);

    let again = service.list_posts().await.expect("listed");
    let relisted: Vec<String> = again.posts.iter().map(|card| card.title.clone()).collect();
    assert_eq!(relisted, listed);
}

#[tokio::test]
async fn home_with_no_posts_still_renders_intro() {
    let h = harness();
    let (status, html) = get(&h.router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(HOME_STARTING_CONTENT));
    assert!(!html.contains("Read More"));
}

#[tokio::test]
async fn home_truncates_long_content() {
    let h = harness();
    let body = "x".repeat(150);
    compose(&h.router, &format!("postTitle=Long&postBody={body}")).await;

    let (_, html) = get(&h.router, "/").await;
    assert!(html.contains(&format!("{} ...", "x".repeat(100))));
    assert!(!html.contains(&body));
}

#[tokio::test]
async fn post_page_shows_title_and_body() {
    let h = harness();
    compose(&h.router, "postTitle=Day+one&postBody=It+rained.").await;
    let id = h.repo.posts.lock().await[0].id;

    let (status, html) = get(&h.router, &format!("/posts/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<h1>Day one</h1>"));
    assert!(html.contains("It rained."));
    assert!(html.contains("<title>Day one | Daily Journal</title>"));
}

#[tokio::test]
async fn post_content_is_escaped() {
    let h = harness();
    compose(
        &h.router,
        "postTitle=Tags&postBody=%3Cscript%3Ealert(1)%3C%2Fscript%3E",
    )
    .await;
    let id = h.repo.posts.lock().await[0].id;

    let (_, html) = get(&h.router, &format!("/posts/{id}")).await;
    assert!(!html.contains("<script>alert(1)</script>"));
}

#[tokio::test]
async fn unknown_and_malformed_post_ids_are_not_found() {
    let h = harness();
    compose(&h.router, "postTitle=T&postBody=C").await;

    let (status, html) = get(&h.router, &format!("/posts/{}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(html.contains("Post Not Found"));

    let (status, _) = get(&h.router, "/posts/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_or_missing_title_is_rejected_without_storing() {
    let h = harness();

    for form in ["postTitle=&postBody=C", "postTitle=+++&postBody=C", "postBody=C"] {
        let response = compose(&h.router, form).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "form `{form}`");
    }

    let response = compose(&h.router, "postTitle=T").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(h.repo.posts.lock().await.is_empty());
}

#[tokio::test]
async fn malformed_compose_submissions_render_the_validation_page() {
    let h = harness();

    let response = h
        .router
        .clone()
        .oneshot(Request::post("/compose").body(Body::empty()).expect("request"))
        .await
        .expect("router response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = String::from_utf8_lossy(
        &response
            .into_body()
            .collect()
            .await
            .expect("collect body")
            .to_bytes(),
    )
    .into_owned();
    assert!(html.contains("Could Not Publish"));

    let response = compose(&h.router, "postTitle=a&postTitle=b&postBody=c").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(h.repo.posts.lock().await.is_empty());
}

#[tokio::test]
async fn empty_body_is_accepted() {
    let h = harness();
    let response = compose(&h.router, "postTitle=Just+a+title&postBody=").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(h.repo.posts.lock().await[0].content, "");
}

#[tokio::test]
async fn compose_form_renders() {
    let h = harness();
    let (status, html) = get(&h.router, "/compose").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("name=\"postTitle\""));
    assert!(html.contains("name=\"postBody\""));
}

#[tokio::test]
async fn static_pages_render_without_a_store() {
    let public = tempfile::tempdir().expect("tempdir");
    let router = router_for(Arc::new(UnreachableStore), &public);

    let (status, html) = get(&router, "/about").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(ABOUT_CONTENT));

    let (status, html) = get(&router, "/contact").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(CONTACT_CONTENT));
}

#[tokio::test]
async fn store_failures_surface_as_service_unavailable() {
    let public = tempfile::tempdir().expect("tempdir");
    let router = router_for(Arc::new(UnreachableStore), &public);

    let (status, html) = get(&router, "/").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(html.contains("Temporarily Unavailable"));

    let (status, _) = get(&router, &format!("/posts/{}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let response = compose(&router, "postTitle=T&postBody=C").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = get(&router, "/_health/db").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn health_reports_no_content_when_store_is_reachable() {
    let h = harness();
    let (status, body) = get(&h.router, "/_health/db").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[tokio::test]
async fn static_files_are_served_from_public_dir() {
    let public = tempfile::tempdir().expect("tempdir");
    std::fs::create_dir_all(public.path().join("css")).expect("css dir");
    std::fs::write(public.path().join("css/styles.css"), "body { margin: 0; }")
        .expect("write stylesheet");
    let router = router_for(Arc::new(InMemoryPostsRepo::default()), &public);

    let (status, body) = get(&router, "/css/styles.css").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "body { margin: 0; }");

    let (status, _) = get(&router, "/css/missing.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let h = harness();
    let response = h
        .router
        .clone()
        .oneshot(Request::get("/about").body(Body::empty()).expect("request"))
        .await
        .expect("router response");

    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .expect("request id header");
    assert!(Uuid::parse_str(request_id).is_ok());
}

#[tokio::test]
async fn service_maps_errors_to_status_codes() {
    let service = BlogService::new(Arc::new(UnreachableStore));

    let err = service.list_posts().await.err().expect("store failure");
    assert!(matches!(
        err,
        BlogError::StoreUnavailable {
            operation: "list_posts",
            ..
        }
    ));
    assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);

    let err = service
        .create_post(None, Some("body".into()))
        .await
        .err()
        .expect("validation runs before the store");
    assert!(matches!(err, BlogError::Validation(_)));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    let err = service
        .post_detail("42")
        .await
        .err()
        .expect("malformed id");
    assert!(matches!(err, BlogError::NotFound(_)));
    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

    let about = service.static_page("about").expect("about page");
    assert_eq!(about.content, ABOUT_CONTENT);
    assert!(matches!(
        service.static_page("pricing"),
        Err(BlogError::NotFound(_))
    ));
}

#[tokio::test]
async fn service_round_trips_a_post() {
    let service = BlogService::new(Arc::new(InMemoryPostsRepo::default()));

    let created = service
        .create_post(Some("Title".into()), Some("Body".into()))
        .await
        .expect("post created");

    let detail = service
        .post_detail(&created.id.to_string())
        .await
        .expect("post found");
    assert_eq!(detail.title, "Title");
    assert_eq!(detail.content, "Body");
    assert!(!detail.published.is_empty());

    let home = service.list_posts().await.expect("listed");
    assert_eq!(home.posts.len(), 1);
    assert_eq!(home.posts[0].href, format!("/posts/{}", created.id));
    assert_eq!(home.posts[0].excerpt, "Body");
}
