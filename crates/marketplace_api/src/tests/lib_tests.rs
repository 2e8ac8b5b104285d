use super::*;

use async_trait::async_trait;
use shared::domain::SortKey;
use storage::Storage;

async fn setup() -> MarketplaceContext<Storage> {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    MarketplaceContext::new(storage, LedgerPolicy::default())
}

fn registration(email: &str) -> RegisterRequest {
    RegisterRequest {
        name: " Maya Chen ".into(),
        email: email.into(),
        password: "pw".into(),
        password_confirm: "pw".into(),
        occupation: "Student".into(),
        custom_occupation: String::new(),
        bio: " CS junior ".into(),
    }
}

async fn signed_in() -> MarketplaceContext<Storage> {
    let mut ctx = setup().await;
    register(&mut ctx, registration("maya@example.com"))
        .await
        .expect("register");
    ctx
}

#[tokio::test]
async fn catalog_and_sessions_require_login() {
    let mut ctx = setup().await;
    let err = catalog_view(&ctx).expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Unauthorized);
    let err = view_service(&mut ctx, ServiceId(1)).expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Unauthorized);
    let err = sessions_view(&ctx).expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Unauthorized);
}

#[tokio::test]
async fn register_trims_fields_and_logs_in() {
    let ctx = signed_in().await;
    let user = ctx.current_user().expect("user");
    assert_eq!(user.name, "Maya Chen");
    assert_eq!(user.bio, "CS junior");
    assert_eq!(
        ctx.store.logged_in_email().await.expect("email").as_deref(),
        Some("maya@example.com")
    );
    assert_eq!(catalog_view(&ctx).expect("catalog").services.len(), 4);
}

#[tokio::test]
async fn register_rejects_mismatched_passwords() {
    let mut ctx = setup().await;
    let err = register(
        &mut ctx,
        RegisterRequest {
            password_confirm: "other".into(),
            ..registration("maya@example.com")
        },
    )
    .await
    .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Validation);
    assert!(ctx.store.load_user().await.expect("load").is_none());
}

#[tokio::test]
async fn register_rejects_existing_email() {
    let mut ctx = signed_in().await;
    let err = register(&mut ctx, registration("maya@example.com"))
        .await
        .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Conflict);
}

#[tokio::test]
async fn other_occupation_uses_custom_text() {
    let mut ctx = setup().await;
    register(
        &mut ctx,
        RegisterRequest {
            occupation: OTHER_OCCUPATION.into(),
            custom_occupation: " Bootcamp grad ".into(),
            ..registration("maya@example.com")
        },
    )
    .await
    .expect("register");
    assert_eq!(ctx.current_user().expect("user").occupation, "Bootcamp grad");

    assert_eq!(resolve_occupation("Other", "   "), "Other");
    assert_eq!(resolve_occupation("Professional", "ignored"), "Professional");
}

#[tokio::test]
async fn login_checks_both_email_and_password() {
    let mut ctx = signed_in().await;
    logout(&mut ctx).await.expect("logout");

    let err = login(
        &mut ctx,
        LoginRequest {
            email: "maya@example.com".into(),
            password: "wrong".into(),
        },
    )
    .await
    .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Unauthorized);
    assert!(ctx.current_user().is_none());

    login(
        &mut ctx,
        LoginRequest {
            email: " maya@example.com ".into(),
            password: "pw".into(),
        },
    )
    .await
    .expect("login");
    assert!(ctx.current_user().is_some());
}

#[tokio::test]
async fn restore_session_follows_logged_in_marker() {
    let ctx = signed_in().await;
    let mut reopened = MarketplaceContext::new(ctx.store.clone(), LedgerPolicy::default());
    let restored = restore_session(&mut reopened).await.expect("restore");
    assert_eq!(restored.map(|u| u.email).as_deref(), Some("maya@example.com"));

    logout(&mut reopened).await.expect("logout");
    logout(&mut reopened).await.expect("logout twice");
    let mut again = MarketplaceContext::new(ctx.store.clone(), LedgerPolicy::default());
    assert!(restore_session(&mut again).await.expect("restore").is_none());
}

#[tokio::test]
async fn profile_update_keeps_omitted_fields_and_persists() {
    let mut ctx = signed_in().await;
    let event = update_profile(
        &mut ctx,
        ProfileUpdate {
            name: Some("  Maya Q. Chen ".into()),
            bio: None,
            occupation: Some(" Intern ".into()),
        },
    )
    .await
    .expect("update");

    let MarketplaceEvent::ProfileUpdated { profile } = event else {
        panic!("unexpected event");
    };
    assert_eq!(profile.name, "Maya Q. Chen");
    assert_eq!(profile.initials, "MQC");
    assert_eq!(profile.bio, "CS junior");
    assert_eq!(profile.occupation, "Intern");
    assert_eq!(
        profile.past_service_titles,
        vec!["Amazon Interview Prep", "Behavioral Interview Coaching"]
    );

    let stored = ctx.store.load_user().await.expect("load").expect("user");
    assert_eq!(stored.name, "Maya Q. Chen");
}

#[tokio::test]
async fn post_filter_view_and_book() {
    let mut ctx = signed_in().await;
    let MarketplaceEvent::ServicePosted { service } = post_service(
        &mut ctx,
        &NewServiceRequest {
            title: "Offer Negotiation".into(),
            mentor: "Dev S.".into(),
            category: "Career Guidance".into(),
            price: "0".into(),
            description: "Practice the salary conversation.".into(),
            featured: true,
            rating: None,
        },
    )
    .expect("post") else {
        panic!("unexpected event");
    };
    assert_eq!(service.id, ServiceId(5));

    set_query(
        &mut ctx,
        QueryUpdate {
            search_text: None,
            category: Some("Career Guidance".into()),
            sort_key: Some(SortKey::PriceAsc),
        },
    )
    .expect("query");
    let view = catalog_view(&ctx).expect("catalog");
    assert_eq!(view.services.len(), 2);
    assert_eq!(view.services[0].id, service.id);
    assert_eq!(view.featured.len(), 1);

    view_service(&mut ctx, service.id).expect("view");
    let MarketplaceEvent::SessionBooked { session, selection } =
        book_session(&mut ctx, &BookingRequest::default()).expect("book")
    else {
        panic!("unexpected event");
    };
    assert_eq!(session.service_title, "Offer Negotiation");
    assert_eq!(selection, Some(service.id));
    assert_eq!(sessions_view(&ctx).expect("sessions").upcoming.len(), 2);

    close_service(&mut ctx).expect("close");
    assert!(selected_service(&ctx).expect("selected").is_none());
}

#[tokio::test]
async fn viewing_unknown_service_reports_not_found() {
    let mut ctx = signed_in().await;
    view_service(&mut ctx, ServiceId(1)).expect("view");
    let err = view_service(&mut ctx, ServiceId(404)).expect_err("should fail");
    assert_eq!(err.code, ErrorCode::NotFound);
    assert_eq!(
        selected_service(&ctx).expect("selected").map(|s| s.id),
        Some(ServiceId(1))
    );
}

struct BrokenStore;

#[async_trait]
impl AccountStore for BrokenStore {
    async fn load_user(&self) -> anyhow::Result<Option<User>> {
        Err(anyhow::anyhow!("disk unplugged"))
    }

    async fn save_user(&self, _user: &User) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("disk unplugged"))
    }

    async fn logged_in_email(&self) -> anyhow::Result<Option<String>> {
        Err(anyhow::anyhow!("disk unplugged"))
    }

    async fn set_logged_in_email(&self, _email: Option<&str>) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("disk unplugged"))
    }
}

#[tokio::test]
async fn store_failures_surface_as_internal_errors() {
    let mut ctx = MarketplaceContext::new(BrokenStore, LedgerPolicy::default());
    let err = login(
        &mut ctx,
        LoginRequest {
            email: "a@b.c".into(),
            password: "x".into(),
        },
    )
    .await
    .expect_err("should fail");
    assert_eq!(err.code, ErrorCode::Internal);
    assert!(err.message.contains("disk unplugged"));
}
