use crate::{
    model::dashboard::DashboardUserDto,
    server::{
        error::{auth::AuthError, AppError},
        middleware::{
            auth::{AuthGuard, Permission},
            session::{CsrfSession, DashboardSession},
        },
    },
};
use test_utils::builder::TestBuilder;

fn user(manageable: &[&str]) -> DashboardUserDto {
    DashboardUserDto {
        id: "123456789".to_string(),
        username: "moderator".to_string(),
        avatar: None,
        manageable_guilds: manageable.iter().map(|id| id.to_string()).collect(),
    }
}

/// Tests the guard without a logged-in user.
///
/// Expected: Err(AuthError::NotLoggedIn)
#[tokio::test]
async fn denies_anonymous_session() -> Result<(), AppError> {
    let mut test = TestBuilder::new().build().await.unwrap();
    let session = test.session().await.unwrap();

    let result = AuthGuard::new(session).require(&[]).await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::NotLoggedIn))
    ));

    Ok(())
}

/// Tests a logged-in user with no permission requirements.
///
/// Expected: Ok with the stored user
#[tokio::test]
async fn returns_logged_in_user() -> Result<(), AppError> {
    let mut test = TestBuilder::new().build().await.unwrap();
    let session = test.session().await.unwrap();
    DashboardSession::new(session).set_user(&user(&[])).await?;

    let returned = AuthGuard::new(session).require(&[]).await?;

    assert_eq!(returned.username, "moderator");

    Ok(())
}

/// Tests guild access for manageable and foreign guilds.
///
/// Expected: Ok for a listed guild, GuildAccessDenied otherwise
#[tokio::test]
async fn checks_manageable_guilds() -> Result<(), AppError> {
    let mut test = TestBuilder::new().build().await.unwrap();
    let session = test.session().await.unwrap();
    DashboardSession::new(session)
        .set_user(&user(&["111", "222"]))
        .await?;
    let guard = AuthGuard::new(session);

    assert!(guard.require(&[Permission::ManageGuild(222)]).await.is_ok());

    match guard.require(&[Permission::ManageGuild(333)]).await {
        Err(AppError::AuthErr(AuthError::GuildAccessDenied { user_id, guild_id })) => {
            assert_eq!(user_id, "123456789");
            assert_eq!(guild_id, 333);
        }
        other => panic!("Expected GuildAccessDenied, got: {:?}", other.map(|u| u.id)),
    }

    Ok(())
}

/// Tests that a CSRF token can only be taken once.
///
/// Expected: token on the first take, None on the second
#[tokio::test]
async fn csrf_token_is_single_use() -> Result<(), AppError> {
    let mut test = TestBuilder::new().build().await.unwrap();
    let session = test.session().await.unwrap();
    let csrf = CsrfSession::new(session);

    csrf.set_token("state".to_string()).await?;

    assert_eq!(csrf.take_token().await?, Some("state".to_string()));
    assert_eq!(csrf.take_token().await?, None);

    Ok(())
}

/// Tests that logout clears the user.
///
/// Expected: not authenticated after clear
#[tokio::test]
async fn clear_logs_out() -> Result<(), AppError> {
    let mut test = TestBuilder::new().build().await.unwrap();
    let session = test.session().await.unwrap();
    let dashboard = DashboardSession::new(session);
    dashboard.set_user(&user(&["1"])).await?;

    dashboard.clear().await;

    assert!(!dashboard.is_authenticated().await?);

    Ok(())
}
