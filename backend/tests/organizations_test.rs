mod common;

use common::unique_email;

#[tokio::test]
async fn created_organization_is_listed_with_its_admin_email() {
    let app = common::setup_test_app().await;
    let (_, root) = app.signup(&unique_email("root")).await;

    let org_id = app.create_org(&root, "Robotics Club", "admin@x.edu").await;

    let resp = app.get("/api/organizations", &root).await;
    assert_eq!(resp.status(), 200);
    let orgs: Vec<serde_json::Value> = resp.json().await.unwrap();
    assert_eq!(orgs.len(), 1);
    assert_eq!(orgs[0]["id"].as_str().unwrap(), org_id.to_string());
    assert_eq!(orgs[0]["name"], "Robotics Club");
    assert_eq!(orgs[0]["admin_email"], "admin@x.edu");
}

#[tokio::test]
async fn creating_org_promotes_named_admin() {
    let app = common::setup_test_app().await;
    let (_, root) = app.signup(&unique_email("root")).await;
    let admin_email = unique_email("admin");
    app.signup(&admin_email).await;

    let org_id = app.create_org(&root, "Garden Club", &admin_email.to_uppercase()).await;

    let token = app.token_for(&admin_email).await;
    let resp = app.get("/api/auth/me", &token).await;
    let me: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(me["role"], "admin");
    assert_eq!(me["organization_id"].as_str().unwrap(), org_id.to_string());
}

#[tokio::test]
async fn org_survives_when_named_admin_does_not_exist() {
    let app = common::setup_test_app().await;
    let (_, root) = app.signup(&unique_email("root")).await;

    app.create_org(&root, "Ghost Club", "nobody@x.edu").await;

    let resp = app.get("/api/organizations", &root).await;
    let orgs: Vec<serde_json::Value> = resp.json().await.unwrap();
    assert_eq!(orgs.len(), 1);
}

#[tokio::test]
async fn duplicate_org_name_is_a_conflict() {
    let app = common::setup_test_app().await;
    let (_, root) = app.signup(&unique_email("root")).await;
    app.create_org(&root, "Chess Club", "a@x.edu").await;

    let resp = app
        .post(
            "/api/organizations",
            &root,
            serde_json::json!({ "name": "chess club", "admin_email": "b@x.edu" }),
        )
        .await;
    assert_eq!(resp.status(), 409);
}

#[tokio::test]
async fn create_org_validates_input() {
    let app = common::setup_test_app().await;
    let (_, root) = app.signup(&unique_email("root")).await;

    let resp = app
        .post(
            "/api/organizations",
            &root,
            serde_json::json!({ "name": "", "admin_email": "a@x.edu" }),
        )
        .await;
    assert_eq!(resp.status(), 400);

    let resp = app
        .post(
            "/api/organizations",
            &root,
            serde_json::json!({ "name": "Valid", "admin_email": "not-an-email" }),
        )
        .await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn assigning_member_of_another_org_conflicts() {
    let app = common::setup_test_app().await;
    let a = app.seed_org("Org A").await;
    let b = app.seed_org_with(&a.superadmin_token, "Org B").await;

    let resp = app
        .post(&b.path("/members"), &b.admin_token, serde_json::json!({ "email": a.student_email }))
        .await;
    assert_eq!(resp.status(), 409);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "User is already in an organization");
}

#[tokio::test]
async fn assigning_unknown_or_superadmin_user_fails() {
    let app = common::setup_test_app().await;
    let fx = app.seed_org("Org A").await;

    let resp = app
        .post(&fx.path("/members"), &fx.admin_token, serde_json::json!({ "email": "ghost@x.edu" }))
        .await;
    assert_eq!(resp.status(), 404);

    let resp = app.get("/api/auth/me", &fx.superadmin_token).await;
    let me: serde_json::Value = resp.json().await.unwrap();
    let resp = app
        .post(&fx.path("/members"), &fx.admin_token, serde_json::json!({ "email": me["email"] }))
        .await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn members_are_listed_by_email() {
    let app = common::setup_test_app().await;
    let fx = app.seed_org("Org A").await;

    let resp = app.get(&fx.path("/members"), &fx.student_token).await;
    assert_eq!(resp.status(), 200);
    let members: Vec<serde_json::Value> = resp.json().await.unwrap();
    let emails: Vec<&str> = members.iter().map(|m| m["email"].as_str().unwrap()).collect();

    let mut expected = vec![fx.admin_email.as_str(), fx.student_email.as_str()];
    expected.sort();
    assert_eq!(emails, expected);
}

#[tokio::test]
async fn removing_admin_demotes_to_student() {
    let app = common::setup_test_app().await;
    let fx = app.seed_org("Org A").await;

    let resp = app
        .delete(&fx.path(&format!("/members/{}", fx.admin_email)), &fx.superadmin_token)
        .await;
    assert_eq!(resp.status(), 200);

    let token = app.token_for(&fx.admin_email).await;
    let resp = app.get("/api/auth/me", &token).await;
    let me: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(me["role"], "student");
    assert!(me["organization_id"].is_null());
}

#[tokio::test]
async fn admin_cannot_remove_self() {
    let app = common::setup_test_app().await;
    let fx = app.seed_org("Org A").await;

    let resp = app
        .delete(&fx.path(&format!("/members/{}", fx.admin_email)), &fx.admin_token)
        .await;
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn removed_member_can_join_another_org() {
    let app = common::setup_test_app().await;
    let a = app.seed_org("Org A").await;
    let b = app.seed_org_with(&a.superadmin_token, "Org B").await;

    let resp = app
        .delete(&a.path(&format!("/members/{}", a.student_email)), &a.admin_token)
        .await;
    assert_eq!(resp.status(), 200);

    let resp = app
        .post(&b.path("/members"), &b.admin_token, serde_json::json!({ "email": a.student_email }))
        .await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["organization_id"].as_str().unwrap(), b.org_id.to_string());
    assert_eq!(body["role"], "student");
}

#[tokio::test]
async fn promote_requires_membership() {
    let app = common::setup_test_app().await;
    let fx = app.seed_org("Org A").await;
    let outsider = unique_email("outsider");
    app.signup(&outsider).await;

    let resp = app
        .post(&fx.path("/admins"), &fx.admin_token, serde_json::json!({ "email": outsider }))
        .await;
    assert_eq!(resp.status(), 404);

    let resp = app
        .post(&fx.path("/admins"), &fx.admin_token, serde_json::json!({ "email": fx.student_email }))
        .await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn deleting_org_removes_content_and_detaches_members() {
    let app = common::setup_test_app().await;
    let fx = app.seed_org("Org A").await;

    app.post(
        &fx.path("/announcements"),
        &fx.admin_token,
        serde_json::json!({ "title": "Bye", "content": "Last one" }),
    )
    .await;

    let resp = app.delete(&fx.path(""), &fx.superadmin_token).await;
    assert_eq!(resp.status(), 200);

    let resp = app.get(&fx.path(""), &fx.superadmin_token).await;
    assert_eq!(resp.status(), 404);
    let resp = app.delete(&fx.path(""), &fx.superadmin_token).await;
    assert_eq!(resp.status(), 404);

    let resp = app.get("/api/auth/me", &fx.admin_token).await;
    let me: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(me["role"], "student");
    assert!(me["organization_id"].is_null());
}
