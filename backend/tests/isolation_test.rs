mod common;

#[tokio::test]
async fn members_cannot_see_other_orgs() {
    let app = common::setup_test_app().await;
    let a = app.seed_org("Org A").await;
    let b = app.seed_org_with(&a.superadmin_token, "Org B").await;

    // Listing returns only the caller's own organization
    let resp = app.get("/api/organizations", &a.student_token).await;
    let orgs: Vec<serde_json::Value> = resp.json().await.unwrap();
    assert_eq!(orgs.len(), 1);
    assert_eq!(orgs[0]["name"], "Org A");

    let resp = app.get("/api/organizations", &a.superadmin_token).await;
    let orgs: Vec<serde_json::Value> = resp.json().await.unwrap();
    assert_eq!(orgs.len(), 2);

    // Anything under another org is reported as missing
    for rest in ["", "/members", "/announcements", "/events", "/tasks"] {
        let resp = app.get(&b.path(rest), &a.student_token).await;
        assert_eq!(resp.status(), 404, "Org B {} should be hidden from org A", rest);
        let resp = app.get(&b.path(rest), &a.admin_token).await;
        assert_eq!(resp.status(), 404, "Org B {} should be hidden from org A admin", rest);
    }
}

#[tokio::test]
async fn admin_cannot_touch_other_orgs_items() {
    let app = common::setup_test_app().await;
    let a = app.seed_org("Org A").await;
    let b = app.seed_org_with(&a.superadmin_token, "Org B").await;

    let resp = app
        .post(
            &b.path("/announcements"),
            &b.admin_token,
            serde_json::json!({ "title": "B only", "content": "Secret" }),
        )
        .await;
    let ann: serde_json::Value = resp.json().await.unwrap();
    let ann_id = ann["id"].as_str().unwrap();

    let resp = app
        .post(&b.path("/tasks"), &b.admin_token, serde_json::json!({ "title": "B task" }))
        .await;
    let task: serde_json::Value = resp.json().await.unwrap();
    let task_id = task["id"].as_str().unwrap();

    // Through org B's path: not a member
    let resp = app
        .delete(&b.path(&format!("/announcements/{}", ann_id)), &a.admin_token)
        .await;
    assert_eq!(resp.status(), 404);

    // Through org A's path: item does not belong there
    let resp = app
        .delete(&a.path(&format!("/announcements/{}", ann_id)), &a.admin_token)
        .await;
    assert_eq!(resp.status(), 404);
    let resp = app
        .patch(
            &a.path(&format!("/tasks/{}", task_id)),
            &a.admin_token,
            serde_json::json!({ "status": "done" }),
        )
        .await;
    assert_eq!(resp.status(), 404);

    // Untouched in org B
    let resp = app.get(&b.path("/announcements"), &b.student_token).await;
    let list: Vec<serde_json::Value> = resp.json().await.unwrap();
    assert_eq!(list.len(), 1);
    let resp = app.get(&b.path("/tasks"), &b.student_token).await;
    let list: Vec<serde_json::Value> = resp.json().await.unwrap();
    assert_eq!(list[0]["status"], "to_do");
}

#[tokio::test]
async fn admin_cannot_remove_members_of_other_orgs() {
    let app = common::setup_test_app().await;
    let a = app.seed_org("Org A").await;
    let b = app.seed_org_with(&a.superadmin_token, "Org B").await;

    let resp = app
        .delete(&b.path(&format!("/members/{}", b.student_email)), &a.admin_token)
        .await;
    assert_eq!(resp.status(), 404);

    // Asking org A to remove someone who is in org B
    let resp = app
        .delete(&a.path(&format!("/members/{}", b.student_email)), &a.admin_token)
        .await;
    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "User not found in this organization");
}
