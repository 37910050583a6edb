mod common;

use reqwest::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

// ── Service ─────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let app = common::spawn_app().await;

    let resp = app.get("/health").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["success"], true);
    assert_eq!(resp.data()["status"], "ok");
    assert!(resp.data()["timestamp"].is_string());
    assert_eq!(resp.headers["x-content-type-options"], "nosniff");

    common::cleanup(app).await;
}

#[tokio::test]
async fn root_describes_the_api() {
    let app = common::spawn_app().await;

    let resp = app.get("/").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data()["status"], "operational");
    assert_eq!(resp.data()["endpoints"]["audit_logs"], "/audit-logs");

    common::cleanup(app).await;
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .request(Method::OPTIONS, app.url("/companies"))
        .header("Origin", "http://admin.example")
        .header("Access-Control-Request-Method", "PATCH")
        .header("Access-Control-Request-Headers", "x-user-id")
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
    assert_eq!(resp.headers()["access-control-max-age"], "86400");

    common::cleanup(app).await;
}

#[tokio::test]
async fn bare_options_is_no_content() {
    let app = common::spawn_app().await;

    let resp = app.request(Method::OPTIONS, "/companies", None, None).await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);
    assert_eq!(resp.body, json!(null));

    let resp = app.request(Method::OPTIONS, "/widgets", None, None).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn huge_offset_still_pages() {
    let app = common::spawn_app().await;
    app.create_company("Acme").await;

    let resp = app
        .get(&format!("/companies?limit=1&offset={}", i64::MAX))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.data(), &json!([]));
    assert_eq!(resp.body["meta"]["total"], 1);
    assert_eq!(resp.body["meta"]["page"], i64::MAX);

    common::cleanup(app).await;
}

// ── Routing errors ──────────────────────────────────────────────

#[tokio::test]
async fn unknown_route_is_enveloped_404() {
    let app = common::spawn_app().await;

    let resp = app.get("/widgets").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(
        resp.body,
        json!({ "success": false, "error": { "code": "NOT_FOUND", "message": "Route not found" } })
    );

    common::cleanup(app).await;
}

#[tokio::test]
async fn wrong_method_is_enveloped_405() {
    let app = common::spawn_app().await;

    let resp = app.request(Method::PUT, "/companies", None, None).await;
    assert_eq!(resp.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.body["error"]["code"], "METHOD_NOT_ALLOWED");
    let message = resp.body["error"]["message"].as_str().unwrap();
    assert!(message.starts_with("Method not allowed. Allowed: "));
    assert!(message.contains("GET") && message.contains("POST"));

    let allow = resp.headers["allow"].to_str().unwrap();
    assert!(allow.contains("GET") && allow.contains("POST"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn malformed_path_id_is_a_validation_error() {
    let app = common::spawn_app().await;

    let resp = app.get("/companies/not-a-uuid").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(resp.body["error"]["details"]["id"][0], "id must be a valid UUID");

    common::cleanup(app).await;
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .post(app.url("/companies"))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(body["error"]["message"], "Invalid JSON body");

    common::cleanup(app).await;
}

#[tokio::test]
async fn malformed_actor_header_is_rejected() {
    let app = common::spawn_app().await;

    let resp = app
        .request(Method::POST, "/companies", Some("bob"), Some(&json!({ "name": "Acme" })))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"]["code"], "VALIDATION_ERROR");
    assert!(resp.body["error"]["details"]["x-user-id"].is_array());
    assert_eq!(app.count_audit_rows().await, 0);

    common::cleanup(app).await;
}

#[tokio::test]
async fn company_header_is_checked_but_not_audited() {
    let app = common::spawn_app().await;

    let bad = app
        .client
        .post(app.url("/companies"))
        .header("X-Company-Id", "acme")
        .json(&json!({ "name": "Acme" }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = bad.json().await.unwrap();
    assert!(body["error"]["details"]["x-company-id"].is_array());

    let ok = app
        .client
        .post(app.url("/companies"))
        .header("X-Company-Id", Uuid::new_v4().to_string())
        .json(&json!({ "name": "Acme" }))
        .send()
        .await
        .unwrap();
    assert_eq!(ok.status(), StatusCode::CREATED);
    let body: serde_json::Value = ok.json().await.unwrap();
    let id = body["data"]["id"].as_str().unwrap();
    let rows = app.audit_rows(id).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].2, None);

    common::cleanup(app).await;
}

// ── Companies ───────────────────────────────────────────────────

#[tokio::test]
async fn companies_crud() {
    let app = common::spawn_app().await;

    let created = app.post("/companies", &json!({ "name": "  Acme Corp  " })).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["name"], "Acme Corp");
    assert_eq!(created.data()["status"], "active");
    let id = created.id();

    let got = app.get(&format!("/companies/{id}")).await;
    assert_eq!(got.status, StatusCode::OK);
    assert_eq!(got.data()["id"], id.as_str());

    let updated = app
        .patch(&format!("/companies/{id}"), &json!({ "status": "suspended" }))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["status"], "suspended");
    assert_eq!(updated.data()["name"], "Acme Corp");

    let missing = app.get(&format!("/companies/{}", Uuid::new_v4())).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"]["message"], "Company not found");

    common::cleanup(app).await;
}

#[tokio::test]
async fn company_names_are_unique_ignoring_case() {
    let app = common::spawn_app().await;
    app.create_company("Acme").await;

    let dup = app.post("/companies", &json!({ "name": "ACME" })).await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.body["error"]["code"], "BAD_REQUEST");
    assert_eq!(dup.body["error"]["message"], "A company with this name already exists");

    let other = app.create_company("Globex").await;
    let clash = app
        .patch(&format!("/companies/{other}"), &json!({ "name": "acme" }))
        .await;
    assert_eq!(clash.status, StatusCode::BAD_REQUEST);

    // Renaming to its own name in a different case is fine.
    let same = app
        .patch(&format!("/companies/{other}"), &json!({ "name": "GLOBEX" }))
        .await;
    assert_eq!(same.status, StatusCode::OK);

    common::cleanup(app).await;
}

#[tokio::test]
async fn company_validation_reports_every_field() {
    let app = common::spawn_app().await;

    let resp = app
        .post("/companies", &json!({ "name": "", "status": "closed" }))
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(resp.body["error"]["message"], "Validation failed");
    let details = &resp.body["error"]["details"];
    assert_eq!(details["name"][0], "Name is required and must be a non-empty string");
    assert_eq!(
        details["status"][0],
        "Status must be one of: active, inactive, suspended"
    );

    let id = app.create_company("Acme").await;
    let empty = app.patch(&format!("/companies/{id}"), &json!({})).await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        empty.body["error"]["details"]["_root"][0],
        "At least one field must be provided for update"
    );

    common::cleanup(app).await;
}

#[tokio::test]
async fn company_mutations_write_one_audit_row_each() {
    let app = common::spawn_app().await;
    let actor = Uuid::new_v4().to_string();

    let created = app
        .request(
            Method::POST,
            "/companies",
            Some(actor.as_str()),
            Some(&json!({ "name": "Acme" })),
        )
        .await;
    let id = created.id();

    let rows = app.audit_rows(&id).await;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].0, "create");
    assert_eq!(rows[0].1["created"]["name"], "Acme");
    assert_eq!(rows[0].2.map(|u| u.to_string()), Some(actor.clone()));

    app.request(
        Method::PATCH,
        &format!("/companies/{id}"),
        Some(actor.as_str()),
        Some(&json!({ "name": "Acme Holdings" })),
    )
    .await;

    let rows = app.audit_rows(&id).await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].0, "update");
    assert_eq!(
        rows[1].1,
        json!({ "name": { "from": "Acme", "to": "Acme Holdings" } })
    );

    common::cleanup(app).await;
}

#[tokio::test]
async fn company_delete_cascades_when_only_created() {
    let app = common::spawn_app().await;
    let company = app.create_company("Acme").await;
    let user = app.create_user("jane@example.com", None).await;
    let asset = app.create_asset(&company, "Laptop").await;
    let grant = app
        .post(&format!("/companies/{company}/users"), &json!({ "user_id": user }))
        .await;
    assert_eq!(grant.status, StatusCode::CREATED);

    let resp = app.delete(&format!("/companies/{company}")).await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);
    assert_eq!(resp.data()["message"], "Company deleted successfully");

    assert_eq!(app.get(&format!("/companies/{company}")).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get(&format!("/assets/{asset}")).await.status, StatusCode::NOT_FOUND);

    let company_id: Uuid = company.parse().unwrap();
    let (grants, audit): (i64, i64) = sqlx::query_as(
        "SELECT (SELECT COUNT(*) FROM company_access WHERE company_id = $1),
                (SELECT COUNT(*) FROM audit_logs WHERE company_id = $1)",
    )
    .bind(company_id)
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!((grants, audit), (0, 0));

    // The user survives.
    assert_eq!(app.get(&format!("/users/{user}")).await.status, StatusCode::OK);

    common::cleanup(app).await;
}

#[tokio::test]
async fn company_delete_refused_after_activity() {
    let app = common::spawn_app().await;
    let company = app.create_company("Acme").await;
    app.patch(&format!("/companies/{company}"), &json!({ "status": "inactive" }))
        .await;

    let resp = app.delete(&format!("/companies/{company}")).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.body["error"]["message"],
        "Cannot delete company with activity history"
    );
    assert_eq!(app.get(&format!("/companies/{company}")).await.status, StatusCode::OK);

    let missing = app.delete(&format!("/companies/{}", Uuid::new_v4())).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn company_list_filters_and_paginates() {
    let app = common::spawn_app().await;
    for i in 0..5 {
        app.create_company(&format!("Company {i}")).await;
    }
    let suspended = app.create_company("Suspended Co").await;
    app.patch(&format!("/companies/{suspended}"), &json!({ "status": "suspended" }))
        .await;

    let page = app.get("/companies?limit=2&offset=2").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.data().as_array().unwrap().len(), 2);
    assert_eq!(page.body["meta"], json!({ "total": 6, "limit": 2, "page": 2 }));

    let capped = app.get("/companies?limit=500").await;
    assert_eq!(capped.body["meta"]["limit"], 100);
    assert_eq!(capped.data().as_array().unwrap().len(), 6);

    let filtered = app.get("/companies?status=suspended").await;
    assert_eq!(filtered.body["meta"]["total"], 1);
    assert_eq!(filtered.data()[0]["name"], "Suspended Co");

    let newest_first = app.get("/companies").await;
    assert_eq!(newest_first.data()[0]["name"], "Suspended Co");

    let bad = app.get("/companies?limit=ten").await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad.body["error"]["code"], "VALIDATION_ERROR");

    common::cleanup(app).await;
}

// ── Users ───────────────────────────────────────────────────────

#[tokio::test]
async fn users_crud() {
    let app = common::spawn_app().await;
    let company = app.create_company("Acme").await;

    let created = app
        .post(
            "/users",
            &json!({ "email": " Jane@Example.COM ", "name": "Jane", "primary_company_id": company }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["email"], "jane@example.com");
    assert_eq!(created.data()["status"], "active");
    let id = created.id();

    let cleared = app
        .patch(&format!("/users/{id}"), &json!({ "primary_company_id": null }))
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert!(cleared.data()["primary_company_id"].is_null());

    let rows = app.audit_rows(&id).await;
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[1].1,
        json!({ "primary_company_id": { "from": company, "to": null } })
    );

    let got = app.get(&format!("/users/{id}")).await;
    assert_eq!(got.data()["name"], "Jane");

    common::cleanup(app).await;
}

#[tokio::test]
async fn user_preconditions() {
    let app = common::spawn_app().await;
    app.create_user("jane@example.com", None).await;

    let dup = app
        .post("/users", &json!({ "email": "JANE@example.com", "name": "Other" }))
        .await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.body["error"]["message"], "A user with this email already exists");

    let orphan = app
        .post(
            "/users",
            &json!({ "email": "x@example.com", "name": "X", "primary_company_id": Uuid::new_v4() }),
        )
        .await;
    assert_eq!(orphan.status, StatusCode::BAD_REQUEST);
    assert_eq!(orphan.body["error"]["message"], "Primary company does not exist");

    let invalid = app
        .post("/users", &json!({ "email": "nope", "name": "" }))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    let details = invalid.body["error"]["details"].as_object().unwrap();
    assert!(details.contains_key("email") && details.contains_key("name"));

    let missing = app
        .patch(&format!("/users/{}", Uuid::new_v4()), &json!({ "name": "Ghost" }))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
    assert_eq!(missing.body["error"]["message"], "User not found");

    common::cleanup(app).await;
}

#[tokio::test]
async fn user_audit_rows_without_company_use_user_scope() {
    let app = common::spawn_app().await;
    let user = app.create_user("solo@example.com", None).await;

    let user_id: Uuid = user.parse().unwrap();
    let company_id: Uuid = sqlx::query_scalar("SELECT company_id FROM audit_logs WHERE entity_id = $1")
        .bind(user_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(company_id, user_id);

    let history = app.get(&format!("/users/{user}/audit-logs")).await;
    assert_eq!(history.status, StatusCode::OK);
    assert_eq!(history.body["meta"]["total"], 1);
    assert_eq!(history.data()[0]["action"], "create");

    common::cleanup(app).await;
}

#[tokio::test]
async fn user_list_company_filter_includes_grant_holders() {
    let app = common::spawn_app().await;
    let acme = app.create_company("Acme").await;
    let globex = app.create_company("Globex").await;

    app.create_user("primary@example.com", Some(&acme)).await;
    let guest = app.create_user("guest@example.com", Some(&globex)).await;
    app.create_user("stranger@example.com", None).await;
    app.post(&format!("/companies/{acme}/users"), &json!({ "user_id": guest }))
        .await;

    let resp = app.get(&format!("/users?company_id={acme}")).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body["meta"]["total"], 2);
    let mut emails: Vec<&str> = resp
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["email"].as_str().unwrap())
        .collect();
    emails.sort();
    assert_eq!(emails, vec!["guest@example.com", "primary@example.com"]);

    let all = app.get("/users").await;
    assert_eq!(all.body["meta"]["total"], 3);

    common::cleanup(app).await;
}

#[tokio::test]
async fn user_delete_drops_grants_and_assignments() {
    let app = common::spawn_app().await;
    let company = app.create_company("Acme").await;
    let user = app.create_user("jane@example.com", Some(&company)).await;
    app.post(&format!("/companies/{company}/users"), &json!({ "user_id": user }))
        .await;
    let asset = app
        .post(
            "/assets",
            &json!({ "company_id": company, "type": "hardware", "name": "Laptop", "assigned_to": user }),
        )
        .await
        .id();

    let resp = app.delete(&format!("/users/{user}")).await;
    assert_eq!(resp.status, StatusCode::OK, "{}", resp.body);

    assert_eq!(app.get(&format!("/users/{user}")).await.status, StatusCode::NOT_FOUND);
    let asset_body = app.get(&format!("/assets/{asset}")).await;
    assert!(asset_body.data()["assigned_to"].is_null());
    let grants = app.get(&format!("/companies/{company}/users")).await;
    assert_eq!(grants.body["meta"]["total"], 0);

    let rows = app.audit_rows(&user).await;
    assert_eq!(rows.last().unwrap().0, "delete");
    assert_eq!(rows.last().unwrap().1["deleted"]["email"], "jane@example.com");

    common::cleanup(app).await;
}

// ── Company access ──────────────────────────────────────────────

#[tokio::test]
async fn company_access_lifecycle() {
    let app = common::spawn_app().await;
    let company = app.create_company("Acme").await;
    let user = app.create_user("jane@example.com", None).await;

    let added = app
        .post(&format!("/companies/{company}/users"), &json!({ "user_id": user }))
        .await;
    assert_eq!(added.status, StatusCode::CREATED);
    assert_eq!(added.data()["role"], "MEMBER");

    let dup = app
        .post(
            &format!("/companies/{company}/users"),
            &json!({ "user_id": user, "role": "ADMIN" }),
        )
        .await;
    assert_eq!(dup.status, StatusCode::BAD_REQUEST);
    assert_eq!(dup.body["error"]["message"], "User already has access to this company");

    let stranger = app
        .post(
            &format!("/companies/{company}/users"),
            &json!({ "user_id": Uuid::new_v4() }),
        )
        .await;
    assert_eq!(stranger.status, StatusCode::BAD_REQUEST);
    assert_eq!(stranger.body["error"]["message"], "User does not exist");

    let nowhere = app
        .post(
            &format!("/companies/{}/users", Uuid::new_v4()),
            &json!({ "user_id": user }),
        )
        .await;
    assert_eq!(nowhere.status, StatusCode::NOT_FOUND);

    let companies = app.get(&format!("/users/{user}/companies")).await;
    assert_eq!(companies.data().as_array().unwrap().len(), 1);

    let removed = app
        .delete(&format!("/companies/{company}/users/{user}"))
        .await;
    assert_eq!(removed.status, StatusCode::NO_CONTENT);

    let again = app
        .delete(&format!("/companies/{company}/users/{user}"))
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(again.body["error"]["message"], "Company access not found");

    let grant_id = added.id();
    let rows = app.audit_rows(&grant_id).await;
    let actions: Vec<&str> = rows.iter().map(|r| r.0.as_str()).collect();
    assert_eq!(actions, vec!["create", "delete"]);
    assert_eq!(rows[1].1["deleted"]["role"], "MEMBER");

    common::cleanup(app).await;
}

#[tokio::test]
async fn stored_roles_are_normalized() {
    let app = common::spawn_app().await;
    let company = app.create_company("Acme").await;
    let legacy = app.create_user("legacy@example.com", None).await;
    let admin = app.create_user("admin@example.com", None).await;

    sqlx::query("INSERT INTO company_access (user_id, company_id, role) VALUES ($1, $2, 'viewer')")
        .bind(legacy.parse::<Uuid>().unwrap())
        .bind(company.parse::<Uuid>().unwrap())
        .execute(&app.pool)
        .await
        .unwrap();
    let added = app
        .post(
            &format!("/companies/{company}/users"),
            &json!({ "user_id": admin, "role": "ADMIN" }),
        )
        .await;
    assert_eq!(added.data()["role"], "ADMIN");

    let stored: String = sqlx::query_scalar("SELECT role FROM company_access WHERE user_id = $1")
        .bind(admin.parse::<Uuid>().unwrap())
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(stored, "admin");

    let read_only = app
        .get(&format!("/companies/{company}/users?role=READ_ONLY"))
        .await;
    assert_eq!(read_only.body["meta"]["total"], 1);
    assert_eq!(read_only.data()[0]["role"], "READ_ONLY");
    assert_eq!(read_only.data()[0]["user_id"], legacy.as_str());

    let all = app.get(&format!("/companies/{company}/users")).await;
    assert_eq!(all.body["meta"]["total"], 2);

    common::cleanup(app).await;
}

// ── Assets ──────────────────────────────────────────────────────

#[tokio::test]
async fn assets_crud() {
    let app = common::spawn_app().await;
    let company = app.create_company("Acme").await;

    let created = app
        .post(
            "/assets",
            &json!({
                "company_id": company,
                "type": "license",
                "name": "IDE seat",
                "identifier": "LIC-001",
                "metadata": { "seats": 5 },
            }),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["type"], "license");
    assert_eq!(created.data()["status"], "active");
    assert_eq!(created.data()["metadata"], json!({ "seats": 5 }));
    let id = created.id();

    let updated = app
        .patch(
            &format!("/assets/{id}"),
            &json!({ "identifier": null, "status": "maintenance" }),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert!(updated.data()["identifier"].is_null());
    assert_eq!(updated.data()["metadata"], json!({ "seats": 5 }));

    let rows = app.audit_rows(&id).await;
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[1].1,
        json!({
            "identifier": { "from": "LIC-001", "to": null },
            "status": { "from": "active", "to": "maintenance" },
        })
    );

    let deleted = app.delete(&format!("/assets/{id}")).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.data()["message"], "Asset deleted successfully");
    assert_eq!(app.get(&format!("/assets/{id}")).await.status, StatusCode::NOT_FOUND);

    let rows = app.audit_rows(&id).await;
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[2].0, "delete");

    common::cleanup(app).await;
}

#[tokio::test]
async fn asset_preconditions() {
    let app = common::spawn_app().await;
    let company = app.create_company("Acme").await;

    let orphan = app
        .post(
            "/assets",
            &json!({ "company_id": Uuid::new_v4(), "type": "hardware", "name": "Laptop" }),
        )
        .await;
    assert_eq!(orphan.status, StatusCode::BAD_REQUEST);
    assert_eq!(orphan.body["error"]["message"], "Company does not exist");

    let ghost = app
        .post(
            "/assets",
            &json!({ "company_id": company, "type": "hardware", "name": "Laptop", "assigned_to": Uuid::new_v4() }),
        )
        .await;
    assert_eq!(ghost.status, StatusCode::BAD_REQUEST);
    assert_eq!(ghost.body["error"]["message"], "Assigned user does not exist");

    let invalid = app
        .post("/assets", &json!({ "company_id": company, "type": "car", "name": "X", "metadata": "x" }))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    let details = invalid.body["error"]["details"].as_object().unwrap();
    assert!(details.contains_key("type") && details.contains_key("metadata"));

    let missing = app
        .patch(&format!("/assets/{}", Uuid::new_v4()), &json!({ "name": "X" }))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn asset_list_filters() {
    let app = common::spawn_app().await;
    let acme = app.create_company("Acme").await;
    let globex = app.create_company("Globex").await;
    app.create_asset(&acme, "Laptop").await;
    app.create_asset(&acme, "Monitor").await;
    app.create_asset(&globex, "Server").await;
    app.post(
        "/assets",
        &json!({ "company_id": acme, "type": "software", "name": "Editor" }),
    )
    .await;

    let acme_assets = app.get(&format!("/assets?company_id={acme}")).await;
    assert_eq!(acme_assets.body["meta"]["total"], 3);

    let hardware = app
        .get(&format!("/assets?company_id={acme}&type=hardware"))
        .await;
    assert_eq!(hardware.body["meta"]["total"], 2);

    let bad = app.get("/assets?type=car").await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

// ── Audit logs ──────────────────────────────────────────────────

#[tokio::test]
async fn audit_log_listing() {
    let app = common::spawn_app().await;
    let company = app.create_company("Acme").await;
    let asset = app.create_asset(&company, "Laptop").await;
    app.patch(&format!("/assets/{asset}"), &json!({ "name": "Laptop 2" }))
        .await;

    let all = app.get(&format!("/audit-logs?company_id={company}")).await;
    assert_eq!(all.status, StatusCode::OK);
    assert_eq!(all.body["meta"]["total"], 3);
    assert_eq!(all.data()[0]["action"], "update");

    let assets_only = app
        .get(&format!("/audit-logs?company_id={company}&entity_type=asset&action=create"))
        .await;
    assert_eq!(assets_only.body["meta"]["total"], 1);
    assert_eq!(assets_only.data()[0]["entity_id"], asset.as_str());

    let windowed = app
        .get(&format!("/audit-logs?company_id={company}&limit=1&offset=1"))
        .await;
    assert_eq!(windowed.data().as_array().unwrap().len(), 1);
    assert_eq!(windowed.body["meta"], json!({ "total": 3, "limit": 1, "page": 2 }));

    let required = app.get("/audit-logs").await;
    assert_eq!(required.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        required.body["error"]["message"],
        "company_id query parameter is required"
    );

    let unknown = app
        .get(&format!("/audit-logs?company_id={}", Uuid::new_v4()))
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}
