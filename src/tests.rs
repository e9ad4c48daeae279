#[cfg(test)]
mod integration_tests {
    use crate::handlers::auth::LoginRequest;
    use crate::handlers::channels::{CreateChannelRequest, UpdateChannelRequest};
    use crate::handlers::keywords::CreateKeywordRequest;
    use crate::handlers::users::{
        CreateUserRequest, SocialNetworksRequest, SyncRolesRequest, UpdateUserRequest,
    };
    use crate::schemas::{ApiResponse, ErrorResponse};
    use crate::test_utils::test_utils::{
        bearer, capture_logs, create_test_product, create_test_user, setup_test_app, TestApp,
        ADMIN_EMAIL, MEMBER_EMAIL, MEMBER_PASSWORD,
    };
    use axum::http::{header, HeaderName, HeaderValue, StatusCode};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::{TestRequest, TestResponse};
    use model::entities::{role, user};
    use model::repositories::{ActivityRepository, NewActivity};
    use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
    use serde_json::Value;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";

    fn as_admin(app: &TestApp, request: TestRequest) -> TestRequest {
        let (name, value) = app.admin_auth();
        request.add_header(name, value)
    }

    fn as_member(app: &TestApp, request: TestRequest) -> TestRequest {
        let (name, value) = app.member_auth();
        request.add_header(name, value)
    }

    fn error_code(response: &TestResponse) -> String {
        let body: ErrorResponse = response.json();
        assert!(!body.success);
        body.code
    }

    fn data(response: &TestResponse) -> Value {
        let body: ApiResponse<Value> = response.json();
        assert!(body.success);
        body.data
    }

    fn create_user_request(email: &str) -> CreateUserRequest {
        CreateUserRequest {
            email: email.to_string(),
            username: None,
            password: "secret123".to_string(),
            first_name: Some("Jane".to_string()),
            last_name: Some("Doe".to_string()),
            phone: None,
            address: None,
            country_id: None,
            birthday: None,
            status: None,
        }
    }

    fn logo_form(bytes: Vec<u8>, mime: &str) -> MultipartForm {
        MultipartForm::new().add_part(
            "logo",
            Part::bytes(bytes).file_name("logo.png").mime_type(mime),
        )
    }

    async fn log_activity(app: &TestApp, user_id: i32, description: String) {
        app.state
            .activities
            .log(NewActivity::new(user_id, description))
            .await
            .expect("Failed to log activity");
    }

    #[tokio::test]
    async fn test_health_check() {
        let app = setup_test_app().await;

        let response = app.server.get("/health").await;

        response.assert_status(StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["database"], "connected");
    }

    #[tokio::test]
    async fn test_login_with_email_or_username() {
        let app = setup_test_app().await;

        for login in [MEMBER_EMAIL, "member"] {
            let response = app
                .server
                .post("/api/v1/auth/login")
                .json(&LoginRequest {
                    login: login.to_string(),
                    password: MEMBER_PASSWORD.to_string(),
                })
                .await;

            response.assert_status(StatusCode::OK);
            let login_data = data(&response);
            assert_eq!(login_data["token_type"], "Bearer");
            assert_eq!(login_data["user"]["email"], MEMBER_EMAIL);
            assert!(!login_data["user"]["last_login"].is_null());

            // The issued token authenticates the caller.
            let token = login_data["token"].as_str().unwrap();
            let (name, value) = bearer(token);
            let me = app.server.get("/api/v1/me").add_header(name, value).await;
            me.assert_status(StatusCode::OK);
            let me_data = data(&me);
            assert_eq!(me_data["user"]["id"], app.member.id);
            assert_eq!(me_data["roles"].as_array().unwrap().len(), 0);
            assert_eq!(me_data["permissions"].as_array().unwrap().len(), 0);
        }
    }

    #[tokio::test]
    async fn test_login_records_client_activity() {
        let app = setup_test_app().await;

        let response = app
            .server
            .post("/api/v1/auth/login")
            .add_header(
                HeaderName::from_static("x-forwarded-for"),
                HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
            )
            .add_header(header::USER_AGENT, HeaderValue::from_static("backoffice-tests"))
            .json(&LoginRequest {
                login: MEMBER_EMAIL.to_string(),
                password: MEMBER_PASSWORD.to_string(),
            })
            .await;
        response.assert_status(StatusCode::OK);

        let activity = app.member.activities(app.db()).await.unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].description, "Logged in.");
        assert_eq!(activity[0].ip_address, "203.0.113.7");
        assert_eq!(activity[0].user_agent, "backoffice-tests");
    }

    #[tokio::test]
    async fn test_login_with_invalid_credentials() {
        let app = setup_test_app().await;

        for (login, password) in [(MEMBER_EMAIL, "wrong-password"), ("nobody@example.com", "secret")] {
            let response = app
                .server
                .post("/api/v1/auth/login")
                .json(&LoginRequest {
                    login: login.to_string(),
                    password: password.to_string(),
                })
                .await;

            response.assert_status(StatusCode::UNAUTHORIZED);
            assert_eq!(error_code(&response), "INVALID_CREDENTIALS");
        }
    }

    #[tokio::test]
    async fn test_login_rejects_banned_and_unconfirmed_users() {
        let app = setup_test_app().await;
        create_test_user(app.db(), "banned@example.com", "banned", "secret123", user::UserStatus::Banned).await;
        create_test_user(
            app.db(),
            "new@example.com",
            "newbie",
            "secret123",
            user::UserStatus::Unconfirmed,
        )
        .await;

        for (login, code) in [("banned", "USER_BANNED"), ("newbie", "USER_UNCONFIRMED")] {
            let response = app
                .server
                .post("/api/v1/auth/login")
                .json(&LoginRequest {
                    login: login.to_string(),
                    password: "secret123".to_string(),
                })
                .await;

            response.assert_status(StatusCode::FORBIDDEN);
            assert_eq!(error_code(&response), code);
        }
    }

    #[tokio::test]
    async fn test_requests_without_valid_token_are_unauthorized() {
        let app = setup_test_app().await;

        let response = app.server.get("/api/v1/me").await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&response), "MISSING_AUTHORIZATION");

        let (name, value) = bearer("not-a-token");
        let response = app.server.get("/api/v1/keywords").add_header(name, value).await;
        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(error_code(&response), "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_banned_user_token_is_rejected() {
        let app = setup_test_app().await;
        let token = app.member_token();

        let mut active: user::ActiveModel = app.member.clone().into();
        active.status = Set(user::UserStatus::Banned);
        active.update(app.db()).await.unwrap();

        let (name, value) = bearer(&token);
        let response = app.server.get("/api/v1/me").add_header(name, value).await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(error_code(&response), "USER_BANNED");
    }

    #[tokio::test]
    async fn test_permissions_gate_every_group() {
        let app = setup_test_app().await;

        for path in ["/api/v1/activity", "/api/v1/users", "/api/v1/channels", "/api/v1/keywords"] {
            let response = as_member(&app, app.server.get(path)).await;
            response.assert_status(StatusCode::FORBIDDEN);
            assert_eq!(error_code(&response), "FORBIDDEN");

            let response = as_admin(&app, app.server.get(path)).await;
            response.assert_status(StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_activity_pagination_and_search() {
        let app = setup_test_app().await;
        for i in 1..=25 {
            log_activity(&app, app.admin.id, format!("Did thing {}.", i)).await;
        }

        let response = as_admin(&app, app.server.get("/api/v1/activity")).await;
        response.assert_status(StatusCode::OK);
        let page = data(&response);
        assert_eq!(page["total"], 25);
        assert_eq!(page["per_page"], 20);
        assert_eq!(page["last_page"], 2);
        assert_eq!(page["data"].as_array().unwrap().len(), 20);
        // Newest first.
        assert_eq!(page["data"][0]["description"], "Did thing 25.");
        assert_eq!(page["data"][0]["user_email"], ADMIN_EMAIL);

        let response = as_admin(&app, app.server.get("/api/v1/activity?page=2")).await;
        let page = data(&response);
        assert_eq!(page["current_page"], 2);
        assert_eq!(page["data"].as_array().unwrap().len(), 5);

        let response = as_admin(&app, app.server.get("/api/v1/activity?per_page=10")).await;
        let page = data(&response);
        assert_eq!(page["last_page"], 3);
        assert_eq!(page["data"].as_array().unwrap().len(), 10);

        let response = as_admin(&app, app.server.get("/api/v1/activity?search=thing%201")).await;
        let page = data(&response);
        // "thing 1." and "thing 10." through "thing 19."
        assert_eq!(page["total"], 11);
        assert_eq!(page["search"], "thing 1");
    }

    #[tokio::test]
    async fn test_user_activity() {
        let app = setup_test_app().await;
        log_activity(&app, app.member.id, "Updated profile details.".to_string()).await;
        log_activity(&app, app.admin.id, "Created new user.".to_string()).await;
        log_activity(&app, app.member.id, "Logged in.".to_string()).await;

        let path = format!("/api/v1/users/{}/activity", app.member.id);
        let response = as_admin(&app, app.server.get(&path)).await;
        response.assert_status(StatusCode::OK);
        let page = data(&response);
        assert_eq!(page["total"], 2);
        assert!(page["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|entry| entry["user_id"] == app.member.id));

        let response = as_admin(&app, app.server.get(&format!("{}?search=profile", path))).await;
        assert_eq!(data(&response)["total"], 1);

        let response = as_admin(&app, app.server.get("/api/v1/users/9999/activity")).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_user() {
        let app = setup_test_app().await;
        let mut request = create_user_request("jane@example.com");
        request.birthday = Some("1990-05-17".to_string());

        let response = as_admin(&app, app.server.post("/api/v1/users").json(&request)).await;

        response.assert_status(StatusCode::CREATED);
        let created = data(&response);
        assert_eq!(created["email"], "jane@example.com");
        assert_eq!(created["full_name"], "Jane Doe");
        assert_eq!(created["status"], "Unconfirmed");
        assert_eq!(created["birthday"], "1990-05-17");
        assert!(created.get("password").is_none());

        // Duplicate emails conflict.
        let response = as_admin(&app, app.server.post("/api/v1/users").json(&request)).await;
        response.assert_status(StatusCode::CONFLICT);
        assert_eq!(error_code(&response), "CONFLICT");

        let activity = app.admin.activities(app.db()).await.unwrap();
        assert!(activity
            .iter()
            .any(|entry| entry.description == "Created new user with email jane@example.com."));
    }

    #[tokio::test]
    async fn test_create_user_validation() {
        let app = setup_test_app().await;

        let response = as_admin(
            &app,
            app.server
                .post("/api/v1/users")
                .json(&create_user_request("not-an-email")),
        )
        .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(&response), "VALIDATION_ERROR");

        let mut request = create_user_request("jane@example.com");
        request.birthday = Some("17/05/1990".to_string());
        let response = as_admin(&app, app.server.post("/api/v1/users").json(&request)).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(&response), "INVALID_BIRTHDAY");

        let mut request = create_user_request("jane@example.com");
        request.status = Some("Sleeping".to_string());
        let response = as_admin(&app, app.server.post("/api/v1/users").json(&request)).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(&response), "INVALID_STATUS");
    }

    #[tokio::test]
    async fn test_list_users_with_filters() {
        let app = setup_test_app().await;
        create_test_user(app.db(), "jane@example.com", "jane", "secret123", user::UserStatus::Unconfirmed).await;

        let response = as_admin(&app, app.server.get("/api/v1/users")).await;
        response.assert_status(StatusCode::OK);
        assert_eq!(data(&response)["total"], 3);

        let response = as_admin(&app, app.server.get("/api/v1/users?status=Unconfirmed")).await;
        let page = data(&response);
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["email"], "jane@example.com");

        let response = as_admin(&app, app.server.get("/api/v1/users?search=member")).await;
        let page = data(&response);
        assert_eq!(page["total"], 1);
        assert_eq!(page["data"][0]["email"], MEMBER_EMAIL);

        let response = as_admin(&app, app.server.get("/api/v1/users?status=Sleeping")).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_update_user() {
        let app = setup_test_app().await;
        let path = format!("/api/v1/users/{}", app.member.id);

        let response = as_admin(
            &app,
            app.server.put(&path).json(&UpdateUserRequest {
                first_name: Some("Mem".to_string()),
                birthday: Some("".to_string()),
                password: Some("changed-secret".to_string()),
                ..Default::default()
            }),
        )
        .await;

        response.assert_status(StatusCode::OK);
        let updated = data(&response);
        assert_eq!(updated["first_name"], "Mem");
        assert!(updated["birthday"].is_null());

        let stored = user::Entity::find_by_id(app.member.id)
            .one(app.db())
            .await
            .unwrap()
            .unwrap();
        assert!(common::verify_password("changed-secret", &stored.password).unwrap());

        let activity = app.admin.activities(app.db()).await.unwrap();
        assert_eq!(
            activity[0].description,
            format!("Updated profile details for {}.", MEMBER_EMAIL)
        );

        let response = as_admin(
            &app,
            app.server.put("/api/v1/users/9999").json(&UpdateUserRequest::default()),
        )
        .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_user() {
        let app = setup_test_app().await;

        let response = as_admin(&app, app.server.delete(&format!("/api/v1/users/{}", app.admin.id))).await;
        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(error_code(&response), "CANNOT_DELETE_SELF");

        let path = format!("/api/v1/users/{}", app.member.id);
        let response = as_admin(&app, app.server.delete(&path)).await;
        response.assert_status(StatusCode::NO_CONTENT);

        let response = as_admin(&app, app.server.get(&path)).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(error_code(&response), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_sync_user_roles() {
        let app = setup_test_app().await;
        let admin_role = role::Entity::find()
            .filter(role::Column::Name.eq(role::ADMIN))
            .one(app.db())
            .await
            .unwrap()
            .unwrap();
        let path = format!("/api/v1/users/{}/roles", app.member.id);

        let response = as_admin(&app, app.server.put(&path).json(&SyncRolesRequest { roles: vec![9999] })).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(&response), "UNKNOWN_ROLE");

        let response = as_admin(
            &app,
            app.server.put(&path).json(&SyncRolesRequest {
                roles: vec![admin_role.id],
            }),
        )
        .await;
        response.assert_status(StatusCode::OK);

        let response = as_admin(&app, app.server.get(&path)).await;
        let roles = data(&response);
        assert_eq!(roles.as_array().unwrap().len(), 1);
        assert_eq!(roles[0]["name"], role::ADMIN);

        // The member now passes the keyword gate.
        let response = as_member(&app, app.server.get("/api/v1/keywords")).await;
        response.assert_status(StatusCode::OK);

        let response = as_admin(&app, app.server.put(&path).json(&SyncRolesRequest { roles: vec![] })).await;
        response.assert_status(StatusCode::OK);
        let response = as_member(&app, app.server.get("/api/v1/keywords")).await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_social_networks() {
        let app = setup_test_app().await;
        let path = format!("/api/v1/users/{}/social-networks", app.member.id);

        let response = as_admin(&app, app.server.get(&path)).await;
        response.assert_status(StatusCode::OK);
        assert!(data(&response)["twitter"].is_null());

        for twitter in ["https://twitter.com/member", "https://twitter.com/member2"] {
            let response = as_admin(
                &app,
                app.server.put(&path).json(&SocialNetworksRequest {
                    facebook: None,
                    twitter: Some(twitter.to_string()),
                    google_plus: None,
                    linked_in: None,
                    dribbble: None,
                    skype: Some("member.skype".to_string()),
                }),
            )
            .await;
            response.assert_status(StatusCode::OK);
        }

        let response = as_admin(&app, app.server.get(&path)).await;
        let networks = data(&response);
        assert_eq!(networks["twitter"], "https://twitter.com/member2");
        assert_eq!(networks["skype"], "member.skype");
    }

    #[tokio::test]
    async fn test_favorites() {
        let app = setup_test_app().await;
        let phone = create_test_product(app.db(), "Phone").await;
        let path = format!("/api/v1/users/{}/favorites/{}", app.member.id, phone.id);

        let response = as_admin(&app, app.server.post(&path)).await;
        response.assert_status(StatusCode::CREATED);
        assert_eq!(data(&response), Value::Bool(true));

        let response = as_admin(&app, app.server.post(&path)).await;
        response.assert_status(StatusCode::OK);
        assert_eq!(data(&response), Value::Bool(false));

        let response = as_admin(
            &app,
            app.server.get(&format!("/api/v1/users/{}/favorites", app.member.id)),
        )
        .await;
        let favorites = data(&response);
        assert_eq!(favorites.as_array().unwrap().len(), 1);
        assert_eq!(favorites[0]["name"], "Phone");

        let response = as_admin(&app, app.server.delete(&path)).await;
        response.assert_status(StatusCode::NO_CONTENT);
        let response = as_admin(&app, app.server.delete(&path)).await;
        response.assert_status(StatusCode::NOT_FOUND);

        let missing = format!("/api/v1/users/{}/favorites/9999", app.member.id);
        let response = as_admin(&app, app.server.post(&missing)).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_recently_watched() {
        let app = setup_test_app().await;
        let phone = create_test_product(app.db(), "Phone").await;
        let laptop = create_test_product(app.db(), "Laptop").await;

        for product_id in [phone.id, laptop.id, phone.id] {
            let response = as_admin(
                &app,
                app.server.post(&format!(
                    "/api/v1/users/{}/recently-watched/{}",
                    app.member.id, product_id
                )),
            )
            .await;
            response.assert_status(StatusCode::OK);
        }

        let response = as_admin(
            &app,
            app.server.get(&format!("/api/v1/users/{}/recently-watched", app.member.id)),
        )
        .await;
        let watched = data(&response);
        assert_eq!(watched.as_array().unwrap().len(), 2);
        assert_eq!(watched[0]["name"], "Phone");
    }

    async fn create_member_channel(app: &TestApp) -> Value {
        let response = as_admin(
            app,
            app.server.post("/api/v1/channels").json(&CreateChannelRequest {
                user_id: app.member.id,
                name: "Member TV".to_string(),
                description: Some("All about members".to_string()),
            }),
        )
        .await;
        response.assert_status(StatusCode::CREATED);
        data(&response)
    }

    #[tokio::test]
    async fn test_channel_crud() {
        let app = setup_test_app().await;

        let channel = create_member_channel(&app).await;
        assert_eq!(channel["relative_logo_link"], "");
        assert_eq!(channel["logo_path"], model::entities::channel::DEFAULT_LOGO);

        // A user owns at most one channel.
        let response = as_admin(
            &app,
            app.server.post("/api/v1/channels").json(&CreateChannelRequest {
                user_id: app.member.id,
                name: "Second".to_string(),
                description: None,
            }),
        )
        .await;
        response.assert_status(StatusCode::CONFLICT);

        let path = format!("/api/v1/channels/{}", channel["id"]);
        let response = as_admin(
            &app,
            app.server.put(&path).json(&UpdateChannelRequest {
                name: Some("Renamed TV".to_string()),
                ..Default::default()
            }),
        )
        .await;
        response.assert_status(StatusCode::OK);
        assert_eq!(data(&response)["name"], "Renamed TV");

        let response = as_admin(&app, app.server.get("/api/v1/channels")).await;
        let channels = data(&response);
        assert_eq!(channels.as_array().unwrap().len(), 1);
        assert_eq!(channels[0]["description"], "All about members");

        let response = as_admin(&app, app.server.get("/api/v1/channels/9999")).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_channel_logo_upload_replaces_previous_file() {
        let app = setup_test_app().await;
        let channel = create_member_channel(&app).await;
        let path = format!("/api/v1/channels/{}/logo", channel["id"]);

        let response = as_admin(&app, app.server.post(&path).multipart(logo_form(PNG.to_vec(), "image/png"))).await;
        response.assert_status(StatusCode::OK);
        let first = data(&response);
        let first_link = first["relative_logo_link"].as_str().unwrap().to_string();
        assert!(first_link.starts_with("upload/channels/"));
        assert!(first_link.ends_with(".png"));
        assert_eq!(first["logo_path"], first_link);

        let first_file = app
            .upload_dir
            .path()
            .join("channels")
            .join(first_link.trim_start_matches("upload/channels/"));
        assert_eq!(std::fs::read(&first_file).unwrap(), PNG);

        let response = as_admin(&app, app.server.post(&path).multipart(logo_form(PNG.to_vec(), "image/png"))).await;
        response.assert_status(StatusCode::OK);
        let second_link = data(&response)["relative_logo_link"].as_str().unwrap().to_string();
        assert_ne!(first_link, second_link);
        assert!(!first_file.exists());
    }

    #[tokio::test]
    async fn test_channel_logo_upload_rejections() {
        let app = setup_test_app().await;
        let channel = create_member_channel(&app).await;
        let path = format!("/api/v1/channels/{}/logo", channel["id"]);

        let response = as_admin(
            &app,
            app.server.post(&path).multipart(logo_form(b"%PDF-1.4".to_vec(), "application/pdf")),
        )
        .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(&response), "INVALID_IMAGE");

        // Declared as PNG but not one.
        let response = as_admin(
            &app,
            app.server.post(&path).multipart(logo_form(b"GIF89a".to_vec(), "image/png")),
        )
        .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let form = MultipartForm::new().add_text("name", "no logo here");
        let response = as_admin(&app, app.server.post(&path).multipart(form)).await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(&response), "MISSING_LOGO");

        let mut oversized = PNG.to_vec();
        oversized.resize(1024 * 1024 + 1, 0);
        let response = as_admin(&app, app.server.post(&path).multipart(logo_form(oversized, "image/png"))).await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(error_code(&response), "PAYLOAD_TOO_LARGE");

        // Nothing was stored and the channel keeps its default logo.
        let response = as_admin(&app, app.server.get(&format!("/api/v1/channels/{}", channel["id"]))).await;
        assert_eq!(data(&response)["relative_logo_link"], "");
        assert!(!app.upload_dir.path().join("channels").exists());
    }

    #[tokio::test]
    async fn test_keywords() {
        let app = setup_test_app().await;

        for keyword in [" rust ", "axum"] {
            let response = as_admin(
                &app,
                app.server.post("/api/v1/keywords").json(&CreateKeywordRequest {
                    keyword: keyword.to_string(),
                }),
            )
            .await;
            response.assert_status(StatusCode::CREATED);
        }

        let response = as_admin(
            &app,
            app.server.post("/api/v1/keywords").json(&CreateKeywordRequest {
                keyword: "rust".to_string(),
            }),
        )
        .await;
        response.assert_status(StatusCode::CONFLICT);

        let response = as_admin(
            &app,
            app.server.post("/api/v1/keywords").json(&CreateKeywordRequest {
                keyword: "   ".to_string(),
            }),
        )
        .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(&response), "INVALID_KEYWORD");

        let response = as_admin(&app, app.server.get("/api/v1/keywords")).await;
        let keywords = data(&response);
        assert_eq!(keywords.as_array().unwrap().len(), 2);
        assert_eq!(keywords[0]["keyword"], "axum");
        assert_eq!(keywords[1]["keyword"], "rust");

        let path = format!("/api/v1/keywords/{}", keywords[1]["id"]);
        let response = as_admin(&app, app.server.delete(&path)).await;
        response.assert_status(StatusCode::NO_CONTENT);
        let response = as_admin(&app, app.server.delete(&path)).await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_handler_logs_never_contain_credentials() {
        let app = setup_test_app().await;
        let admin = user::Entity::find_by_id(app.admin.id)
            .one(app.db())
            .await
            .unwrap()
            .unwrap();
        let (logs, _guard) = capture_logs();

        let response = as_admin(
            &app,
            app.server.post("/api/v1/keywords").json(&CreateKeywordRequest {
                keyword: "rust".to_string(),
            }),
        )
        .await;
        response.assert_status(StatusCode::CREATED);

        let response = as_admin(
            &app,
            app.server
                .put(&format!("/api/v1/users/{}", app.member.id))
                .json(&UpdateUserRequest {
                    first_name: Some("Mem".to_string()),
                    ..Default::default()
                }),
        )
        .await;
        response.assert_status(StatusCode::OK);

        let output = logs.contents();
        assert!(output.contains("create_keyword"));
        assert!(output.contains("update_user"));
        assert!(!output.contains(&admin.password));
        assert!(!output.contains("$argon2"));
        // The authenticated user is not recorded as a span field.
        assert!(!output.contains("auth="));
    }

    #[tokio::test]
    async fn test_blank_channel_names_are_rejected() {
        let app = setup_test_app().await;

        let response = as_admin(
            &app,
            app.server.post("/api/v1/channels").json(&CreateChannelRequest {
                user_id: app.member.id,
                name: "   ".to_string(),
                description: None,
            }),
        )
        .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(&response), "INVALID_CHANNEL_NAME");

        let channel = create_member_channel(&app).await;
        let path = format!("/api/v1/channels/{}", channel["id"]);
        let response = as_admin(
            &app,
            app.server.put(&path).json(&UpdateChannelRequest {
                name: Some("  ".to_string()),
                ..Default::default()
            }),
        )
        .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error_code(&response), "INVALID_CHANNEL_NAME");

        let response = as_admin(&app, app.server.get(&path)).await;
        assert_eq!(data(&response)["name"], "Member TV");
    }

    #[tokio::test]
    async fn test_failed_logo_update_removes_written_file() {
        let app = setup_test_app().await;
        let channel = create_member_channel(&app).await;
        app.db()
            .execute_unprepared(
                "CREATE TRIGGER channels_read_only BEFORE UPDATE ON channels \
                 BEGIN SELECT RAISE(ABORT, 'channels are read only'); END;",
            )
            .await
            .unwrap();

        let path = format!("/api/v1/channels/{}/logo", channel["id"]);
        let response = as_admin(&app, app.server.post(&path).multipart(logo_form(PNG.to_vec(), "image/png"))).await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

        let logo_dir = app.upload_dir.path().join("channels");
        let leftovers = std::fs::read_dir(&logo_dir)
            .map(|entries| entries.count())
            .unwrap_or(0);
        assert_eq!(leftovers, 0);
    }
}
