use campus::prelude::*;

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

const ACCOUNTS: [(&str, &str, Option<&str>); 4] = [
    ("ala@school.edu", "ala-secret", Some("student")),
    ("nowak@school.edu", "nowak-secret", Some("teacher")),
    ("mama@home.org", "mama-secret", Some("parent")),
    ("root@school.edu", "root-secret", Some("admin")),
];

async fn seed(backend: &MemoryBackend) {
    for (email, password, user_type) in ACCOUNTS {
        backend.register_account(email, password, user_type).await;
    }
}

// ---------------------------------------------------------------------------
// Screens
// ---------------------------------------------------------------------------

/// Prints what a screen would render for the current view.
fn render(view: &GateView) {
    let json = serde_json::to_string(view).unwrap_or_default();
    if view.loading {
        println!("[spinner] {json}");
    } else {
        println!("[{}] {json}", view.location);
    }
}

async fn attempt(app: &CampusApp<MemoryBackend, MemoryBackend, History>, form: LoginForm) {
    println!("> login {} as {}", form.email, form.role);
    match app.login(&form).await {
        Ok(session) => {
            let role = form.role;
            let view = app
                .gate()
                .wait_for(|v| {
                    v.user_id.as_ref() == Some(&session.user_id)
                        && v.role == Some(role)
                        && v.is_settled()
                })
                .await;
            if let Ok(view) = view {
                render(&view);
            }
        }
        Err(e) => {
            let alert = e.alert();
            println!("! {}: {}", alert.title, alert.message);
        }
    }
}

// ---------------------------------------------------------------------------
// Walkthrough
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    campus::logging::init();

    let app = CampusApp::builder()
        .build_in_memory(Route::parse("/(teacher)/grades")?)
        .await;
    seed(app.auth()).await;

    // Nobody is signed in, so the deep link ends on the login screen.
    render(&app.gate().settled().await?);

    attempt(&app, LoginForm::new("ala@school.edu", "wrong", Role::Student)).await;
    attempt(&app, LoginForm::new("nowak@school.edu", "nowak-secret", Role::Parent)).await;
    attempt(&app, LoginForm::new("nowak@school.edu", "nowak-secret", Role::Teacher)).await;

    // A teacher following a link into the student area is sent home.
    let mut locations = app.navigator().watch();
    app.navigator().push(Role::Student.home_route().join("homework")).await?;
    while locations.changed().await.is_ok() {
        let location = locations.borrow_and_update().clone();
        println!("  at {location}");
        if location == Role::Teacher.home_route() {
            break;
        }
    }
    render(&app.gate().view());

    app.logout().await?;
    render(
        &app.gate()
            .wait_for(|v| !v.session_present && v.is_settled())
            .await?,
    );
    tracing::info!(history = ?app.navigator().entries().await, "final history");

    app.shutdown().await;
    Ok(())
}
