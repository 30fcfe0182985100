use utoipa::OpenApi;

use crate::ritmo::handlers::{habits, health, login, signup};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ritmo",
        description = "Habit tracking API",
    ),
    paths(
        health::health,
        signup::signup,
        login::login,
        habits::habits,
    ),
    components(schemas(
        signup::SignupRequest,
        login::LoginRequest,
        login::TokenResponse,
        habits::Habit,
    )),
    tags(
        (name = "auth", description = "Signup and login"),
        (name = "habits", description = "Role-protected habit listing"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_all_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for path in ["/health", "/auth/signup", "/auth/login", "/habits"] {
            assert!(
                paths.iter().any(|p| p.as_str() == path),
                "missing path {path}"
            );
        }
    }
}
