// Services module - identity provider client, session tokens, user directory

pub mod jwt;
pub mod keycloak;
pub mod users;

pub use keycloak::{KeycloakConfig, KeycloakService};
