use thiserror::Error;

/// Authentication errors for the Lifeline platform.
///
/// Authorization failures (e.g. acting on an ambulance operated by another
/// account) are domain outcomes, not auth errors; they are modeled in the
/// dispatch domain so handlers decide how much to reveal on the wire.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication required")]
    AuthenticationRequired,
}
