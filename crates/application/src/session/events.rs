//! Notifications emitted by the session manager

/// Session lifecycle notifications.
///
/// `LoginRequired` takes the place of a hard redirect: the host decides how
/// to bring the user to the login screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Credentials were accepted.
    LoggedIn {
        /// E-mail used to log in.
        email: String,
    },
    /// A new access token was obtained.
    TokenRefreshed,
    /// The session was cleared by `logout`.
    LoggedOut,
    /// The session is gone and the user must log in again.
    LoginRequired {
        /// Path the user was on when the session was lost.
        from: String,
    },
}
