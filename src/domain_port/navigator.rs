/// Side effect run when the session cannot be renewed: send the user agent
/// to the login entry point.
pub trait Navigator: Send + Sync {
    fn redirect_to_login(&self, login_url: &str);
}
