pub mod callback;
pub mod cookies;
pub mod forgot_password;
pub mod google_login;
pub mod login;
pub mod me;
pub mod refresh;
pub mod reset_password;
pub mod session;
pub mod sign_out;
pub mod signup;

pub use callback::auth_callback;
pub use forgot_password::handle_forgot_password;
pub use google_login::google_login;
pub use login::handle_login;
pub use me::handle_me;
pub use refresh::handle_refresh;
pub use reset_password::handle_reset_password;
pub use session::AuthSession;
pub use sign_out::handle_sign_out;
pub use signup::handle_signup;
