use crate::commands::{AppState, CommandError};
use crate::models::{CommandArgs, LoginRequest, RegisterRequest, SessionUser};

/// `register`: create an account and log into it
pub fn register(state: &mut AppState, args: &CommandArgs) -> Result<String, CommandError> {
    let request = RegisterRequest::from_args(args)?;
    let user = state.users.register(&request)?;

    state.session = Some(SessionUser::from(user));
    Ok("Регистрация успешна. Вы вошли в аккаунт.".to_string())
}

/// `login`
pub fn login(state: &mut AppState, args: &CommandArgs) -> Result<String, CommandError> {
    let request = LoginRequest::from_args(args)?;
    let user = state.users.authenticate(&request)?;

    tracing::info!("User {} logged in", user.login);
    state.session = Some(SessionUser::from(user));
    Ok("Вход выполнен.".to_string())
}

/// `logout`
pub fn logout(state: &mut AppState, _args: &CommandArgs) -> Result<String, CommandError> {
    match state.session.take() {
        Some(user) => {
            tracing::info!("User {} logged out", user.login);
            Ok("Вы вышли из аккаунта.".to_string())
        }
        None => Err(CommandError::NotLoggedIn),
    }
}
