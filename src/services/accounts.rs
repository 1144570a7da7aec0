use std::path::{Path, PathBuf};

use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use serde_json::Value;
use thiserror::Error;
use validator::Validate;

use crate::models::{LoginRequest, RegisterRequest, User};
use crate::services::storage::{load_json_list, next_id, now_iso, record_id, save_json_list, StorageError};

pub const MIN_LOGIN_LEN: usize = 3;
pub const MAX_LOGIN_LEN: usize = 32;
pub const MIN_PASSWORD_LEN: usize = 8;
pub const MAX_PASSWORD_LEN: usize = 128;
pub const DEFAULT_MEMORY_KIB: u32 = 65_536;
pub const DEFAULT_TIME_COST: u32 = 3;
pub const DEFAULT_PARALLELISM: u32 = 4;

const SALT_LEN: usize = 16;

const RESERVED_LOGINS: &[&str] = &[
    "admin", "root", "system", "support", "null", "none", "me", "self", "api", "auth", "login",
    "logout", "register", "user", "users", "test",
];

const COMMON_PASSWORDS: &[&str] = &[
    "password", "12345678", "qwertyui", "abcdefgh", "11111111", "password1",
];

/// Errors that can occur during registration and login
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Ошибка: {0}")]
    InvalidLogin(String),

    #[error("Ошибка: некорректный email.")]
    InvalidEmail,

    #[error("Ошибка: такой login уже занят.")]
    LoginTaken,

    #[error("Ошибка: такой email уже зарегистрирован.")]
    EmailTaken,

    #[error("{}", join_errors(.0))]
    WeakPassword(Vec<String>),

    #[error("Неверный логин или пароль.")]
    InvalidCredentials,

    #[error("Ошибка: закончились свободные идентификаторы пользователей.")]
    IdsExhausted,

    #[error("Ошибка: не удалось вычислить хеш пароля ({0}).")]
    Hashing(#[from] password_hash::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn join_errors(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!("Ошибка: {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check a login against the naming policy
pub fn validate_login(login: &str) -> Result<(), AccountError> {
    let invalid = |msg: String| Err(AccountError::InvalidLogin(msg));
    let len = login.chars().count();

    if login.is_empty() {
        return invalid("Логин не должен быть пустым.".to_string());
    }
    if len < MIN_LOGIN_LEN {
        return invalid(format!("Логин должен быть не короче {MIN_LOGIN_LEN} символов."));
    }
    if len > MAX_LOGIN_LEN {
        return invalid(format!("Логин должен быть не длиннее {MAX_LOGIN_LEN} символов."));
    }
    if !login.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return invalid("Логин может содержать только латинские буквы, цифры, '_' и '-'.".to_string());
    }
    if login.starts_with(['_', '-']) {
        return invalid("Логин не должен начинаться с '_' или '-'.".to_string());
    }
    if login.ends_with(['_', '-']) {
        return invalid("Логин не должен заканчиваться '_' или '-'.".to_string());
    }
    if login.contains("__") || login.contains("--") {
        return invalid("Логин не должен содержать подряд '__' или '--'.".to_string());
    }
    if RESERVED_LOGINS.contains(&login.to_lowercase().as_str()) {
        return invalid("Этот логин зарезервирован.".to_string());
    }

    Ok(())
}

/// Check a password against the security policy, returning every violation
pub fn validate_password(password: &str, login: &str) -> Vec<String> {
    if password.is_empty() {
        return vec!["Пароль не должен быть пустым.".to_string()];
    }

    let mut errors = Vec::new();
    let len = password.chars().count();
    let has_digit = password.chars().any(char::is_numeric);
    let has_alpha = password.chars().any(char::is_alphabetic);
    let has_upper = password.chars().any(char::is_uppercase);
    let has_lower = password.chars().any(char::is_lowercase);

    if len < MIN_PASSWORD_LEN {
        errors.push(format!("Пароль должен быть не короче {MIN_PASSWORD_LEN} символов."));
    }
    if len > MAX_PASSWORD_LEN {
        errors.push(format!("Пароль должен быть не длиннее {MAX_PASSWORD_LEN} символов."));
    }
    if COMMON_PASSWORDS.contains(&password.to_lowercase().as_str()) {
        errors.push("Пароль слишком простой (часто используемый).".to_string());
    }
    if password.chars().all(char::is_numeric) {
        errors.push("Пароль не должен состоять только из цифр.".to_string());
    }
    if password.chars().all(char::is_alphabetic) {
        errors.push("Пароль не должен состоять только из букв.".to_string());
    }
    if has_upper != has_lower {
        errors.push("Используйте разные регистры букв.".to_string());
    }
    if !has_digit {
        errors.push("Добавьте хотя бы одну цифру.".to_string());
    }
    if !has_alpha {
        errors.push("Добавьте хотя бы одну букву.".to_string());
    }
    if password.chars().any(|c| c.is_control() || (c.is_whitespace() && c != ' ')) {
        errors.push("Пароль содержит недопустимые символы.".to_string());
    }
    if password.to_lowercase().contains(&login.to_lowercase()) {
        errors.push("Пароль не должен содержать логин.".to_string());
    }

    errors
}

/// Argon2id cost of newly created hashes
///
/// Verification ignores this and uses the parameters encoded in the stored hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_MEMORY_KIB,
            time_cost: DEFAULT_TIME_COST,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

impl HashCost {
    pub const fn new(memory_kib: u32, time_cost: u32, parallelism: u32) -> Self {
        Self {
            memory_kib,
            time_cost,
            parallelism,
        }
    }

    fn hasher(&self) -> Result<Argon2<'static>, argon2::Error> {
        let params = Params::new(self.memory_kib, self.time_cost, self.parallelism, None)?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// Hash a password into a PHC string (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`)
pub fn hash_password(password: &str, cost: HashCost) -> Result<String, password_hash::Error> {
    let salt: [u8; SALT_LEN] = rand::random();
    let salt = SaltString::encode_b64(&salt)?;
    let hash = cost.hasher()?.hash_password(password.as_bytes(), &salt)?;

    Ok(hash.to_string())
}

/// Verify a password against a stored PHC hash; malformed hashes never verify
pub fn verify_password(password: &str, stored: &str) -> bool {
    PasswordHash::new(stored)
        .and_then(|hash| Argon2::default().verify_password(password.as_bytes(), &hash))
        .is_ok()
}

/// Registered users backed by `users.json`
///
/// Records that could not be read stay in the file and still own their id,
/// login and email.
#[derive(Debug)]
pub struct UserStore {
    path: PathBuf,
    users: Vec<User>,
    unreadable: Vec<Value>,
    hash_cost: HashCost,
}

fn raw_text<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

impl UserStore {
    /// Load users from disk, creating an empty file when it is missing
    pub fn load(path: &Path, hash_cost: HashCost) -> Result<Self, StorageError> {
        let loaded = load_json_list::<User>(path)?;
        tracing::info!("Loaded {} users from {}", loaded.items.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            users: loaded.items,
            unreadable: loaded.unreadable,
            hash_cost,
        })
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_by_id(&self, id: u64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Case-insensitive login lookup
    pub fn find_by_login(&self, login: &str) -> Option<&User> {
        let login = login.to_lowercase();
        self.users.iter().find(|u| u.login.to_lowercase() == login)
    }

    /// Validate and persist a new account
    pub fn register(&mut self, request: &RegisterRequest) -> Result<&User, AccountError> {
        validate_login(&request.login)?;

        if request.validate().is_err() {
            return Err(AccountError::InvalidEmail);
        }

        let login = request.login.to_lowercase();
        let email = request.email.to_lowercase();
        let stored = self
            .users
            .iter()
            .map(|u| (Some(u.login.as_str()), Some(u.email.as_str())))
            .chain(self.unreadable.iter().map(|r| (raw_text(r, "login"), raw_text(r, "email"))));
        for (stored_login, stored_email) in stored {
            if stored_login.is_some_and(|l| l.to_lowercase() == login) {
                return Err(AccountError::LoginTaken);
            }
            if stored_email.is_some_and(|e| e.to_lowercase() == email) {
                return Err(AccountError::EmailTaken);
            }
        }

        let errors = validate_password(&request.password, &request.login);
        if !errors.is_empty() {
            return Err(AccountError::WeakPassword(errors));
        }

        let ids = self.users.iter().map(|u| u.id).chain(self.unreadable.iter().filter_map(record_id));
        let id = next_id(ids).ok_or(AccountError::IdsExhausted)?;

        let user = User {
            id,
            email: request.email.clone(),
            login: request.login.clone(),
            password_hash: hash_password(&request.password, self.hash_cost)?,
            first: request.first.clone(),
            last: request.last.clone(),
            created_at: now_iso(),
        };

        self.users.push(user);
        if let Err(e) = save_json_list(&self.path, &self.users, &self.unreadable) {
            self.users.pop();
            tracing::error!("Failed to save users: {}", e);
            return Err(e.into());
        }

        let user = &self.users[self.users.len() - 1];
        tracing::info!("Registered user {} (id {})", user.login, user.id);
        Ok(user)
    }

    /// Check credentials; unknown login and wrong password are indistinguishable
    pub fn authenticate(&self, request: &LoginRequest) -> Result<&User, AccountError> {
        self.find_by_login(&request.login)
            .filter(|user| verify_password(&request.password, &user.password_hash))
            .ok_or(AccountError::InvalidCredentials)
    }
}
