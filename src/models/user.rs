use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::constants::DEFAULT_LANGUAGE_CODE;

fn default_language_code() -> String {
    DEFAULT_LANGUAGE_CODE.to_string()
}

/// `null` explícito = valor por defecto (igual que un campo ausente)
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn language_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|code| !code.is_empty())
        .unwrap_or_else(default_language_code))
}

/// DRF serializa DecimalField como string ("500.00")
fn decimal_balance<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Decimal {
        Number(f64),
        Text(String),
    }

    match Option::<Decimal>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(Decimal::Number(n)) => Ok(n),
        Some(Decimal::Text(text)) => text
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("saldo inválido: {:?}", text))),
    }
}

/// Perfil confirmado por el backend (`/users/me/`, respuesta de auth).
/// Se reemplaza entero en cada fetch, nunca se parchea.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "decimal_balance")]
    pub balance: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_premium: bool,
    #[serde(default = "default_language_code", deserialize_with = "language_or_default")]
    pub language_code: String,
}

impl UserProfile {
    pub fn display_name(&self) -> String {
        match self.last_name.as_deref().filter(|l| !l.is_empty()) {
            Some(last) if !self.first_name.is_empty() => format!("{} {}", self.first_name, last),
            Some(last) => last.to_string(),
            None => self.first_name.clone(),
        }
    }
}

/// Usuario de `initDataUnsafe.user`: sin firma, solo orientativo.
/// Nunca debe usarse para decisiones de autorización.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostUser {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_premium: bool,
    #[serde(default)]
    pub language_code: Option<String>,
}

impl From<HostUser> for UserProfile {
    fn from(user: HostUser) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            // El host no conoce el saldo
            balance: 0.0,
            is_premium: user.is_premium,
            language_code: user.language_code.unwrap_or_else(default_language_code),
        }
    }
}
