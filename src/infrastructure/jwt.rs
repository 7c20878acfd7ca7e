//! JWT Token 生成和验证模块
//!
//! 会话管理（登录、登出、刷新）由网关侧协作方负责，本服务只验签、
//! 取 user_id 和 role 做权限判断。

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Subject (user ID)
    pub role: String, // "distributor" | "operator" | "admin"
    pub exp: i64,     // Expiration time
    pub iat: i64,     // Issued at
    pub jti: String,  // JWT ID，保证每个token唯一
}

impl Claims {
    pub fn new(user_id: Uuid, role: String, expires_in_secs: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            role,
            exp: (now + Duration::seconds(expires_in_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// 获取用户 ID（UUID）
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow!("Invalid user ID in claims: {}", e))
    }
}

fn get_jwt_secret() -> Result<String> {
    let secret = std::env::var("JWT_SECRET").map_err(|_| anyhow!("JWT_SECRET must be set"))?;
    if secret.len() < 32 {
        return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
    }
    Ok(secret)
}

/// 生成JWT Token（测试和内部工具用；对外签发在网关侧）
pub fn generate_token(user_id: Uuid, role: String, expires_in_secs: i64) -> Result<String> {
    let secret = get_jwt_secret()?;
    let claims = Claims::new(user_id, role, expires_in_secs);

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| anyhow!("Failed to encode token: {}", e))
}

/// 验证JWT Token
pub fn verify_token(token: &str) -> Result<Claims> {
    let secret = get_jwt_secret()?;
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| anyhow!("Invalid token: {}", e))?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_test_secret() {
        std::env::set_var(
            "JWT_SECRET",
            "test_secret_that_is_at_least_32_characters_long",
        );
    }

    #[test]
    fn token_round_trip() {
        set_test_secret();
        let user_id = Uuid::new_v4();
        let token = generate_token(user_id, "admin".into(), 3600).unwrap();
        let claims = verify_token(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.role, "admin");
    }

    #[test]
    fn expired_token_is_rejected() {
        set_test_secret();
        let token = generate_token(Uuid::new_v4(), "operator".into(), -60).unwrap();
        assert!(verify_token(&token).is_err());
    }
}
