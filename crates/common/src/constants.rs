/// Prefix applied to the issuer id in the `iss` and `sub` claims.
pub const ISSUER_PREFIX: &str = "bank:";

/// Value of the `typ` header parameter.
pub const TOKEN_TYPE_JWT: &str = "JWT";

/// Token type reported to HTTP callers alongside an issued token.
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Environment variable prefix for settings overrides (`BANK_TOKEN__TOKEN__AUDIENCE`).
pub const ENV_PREFIX: &str = "BANK_TOKEN";

pub const DEFAULT_ALGORITHM: &str = "ES256";
pub const DEFAULT_TTL_SECONDS: u32 = 600;
