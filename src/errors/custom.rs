//! Caller-defined error kinds.
//!
//! A [`CustomKind`] fixes a code string, a status code and a default
//! message, and mints [`ErrorRecord`]s from them. Two kinds that share a
//! code string produce records that cannot be told apart; use a
//! [`KindRegistry`] when that needs to be caught.

use axum::http::StatusCode;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

use super::codes::ErrorCode;
use super::record::{ErrorKind, ErrorRecord};

/// Errors raised while defining or registering custom kinds
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KindError {
    #[error("invalid HTTP status code: {0}")]
    InvalidStatus(u16),

    #[error("error code must not be empty")]
    EmptyCode,

    #[error("error code {0} is already registered")]
    DuplicateCode(String),

    #[error("error code {0} is reserved by a predefined kind")]
    ReservedCode(String),
}

/// True for 4xx and 5xx statuses, the only ones a record may carry
pub const fn is_error_status(status: StatusCode) -> bool {
    let code = status.as_u16();
    code >= 400 && code < 600
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomKind {
    code: Cow<'static, str>,
    status: StatusCode,
    default_message: Cow<'static, str>,
}

impl CustomKind {
    /// Define a kind from static parts, usable in `const` items.
    ///
    /// `status` must be a client or server error.
    pub const fn from_static(
        code: &'static str,
        status: StatusCode,
        default_message: &'static str,
    ) -> Self {
        debug_assert!(is_error_status(status), "custom kinds need a 4xx or 5xx status");
        Self {
            code: Cow::Borrowed(code),
            status,
            default_message: Cow::Borrowed(default_message),
        }
    }

    /// `status` must be a client or server error; use
    /// [`CustomKind::try_define`] when it comes from outside.
    pub fn define(
        code: impl Into<Cow<'static, str>>,
        status: StatusCode,
        default_message: impl Into<Cow<'static, str>>,
    ) -> Self {
        debug_assert!(is_error_status(status), "custom kinds need a 4xx or 5xx status");
        Self {
            code: code.into(),
            status,
            default_message: default_message.into(),
        }
    }

    /// Like [`CustomKind::define`], but validates a raw status code.
    /// Anything outside 400..=599 is rejected.
    pub fn try_define(
        code: impl Into<Cow<'static, str>>,
        status: u16,
        default_message: impl Into<Cow<'static, str>>,
    ) -> Result<Self, KindError> {
        let code = code.into();
        if code.is_empty() {
            return Err(KindError::EmptyCode);
        }
        let status = StatusCode::from_u16(status)
            .ok()
            .filter(|s| is_error_status(*s))
            .ok_or(KindError::InvalidStatus(status))?;
        Ok(Self::define(code, status, default_message))
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn default_message(&self) -> &str {
        &self.default_message
    }

    /// Build a record with the default message
    pub fn error(&self) -> ErrorRecord {
        ErrorRecord::from_parts(
            ErrorKind::Custom(self.code.clone()),
            self.status,
            self.default_message.to_string(),
        )
    }

    pub fn with_message(&self, message: impl Into<String>) -> ErrorRecord {
        self.error().with_message(message)
    }

    /// Build a record, overriding only the parts that are given
    pub fn build(&self, message: Option<String>, data: Option<Value>) -> ErrorRecord {
        let mut err = self.error();
        if let Some(message) = message {
            err = err.with_message(message);
        }
        if let Some(data) = data {
            err = err.with_data(data);
        }
        err
    }

    /// True if `record` carries this kind's code
    pub fn matches(&self, record: &ErrorRecord) -> bool {
        matches!(record.kind(), ErrorKind::Custom(code) if *code == self.code)
    }
}

/// Define an ad-hoc kind without touching the predefined table
pub fn define_kind(
    code: impl Into<Cow<'static, str>>,
    status: StatusCode,
    default_message: impl Into<Cow<'static, str>>,
) -> CustomKind {
    CustomKind::define(code, status, default_message)
}

// Common domain kinds

pub const PAYMENT_FAILED: CustomKind = CustomKind::from_static(
    "PAYMENT_FAILED",
    StatusCode::UNPROCESSABLE_ENTITY,
    "payment failed",
);

pub const INSUFFICIENT_FUNDS: CustomKind = CustomKind::from_static(
    "INSUFFICIENT_FUNDS",
    StatusCode::UNPROCESSABLE_ENTITY,
    "insufficient funds",
);

pub const PRODUCT_OUT_OF_STOCK: CustomKind = CustomKind::from_static(
    "PRODUCT_OUT_OF_STOCK",
    StatusCode::CONFLICT,
    "product out of stock",
);

pub const INVALID_COUPON: CustomKind = CustomKind::from_static(
    "INVALID_COUPON",
    StatusCode::UNPROCESSABLE_ENTITY,
    "coupon invalid or expired",
);

pub const FILE_NOT_FOUND: CustomKind =
    CustomKind::from_static("FILE_NOT_FOUND", StatusCode::NOT_FOUND, "file not found");

pub const FILE_TOO_LARGE: CustomKind = CustomKind::from_static(
    "FILE_TOO_LARGE",
    StatusCode::UNPROCESSABLE_ENTITY,
    "file exceeds size limit",
);

/// Opt-in set of custom kinds that rejects duplicate codes
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: BTreeMap<String, CustomKind>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-filled with the common domain kinds
    pub fn with_catalog() -> Self {
        let kinds = [
            PAYMENT_FAILED,
            INSUFFICIENT_FUNDS,
            PRODUCT_OUT_OF_STOCK,
            INVALID_COUPON,
            FILE_NOT_FOUND,
            FILE_TOO_LARGE,
        ];
        Self {
            kinds: kinds
                .into_iter()
                .map(|kind| (kind.code().to_string(), kind))
                .collect(),
        }
    }

    pub fn register(&mut self, kind: CustomKind) -> Result<CustomKind, KindError> {
        if kind.code().is_empty() {
            return Err(KindError::EmptyCode);
        }
        if kind.code().parse::<ErrorCode>().is_ok() {
            return Err(KindError::ReservedCode(kind.code().to_string()));
        }
        if self.kinds.contains_key(kind.code()) {
            return Err(KindError::DuplicateCode(kind.code().to_string()));
        }
        self.kinds.insert(kind.code().to_string(), kind.clone());
        Ok(kind)
    }

    pub fn get(&self, code: &str) -> Option<&CustomKind> {
        self.kinds.get(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CustomKind> {
        self.kinds.values()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_define_kind_defaults() {
        let out_of_stock = define_kind("OUT_OF_STOCK", StatusCode::CONFLICT, "out of stock");
        let err = out_of_stock.error();
        assert_eq!(err.code(), "OUT_OF_STOCK");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.message(), "out of stock");
        assert!(err.data().is_none());
    }

    #[test]
    fn test_define_kind_overrides() {
        let out_of_stock = define_kind("OUT_OF_STOCK", StatusCode::CONFLICT, "out of stock");

        let err = out_of_stock.with_message("only 2 left");
        assert_eq!(err.message(), "only 2 left");
        assert_eq!(err.status_code(), StatusCode::CONFLICT);

        let err = out_of_stock.build(None, Some(json!({ "availableStock": 0 })));
        assert_eq!(err.message(), "out of stock");
        assert_eq!(err.data().unwrap()["availableStock"], 0);
        assert_eq!(err.code(), "OUT_OF_STOCK");
    }

    #[test]
    fn test_same_code_is_indistinguishable() {
        let a = define_kind("OUT_OF_STOCK", StatusCode::CONFLICT, "a");
        let b = define_kind("OUT_OF_STOCK", StatusCode::UNPROCESSABLE_ENTITY, "b");
        assert!(a.matches(&b.error()));
        assert!(b.matches(&a.error()));
        assert!(!PAYMENT_FAILED.matches(&a.error()));
    }

    #[test]
    fn test_try_define() {
        let kind = CustomKind::try_define("TEAPOT", 418, "short and stout").unwrap();
        assert_eq!(kind.status_code(), StatusCode::IM_A_TEAPOT);
        assert_eq!(
            CustomKind::try_define("BAD", 42, "x"),
            Err(KindError::InvalidStatus(42))
        );
        assert_eq!(CustomKind::try_define("", 400, "x"), Err(KindError::EmptyCode));
    }

    #[test]
    fn test_try_define_rejects_non_error_statuses() {
        for status in [100, 200, 204, 302, 399, 600] {
            assert_eq!(
                CustomKind::try_define("WEIRD", status, "weird"),
                Err(KindError::InvalidStatus(status))
            );
        }
        let kind = CustomKind::try_define("EDGE", 599, "edge").unwrap();
        assert!(kind.error().status_code().is_server_error());
        let kind = CustomKind::try_define("EDGE", 400, "edge").unwrap();
        assert!(kind.error().status_code().is_client_error());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "4xx or 5xx")]
    fn test_define_panics_on_success_status() {
        let _ = define_kind("WEIRD", StatusCode::OK, "weird");
    }

    #[test]
    fn test_registry_rejects_collisions() {
        let mut registry = KindRegistry::with_catalog();
        assert_eq!(registry.len(), 6);

        let kind = define_kind("OUT_OF_STOCK", StatusCode::CONFLICT, "out of stock");
        assert!(registry.register(kind.clone()).is_ok());
        assert_eq!(
            registry.register(kind),
            Err(KindError::DuplicateCode("OUT_OF_STOCK".to_string()))
        );
        assert_eq!(
            registry.register(define_kind("VALIDATION_ERROR", StatusCode::BAD_REQUEST, "x")),
            Err(KindError::ReservedCode("VALIDATION_ERROR".to_string()))
        );
        assert_eq!(registry.get("OUT_OF_STOCK").unwrap().default_message(), "out of stock");
    }

    #[test]
    fn test_catalog_kinds() {
        assert_eq!(PRODUCT_OUT_OF_STOCK.error().status_code(), StatusCode::CONFLICT);
        assert_eq!(FILE_NOT_FOUND.error().status_code(), StatusCode::NOT_FOUND);
        assert_eq!(PAYMENT_FAILED.error().message(), "payment failed");
    }
}
