//! Error taxonomy for a single congestion lookup.

use thiserror::Error;

/// Failure kinds surfaced by [`crate::CongestionProvider::get_congestion_info`].
///
/// Every kind carries a fixed, user-facing message and an HTTP-style status
/// code. The detail that caused the failure is logged where it is detected and
/// never becomes part of the message.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CongestionError {
    /// The caller supplied a blank area name.
    #[error("유효하지 않은 장소명입니다.")]
    InvalidAreaName,

    /// Upstream call failed, returned an empty body, or reported a different area.
    #[error("Seoul API 호출 실패")]
    FetchFailed,

    /// The body was not valid JSON, or a forecast timestamp could not be parsed.
    #[error("Seoul API 데이터 처리 실패")]
    ParseFailed,

    /// The required `CITYDATA` object is missing or is not an object.
    #[error("유효하지 않은 json 데이터입니다.")]
    InvalidJsonStructure,
}

impl CongestionError {
    pub const fn status_code(&self) -> u16 {
        match self {
            CongestionError::InvalidAreaName
            | CongestionError::FetchFailed
            | CongestionError::ParseFailed => 400,
            CongestionError::InvalidJsonStructure => 409,
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            CongestionError::InvalidAreaName => "유효하지 않은 장소명입니다.",
            CongestionError::FetchFailed => "Seoul API 호출 실패",
            CongestionError::ParseFailed => "Seoul API 데이터 처리 실패",
            CongestionError::InvalidJsonStructure => "유효하지 않은 json 데이터입니다.",
        }
    }
}
