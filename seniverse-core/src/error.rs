use thiserror::Error;

use crate::{client::ClientError, gazetteer::GazetteerError, signer::SignError};

/// Every way a forecast lookup can fail.
///
/// `Display` is meant for logs; [`ForecastError::user_message`] is what may
/// be sent back to the user.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("invalid day count {0:?}")]
    InvalidDayCount(String),

    #[error("unknown city {0:?}")]
    UnknownCity(String),

    #[error("provider returned no daily forecast")]
    EmptyPayload,

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Sign(#[from] SignError),

    #[error(transparent)]
    Gazetteer(#[from] GazetteerError),
}

impl ForecastError {
    /// Failures whose detail only operators should see.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Client(ClientError::Unknown(_)) | Self::Gazetteer(_))
    }

    /// Short text safe to show in chat.
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidDayCount(day) => format!("{day} 并非合法天数"),
            Self::UnknownCity(city) => {
                format!("未找到城市：{city} 区级请用 北京/朝阳 写法")
            }
            Self::EmptyPayload => "收到的返回为空".to_string(),
            Self::Client(ClientError::AuthOrQuota { paid_area: true, .. }) => {
                "🔒 请求被拒绝 查询的是付费区域".to_string()
            }
            Self::Client(ClientError::AuthOrQuota { paid_area: false, .. }) => {
                "🔒 请求被拒绝 查询的是付费区域或密钥设置错误".to_string()
            }
            Self::Client(ClientError::EndpointConfig)
            | Self::Sign(SignError::InvalidEndpoint { .. }) => {
                "🚫 请求失败 请检查url设置".to_string()
            }
            Self::Client(ClientError::Unknown(_)) | Self::Gazetteer(_) => {
                "❌ 未知错误，请查看日志！".to_string()
            }
        }
    }
}
