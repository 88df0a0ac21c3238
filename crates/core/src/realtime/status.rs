use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Lifecycle of one subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Connecting,
    Subscribed,
    /// Transport failure. Not fatal; a later acknowledgement recovers.
    Error(String),
    /// Torn down. Terminal.
    Closed,
}

/// Input to the subscription state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSignal {
    Acknowledged,
    Failed(String),
    TornDown,
}

impl SubscriptionStatus {
    pub fn transition(&self, signal: StatusSignal) -> Result<SubscriptionStatus> {
        match (self, signal) {
            (SubscriptionStatus::Closed, StatusSignal::TornDown) => Ok(SubscriptionStatus::Closed),
            (SubscriptionStatus::Closed, signal) => Err(Error::Realtime(format!(
                "subscription is closed, cannot apply {:?}",
                signal
            ))),
            (_, StatusSignal::TornDown) => Ok(SubscriptionStatus::Closed),
            (_, StatusSignal::Acknowledged) => Ok(SubscriptionStatus::Subscribed),
            (_, StatusSignal::Failed(reason)) => Ok(SubscriptionStatus::Error(reason)),
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, SubscriptionStatus::Closed)
    }

    pub fn is_live(&self) -> bool {
        matches!(self, SubscriptionStatus::Subscribed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let status = SubscriptionStatus::Connecting;
        let status = status.transition(StatusSignal::Acknowledged).unwrap();
        assert_eq!(status, SubscriptionStatus::Subscribed);
        let status = status
            .transition(StatusSignal::Failed("socket reset".into()))
            .unwrap();
        assert_eq!(status, SubscriptionStatus::Error("socket reset".into()));
        let status = status.transition(StatusSignal::Acknowledged).unwrap();
        assert!(status.is_live());
        let status = status.transition(StatusSignal::TornDown).unwrap();
        assert!(status.is_closed());
    }

    #[test]
    fn test_connecting_can_fail_or_close() {
        let failed = SubscriptionStatus::Connecting
            .transition(StatusSignal::Failed("refused".into()))
            .unwrap();
        assert!(matches!(failed, SubscriptionStatus::Error(_)));
        let closed = SubscriptionStatus::Connecting
            .transition(StatusSignal::TornDown)
            .unwrap();
        assert!(closed.is_closed());
    }

    #[test]
    fn test_closed_is_terminal() {
        let closed = SubscriptionStatus::Closed;
        assert!(closed.transition(StatusSignal::Acknowledged).is_err());
        assert!(closed.transition(StatusSignal::Failed("x".into())).is_err());
        assert_eq!(
            closed.transition(StatusSignal::TornDown).unwrap(),
            SubscriptionStatus::Closed
        );
    }

    #[test]
    fn test_status_wire_shape() {
        let json = serde_json::to_value(SubscriptionStatus::Error("lagged".into())).unwrap();
        assert_eq!(json["state"], "error");
        assert_eq!(json["reason"], "lagged");
        let json = serde_json::to_value(SubscriptionStatus::Subscribed).unwrap();
        assert_eq!(json["state"], "subscribed");
    }
}
