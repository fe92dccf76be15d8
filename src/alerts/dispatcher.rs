use crate::client::{AlertMail, MailRelay};
use crate::config::{AlertPolicy, MailConfig};
use crate::error::NotifyError;
use crate::models::{AlertPair, Metric};
use log::{debug, error, info};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertLevel {
    #[default]
    Normal,
    Exceeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Nothing exceeded.
    Quiet,
    /// Something is exceeded but the policy held the mail back.
    Suppressed,
    Sent,
    Failed,
}

/// Sends alert mails and remembers, per metric, whether the last
/// observation was over its limit. State lives as long as the dispatcher.
pub struct AlertDispatcher<M> {
    relay: M,
    from: String,
    to: String,
    subject: String,
    body: String,
    timeout: Duration,
    policy: AlertPolicy,
    temperature: AlertLevel,
    humidity: AlertLevel,
}

impl<M: MailRelay> AlertDispatcher<M> {
    pub fn new(relay: M, mail: &MailConfig, policy: AlertPolicy) -> Self {
        Self {
            relay,
            from: mail.sender.clone(),
            to: mail.recipient.clone(),
            subject: mail.subject.clone(),
            body: mail.body.clone(),
            timeout: mail.timeout(),
            policy,
            temperature: AlertLevel::Normal,
            humidity: AlertLevel::Normal,
        }
    }

    pub fn relay(&self) -> &M {
        &self.relay
    }

    pub fn level(&self, metric: Metric) -> AlertLevel {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
        }
    }

    fn set_level(&mut self, metric: Metric, level: AlertLevel) {
        match metric {
            Metric::Temperature => self.temperature = level,
            Metric::Humidity => self.humidity = level,
        }
    }

    /// Level each metric moves to after this evaluation. An absent value
    /// carries the previous level forward.
    fn next_levels(&self, alerts: &AlertPair) -> [(Metric, AlertLevel); 2] {
        Metric::ALL.map(|metric| {
            let state = alerts.get(metric);
            let level = match (state.current_value, state.exceeded) {
                (None, _) => self.level(metric),
                (Some(_), true) => AlertLevel::Exceeded,
                (Some(_), false) => AlertLevel::Normal,
            };
            (metric, level)
        })
    }

    pub fn compose(&self, alerts: &AlertPair) -> AlertMail {
        let mut body = self.body.clone();
        let messages = alerts.messages();
        if !messages.is_empty() {
            body.push_str("\n\n");
            body.push_str(&messages.join("\n"));
        }
        AlertMail {
            from: self.from.clone(),
            to: self.to.clone(),
            subject: self.subject.clone(),
            body,
        }
    }

    pub async fn dispatch(&mut self, alerts: &AlertPair) -> DispatchOutcome {
        let next = self.next_levels(alerts);
        let rising = next
            .iter()
            .any(|(m, l)| *l == AlertLevel::Exceeded && self.level(*m) == AlertLevel::Normal);

        let notify = match self.policy {
            AlertPolicy::Edge => rising,
            AlertPolicy::EveryCycle => alerts.any_exceeded(),
        };

        if !notify {
            for (metric, level) in next {
                self.set_level(metric, level);
            }
            return if alerts.any_exceeded() {
                debug!("Threshold still exceeded, alert mail suppressed");
                DispatchOutcome::Suppressed
            } else {
                DispatchOutcome::Quiet
            };
        }

        let mail = self.compose(alerts);
        let result = match tokio::time::timeout(self.timeout, self.relay.send(&mail)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Timeout(self.timeout)),
        };

        match result {
            Ok(()) => {
                info!("Alert mail sent to {}", self.to);
                for (metric, level) in next {
                    self.set_level(metric, level);
                }
                DispatchOutcome::Sent
            }
            Err(e) => {
                error!("Failed to send alert mail: {e}");
                // Keep rising metrics at Normal so the next tick retries.
                for (metric, level) in next {
                    if self.level(metric) == AlertLevel::Exceeded || level == AlertLevel::Normal {
                        self.set_level(metric, level);
                    }
                }
                DispatchOutcome::Failed
            }
        }
    }
}
