//! Webhook registration.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};
use tracing::debug;

use super::posts::params;
use crate::client::KitClient;
use crate::error::{KitError, Result};
use crate::http::Params;

/// Events a webhook can subscribe to. Events scoped to a form, course, tag
/// or product carry its ID; link clicks carry the URL.
///
/// Parses from `name` or `name:argument`, e.g. `subscriber.tag_add:42`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    SubscriberActivate,
    SubscriberUnsubscribe,
    SubscriberBounce,
    SubscriberComplain,
    FormSubscribe { form_id: u64 },
    CourseSubscribe { course_id: u64 },
    CourseComplete { course_id: u64 },
    LinkClick { initiator_value: String },
    ProductPurchase { product_id: u64 },
    TagAdd { tag_id: u64 },
    TagRemove { tag_id: u64 },
    PurchaseCreate,
}

impl WebhookEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubscriberActivate => "subscriber.subscriber_activate",
            Self::SubscriberUnsubscribe => "subscriber.subscriber_unsubscribe",
            Self::SubscriberBounce => "subscriber.subscriber_bounce",
            Self::SubscriberComplain => "subscriber.subscriber_complain",
            Self::FormSubscribe { .. } => "subscriber.form_subscribe",
            Self::CourseSubscribe { .. } => "subscriber.course_subscribe",
            Self::CourseComplete { .. } => "subscriber.course_complete",
            Self::LinkClick { .. } => "subscriber.link_click",
            Self::ProductPurchase { .. } => "subscriber.product_purchase",
            Self::TagAdd { .. } => "subscriber.tag_add",
            Self::TagRemove { .. } => "subscriber.tag_remove",
            Self::PurchaseCreate => "purchase.purchase_create",
        }
    }

    /// The `event` object of a create-webhook request.
    pub fn to_json(&self) -> Value {
        let mut event = json!({ "name": self.name() });
        let (key, value) = match self {
            Self::FormSubscribe { form_id } => ("form_id", json!(form_id)),
            Self::CourseSubscribe { course_id } | Self::CourseComplete { course_id } => {
                ("course_id", json!(course_id))
            }
            Self::LinkClick { initiator_value } => ("initiator_value", json!(initiator_value)),
            Self::ProductPurchase { product_id } => ("product_id", json!(product_id)),
            Self::TagAdd { tag_id } | Self::TagRemove { tag_id } => ("tag_id", json!(tag_id)),
            _ => return event,
        };
        event[key] = value;
        event
    }
}

impl fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WebhookEvent {
    type Err = KitError;

    fn from_str(s: &str) -> Result<Self> {
        let (name, argument) = match s.split_once(':') {
            Some((name, argument)) => (name.trim(), Some(argument.trim())),
            None => (s.trim(), None),
        };
        let id = || -> Result<u64> {
            argument
                .ok_or_else(|| KitError::InvalidArgument(format!("webhook event {name} requires an ID")))?
                .parse()
                .map_err(|_| KitError::InvalidArgument(format!("webhook event {name} requires a numeric ID")))
        };

        Ok(match name {
            "subscriber.subscriber_activate" => Self::SubscriberActivate,
            "subscriber.subscriber_unsubscribe" => Self::SubscriberUnsubscribe,
            "subscriber.subscriber_bounce" => Self::SubscriberBounce,
            "subscriber.subscriber_complain" => Self::SubscriberComplain,
            "subscriber.form_subscribe" => Self::FormSubscribe { form_id: id()? },
            "subscriber.course_subscribe" => Self::CourseSubscribe { course_id: id()? },
            "subscriber.course_complete" => Self::CourseComplete { course_id: id()? },
            "subscriber.link_click" => Self::LinkClick {
                initiator_value: argument
                    .filter(|v| !v.is_empty())
                    .ok_or_else(|| {
                        KitError::InvalidArgument(format!("webhook event {name} requires a URL"))
                    })?
                    .to_string(),
            },
            "subscriber.product_purchase" => Self::ProductPurchase { product_id: id()? },
            "subscriber.tag_add" => Self::TagAdd { tag_id: id()? },
            "subscriber.tag_remove" => Self::TagRemove { tag_id: id()? },
            "purchase.purchase_create" => Self::PurchaseCreate,
            other => {
                return Err(KitError::InvalidArgument(format!(
                    "{other} is not a supported webhook event"
                )))
            }
        })
    }
}

impl KitClient {
    /// Register `url` to receive `event`.
    pub async fn create_webhook(&self, url: &str, event: &WebhookEvent) -> Result<Value> {
        debug!(url, event = %event, "create_webhook");
        self.post(
            "webhooks",
            params(json!({ "target_url": url, "event": event.to_json() })),
        )
        .await
    }

    pub async fn delete_webhook(&self, id: u64) -> Result<Value> {
        debug!(id, "delete_webhook");
        self.delete(&format!("webhooks/{id}"), Params::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_events_with_and_without_arguments() {
        assert_eq!(
            "subscriber.subscriber_activate".parse::<WebhookEvent>().unwrap(),
            WebhookEvent::SubscriberActivate
        );
        assert_eq!(
            "subscriber.tag_add:42".parse::<WebhookEvent>().unwrap(),
            WebhookEvent::TagAdd { tag_id: 42 }
        );
        assert_eq!(
            "subscriber.link_click:https://example.com/a".parse::<WebhookEvent>().unwrap(),
            WebhookEvent::LinkClick {
                initiator_value: "https://example.com/a".to_string()
            }
        );
    }

    #[test]
    fn rejects_unknown_events_and_missing_ids() {
        assert!(matches!(
            "subscriber.nonsense".parse::<WebhookEvent>(),
            Err(KitError::InvalidArgument(_))
        ));
        assert!("subscriber.form_subscribe".parse::<WebhookEvent>().is_err());
        assert!("subscriber.form_subscribe:abc".parse::<WebhookEvent>().is_err());
        assert!("subscriber.link_click".parse::<WebhookEvent>().is_err());
    }

    #[test]
    fn event_json_carries_its_argument() {
        assert_eq!(
            WebhookEvent::FormSubscribe { form_id: 7 }.to_json(),
            json!({ "name": "subscriber.form_subscribe", "form_id": 7 })
        );
        assert_eq!(
            WebhookEvent::PurchaseCreate.to_json(),
            json!({ "name": "purchase.purchase_create" })
        );
    }
}
