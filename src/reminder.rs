use chrono::Utc;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderStatus {
    Active,
    Completed,
}

/// Kind tag without the kind-specific payload, for denormalized records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderType {
    Task,
    Debit,
    Call,
    Whatsapp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    Upi,
    Mobile,
}

/// Kind-specific fields, tagged on `type`. Exactly one field group exists
/// and always matches the kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReminderKind {
    Task,
    Debit {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        amount: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recipient_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payment_mode: Option<PaymentMode>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upi_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mobile_number: Option<String>,
    },
    Call {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recipient_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        phone: Option<String>,
    },
    Whatsapp {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        recipient_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        phone: Option<String>,
    },
}

impl ReminderKind {
    pub fn reminder_type(&self) -> ReminderType {
        match self {
            ReminderKind::Task => ReminderType::Task,
            ReminderKind::Debit { .. } => ReminderType::Debit,
            ReminderKind::Call { .. } => ReminderType::Call,
            ReminderKind::Whatsapp { .. } => ReminderType::Whatsapp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: ReminderKind,
    pub due_timestamp: i64,
    pub status: ReminderStatus,
    pub created_at: String,
}

impl Reminder {
    pub fn is_due(&self, now_ms: i64) -> bool {
        self.status == ReminderStatus::Active && self.due_timestamp <= now_ms
    }

    /// UPI launch URL for DEBIT reminders. A stored `upi://` URL passes
    /// through untouched; the mobile payment mode uses the intent form.
    pub fn payment_url(&self) -> Option<String> {
        let ReminderKind::Debit {
            amount,
            recipient_name,
            payment_mode,
            upi_id,
            mobile_number,
        } = &self.kind
        else {
            return None;
        };

        let mode = payment_mode.unwrap_or(PaymentMode::Upi);
        match mode {
            PaymentMode::Mobile => {
                let number: String = mobile_number.as_deref()?.split_whitespace().collect();
                if number.is_empty() {
                    return None;
                }
                Some(format!("intent://pay?pa={}@upi#Intent;scheme=upi;end;", number))
            }
            PaymentMode::Upi => {
                let vpa = upi_id.as_deref()?;
                if vpa.starts_with("upi://") {
                    return Some(vpa.to_string());
                }
                let mut url = format!("upi://pay?pa={}", vpa);
                if let Some(name) = recipient_name {
                    url.push_str("&pn=");
                    url.push_str(&encode(name));
                }
                if let Some(amount) = amount {
                    url.push_str(&format!("&am={}", amount));
                }
                if let Some(note) = &self.description {
                    url.push_str("&tn=");
                    url.push_str(&encode(note));
                }
                url.push_str("&cu=INR");
                Some(url)
            }
        }
    }

    /// wa.me launch URL for WHATSAPP reminders, description as prefilled text.
    pub fn whatsapp_url(&self) -> Option<String> {
        let ReminderKind::Whatsapp { phone, .. } = &self.kind else {
            return None;
        };
        let number: String = phone
            .as_deref()?
            .chars()
            .filter(|c| c.is_ascii_digit())
            .collect();
        if number.is_empty() {
            return None;
        }
        let text = encode(self.description.as_deref().unwrap_or(""));
        Some(format!("https://wa.me/{}?text={}", number, text))
    }
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, NON_ALPHANUMERIC).to_string()
}

/// Creation payload from the add-reminder form. The form owns validation;
/// the store only ever sees payloads that passed `validate`.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReminder {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(flatten)]
    pub kind: ReminderKind,
    pub due_timestamp: i64,
}

impl NewReminder {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::validation("title is required"));
        }
        if self.due_timestamp <= 0 {
            return Err(AppError::validation("due time is required"));
        }
        Ok(())
    }

    pub fn into_reminder(self, id: i64) -> Reminder {
        Reminder {
            id,
            title: self.title,
            description: self.description.filter(|d| !d.is_empty()),
            kind: self.kind,
            due_timestamp: self.due_timestamp,
            status: ReminderStatus::Active,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}
