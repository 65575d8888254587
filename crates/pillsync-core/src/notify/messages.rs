//! Notification message composition.

use serde::{Deserialize, Serialize};

use crate::models::VerificationRecord;

/// Characters of patient OCR text quoted in a mismatch alert.
const MISMATCH_TEXT_CHARS: usize = 200;

/// Characters of the message body carried in an SMS.
const SMS_BODY_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Normal,
    High,
}

/// A composed notification, ready for any channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
    pub priority: Priority,
}

impl Notification {
    /// Compose the notification for a verification result.
    pub fn for_verification(record: &VerificationRecord) -> Self {
        if record.verified {
            verified_message(record)
        } else {
            mismatch_message(record)
        }
    }

    /// Short form sent over SMS.
    pub fn sms_text(&self) -> String {
        let excerpt: String = self.body.chars().take(SMS_BODY_CHARS).collect();
        format!("{}: {}", self.subject, excerpt)
    }
}

fn confidence_percent(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

fn verified_message(record: &VerificationRecord) -> Notification {
    let medicine_name = &record.best.medicine_name;
    let body = format!(
        "MEDICINE VERIFICATION SUCCESSFUL\n\
         \n\
         Patient ID: {}\n\
         Medicine Name: {}\n\
         Verification Confidence: {}\n\
         Verified At: {}\n\
         \n\
         The patient has correctly taken their prescribed medicine.\n\
         \n\
         This is an automated notification from PillSync.\n",
        record.user_id,
        medicine_name,
        confidence_percent(record.best.result.reported_confidence()),
        record.verified_at,
    );

    Notification {
        subject: format!("Medicine Verified - {}", medicine_name),
        body,
        priority: Priority::Normal,
    }
}

fn mismatch_message(record: &VerificationRecord) -> Notification {
    let medicine_name = &record.best.medicine_name;
    let patient_text: String = record.patient_ocr_text.chars().take(MISMATCH_TEXT_CHARS).collect();
    let body = format!(
        "MEDICINE MISMATCH ALERT\n\
         \n\
         Patient ID: {}\n\
         Expected Medicine: {}\n\
         Verification Confidence: {}\n\
         Verified At: {}\n\
         \n\
         WARNING: The medicine photo taken by the patient does not match the registered medicine.\n\
         \n\
         Patient Photo OCR Text: {}\n\
         \n\
         PLEASE CHECK IMMEDIATELY:\n\
         - Verify the patient has the correct medicine\n\
         - Ensure the patient understands which medicine to take\n\
         - Confirm proper medication compliance\n\
         \n\
         This is an automated ALERT from PillSync.\n",
        record.user_id,
        medicine_name,
        confidence_percent(record.best.result.reported_confidence()),
        record.verified_at,
        patient_text,
    );

    Notification {
        subject: format!("MEDICINE MISMATCH ALERT - {}", medicine_name),
        body,
        priority: Priority::High,
    }
}
