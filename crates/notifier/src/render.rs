//! Plain-text rendering of notification mails and receipt documents.
//!
//! Amounts are shown in rupees with Indian digit grouping; dates in
//! Asia/Kolkata.

use chrono::{DateTime, Utc};
use engine::{Transaction, TransactionKind};

use crate::Event;

pub(crate) struct Mail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub(crate) fn mail_for(event: &Event) -> Mail {
    match event {
        Event::Welcome {
            name,
            email,
            registration_number,
            plan_amount_minor,
        } => Mail {
            to: email.clone(),
            subject: "Welcome to the society!".to_string(),
            body: format!(
                "Hi {name},\n\n\
                 Your registration is successful. We are glad to have you in our community.\n\n\
                 Registration ID: {registration_number}\n\
                 Monthly plan: {}\n\n\
                 You can now log in to manage your society funds and loans.\n\n\
                 Best regards,\nSociety Management",
                format_inr(*plan_amount_minor)
            ),
        },
        Event::TransactionRecorded { transaction } => Mail {
            to: transaction.member_email.clone(),
            subject: format!("Transaction alert: {}", kind_label(transaction.kind)),
            body: format!(
                "Hi {},\n\n\
                 This is to notify you about a recent transaction on your account.\n\n\
                 Type: {}\n\
                 Amount: {}\n\
                 Description: {}\n\
                 Transaction ID: {}\n\
                 Date: {}\n\n\
                 Best regards,\nSociety Management",
                transaction.member_name,
                kind_label(transaction.kind),
                format_inr(transaction.amount_minor),
                transaction.description.as_deref().unwrap_or("-"),
                transaction.id,
                format_date(transaction.created_at),
            ),
        },
        Event::LoanDueSoon {
            name,
            email,
            remaining_minor,
            due_at,
        } => Mail {
            to: email.clone(),
            subject: "Reminder: loan payment due soon".to_string(),
            body: format!(
                "Hi {name},\n\n\
                 This is a friendly reminder that your loan payment of {} is due on {}.\n\
                 Please ensure timely payment to avoid late fees.\n\n\
                 Best regards,\nSociety Management",
                format_inr(*remaining_minor),
                format_date(*due_at),
            ),
        },
        Event::LoanOverdue {
            name,
            email,
            remaining_minor,
            due_at,
        } => Mail {
            to: email.clone(),
            subject: "URGENT: loan payment overdue".to_string(),
            body: format!(
                "Hi {name},\n\n\
                 Your loan payment of {} was due on {} and is now OVERDUE.\n\
                 Late payment charges and interest will be applied to your account.\n\
                 Please settle the amount immediately to restore your account status.\n\n\
                 Best regards,\nSociety Management",
                format_inr(*remaining_minor),
                format_date(*due_at),
            ),
        },
    }
}

/// The receipt stored alongside a transaction.
pub(crate) fn receipt_document(tx: &Transaction) -> String {
    format!(
        "SOCIETY FUND RECEIPT\n\
         =====================\n\
         Receipt for  : {}\n\
         Member       : {} <{}>\n\
         Type         : {}\n\
         Amount       : {}\n\
         Description  : {}\n\
         Date         : {}\n",
        tx.id,
        tx.member_name,
        tx.member_email,
        kind_label(tx.kind),
        format_inr(tx.amount_minor),
        tx.description.as_deref().unwrap_or("-"),
        format_date(tx.created_at),
    )
}

fn kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Contribution => "Contribution",
        TransactionKind::LoanIssued => "Loan issued",
        TransactionKind::LoanPayment => "Loan payment",
        TransactionKind::Bonus => "Bonus received",
    }
}

fn format_date(dt: DateTime<Utc>) -> String {
    dt.with_timezone(&chrono_tz::Asia::Kolkata)
        .format("%d %b %Y")
        .to_string()
}

/// Rupees with Indian digit grouping: last three digits, then pairs.
fn format_inr(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    let rupees = (abs / 100).to_string();
    let paise = abs % 100;

    let grouped = if rupees.len() > 3 {
        let (head, tail) = rupees.split_at(rupees.len() - 3);
        let mut parts: Vec<&str> = Vec::new();
        let mut i = head.len();
        while i > 2 {
            parts.push(&head[i - 2..i]);
            i -= 2;
        }
        parts.push(&head[..i]);
        let mut out = String::new();
        for part in parts.iter().rev() {
            out.push_str(part);
            out.push(',');
        }
        out.push_str(tail);
        out
    } else {
        rupees
    };

    format!("{sign}\u{20b9}{grouped}.{paise:02}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn inr_grouping() {
        assert_eq!(format_inr(0), "₹0.00");
        assert_eq!(format_inr(50), "₹0.50");
        assert_eq!(format_inr(1_000_00), "₹1,000.00");
        assert_eq!(format_inr(12_345_00), "₹12,345.00");
        assert_eq!(format_inr(1_23_456_75), "₹1,23,456.75");
        assert_eq!(format_inr(12_34_56_789_00), "₹12,34,56,789.00");
        assert_eq!(format_inr(-1_050), "-₹10.50");
    }

    #[test]
    fn receipt_contains_the_essentials() {
        let tx = engine::Transaction::new(
            Uuid::new_v4(),
            "Asha".to_string(),
            "asha@example.com".to_string(),
            TransactionKind::Bonus,
            500_00,
            Some("Diwali bonus".to_string()),
            Utc::now(),
        )
        .unwrap();
        let doc = receipt_document(&tx);
        assert!(doc.contains("Asha"));
        assert!(doc.contains("Bonus received"));
        assert!(doc.contains("₹500.00"));
        assert!(doc.contains(&tx.id.to_string()));
    }

    #[test]
    fn overdue_mail_is_urgent() {
        let event = Event::LoanOverdue {
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            remaining_minor: 3_000_00,
            due_at: Utc::now(),
        };
        let mail = mail_for(&event);
        assert_eq!(mail.to, "asha@example.com");
        assert!(mail.subject.contains("URGENT"));
        assert!(mail.body.contains("₹3,000.00"));
    }
}
