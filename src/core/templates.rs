use crate::core::{EmailTemplate, Kind, Record};
use serde::Serialize;

/// Sender names used in the `From` header.
#[derive(Debug, Clone)]
pub struct MailIdentity {
    pub sender: String,
    pub organization_name: String,
    pub site_name: String,
}

impl MailIdentity {
    fn from_header(&self, display_name: &str) -> String {
        format!("\"{}\" <{}>", display_name, self.sender)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

pub fn subject(template: EmailTemplate) -> &'static str {
    match template {
        EmailTemplate::Confirmation(kind) => match kind {
            Kind::Contact => "We received your message",
            Kind::Forum => "CJB Business Forum Registration Received",
            Kind::Marketplace => "Marketplace Registration Received",
            Kind::Membership => "Membership Registration Received",
            Kind::School => "School of Eschatology Registration Received",
            Kind::Tour => "Tour Registration Received",
            Kind::Product => "Product Submission Received",
        },
        EmailTemplate::Alert(kind) => match kind {
            Kind::Contact => "📥 New Contact Submission",
            Kind::Forum => "📥 New Forum Registration",
            Kind::Marketplace => "📥 New Marketplace Registration",
            Kind::Membership => "📥 New Membership Application Received",
            Kind::School => "📥 New School of Eschatology Registration",
            Kind::Tour => "📥 New Tour Registration",
            Kind::Product => "📥 New Product Submitted",
        },
    }
}

/// Renders `template` for `record`, addressed to `recipient`.
pub fn render(
    template: EmailTemplate,
    recipient: &str,
    record: &Record,
    identity: &MailIdentity,
) -> EmailMessage {
    let (from_name, html) = match template {
        EmailTemplate::Confirmation(kind) => {
            let from = match kind {
                Kind::Contact | Kind::Forum => &identity.site_name,
                _ => &identity.organization_name,
            };
            (from, confirmation_body(kind, record))
        }
        EmailTemplate::Alert(kind) => (&identity.site_name, alert_body(kind, record)),
    };

    EmailMessage {
        from: identity.from_header(from_name),
        to: recipient.to_string(),
        subject: subject(template).to_string(),
        html,
    }
}

fn confirmation_body(kind: Kind, record: &Record) -> String {
    let v = |name: &str| escape_html(&record.field_str(name).unwrap_or_default());
    let full_name = || {
        let title = record
            .field_str("title")
            .map(|t| format!("{} ", escape_html(&t)))
            .unwrap_or_default();
        format!("{}{} {}", title, v("firstName"), v("lastName"))
    };

    match kind {
        Kind::Contact => format!(
            "<h2>Hi {},</h2>\n<p>Thanks for contacting CJB. We received your message about <strong>{}</strong> and will get back to you soon.</p>",
            v("name"),
            v("subject")
        ),
        Kind::Forum => format!(
            "<h2>Dear {} {},</h2>\n<p>Thank you for registering for the CJB Business Forum. Company: <strong>{}</strong>.</p>",
            v("firstName"),
            v("lastName"),
            v("companyName")
        ),
        Kind::Marketplace => format!(
            "<h2>Thank you, {}!</h2>\n<p>We’ve received your business registration for <strong>{}</strong>.</p>",
            v("ownerName"),
            v("businessName")
        ),
        Kind::Membership => format!(
            "<h2>Dear {},</h2>\n<p>Your membership application has been received. Thank you!</p>",
            v("firstName")
        ),
        Kind::School => format!(
            "<h2>Dear {},</h2>\n<p>Thank you for registering with the Messianic School of Eschatology & Jewish Root.</p>",
            full_name()
        ),
        Kind::Tour => format!(
            "<h2>Dear {},</h2>\n<p>Thank you for registering for the tour.</p>\n<p><strong>Destination:</strong> {}</p>\n<p><strong>Preferred Dates:</strong> {}</p>",
            full_name(),
            v("destination"),
            or_na(record, "dates")
        ),
        Kind::Product => format!(
            "<h2>Thank you!</h2>\n<p>Your product <strong>{}</strong> has been submitted to the {} catalog.</p>",
            v("name"),
            v("category")
        ),
    }
}

fn alert_body(kind: Kind, record: &Record) -> String {
    let heading = match kind {
        Kind::Contact => "New Contact Submission",
        Kind::Forum => "New Forum Registration",
        Kind::Marketplace => "New Marketplace Registration",
        Kind::Membership => "New Membership Application",
        Kind::School => "New School Registration",
        Kind::Tour => "New Tour Registration",
        Kind::Product => "New Product",
    };

    let mut html = format!("<h2>{heading}</h2>\n");
    for name in crate::domain::forms::field_names(kind) {
        html.push_str(&format!(
            "<p><strong>{}:</strong> {}</p>\n",
            label(name),
            or_na(record, name)
        ));
    }
    if let Some(image) = record.field_str("image") {
        html.push_str(&format!("<p><strong>Image:</strong> {}</p>\n", escape_html(&image)));
    }
    if let Some(at) = record.submitted_at {
        html.push_str(&format!(
            "<p><em>Submitted at {}</em></p>",
            at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    html
}

fn or_na(record: &Record, name: &str) -> String {
    record
        .field_str(name)
        .map(|v| escape_html(&v))
        .unwrap_or_else(|| "N/A".to_string())
}

fn label(field: &str) -> String {
    match field {
        "isChristian" => "Christian".to_string(),
        "preferredGarment" => "Preferred Garments".to_string(),
        "dates" => "Preferred Dates".to_string(),
        "companyName" => "Company".to_string(),
        "businessName" => "Business".to_string(),
        "ownerName" => "Owner".to_string(),
        other => {
            // camelCase -> "Camel Case"
            let mut out = String::new();
            for (i, c) in other.chars().enumerate() {
                if i == 0 {
                    out.extend(c.to_uppercase());
                } else if c.is_uppercase() {
                    out.push(' ');
                    out.push(c);
                } else {
                    out.push(c);
                }
            }
            out
        }
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity() -> MailIdentity {
        MailIdentity {
            sender: "site@example.org".to_string(),
            organization_name: "Christian Jewish Believers".to_string(),
            site_name: "CJB Website".to_string(),
        }
    }

    fn record(value: serde_json::Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_tour_confirmation_includes_title_and_dates_fallback() {
        let tour = record(json!({
            "title": "Dr",
            "firstName": "Eli",
            "lastName": "Ben",
            "email": "eli@example.com",
            "destination": "Galilee",
        }));

        let msg = render(
            EmailTemplate::Confirmation(Kind::Tour),
            "eli@example.com",
            &tour,
            &identity(),
        );

        assert_eq!(msg.from, "\"Christian Jewish Believers\" <site@example.org>");
        assert_eq!(msg.subject, "Tour Registration Received");
        assert!(msg.html.contains("Dear Dr Eli Ben,"));
        assert!(msg.html.contains("<strong>Preferred Dates:</strong> N/A"));
    }

    #[test]
    fn test_alert_lists_canonical_fields_with_labels() {
        let member = record(json!({
            "firstName": "Ruth",
            "lastName": "Moab",
            "email": "ruth@example.com",
            "country": "Israel",
            "isChristian": "yes",
            "submittedAt": "2024-03-01T08:30:00Z",
        }));

        let msg = render(
            EmailTemplate::Alert(Kind::Membership),
            "admin@example.org",
            &member,
            &identity(),
        );

        assert_eq!(msg.from, "\"CJB Website\" <site@example.org>");
        assert_eq!(msg.to, "admin@example.org");
        assert!(msg.html.contains("<strong>First Name:</strong> Ruth"));
        assert!(msg.html.contains("<strong>Christian:</strong> yes"));
        assert!(msg.html.contains("<strong>Preferred Garments:</strong> N/A"));
        assert!(msg.html.contains("Submitted at 2024-03-01 08:30:00 UTC"));
    }

    #[test]
    fn test_user_values_are_escaped() {
        let contact = record(json!({
            "name": "<script>x</script>",
            "subject": "Tom & Jerry",
        }));
        let msg = render(
            EmailTemplate::Confirmation(Kind::Contact),
            "a@b.org",
            &contact,
            &identity(),
        );
        assert!(msg.html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(msg.html.contains("Tom &amp; Jerry"));
        assert_eq!(msg.from, "\"CJB Website\" <site@example.org>");
    }

    #[test]
    fn test_product_alert_mentions_image() {
        let product = record(json!({"name": "Oil", "category": "Health", "image": "/uploads/a.png"}));
        let msg = render(EmailTemplate::Alert(Kind::Product), "ops@x.org", &product, &identity());
        assert!(msg.html.contains("<strong>Image:</strong> /uploads/a.png"));
        assert_eq!(msg.subject, "📥 New Product Submitted");
    }
}
