// https://documentation.mailgun.com/docs/mailgun/api-reference/send/messages/

use std::collections::HashMap;

pub mod models;
use reqwest::Client;

use crate::models::SendMessageResponse;

#[derive(Debug, Clone)]
pub struct MailgunOptions {
    pub api_key: String,
    pub domain: String,
    pub sender: String,
}

#[derive(Debug, Clone)]
pub struct MailgunService {
    options: MailgunOptions,
}

impl MailgunService {
    pub fn new(options: MailgunOptions) -> Self {
        Self { options }
    }

    pub async fn send_email(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<SendMessageResponse, &'static str> {
        let api_key = self.options.api_key.clone();
        let domain = self.options.domain.clone();
        let sender = self.options.sender.clone();

        let url = format!("https://api.mailgun.net/v3/{domain}/messages");

        let mut form_body: HashMap<&str, String> = HashMap::new();
        form_body.insert("from", sender);
        form_body.insert("to", recipient.to_string());
        form_body.insert("subject", subject.to_string());
        form_body.insert("text", body.to_string());

        let client = Client::new();
        let res = client
            .post(url)
            .basic_auth("api", Some(api_key))
            .form(&form_body)
            .send()
            .await;

        match res {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    // Log the error response from Mailgun
                    let error_body = response.text().await.unwrap_or_default();
                    eprintln!("Mailgun error ({}): {}", status, error_body);
                    return Err("Mailgun returned an error");
                }

                let result = response.json::<SendMessageResponse>().await;
                match result {
                    Ok(data) => Ok(data),
                    Err(e) => {
                        eprintln!("Failed to parse Mailgun response: {}", e);
                        Err("Error parsing send response")
                    }
                }
            }
            Err(e) => {
                eprintln!("Request to Mailgun failed: {}", e);
                Err("Error sending email")
            }
        }
    }
}
