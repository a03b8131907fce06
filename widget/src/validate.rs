//! Lead form validation.
//!
//! Checks run in a fixed order and stop at the first failure: required
//! fields, then email shape, then phone shape. Nothing here touches the
//! network.

use std::sync::LazyLock;

use regex::Regex;
use wire::EMAIL_PATTERN;

pub const MISSING_FIELDS: &str = "Please fill in all required fields (Name, Email, Phone, Message).";
pub const INVALID_EMAIL: &str = "Please enter a valid email address.";
pub const INVALID_PHONE: &str = "Please enter a valid phone number.";

const PHONE_PATTERN: &str = r"^[+]?[0-9\s-]{7,15}$";

static EMAIL_RE: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN));
static PHONE_RE: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(PHONE_PATTERN));

/// Raw values of the lead capture form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LeadForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    /// The visitor's first message; sent to the relay once the lead is saved.
    pub query: String,
}

impl LeadForm {
    #[must_use]
    pub fn new(name: &str, email: &str, phone: &str, query: &str) -> Self {
        Self { name: name.into(), email: email.into(), phone: phone.into(), query: query.into() }
    }

    fn trimmed(&self) -> Self {
        Self::new(self.name.trim(), self.email.trim(), self.phone.trim(), self.query.trim())
    }
}

/// Validate and trim the form. The error is the alert text to show.
///
/// # Errors
///
/// Returns the first failing check's message.
pub fn validate_lead(form: &LeadForm) -> Result<LeadForm, &'static str> {
    let form = form.trimmed();
    if form.name.is_empty() || form.email.is_empty() || form.phone.is_empty() || form.query.is_empty() {
        return Err(MISSING_FIELDS);
    }
    if !is_valid_email(&form.email) {
        return Err(INVALID_EMAIL);
    }
    if !is_valid_phone(&form.phone) {
        return Err(INVALID_PHONE);
    }
    Ok(form)
}

#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    matches(&EMAIL_RE, email)
}

/// Optional leading `+`, then 7 to 15 digits, spaces or hyphens.
#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    matches(&PHONE_RE, phone)
}

fn matches(re: &LazyLock<Result<Regex, regex::Error>>, input: &str) -> bool {
    match &**re {
        Ok(re) => re.is_match(input),
        Err(e) => {
            log::error!("validation pattern failed to compile: {e}");
            false
        }
    }
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
