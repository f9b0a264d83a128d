//! Login-form field extraction.
//!
//! The login page carries a fixed set of hidden inputs (csrf, session, and
//! tracking tokens) that must be echoed back on submit. This module turns
//! the page HTML into a flat key/value form-data map.

use std::collections::HashMap;

use scraper::{Html, Selector};

use crate::error::{Error, Result};

/// Hidden inputs the login page must carry.
const HIDDEN_FIELDS: &[&str] = &[
    "loginCsrfParam",
    "sIdString",
    "parentPageKey",
    "pageInstance",
    "fp_data",
    "_d",
    "controlId",
];

/// Fixed fields posted alongside the scraped ones.
const FIXED_FIELDS: &[(&str, &str)] = &[
    ("ac", "0"),
    ("trk", ""),
    ("authUUID", ""),
    ("session_redirect", ""),
];

/// Extract the login form's hidden fields into a form-data map.
///
/// A missing input is a malformed-data error naming the field.
pub fn login_form_fields(html: &str) -> Result<HashMap<String, String>> {
    let document = Html::parse_document(html);
    let mut fields = HashMap::new();

    for &name in HIDDEN_FIELDS {
        let selector =
            Selector::parse(&format!("input[name=\"{}\"]", name)).expect("static selector");
        let value = document
            .select(&selector)
            .next()
            .and_then(|input| input.value().attr("value"))
            .ok_or_else(|| Error::malformed(name, "login form"))?;
        fields.insert(name.to_string(), value.to_string());
    }

    // The CSRF value is posted twice, under both names.
    let csrf = fields["loginCsrfParam"].clone();
    fields.insert("csrfToken".to_string(), csrf);

    for &(name, value) in FIXED_FIELDS {
        fields.insert(name.to_string(), value.to_string());
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_PAGE: &str = r#"
        <html><body><form action="/checkpoint/lg/login-submit">
            <input type="hidden" name="loginCsrfParam" value="csrf-123">
            <input type="hidden" name="sIdString" value="sid-1">
            <input type="hidden" name="parentPageKey" value="login">
            <input type="hidden" name="pageInstance" value="urn:li:page:login">
            <input type="hidden" name="fp_data" value="fp">
            <input type="hidden" name="_d" value="d">
            <input type="hidden" name="controlId" value="ctl-1">
            <input name="session_key"><input name="session_password" type="password">
        </form></body></html>"#;

    #[test]
    fn extracts_hidden_and_fixed_fields() {
        let fields = login_form_fields(LOGIN_PAGE).unwrap();

        assert_eq!(fields["loginCsrfParam"], "csrf-123");
        assert_eq!(fields["csrfToken"], "csrf-123");
        assert_eq!(fields["controlId"], "ctl-1");
        assert_eq!(fields["ac"], "0");
        assert_eq!(fields["trk"], "");
        assert_eq!(fields["session_redirect"], "");
    }

    #[test]
    fn missing_input_names_the_field() {
        let html = LOGIN_PAGE.replace("controlId", "somethingElse");
        let err = login_form_fields(&html).unwrap_err();
        assert!(matches!(
            err,
            Error::MalformedData { ref field, ref node }
                if field == "controlId" && node == "login form"
        ));
    }
}
