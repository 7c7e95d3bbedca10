use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use crate::error::{Error, Result};
use crate::parsers::clean_text;

static CSRF_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#""_csrf"\s+content="([^"]*)""#).expect("Invalid csrf regex")
});
static ACCOUNT_MENU_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.m-accountmenu").expect("Invalid account menu selector"));
static ACCOUNT_MAIL_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("span.m-accountmenuflyout__info-mail").expect("Invalid account mail selector")
});
static ACCOUNT_NAME_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("span.m-accountmenuflyout__info-title").expect("Invalid account name selector")
});

/// Find the CSRF token in the login page's `_csrf` meta tag.
pub fn extract_csrf_token(html: &str) -> Result<String> {
    CSRF_REGEX
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|token| token.as_str().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::Authentication("no CSRF token on the login page".to_string()))
}

/// Check the account menu of the page returned after login and return the
/// account holder's display name.
pub fn verify_account_menu(html: &str, expected_email: &str) -> Result<String> {
    let document = Html::parse_document(html);

    let menu = document
        .select(&ACCOUNT_MENU_SELECTOR)
        .next()
        .ok_or_else(|| Error::Authentication("no account menu after login".to_string()))?;

    if menu.value().attr("data-logged-in") != Some("true") {
        return Err(Error::Authentication("portal reports the session as logged out".to_string()));
    }

    let email = menu
        .select(&ACCOUNT_MAIL_SELECTOR)
        .next()
        .map(|span| clean_text(&span.text().collect::<String>()))
        .unwrap_or_default();
    if email != expected_email {
        return Err(Error::Authentication(format!(
            "could not find username {} when authenticating",
            expected_email
        )));
    }

    Ok(menu
        .select(&ACCOUNT_NAME_SELECTOR)
        .next()
        .map(|span| clean_text(&span.text().collect::<String>()))
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu(logged_in: &str, email: &str) -> String {
        format!(
            r#"<div class="m-accountmenu" data-logged-in="{logged_in}">
                 <span class="m-accountmenuflyout__info-title">Anna Muster</span>
                 <span class="m-accountmenuflyout__info-mail">{email}</span>
               </div>"#
        )
    }

    #[test]
    fn extracts_csrf_from_meta_tag() {
        let html = r#"<head><meta name="_csrf" content="4f1c-99ab"/></head>"#;
        assert_eq!(extract_csrf_token(html).unwrap(), "4f1c-99ab");
        assert!(extract_csrf_token("<head></head>").is_err());
    }

    #[test]
    fn accepts_matching_logged_in_account() {
        let name = verify_account_menu(&menu("true", "anna@example.ch"), "anna@example.ch").unwrap();
        assert_eq!(name, "Anna Muster");
    }

    #[test]
    fn rejects_logged_out_or_foreign_account() {
        assert!(verify_account_menu(&menu("false", "anna@example.ch"), "anna@example.ch").is_err());
        assert!(verify_account_menu(&menu("true", "bob@example.ch"), "anna@example.ch").is_err());
        assert!(verify_account_menu("<html></html>", "anna@example.ch").is_err());
    }
}
