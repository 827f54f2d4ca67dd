//! HTML pages.
//!
//! Pages are small enough to build with `format!`; every value that comes
//! from a user or from QuickBooks goes through [`escape`].

use std::fmt::Write as _;

use qb_link_core::Customer;

/// Escape text for use in HTML content and attribute values.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{body}\n</body>\n</html>\n",
        escape(title)
    )
}

/// The bare login link.
#[must_use]
pub fn auth_link(authorization_url: &str) -> String {
    format!(
        "<a href=\"{}\">Login with Intuit</a>",
        escape(authorization_url)
    )
}

/// Landing page with the login link.
#[must_use]
pub fn index(authorization_url: &str, logged_in: bool) -> String {
    let mut body = String::from("<h1>QuickBooks Link</h1>\n");
    if logged_in {
        body.push_str("<p>Connected to QuickBooks.</p>\n<p><a href=\"/customers\">View Customers</a></p>\n");
    }
    let _ = writeln!(body, "<p>{}</p>", auth_link(authorization_url));
    layout("QuickBooks Link", &body)
}

/// Confirmation shown after a successful OAuth callback.
#[must_use]
pub fn logged_in() -> String {
    "<p>You are logged in!</p><br><a href=\"/customers\">View Customers</a>".to_string()
}

fn optional(value: Option<&str>) -> String {
    value.map(escape).unwrap_or_default()
}

/// Customer table with invoice actions and the creation form.
#[must_use]
pub fn customers(customers: &[Customer]) -> String {
    let mut body = String::from("<h1>Customers</h1>\n");

    body.push_str(
        "<table>\n<thead><tr><th>Display name</th><th>QuickBooks ID</th>\
         <th>Salary advance invoice</th><th>Tip invoice</th><th></th></tr></thead>\n<tbody>\n",
    );

    for customer in customers {
        let id = customer.id.to_string();
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td><a href=\"/customers/{id}/createSAInvoice\">Create salary advance invoice</a> \
             <a href=\"/customers/{id}/createTipInvoice\">Create tip invoice</a></td></tr>",
            escape(&customer.display_name),
            escape(&customer.external_customer_id),
            optional(customer.salary_advance_invoice_id.as_deref()),
            optional(customer.tip_invoice_id.as_deref()),
        );
    }

    body.push_str("</tbody>\n</table>\n");
    body.push_str(
        "<form method=\"post\" action=\"/customers\">\n\
         <input type=\"text\" name=\"displayName\" placeholder=\"Display name\" required>\n\
         <button type=\"submit\">Create customer</button>\n</form>\n",
    );

    layout("Customers", &body)
}
