// Askama template definitions

use askama::Template;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub version: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub email: String,
}

#[derive(Template)]
#[template(path = "config.html")]
pub struct ConfigTemplate {
    pub email: String,
}

/// Public quote page; template_id comes from the URL, not from a session.
#[derive(Template)]
#[template(path = "quote.html")]
pub struct QuoteTemplate {
    pub template_id: String,
}
