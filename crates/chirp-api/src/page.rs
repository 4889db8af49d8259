//! Server-side markup for the profile page.
//!
//! The page only carries the profile header and the empty `#posts` container;
//! chirps are loaded into it page by page through `/user/fetch_chirps`.

use std::fmt::Write;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use chirp_types::models::UserProfile;

use crate::session::Viewer;

pub const GUEST_AVATAR: &str = "/src/images/users/guest/user.svg";
pub const DEFAULT_BANNER: &str = "/src/images/users/chirp/banner.png";
pub const DEFAULT_BIO: &str =
    "This is a bio where you describe your account using at most 120 characters.";
const VERIFIED_ICON: &str = "/src/images/icons/verified.svg";
/// Characters left as-is in a query value; everything else is percent-encoded.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');
const STYLESHEETS: [&str; 4] = [
    "/src/styles/styles.css",
    "/src/styles/timeline.css",
    "/src/styles/menus.css",
    "/src/styles/responsive.css",
];

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `/user/?id=...` link for `username`, ready to drop into an attribute.
pub fn profile_href(username: &str) -> String {
    let query = utf8_percent_encode(username, QUERY_VALUE).to_string();
    escape_html(&format!("/user/?id={query}"))
}

pub fn page_title(user: &UserProfile) -> String {
    format!(
        "{} (@{}) - Chirp",
        escape_html(display_name(user)),
        escape_html(&user.username)
    )
}

fn display_name(user: &UserProfile) -> &str {
    user.name.as_deref().unwrap_or(&user.username)
}

/// Render the full profile page for `user` as seen by `viewer`.
/// `deferred_error` is a drained session message to surface in the console.
pub fn render_profile(user: &UserProfile, viewer: &Viewer, deferred_error: Option<&str>) -> String {
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1, viewport-fit=cover\">\n",
    );
    for sheet in STYLESHEETS {
        let _ = writeln!(html, "    <link href=\"{sheet}\" rel=\"stylesheet\">");
    }
    let _ = writeln!(html, "    <title>{}</title>", page_title(user));
    html.push_str("</head>\n<body>\n");

    render_viewer_menu(&mut html, viewer);
    html.push_str("<main>\n<div id=\"feed\">\n<div id=\"chirps\">\n");
    render_header(&mut html, user);
    html.push_str("</div>\n");

    let _ = writeln!(
        html,
        "<div id=\"posts\" data-offset=\"0\" data-user=\"{}\"></div>",
        user.id
    );
    html.push_str("<div id=\"noMoreChirps\"><div class=\"lds-ring\"><div></div><div></div><div></div><div></div></div></div>\n");
    html.push_str("</div>\n</main>\n");

    if let Some(message) = deferred_error {
        let _ = writeln!(html, "<script>console.error({});</script>", script_string(message));
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_viewer_menu(html: &mut String, viewer: &Viewer) {
    let claims = viewer.claims();
    let username = claims.map(|c| c.username.as_str()).unwrap_or("guest");
    let name = claims.and_then(|c| c.name.as_deref()).unwrap_or(match claims {
        Some(c) => c.username.as_str(),
        None => "Guest",
    });
    let avatar = claims
        .and_then(|c| c.profile_pic.as_deref())
        .unwrap_or(GUEST_AVATAR);
    let profile_link = match claims {
        Some(c) => profile_href(&c.username),
        None => "/signin".to_string(),
    };
    let verified = claims.is_some_and(|c| c.is_verified);

    html.push_str("<header>\n<nav>\n");
    html.push_str("    <a href=\"/\">Home</a>\n");
    let _ = writeln!(html, "    <a href=\"{profile_link}\">Profile</a>");
    html.push_str("</nav>\n<div id=\"viewer\">\n");
    let _ = writeln!(
        html,
        "    <img class=\"userPic\" src=\"{}\" alt=\"{}\">",
        escape_html(avatar),
        escape_html(username)
    );
    let _ = write!(html, "    <p class=\"usernameMenu\">{}", escape_html(name));
    if verified {
        let _ = write!(html, " <img class=\"emoji\" src=\"{VERIFIED_ICON}\" alt=\"Verified\">");
    }
    html.push_str("</p>\n");
    let _ = writeln!(html, "    <p class=\"subText\">@{}</p>", escape_html(username));
    if claims.is_some() {
        html.push_str("    <a href=\"/signout\">Sign out</a>\n");
    } else {
        html.push_str("    <a href=\"/signin/\">Sign in</a>\n");
    }
    html.push_str("</div>\n</header>\n");
}

fn render_header(html: &mut String, user: &UserProfile) {
    let avatar = user.profile_pic.as_deref().unwrap_or(GUEST_AVATAR);
    let banner = user.user_banner.as_deref().unwrap_or(DEFAULT_BANNER);
    let name = escape_html(display_name(user));

    let _ = writeln!(html, "<img class=\"userBanner\" src=\"{}\">", escape_html(banner));
    html.push_str("<div class=\"account\">\n<div class=\"accountInfo\">\n");
    let _ = writeln!(html, "    <img class=\"userPic\" src=\"{}\" alt=\"{}\">", escape_html(avatar), name);
    let _ = write!(html, "    <p>{name}");
    if user.is_verified {
        let _ = write!(html, " <img class=\"verified\" src=\"{VERIFIED_ICON}\" alt=\"Verified\">");
    }
    html.push_str("</p>\n");
    let _ = writeln!(html, "    <p class=\"subText\">@{}</p>", escape_html(&user.username));
    html.push_str("</div>\n");
    let _ = writeln!(
        html,
        "<p class=\"bio\">{}</p>",
        escape_html(user.bio.as_deref().unwrap_or(DEFAULT_BIO))
    );
    let _ = writeln!(
        html,
        "<div id=\"accountStats\"><p class=\"subText\">{} following</p><p class=\"subText\">{} followers</p></div>",
        user.following.unwrap_or(0),
        user.followers.unwrap_or(0)
    );
    html.push_str("</div>\n");
}

/// JSON-encode a message for inline script use. `</` is split so a message
/// cannot close the surrounding script element.
fn script_string(message: &str) -> String {
    serde_json::Value::String(message.to_string())
        .to_string()
        .replace("</", "<\\/")
}
