//! Server-rendered HTML for the submission form and public profile pages.
//!
//! The markup is small enough that a templating engine would outweigh it;
//! pages are assembled from escaped fields directly.

use crate::badge::BadgeRecord;

/// Escape text for interpolation into HTML content and attribute values
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

const STYLE: &str = r#"
    body { font-family: sans-serif; background: #fff; margin: 0; }
    header { background: #2563eb; color: #fff; padding: 1rem 2rem; }
    header h1 { margin: 0; font-size: 1.5rem; }
    main { max-width: 56rem; margin: 2rem auto; padding: 0 1rem; }
    .card { background: #eff6ff; border-radius: 0.5rem; padding: 2rem;
            box-shadow: 0 1px 3px rgba(0,0,0,0.2); }
    .card h2 { color: #2563eb; margin-top: 0; }
    .field { margin-bottom: 1rem; }
    .field label { display: block; font-weight: 600; color: #1d4ed8;
                   margin-bottom: 0.25rem; }
    .field input { width: 100%; padding: 0.5rem; border: 1px solid #93c5fd;
                   border-radius: 0.25rem; box-sizing: border-box; }
    .error { color: #dc2626; margin: 0.25rem 0 0; }
    button { background: #2563eb; color: #fff; border: 0; padding: 0.6rem 1.5rem;
             border-radius: 0.25rem; font-size: 1rem; cursor: pointer; }
    .qr img { border: 1px solid #93c5fd; border-radius: 0.25rem; }
    .detail { font-weight: 600; color: #1d4ed8; margin: 0.5rem 0; }
    .extended h3 { color: #2563eb; margin-bottom: 0.25rem; }
    .extended p { color: #374151; margin-top: 0; }
"#;

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <header><h1>Lanyard</h1></header>\n<main>{body}</main>\n</body>\n</html>\n",
        title = escape(title),
    )
}

/// The attendee submission form
///
/// Posts JSON to `/badges` and navigates to the returned profile URL;
/// server-side validation messages are mirrored inline.
pub fn submission_form() -> String {
    let body = r#"
<div class="card">
  <h2>Create Your Badge</h2>
  <form id="badge-form">
    <div class="field">
      <label for="name">Name:</label>
      <input type="text" id="name" name="name">
    </div>
    <div class="field">
      <label for="university">University:</label>
      <input type="text" id="university" name="university">
    </div>
    <div class="field">
      <label for="major">Major:</label>
      <input type="text" id="major" name="major">
    </div>
    <div class="field">
      <label for="graduationDate">Graduation Date:</label>
      <input type="date" id="graduationDate" name="graduationDate">
    </div>
    <div class="field">
      <label for="github">GitHub (optional):</label>
      <input type="text" id="github" name="github">
    </div>
    <p class="error" id="form-error"></p>
    <button type="submit">Generate Badge</button>
  </form>
</div>
<script>
document.getElementById('badge-form').addEventListener('submit', async (e) => {
  e.preventDefault();
  const error = document.getElementById('form-error');
  error.textContent = '';
  const field = (id) => document.getElementById(id).value.trim();
  const payload = {
    name: field('name'),
    university: field('university'),
    major: field('major'),
    graduationDate: field('graduationDate'),
    github: field('github'),
  };
  for (const required of ['name', 'university', 'major', 'graduationDate']) {
    if (!payload[required]) {
      error.textContent = 'All fields except GitHub are required';
      return;
    }
  }
  const response = await fetch('/badges', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify(payload),
  });
  const data = await response.json();
  if (response.ok) {
    window.location.href = '/profile/' + data.id;
  } else {
    error.textContent = data.error || 'Failed to create badge';
  }
});
</script>
"#;
    page("Create Your Badge | Lanyard", body)
}

/// The public profile page for a badge record
pub fn profile(record: &BadgeRecord) -> String {
    let name = escape(&record.name);
    let github = if record.github.is_empty() {
        "N/A".to_string()
    } else {
        let handle = escape(&record.github);
        format!("<a href=\"https://github.com/{handle}\" rel=\"noopener noreferrer\">{handle}</a>")
    };
    let skills = escape(record.skills.as_deref().unwrap_or("No skills provided"));
    let interests = escape(record.interests.as_deref().unwrap_or("No interests provided"));
    let year = escape(record.year_in_college.as_deref().unwrap_or("Not provided"));
    let photo = match record.profile_photo.as_deref() {
        Some(url) if url.starts_with("http") => {
            format!(
                "<img src=\"{}\" alt=\"{name}'s profile photo\" width=\"150\" height=\"150\">",
                escape(url)
            )
        }
        _ => String::new(),
    };

    let body = format!(
        r#"
<div class="card">
  <h2>{name}'s Badge</h2>
  {photo}
  <p class="detail"><strong>Name:</strong> {name}</p>
  <p class="detail"><strong>University:</strong> {university}</p>
  <p class="detail"><strong>Major:</strong> {major}</p>
  <p class="detail"><strong>Graduation Date:</strong> {graduation_date}</p>
  <p class="detail"><strong>GitHub:</strong> {github}</p>
  <div class="qr">
    <h3>Scan Your Badge</h3>
    <img src="{qr_code}" alt="{name}'s QR code">
  </div>
  <div class="extended">
    <h3>Skills</h3>
    <p>{skills}</p>
    <h3>Interests</h3>
    <p>{interests}</p>
    <h3>Year in College</h3>
    <p>{year}</p>
  </div>
</div>
"#,
        university = escape(&record.university),
        major = escape(&record.major),
        graduation_date = escape(&record.graduation_date),
        qr_code = escape(&record.qr_code),
    );

    page(&format!("{}'s Badge | Lanyard", record.name), &body)
}

/// The rendered not-found state for an unknown identifier
pub fn profile_not_found(id: &str) -> String {
    let body = format!(
        "<div class=\"card\"><h2>Profile not found</h2>\
         <p>No badge exists for identifier {}.</p></div>",
        escape(id)
    );
    page("Profile not found | Lanyard", &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> BadgeRecord {
        BadgeRecord {
            id: "1700000000000".to_string(),
            name: "Ada".to_string(),
            university: "X".to_string(),
            major: "CS".to_string(),
            graduation_date: "2025-05".to_string(),
            github: "ada".to_string(),
            profile_url: "http://localhost:8080/profile/1700000000000".to_string(),
            qr_code: "data:image/png;base64,AAAA".to_string(),
            profile_photo: None,
            skills: None,
            interests: None,
            year_in_college: None,
        }
    }

    #[test]
    fn test_profile_shows_submitted_fields() {
        let html = profile(&record());
        assert!(html.contains("Ada"));
        assert!(html.contains("<strong>University:</strong> X"));
        assert!(html.contains("<strong>Major:</strong> CS"));
        assert!(html.contains("<strong>Graduation Date:</strong> 2025-05"));
        assert!(html.contains("https://github.com/ada"));
        assert!(html.contains("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_profile_without_github_shows_na() {
        let mut rec = record();
        rec.github = String::new();
        let html = profile(&rec);
        assert!(html.contains("<strong>GitHub:</strong> N/A"));
    }

    #[test]
    fn test_profile_extended_field_placeholders() {
        let html = profile(&record());
        assert!(html.contains("No skills provided"));
        assert!(html.contains("No interests provided"));
        assert!(html.contains("Not provided"));

        let mut rec = record();
        rec.skills = Some("Rust, Embedded".to_string());
        rec.year_in_college = Some("Junior".to_string());
        let html = profile(&rec);
        assert!(html.contains("Rust, Embedded"));
        assert!(html.contains("Junior"));
        assert!(!html.contains("No skills provided"));
    }

    #[test]
    fn test_profile_photo_requires_http_url() {
        let mut rec = record();
        rec.profile_photo = Some("javascript:alert(1)".to_string());
        assert!(!profile(&rec).contains("javascript:alert(1)"));

        rec.profile_photo = Some("https://example.com/ada.png".to_string());
        assert!(profile(&rec).contains("https://example.com/ada.png"));
    }

    #[test]
    fn test_fields_are_html_escaped() {
        let mut rec = record();
        rec.name = "<script>alert(1)</script>".to_string();
        let html = profile(&rec);
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_not_found_page_names_identifier() {
        let html = profile_not_found("999");
        assert!(html.contains("Profile not found"));
        assert!(html.contains("999"));
    }

    #[test]
    fn test_form_posts_to_badges() {
        let html = submission_form();
        assert!(html.contains("fetch('/badges'"));
        assert!(html.contains("graduationDate"));
        assert!(html.contains("All fields except GitHub are required"));
    }
}
