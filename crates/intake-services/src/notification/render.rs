use intake_core::SubmissionFields;

const NOT_SPECIFIED: &str = "Not specified";

/// Subject and both body renditions of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    pub subject: String,
    pub html: String,
    pub text: String,
}

struct Section<'a> {
    title: &'static str,
    rows: Vec<(&'static str, &'a str)>,
}

/// Render the notification for a set of validated fields.
pub fn render_submission(fields: &SubmissionFields) -> RenderedBody {
    let quantity = fields.quantity.to_string();
    let delivery_date = fields
        .delivery_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();

    let sections = [
        Section {
            title: "Contact Information",
            rows: vec![("Name", fields.name.as_str()), ("Work Email", fields.email.as_str())],
        },
        Section {
            title: "Project Details",
            rows: vec![
                ("Project Name", fields.project_name.as_str()),
                ("Material", fields.material.display_name()),
                ("Quantity", quantity.as_str()),
                ("Surface Treatment", fields.surface_treatment.as_str()),
                ("Key Tolerance Information", fields.tolerance.as_str()),
            ],
        },
        Section {
            title: "Logistics",
            rows: vec![
                ("Expected Delivery Date", delivery_date.as_str()),
                ("Destination", fields.destination.as_str()),
            ],
        },
    ];

    let subject = format!("New Project Submission: {}", fields.project_name);

    RenderedBody {
        html: render_html(&subject, &sections, &fields.additional_notes),
        text: render_text(&subject, &sections, &fields.additional_notes),
        subject,
    }
}

fn or_placeholder(value: &str) -> &str {
    if value.is_empty() {
        NOT_SPECIFIED
    } else {
        value
    }
}

fn render_html(subject: &str, sections: &[Section<'_>], notes: &str) -> String {
    let mut html = format!(
        "<div>\n<h1>{}</h1>\n<p>A new project has been submitted through the website. Details are below:</p>\n",
        escape_html(subject)
    );

    for section in sections {
        html.push_str(&format!("<h2>{}</h2>\n<ul>\n", section.title));
        for (label, value) in &section.rows {
            html.push_str(&format!(
                "<li><strong>{}:</strong> {}</li>\n",
                label,
                escape_html(or_placeholder(value))
            ));
        }
        html.push_str("</ul>\n");
    }

    html.push_str(&format!(
        "<h2>Additional Notes</h2>\n<p>{}</p>\n",
        escape_html(or_placeholder(notes)).replace('\n', "<br>")
    ));
    html.push_str("<p>The submitted 3D and 2D files are attached to this email.</p>\n</div>\n");
    html
}

fn render_text(subject: &str, sections: &[Section<'_>], notes: &str) -> String {
    let mut text = format!(
        "{}\nA new project has been submitted through the website. Details are below:\n",
        subject
    );

    for section in sections {
        text.push_str(&format!("\n{}\n", section.title));
        for (label, value) in &section.rows {
            text.push_str(&format!("- {}: {}\n", label, or_placeholder(value)));
        }
    }

    text.push_str(&format!("\nAdditional Notes\n{}\n", or_placeholder(notes)));
    text.push_str("\nThe submitted 3D and 2D files are attached to this email.\n");
    text
}

/// Field values never contain markup characters once validated; escaping
/// keeps the HTML body well-formed if that ever changes.
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
