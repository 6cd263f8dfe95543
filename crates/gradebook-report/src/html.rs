//! HTML report generator.
//!
//! Produces self-contained HTML files with all CSS inlined and charts drawn
//! as inline SVG.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use gradebook_core::grades::round2;
use gradebook_core::StudentEntity;

/// Number of students drawn in the class chart.
const CHART_TOP_N: usize = 10;

/// Highest possible grade; bars are scaled against it.
const GRADE_SCALE: f64 = 20.0;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn text(value: &Option<String>) -> String {
    html_escape(value.as_deref().unwrap_or("-"))
}

fn average_text(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

fn push_head(html: &mut String, title: &str) {
    html.push_str("<!DOCTYPE html>\n<html lang=\"fr\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!("<title>{}</title>\n", html_escape(title)));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");
}

fn push_footer(html: &mut String) {
    html.push_str(&format!(
        "<footer class=\"meta\">Generated {}</footer>\n",
        Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</body>\n</html>");
}

/// Generate the report for one student.
pub fn generate_student_html(student: &StudentEntity) -> String {
    let mut html = String::new();
    push_head(&mut html, &format!("Student report: {}", student.display_name()));

    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&student.display_name())));
    html.push_str("</header>\n");

    html.push_str("<section class=\"identity\">\n<table>\n<tbody>\n");
    let identity = [
        ("Numero", &student.numero),
        ("Nom", &student.nom),
        ("Prenom", &student.prenom),
        ("Date de naissance", &student.date_naissance),
        ("Classe", &student.classe),
    ];
    for (label, value) in identity {
        html.push_str(&format!("<tr><th>{label}</th><td>{}</td></tr>\n", text(value)));
    }
    html.push_str("</tbody>\n</table>\n</section>\n");

    html.push_str("<section class=\"grades\">\n");
    html.push_str("<h2>Grades</h2>\n");
    if student.grades().is_empty() {
        html.push_str("<p class=\"meta\">No grades recorded.</p>\n");
    } else {
        html.push_str("<table>\n");
        html.push_str("<thead><tr><th>Subject</th><th>Assignments</th><th>Exam</th><th>Average</th></tr></thead>\n");
        html.push_str("<tbody>\n");
        for (subject, record) in student.grades().iter() {
            let assignments = record
                .assignment_scores
                .iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{:.2}</td></tr>\n",
                html_escape(subject),
                assignments,
                record.exam_score,
                record.average(),
            ));
        }
        html.push_str("</tbody></table>\n");
    }
    html.push_str("</section>\n");

    html.push_str(&format!(
        "<p class=\"overall\">Overall average: <strong>{}</strong></p>\n",
        average_text(student.overall_average)
    ));

    push_footer(&mut html);
    html
}

/// Generate the report for a class.
///
/// Students are listed by overall average, best first, and the ten best are
/// charted.
pub fn generate_class_html(classe: &str, students: &[&StudentEntity]) -> String {
    let mut ranked: Vec<&StudentEntity> = students.to_vec();
    ranked.sort_by(|a, b| b.average_or_zero().total_cmp(&a.average_or_zero()));

    let class_average = if ranked.is_empty() {
        None
    } else {
        let sum: f64 = ranked.iter().map(|s| s.average_or_zero()).sum();
        Some(round2(sum / ranked.len() as f64))
    };

    let mut html = String::new();
    push_head(&mut html, &format!("Class report: {classe}"));

    html.push_str("<header>\n");
    html.push_str(&format!("<h1>Class {}</h1>\n", html_escape(classe)));
    html.push_str(&format!(
        "<p class=\"meta\">{} students | class average <strong>{}</strong></p>\n",
        ranked.len(),
        average_text(class_average)
    ));
    html.push_str("</header>\n");

    if !ranked.is_empty() {
        html.push_str("<section class=\"chart\">\n");
        html.push_str(&format!("<h2>Top {}</h2>\n", CHART_TOP_N.min(ranked.len())));
        html.push_str(&generate_bar_chart(&ranked[..CHART_TOP_N.min(ranked.len())]));
        html.push_str("</section>\n");
    }

    html.push_str("<section class=\"ranking\">\n");
    html.push_str("<h2>Students</h2>\n");
    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>#</th><th>Numero</th><th>Nom</th><th>Prenom</th><th>Average</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for (rank, student) in ranked.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            rank + 1,
            text(&student.numero),
            text(&student.nom),
            text(&student.prenom),
            average_text(student.overall_average),
        ));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    push_footer(&mut html);
    html
}

/// Write a student report, creating the parent directory.
pub fn write_student_report(student: &StudentEntity, path: &Path) -> Result<()> {
    write_html(&generate_student_html(student), path)
}

/// Write a class report, creating the parent directory.
///
/// Fails when `students` is empty.
pub fn write_class_report(classe: &str, students: &[&StudentEntity], path: &Path) -> Result<()> {
    if students.is_empty() {
        anyhow::bail!("no accepted students in class {classe}");
    }
    write_html(&generate_class_html(classe, students), path)
}

fn write_html(html: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write report: {}", path.display()))?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}

fn generate_bar_chart(students: &[&StudentEntity]) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 220;

    let total_height = students.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, student) in students.iter().enumerate() {
        let average = student.average_or_zero();
        let y = i * (bar_height + padding) + padding;
        let width = ((average / GRADE_SCALE).clamp(0.0, 1.0) * max_width as f64) as usize;

        let color = if average >= 14.0 {
            "#22c55e"
        } else if average >= 10.0 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"13\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&student.display_name())
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"3\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.2}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            average
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.overall { font-size: 1.2rem; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
footer { margin-top: 3rem; font-size: 0.85rem; }
svg { margin: 1rem 0; }
"#;
