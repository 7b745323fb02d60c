//! Static HTML report of ranked products.
//!
//! The page shell and card markup live in `templates/report.html`; askama
//! checks the template at compile time and escapes every value.

use std::path::{Path, PathBuf};

use askama::Template;

use crate::models::ProductRecord;

/// Errors from rendering or writing the report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("template error: {0}")]
    Template(#[from] askama::Error),
    #[error("failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One product card.
struct ReportCard<'a> {
    image: &'a str,
    title: &'a str,
    url: &'a str,
    discount: String,
    price: String,
}

impl<'a> From<&'a ProductRecord> for ReportCard<'a> {
    fn from(record: &'a ProductRecord) -> Self {
        Self {
            image: &record.image,
            title: &record.title,
            url: &record.url,
            discount: format!("{:.2}", record.discount_pct),
            price: format!("{:.2}", record.price),
        }
    }
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate<'a> {
    title: &'a str,
    cards: Vec<ReportCard<'a>>,
}

/// Render the report page for `records`, in the order given.
pub fn render_html(records: &[ProductRecord]) -> Result<String, ReportError> {
    let template = ReportTemplate {
        title: "Result",
        cards: records.iter().map(ReportCard::from).collect(),
    };
    Ok(template.render()?)
}

/// Render `records` and write them to `output`, replacing any existing file.
///
/// Returns the absolute path of the written report.
pub fn render_report(records: &[ProductRecord], output: &Path) -> Result<PathBuf, ReportError> {
    let html = render_html(records)?;

    let write_err = |source| ReportError::Write {
        path: output.to_path_buf(),
        source,
    };
    std::fs::write(output, html).map_err(write_err)?;
    std::fs::canonicalize(output).map_err(write_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, price: f64, discount_pct: f64) -> ProductRecord {
        ProductRecord::new(
            format!("https://cdn.shop.test/{title}.png"),
            title.to_string(),
            format!("https://shop.test/p/{title}"),
            price,
            discount_pct,
        )
    }

    #[test]
    fn test_render_cards_in_order() {
        let html = render_html(&[record("kettle", 39.9, 33.333), record("mug", 5.0, 10.0)])
            .unwrap();

        let kettle = html.find(">kettle</p>").unwrap();
        let mug = html.find(">mug</p>").unwrap();
        assert!(kettle < mug);
        assert!(html.contains("<strong>39.90</strong>"));
        assert!(html.contains(">33.33</small>"));
        assert!(html.contains(">10.00</small>"));
        assert_eq!(html.matches("class=\"col-md-4\"").count(), 2);
    }

    #[test]
    fn test_render_escapes_title() {
        let html = render_html(&[record("<b>bold</b>", 1.0, 50.0)]).unwrap();
        assert!(html.contains("&lt;b&gt;bold&lt;"));
        assert!(!html.contains("<b>bold"));
    }

    #[test]
    fn test_render_empty_report() {
        let html = render_html(&[]).unwrap();
        assert!(html.contains("<title>Result</title>"));
        assert!(!html.contains("card-body"));
        assert!(html.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_render_report_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.html");
        std::fs::write(&output, "stale contents").unwrap();

        let written = render_report(&[record("kettle", 39.9, 25.0)], &output).unwrap();

        assert!(written.is_absolute());
        let contents = std::fs::read_to_string(&written).unwrap();
        assert!(!contents.contains("stale contents"));
        assert!(contents.contains(">kettle</p>"));
    }

    #[test]
    fn test_render_report_bad_directory() {
        let err = render_report(&[], Path::new("/nonexistent/dir/report.html")).unwrap_err();
        assert!(matches!(err, ReportError::Write { .. }));
    }
}
