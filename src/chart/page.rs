//! Self-contained HTML dashboard embedding ECharts options

use std::path::Path;

use charming::Chart;
use handlebars::Handlebars;
use serde::Serialize;
use tracing::info;

use crate::error::Result;

const TEMPLATE: &str = include_str!("dashboard.html.hbs");

#[derive(Debug, Serialize)]
struct Panel {
    id: String,
    heading: String,
    option: Option<String>,
    note: Option<String>,
    height: u32,
}

#[derive(Serialize)]
struct PageData<'a> {
    title: &'a str,
    generated: String,
    panels: &'a [Panel],
}

/// Ordered list of chart panels rendered into one HTML page
pub(crate) struct DashboardPage {
    title: String,
    panels: Vec<Panel>,
}

impl DashboardPage {
    pub(crate) fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            panels: Vec::new(),
        }
    }

    /// Embed the chart's option; its `Display` form splices formatter functions in as code
    pub(crate) fn push_chart(&mut self, heading: impl Into<String>, chart: &Chart, height: u32) {
        // Option lands inside <script>; keep "</" from closing it
        let option = chart.to_string().replace("</", "<\\/");
        let id = format!("panel-{}", self.panels.len());
        self.panels.push(Panel {
            id,
            heading: heading.into(),
            option: Some(option),
            note: None,
            height,
        });
    }

    /// Text-only panel, e.g. a loading or error placeholder
    pub(crate) fn push_note(&mut self, heading: impl Into<String>, note: impl Into<String>) {
        let id = format!("panel-{}", self.panels.len());
        self.panels.push(Panel {
            id,
            heading: heading.into(),
            option: None,
            note: Some(note.into()),
            height: 0,
        });
    }

    pub(crate) fn render(&self) -> Result<String> {
        let data = PageData {
            title: &self.title,
            generated: chrono::Local::now().to_rfc2822(),
            panels: &self.panels,
        };
        Ok(Handlebars::new().render_template(TEMPLATE, &data)?)
    }

    pub(crate) fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render()?)?;
        info!(path = %path.display(), panels = self.panels.len(), "saved dashboard");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charming::component::Title;

    #[test]
    fn test_render_embeds_panels_in_order() {
        let mut page = DashboardPage::new("Crawl time");
        page.push_chart("total", &Chart::new().title(Title::new().text("first")), 480);
        page.push_note("amazon", "Failed to load data from the server");
        let html = page.render().unwrap();

        let first = html.find("panel-0").unwrap();
        let second = html.find("panel-1").unwrap();
        assert!(first < second);
        assert!(html.contains("\"first\""));
        assert!(html.contains("Failed to load data from the server"));
        assert!(html.contains("<title>Crawl time</title>"));
        assert!(!html.contains("panel-2"));
    }

    #[test]
    fn test_script_close_is_escaped() {
        let mut page = DashboardPage::new("t");
        let chart = Chart::new().title(Title::new().text("</script><b>"));
        page.push_chart("x", &chart, 300);
        let html = page.render().unwrap();
        assert!(!html.contains("</script><b>"));
    }

    #[test]
    fn test_save_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dash.html");
        DashboardPage::new("empty").save(&path).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("echarts"));
    }
}
