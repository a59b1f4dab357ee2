use std::fmt::Display;

use crate::config::OutputFormat;
use crate::types;

mod json;
mod pretty;
mod text;

pub enum Formatter {
    Text(text::Text),
    Pretty(pretty::Pretty),
    Json(json::Json),
}

impl Formatter {
    pub fn new(format: OutputFormat, report: types::Report) -> Self {
        match format {
            OutputFormat::Text => Formatter::Text(text::Text::new(report)),
            OutputFormat::Table => Formatter::Pretty(pretty::Pretty::new(report)),
            OutputFormat::Json => Formatter::Json(json::Json::new(report)),
        }
    }
}

impl Display for Formatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Formatter::Text(t) => t.fmt(f),
            Formatter::Pretty(p) => p.fmt(f),
            Formatter::Json(j) => j.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::{GsaEmail, KsaRef, Report};

    pub(super) fn report(pod: Option<&str>, roles: &[&str]) -> Report {
        Report {
            pod: pod.map(String::from),
            ksa: KsaRef::new("prod", "runner"),
            gsa: GsaEmail::new("app@proj.iam.gserviceaccount.com"),
            project: "proj".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn format_selection() {
        let r = report(None, &["roles/viewer"]);
        assert!(matches!(
            Formatter::new(OutputFormat::Text, r.clone()),
            Formatter::Text(_)
        ));
        assert!(matches!(
            Formatter::new(OutputFormat::Table, r.clone()),
            Formatter::Pretty(_)
        ));
        assert!(matches!(
            Formatter::new(OutputFormat::Json, r),
            Formatter::Json(_)
        ));
    }
}
