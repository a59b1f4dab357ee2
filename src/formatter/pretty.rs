use crate::types;

use comfy_table::{presets::NOTHING, Attribute, Cell, Color, Table};
use std::fmt::Display;

pub struct Pretty {
    report: types::Report,
}

impl Pretty {
    pub fn new(report: types::Report) -> Self {
        Self { report }
    }
}

impl Display for Pretty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut table = Table::new();
        table.load_preset(NOTHING);
        table.set_header(vec![
            Cell::new("Field").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        let report = &self.report;
        if let Some(pod) = &report.pod {
            table.add_row(vec![Cell::new("Pod"), Cell::new(pod)]);
        }
        table.add_row(vec![Cell::new("Namespace"), Cell::new(&report.ksa.namespace)]);
        table.add_row(vec![Cell::new("KSA"), Cell::new(&report.ksa.name)]);
        table.add_row(vec![
            Cell::new("GSA"),
            Cell::new(report.gsa.as_str()).fg(Color::AnsiValue(34)),
        ]);
        table.add_row(vec![Cell::new("Project"), Cell::new(&report.project)]);

        let roles = if report.roles.is_empty() {
            Cell::new("(none)").fg(Color::Red)
        } else {
            Cell::new(report.roles.join("\n"))
        };
        table.add_row(vec![Cell::new("Roles"), roles]);

        table.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::formatter::tests::report;

    #[test]
    fn table_lists_every_field() {
        let out = Pretty::new(report(Some("web-0"), &["roles/viewer", "roles/storage.admin"]))
            .to_string();
        for expected in [
            "Pod",
            "web-0",
            "Namespace",
            "prod",
            "runner",
            "app@proj.iam.gserviceaccount.com",
            "roles/viewer",
            "roles/storage.admin",
        ] {
            assert!(out.contains(expected), "missing {:?} in\n{}", expected, out);
        }
    }

    #[test]
    fn table_without_pod_or_roles() {
        let out = Pretty::new(report(None, &[])).to_string();
        assert!(!out.contains("Pod"));
        assert!(out.contains("(none)"));
    }
}
