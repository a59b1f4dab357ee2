use std::fmt::Display;

use crate::types;

/// The one-line diagnostic sentence.
pub struct Text {
    report: types::Report,
}

impl Text {
    pub fn new(report: types::Report) -> Self {
        Self { report }
    }
}

impl Display for Text {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let r = &self.report;
        write!(
            f,
            "{}KSA {:?}, which links to GSA {:?}, whose roles on the project {:?} are [{}]",
            r.prefix(),
            r.ksa.name,
            r.gsa.as_str(),
            r.project,
            r.roles.join(" ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::formatter::tests::report;

    #[test]
    fn sentence_for_ksa() {
        let text = Text::new(report(None, &["roles/viewer", "roles/storage.admin"]));
        assert_eq!(
            text.to_string(),
            "KSA \"runner\", which links to GSA \"app@proj.iam.gserviceaccount.com\", whose roles on the project \"proj\" are [roles/viewer roles/storage.admin]"
        );
    }

    #[test]
    fn sentence_for_pod_without_roles() {
        let text = Text::new(report(Some("web-0"), &[]));
        assert_eq!(
            text.to_string(),
            "Pod \"web-0\" uses KSA \"runner\", which links to GSA \"app@proj.iam.gserviceaccount.com\", whose roles on the project \"proj\" are []"
        );
    }
}
