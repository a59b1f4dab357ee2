use std::fmt::Display;

use serde::Serialize;

use crate::types;

pub struct Json {
    result: JsonReport,
}

#[derive(Serialize)]
struct JsonReport {
    pod: Option<String>,
    namespace: String,
    ksa: String,
    gsa: types::GsaEmail,
    project: String,
    roles: Vec<String>,
}

impl From<types::Report> for JsonReport {
    fn from(value: types::Report) -> Self {
        Self {
            pod: value.pod,
            namespace: value.ksa.namespace,
            ksa: value.ksa.name,
            gsa: value.gsa,
            project: value.project,
            roles: value.roles,
        }
    }
}

impl Json {
    pub fn new(report: types::Report) -> Self {
        Self {
            result: report.into(),
        }
    }
}

impl Display for Json {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(&self.result) {
            Ok(output) => f.write_str(&output),
            Err(_e) => Err(std::fmt::Error),
        }
    }
}
