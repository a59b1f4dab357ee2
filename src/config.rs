use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};

use crate::constants;

#[derive(Parser, Debug)]
#[command(
    name = "diagnose-wi",
    version,
    about = "Check that a KSA can use its Workload Identity GSA and list the GSA's project roles"
)]
pub struct Cli {
    /// Pod Namespace
    #[arg(long = "ns", default_value = constants::DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// KSA name
    #[arg(long)]
    pub ksa: Option<String>,

    /// Pod name
    #[arg(long)]
    pub pod: Option<String>,

    /// Project ID
    #[arg(long)]
    pub project: Option<String>,

    /// Cluster Project
    #[arg(long = "clusterProject")]
    pub cluster_project: Option<String>,

    /// Cluster Location
    #[arg(long = "clusterLocation")]
    pub cluster_location: Option<String>,

    /// Cluster Name
    #[arg(long = "clusterName")]
    pub cluster_name: Option<String>,

    /// The address of the Kubernetes API server. Overrides any value in kubeconfig. Only required if out-of-cluster.
    #[arg(long)]
    pub server: Option<String>,

    /// Path to a kubeconfig. Only required if out-of-cluster.
    #[arg(long, env = "KUBECONFIG")]
    pub kubeconfig: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Table,
    Json,
}

/// What the user asked to diagnose.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Subject {
    Ksa(String),
    Pod(String),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClusterFlags {
    pub project: Option<String>,
    pub location: Option<String>,
    pub name: Option<String>,
}

impl ClusterFlags {
    pub fn is_complete(&self) -> bool {
        self.project.is_some() && self.location.is_some() && self.name.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub namespace: String,
    pub subject: Subject,
    pub project: Option<String>,
    pub cluster: ClusterFlags,
    pub server: Option<String>,
    pub kubeconfig: Option<PathBuf>,
    pub output: OutputFormat,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let subject = match (non_empty(cli.ksa), non_empty(cli.pod)) {
            (Some(ksa), None) => Subject::Ksa(ksa),
            (None, Some(pod)) => Subject::Pod(pod),
            _ => bail!("Exactly one of --ksa and --pod must be specified."),
        };
        let namespace = if cli.namespace.is_empty() {
            constants::DEFAULT_NAMESPACE.to_string()
        } else {
            cli.namespace
        };
        Ok(Self {
            namespace,
            subject,
            project: non_empty(cli.project),
            cluster: ClusterFlags {
                project: non_empty(cli.cluster_project),
                location: non_empty(cli.cluster_location),
                name: non_empty(cli.cluster_name),
            },
            server: non_empty(cli.server),
            kubeconfig: cli.kubeconfig.filter(|p| !p.as_os_str().is_empty()),
            output: cli.output,
        })
    }
}

/// Rewrites Go-style long flags (`-ksa`, `-ns=foo`) into the `--ksa` form clap expects.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .enumerate()
        .map(|(i, arg)| {
            let arg: OsString = arg.into();
            if i == 0 || passthrough {
                return arg;
            }
            match arg.to_str() {
                Some("--") => {
                    passthrough = true;
                    arg
                }
                Some(s) if is_go_long_flag(s) => format!("-{}", s).into(),
                _ => arg,
            }
        })
        .collect()
}

fn is_go_long_flag(arg: &str) -> bool {
    let name = match arg.strip_prefix('-') {
        Some(rest) if !rest.starts_with('-') => rest,
        _ => return false,
    };
    let name = name.split('=').next().unwrap_or_default();
    name.chars().count() > 1 && name.starts_with(|c: char| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Config> {
        let args = std::iter::once("diagnose-wi").chain(args.iter().copied());
        Config::from_cli(Cli::try_parse_from(normalize_args(args))?)
    }

    #[test]
    fn go_style_flags_are_rewritten() {
        let args = normalize_args(vec![
            "diagnose-wi",
            "-ksa",
            "app",
            "-ns=prod",
            "--pod",
            "-h",
            "-1",
            "--",
            "-raw",
        ]);
        let args: Vec<&str> = args.iter().filter_map(|a| a.to_str()).collect();
        assert_eq!(
            args,
            vec![
                "diagnose-wi",
                "--ksa",
                "app",
                "--ns=prod",
                "--pod",
                "-h",
                "-1",
                "--",
                "-raw"
            ]
        );
    }

    #[test]
    fn ksa_subject() -> Result<()> {
        let config = parse(&["-ksa", "app", "-ns", "prod"])?;
        assert_eq!(config.subject, Subject::Ksa("app".into()));
        assert_eq!(config.namespace, "prod");
        assert_eq!(config.output, OutputFormat::Text);
        Ok(())
    }

    #[test]
    fn pod_subject_defaults_namespace() -> Result<()> {
        let config = parse(&["--pod=web-0", "-output", "json"])?;
        assert_eq!(config.subject, Subject::Pod("web-0".into()));
        assert_eq!(config.namespace, "default");
        assert_eq!(config.output, OutputFormat::Json);
        Ok(())
    }

    #[test]
    fn exactly_one_subject_is_required() {
        for args in [
            &[][..],
            &["-ksa", "app", "-pod", "web-0"][..],
            &["-ksa", "", "-pod", ""][..],
        ] {
            let err = parse(args).unwrap_err();
            assert!(
                err.to_string().contains("Exactly one of --ksa and --pod"),
                "{:?}: {}",
                args,
                err
            );
        }
    }

    #[test]
    fn empty_values_are_absent() -> Result<()> {
        let config = parse(&["-ksa", "app", "-project", "", "-clusterName", "c1"])?;
        assert_eq!(config.project, None);
        assert_eq!(config.cluster.name.as_deref(), Some("c1"));
        assert!(!config.cluster.is_complete());
        Ok(())
    }

    #[test]
    fn cluster_flags() -> Result<()> {
        let config = parse(&[
            "-ksa",
            "app",
            "-clusterProject",
            "p",
            "-clusterLocation",
            "europe-west1",
            "-clusterName",
            "c1",
            "-server",
            "https://10.0.0.1",
        ])?;
        assert!(config.cluster.is_complete());
        assert_eq!(config.server.as_deref(), Some("https://10.0.0.1"));
        Ok(())
    }
}
