use crate::types::Role;
use thiserror::Error;

pub type BillResult<T> = Result<T, BillError>;

#[derive(Error, Debug)]
pub enum BillError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Import error: {0}")]
    Import(String),

    #[error("no row containing 'Month' found in the bill; check the file format")]
    HeaderNotFound,

    #[error("missing required column roles: {}", format_roles(.0))]
    MissingRoles(Vec<Role>),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Export error: {0}")]
    Export(String),
}

fn format_roles(roles: &[Role]) -> String {
    roles
        .iter()
        .map(Role::name)
        .collect::<Vec<_>>()
        .join(", ")
}
