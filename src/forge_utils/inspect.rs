use std::path::{Path, PathBuf};

use eyre::WrapErr;
use strum::{AsRefStr, Display};
use tracing::{info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum InspectField {
    Abi,
    Bytecode,
}

#[derive(Debug)]
pub struct ForgeInspect {
    cwd: Option<PathBuf>,
    contract_name: String,
    field: InspectField,
}

impl ForgeInspect {
    pub fn new(contract_name: impl ToString, field: InspectField) -> Self {
        Self {
            cwd: None,
            contract_name: contract_name.to_string(),
            field,
        }
    }

    pub fn abi(contract_name: impl ToString) -> Self {
        Self::new(contract_name, InspectField::Abi)
    }

    pub fn bytecode(contract_name: impl ToString) -> Self {
        Self::new(contract_name, InspectField::Bytecode)
    }

    pub fn with_cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_owned());
        self
    }

    fn command(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new("forge");

        cmd.arg("inspect");

        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }

        cmd.arg(&self.contract_name);
        cmd.arg(self.field.as_ref());

        if self.field == InspectField::Abi {
            cmd.arg("--json");
        }

        cmd
    }

    /// Returns forge's stdout, trimmed.
    #[instrument(name = "forge_inspect", skip_all, fields(field = %self.field))]
    pub async fn run(&self) -> eyre::Result<String> {
        let mut cmd = self.command();

        info!("Inspecting contract with {cmd:#?}");

        let output = cmd.output().await.wrap_err_with(|| {
            let cwd = self.cwd.as_deref().unwrap_or_else(|| Path::new("."));
            format!("Running forge in {}", cwd.display())
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            eyre::bail!("forge inspect {} failed: {}", self.field, stderr);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);

        Ok(stdout.trim().to_string())
    }
}
