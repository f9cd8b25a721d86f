#[derive(Debug, thiserror::Error)]
pub enum DockerError {
    #[error("docker CLI not found; install Docker or put `docker` on PATH")]
    NotFound { source: std::io::Error },

    #[error("docker command failed: {args:?} ({status})")]
    CommandFailed { args: Vec<String>, status: String },
}

/// Abstraction over docker CLI execution for testability.
///
/// Production code uses [`RealExecutor`], tests use mockall-generated mocks.
#[allow(async_fn_in_trait)]
pub trait DockerExecutor: Send + Sync {
    /// Execute a docker command, streaming its output to the terminal.
    async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError>;
}

/// Real docker CLI executor.
pub struct RealExecutor;

impl DockerExecutor for RealExecutor {
    async fn exec_streaming(&self, args: &[String]) -> Result<(), DockerError> {
        use std::process::Stdio;

        let status = tokio::process::Command::new("docker")
            .args(args)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| DockerError::NotFound { source: e })?;

        if status.success() {
            Ok(())
        } else {
            Err(DockerError::CommandFailed {
                args: args.to_vec(),
                status: status.to_string(),
            })
        }
    }
}

/// Inputs of one data volume image build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeBuild {
    /// Full image reference, e.g. `dtcenter/metplus-data-dev:develop-obs`
    pub image: String,
    pub dockerfile: String,
    pub context: String,
    pub tarfile_url: String,
    pub mount_point: String,
    pub data_dir: String,
}

impl VolumeBuild {
    pub fn args(&self) -> Vec<String> {
        let mut cmd = args([
            "build",
            "-t",
            self.image.as_str(),
            "-f",
            self.dockerfile.as_str(),
            self.context.as_str(),
        ]);
        for (key, value) in [
            ("TARFILE_URL", &self.tarfile_url),
            ("MOUNTPT", &self.mount_point),
            ("DATA_DIR", &self.data_dir),
        ] {
            cmd.push("--build-arg".to_owned());
            cmd.push(format!("{key}={value}"));
        }
        cmd
    }
}

/// Docker operations client, parameterized over the executor for testability.
pub struct DockerClient<E: DockerExecutor = RealExecutor> {
    executor: E,
}

impl DockerClient<RealExecutor> {
    pub fn new() -> Self {
        Self {
            executor: RealExecutor,
        }
    }
}

impl Default for DockerClient<RealExecutor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: DockerExecutor> DockerClient<E> {
    pub fn with_executor(executor: E) -> Self {
        Self { executor }
    }

    pub async fn build_volume(&self, build: &VolumeBuild) -> Result<(), DockerError> {
        self.run(build.args()).await
    }

    pub async fn push_image(&self, image: &str) -> Result<(), DockerError> {
        self.run(args(["push", image])).await
    }

    /// Remove every unused local image to free disk space between builds.
    pub async fn prune_images(&self) -> Result<(), DockerError> {
        self.run(args(["image", "prune", "-af"])).await
    }

    async fn run(&self, cmd: Vec<String>) -> Result<(), DockerError> {
        tracing::info!(command = %format!("docker {}", cmd.join(" ")), "running command");
        self.executor.exec_streaming(&cmd).await
    }
}

// ── Helper ──

fn args<const N: usize>(a: [&str; N]) -> Vec<String> {
    a.iter().map(|s| (*s).to_owned()).collect()
}
